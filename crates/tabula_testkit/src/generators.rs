//! Property-based test generators using proptest.
//!
//! Provides strategies for record values and for sequences of table
//! operations, plus a plain model to check backends against.

use crate::fixtures::Widget;
use proptest::prelude::*;
use std::collections::BTreeMap;
use tabula_core::{CoreResult, Table, UnitOfWork};

/// Strategy for generating widget names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}").expect("Invalid regex")
}

/// Strategy for generating a single widget with an id below `max_id`.
pub fn widget_strategy(max_id: u32) -> impl Strategy<Value = Widget> {
    (0..max_id, name_strategy()).prop_map(|(id, name)| Widget { id, name })
}

/// Strategy for generating up to `max_len` widgets with distinct ids.
///
/// `widgets_strategy(0)` only yields the empty vector.
pub fn widgets_strategy(max_len: usize) -> impl Strategy<Value = Vec<Widget>> {
    let max_id = (max_len as u32).saturating_mul(4).max(1);
    prop::collection::btree_map(0..max_id, name_strategy(), 0..=max_len)
        .prop_map(|named| {
            named
                .into_iter()
                .map(|(id, name)| Widget { id, name })
                .collect()
        })
}

/// A table operation to apply in a test.
#[derive(Debug, Clone)]
pub enum TableOperation {
    /// Add a widget.
    Add(Widget),
    /// Update the widget with this id to a new name.
    Update {
        /// Widget id
        id: u32,
        /// New name
        name: String,
    },
    /// Remove the widget with this id.
    Remove {
        /// Widget id
        id: u32,
    },
    /// Remove every widget whose name starts with this letter.
    RemoveWhere {
        /// Name prefix
        prefix: char,
    },
}

/// Strategy for generating table operations over ids below `max_id`.
pub fn table_operation_strategy(max_id: u32) -> impl Strategy<Value = TableOperation> {
    prop_oneof![
        3 => widget_strategy(max_id).prop_map(TableOperation::Add),
        2 => (0..max_id, name_strategy())
            .prop_map(|(id, name)| TableOperation::Update { id, name }),
        2 => (0..max_id).prop_map(|id| TableOperation::Remove { id }),
        1 => prop::char::range('a', 'z').prop_map(|prefix| TableOperation::RemoveWhere { prefix }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    max_id: u32,
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<TableOperation>> {
    prop::collection::vec(table_operation_strategy(max_id), min_ops..max_ops)
}

/// Applies `op` to the widget table of `uow`.
///
/// Only operations a [`WidgetModel`] accepted should be applied; others
/// fail on the in-memory backend.
pub fn apply_operation<U: UnitOfWork>(uow: &mut U, op: &TableOperation) -> CoreResult<()> {
    let mut widgets = uow.table::<Widget>()?;
    match op {
        TableOperation::Add(widget) => widgets.add(widget.clone()),
        TableOperation::Update { id, name } => widgets.update(Widget {
            id: *id,
            name: name.clone(),
        }),
        TableOperation::Remove { id } => widgets.remove(Widget {
            id: *id,
            name: String::new(),
        }),
        TableOperation::RemoveWhere { prefix } => widgets
            .remove_where(&|w| w.name.starts_with(*prefix))
            .map(|_| ()),
    }
}

/// Reference model of a widget table.
///
/// A removed id may be added again; both backends treat that as a
/// replacement of the removed widget.
#[derive(Debug, Clone, Default)]
pub struct WidgetModel {
    widgets: BTreeMap<u32, String>,
}

impl WidgetModel {
    /// Creates a model holding `seed`.
    pub fn new(seed: &[Widget]) -> Self {
        Self {
            widgets: seed.iter().map(|w| (w.id, w.name.clone())).collect(),
        }
    }

    /// Applies `op` if it is valid and returns whether it was accepted.
    pub fn accepts(&mut self, op: &TableOperation) -> bool {
        match op {
            TableOperation::Add(widget) => {
                if self.widgets.contains_key(&widget.id) {
                    return false;
                }
                self.widgets.insert(widget.id, widget.name.clone());
                true
            }
            TableOperation::Update { id, name } => match self.widgets.get_mut(id) {
                Some(current) => {
                    *current = name.clone();
                    true
                }
                None => false,
            },
            TableOperation::Remove { id } => self.widgets.remove(id).is_some(),
            TableOperation::RemoveWhere { prefix } => {
                let matched: Vec<u32> = self
                    .widgets
                    .iter()
                    .filter(|(_, name)| name.starts_with(*prefix))
                    .map(|(id, _)| *id)
                    .collect();
                for id in matched {
                    self.widgets.remove(&id);
                }
                true
            }
        }
    }

    /// Returns the modelled widgets ordered by id.
    pub fn widgets(&self) -> Vec<Widget> {
        self.widgets
            .iter()
            .map(|(id, name)| Widget {
                id: *id,
                name: name.clone(),
            })
            .collect()
    }
}

/// Returns `widgets` ordered by id.
pub fn sorted_by_id(mut widgets: Vec<Widget>) -> Vec<Widget> {
    widgets.sort_by_key(|w| w.id);
    widgets
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn widget_ids_are_distinct(widgets in widgets_strategy(16)) {
            let ids: HashSet<u32> = widgets.iter().map(|w| w.id).collect();
            prop_assert_eq!(ids.len(), widgets.len());
        }

        #[test]
        fn model_rejects_adding_a_present_id(ops in operation_sequence_strategy(8, 1, 40)) {
            let mut model = WidgetModel::default();
            for op in &ops {
                let present: HashSet<u32> = model.widgets().iter().map(|w| w.id).collect();
                let accepted = model.accepts(op);
                if let TableOperation::Add(widget) = op {
                    prop_assert_eq!(accepted, !present.contains(&widget.id));
                }
            }
        }
    }

    #[test]
    fn zero_length_widgets_are_empty() {
        use proptest::strategy::ValueTree;
        use proptest::test_runner::TestRunner;

        let mut runner = TestRunner::deterministic();
        for _ in 0..16 {
            let tree = widgets_strategy(0).new_tree(&mut runner).unwrap();
            assert!(tree.current().is_empty());
        }
    }

    #[test]
    fn removed_id_can_be_added_again() {
        let mut model = WidgetModel::new(&[Widget {
            id: 1,
            name: "a".into(),
        }]);

        assert!(model.accepts(&TableOperation::Remove { id: 1 }));
        assert!(model.accepts(&TableOperation::Add(Widget {
            id: 1,
            name: "b".into(),
        })));
        assert_eq!(
            model.widgets(),
            vec![Widget {
                id: 1,
                name: "b".into(),
            }]
        );
    }
}
