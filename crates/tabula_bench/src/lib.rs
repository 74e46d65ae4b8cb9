//! Benchmark utilities.

#![warn(missing_docs)]

use tabula_testkit::{widget, Widget};

/// Generates `count` widgets with ids `0..count`.
pub fn generate_widgets(count: usize) -> Vec<Widget> {
    generate_widgets_from(0, count)
}

/// Generates `count` widgets with ids starting at `offset`.
pub fn generate_widgets_from(offset: usize, count: usize) -> Vec<Widget> {
    (offset as u32..(offset + count) as u32)
        .map(|id| widget(id, &format!("widget-{id}")))
        .collect()
}
