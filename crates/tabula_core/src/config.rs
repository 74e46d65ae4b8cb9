//! Unit-of-work configuration.

use tabula_storage::ConflictMode;

/// Configuration for a unit of work.
#[derive(Debug, Clone)]
pub struct Config {
    /// How the relational backend submits changes.
    pub conflict_mode: ConflictMode,

    /// Initial capacity of the per-type table registry.
    pub registry_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conflict_mode: ConflictMode::ContinueOnConflict,
            registry_capacity: 3,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the conflict mode used on save.
    #[must_use]
    pub const fn conflict_mode(mut self, mode: ConflictMode) -> Self {
        self.conflict_mode = mode;
        self
    }

    /// Sets the initial registry capacity.
    #[must_use]
    pub const fn registry_capacity(mut self, capacity: usize) -> Self {
        self.registry_capacity = capacity;
        self
    }
}
