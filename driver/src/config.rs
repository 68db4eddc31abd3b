//! Line configuration source.
//!
//! The driver never hard-codes pin numbers; reset and interrupt lines are
//! resolved by name at open time, so the same core runs on any board that
//! can answer the two well-known names (`fp-gpio-reset`, `fp-gpio-irq`).
//! The embedding kernel typically answers from its device tree; boards
//! with compiled-in pin maps use [`StaticLineConfig`].

/// Resolves named hardware lines to line numbers.
pub trait LineConfig: Send + Sync {
    /// Resolve a named line. Returns `None` when the name is unknown.
    fn line_by_name(&self, name: &str) -> Option<u32>;
}

/// Fixed-table line configuration for boards with compiled-in pin maps.
pub struct StaticLineConfig {
    entries: &'static [(&'static str, u32)],
}

impl StaticLineConfig {
    pub const fn new(entries: &'static [(&'static str, u32)]) -> Self {
        Self { entries }
    }
}

impl LineConfig for StaticLineConfig {
    fn line_by_name(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, line)| *line)
    }
}
