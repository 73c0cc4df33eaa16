//! Pass-scoped record of exempted validator names
//!
//! A type alias of shape `Static<typeof validatorName>` (optionally
//! wrapped once in `Readonly<...>`) merely re-exposes the inferred type
//! of an already-checked validator, so the validator declaration it
//! names is exempt from reporting. The alias and the validator may
//! appear in either order in the source; membership is therefore built
//! during the full declaration scan and only consulted at flush.

use rustc_hash::FxHashSet;

#[derive(Debug, Default)]
pub struct ExemptionTracker {
    names: FxHashSet<String>,
}

impl ExemptionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn is_exempt(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
