//! Advisory diagnostics, emitted as `tracing` events with this module's path as the target.

use tracing::warn;

/// Whether advisory diagnostics are emitted.
///
/// Diagnostics never affect the outcome of an operation. They are reported as [`tracing`] events
/// and can additionally be filtered by the installed subscriber.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum Diagnostics {
    /// Diagnostics are emitted. This is the default.
    #[default]
    Report,

    /// No diagnostics are emitted.
    Suppress,
}

impl Diagnostics {
    /// Whether diagnostics are emitted.
    #[must_use]
    pub fn is_reported(self) -> bool {
        self == Self::Report
    }
}

#[cfg_attr(test, mutants::skip)] // Output only, no effect on behavior.
pub(crate) fn unsupported_type(diagnostics: Diagnostics, type_name: &str) {
    if diagnostics.is_reported() {
        warn!(type_name, "unknown object type encountered, replacing it with null");
    }
}
