//! Advisory diagnostics, emitted as `tracing` events with this module's path as the target.

use deep_clone::Diagnostics;
use tracing::{debug, warn};

use crate::InvalidSize;

#[cfg_attr(test, mutants::skip)] // Output only, no effect on behavior.
pub(crate) fn invalid_size(diagnostics: Diagnostics, error: &InvalidSize) {
    if diagnostics.is_reported() {
        warn!(field = error.field, value = %error.value, "{error}");
    }
}

#[cfg_attr(test, mutants::skip)] // Output only, no effect on behavior.
pub(crate) fn floored_size(
    diagnostics: Diagnostics,
    field: &'static str,
    requested: f64,
    floored: usize,
) {
    if diagnostics.is_reported() {
        debug!(field, requested, floored, "{field} value is floored to an integer");
    }
}
