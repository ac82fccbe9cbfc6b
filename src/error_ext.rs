//! Logging conversions from `Result` to `Option`.
//!
//! Export content is third-party input, so many failures are recoverable:
//! the offending item is dropped and the run continues. These helpers make
//! sure every dropped item leaves a trace.

use tracing::{debug, warn};

pub trait ResultExt<T, E: std::fmt::Display> {
    /// Convert to Option, logging the error at warn level if Err.
    fn ok_warn(self, context: &str) -> Option<T>;

    /// Convert to Option, logging the error at debug level if Err.
    ///
    /// For failures that are routine in real exports.
    fn ok_debug(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn ok_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(context = %context, error = %e, "Skipping unreadable item");
                None
            }
        }
    }

    fn ok_debug(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(context = %context, error = %e, "Skipping item");
                None
            }
        }
    }
}
