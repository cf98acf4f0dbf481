//! System notification contract.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Best-effort notification delivery failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError(pub String);

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification failed: {}", self.0)
    }
}

impl Error for NotifyError {}

/// Desktop notification primitive.
pub trait Notifier {
    /// Asks the platform for permission; returns whether it was granted.
    fn request_permission(&mut self) -> bool;
    fn notify(&mut self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Notifier for environments without a notification primitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn request_permission(&mut self) -> bool {
        false
    }

    fn notify(&mut self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
