//! Progress reporting for the query battery.
//!
//! [`ProgressCallback`] keeps the battery independent of how progress is
//! rendered; the CLI plugs in an `indicatif` bar, tests use
//! [`NullProgress`].

/// Receives progress updates from the battery.
pub trait ProgressCallback: Send + Sync {
    /// Set the total number of queries to run.
    fn set_total(&self, total: u64);

    /// Advance by `delta` completed queries.
    fn inc(&self, delta: u64);

    /// Update the message shown alongside the indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}
