//! # Submission handle.
//!
//! [`RetryHandle`] is returned by every successful submit. It only allows
//! abandoning the submission; outcomes are observable through events.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Handle to one submitted task and its retry sequence.
///
/// Cloning is cheap; all clones control the same submission.
#[derive(Clone, Debug)]
pub struct RetryHandle {
    name: Arc<str>,
    token: CancellationToken,
}

impl RetryHandle {
    pub(crate) fn new(name: Arc<str>, token: CancellationToken) -> Self {
        Self { name, token }
    }

    /// Name of the submitted task.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Abandons the submission.
    ///
    /// An attempt that has not started yet will not run; a running attempt
    /// sees the cancellation on its token and is never rescheduled.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once the submission (or the whole scheduler) was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
