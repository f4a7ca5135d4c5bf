//! Events pushed by a build engine to its subscribers.

use crate::artifact::TreeSnapshot;
use std::sync::Arc;

/// Notification emitted by a [`BuildEngine`](crate::BuildEngine).
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The build failed. Does not invalidate previously built artifacts.
    Error { message: String, stack: String },

    /// `tree[artifact][variant]` holds a freshly built buffer.
    Change {
        artifact: String,
        variant: String,
        tree: Arc<TreeSnapshot>,
    },
}

impl EngineEvent {
    /// Build an error event from any error, using its source chain as the stack.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut stack = String::new();
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        EngineEvent::Error {
            message: err.to_string(),
            stack,
        }
    }
}
