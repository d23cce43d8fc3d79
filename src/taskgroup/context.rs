use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::actor::Actor;
use crate::error::TaskError;

/// Actor that terminates the group when an external token is cancelled.
///
/// Both ways of finishing (external cancellation or interruption by another
/// actor) yield [`TaskError::Canceled`].
pub struct ContextHandler {
    token: CancellationToken,
}

impl ContextHandler {
    /// Watches a child of `parent`; cancelling `parent` ends the actor.
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }
}

#[async_trait]
impl Actor for ContextHandler {
    async fn execute(&self, token: CancellationToken) -> Result<(), TaskError> {
        tokio::select! {
            _ = self.token.cancelled() => {},
            _ = token.cancelled() => {},
        }
        Err(TaskError::Canceled)
    }

    fn interrupt(&self, token: &CancellationToken, _reason: Option<&TaskError>) {
        token.cancel();
    }
}
