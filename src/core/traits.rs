use async_trait::async_trait;

use crate::reply::ReplyEnvelope;

/// Something that can answer a chat message.
///
/// Implementations absorb every failure themselves: errors come back as a
/// readable [`ReplyEnvelope`], and `None` means the provider produced nothing
/// usable.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, user_text: &str) -> Option<ReplyEnvelope>;
}
