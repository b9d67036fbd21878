use {async_trait::async_trait, autodelete_common::MessageEvent};

/// Receives inbound messages from a platform adapter.
///
/// Implementations must return quickly: adapters await `dispatch` on their
/// event loop.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn dispatch(&self, event: MessageEvent);
}
