//! Input feed abstraction for attribute updates

use tokio::sync::mpsc;

use crate::Result;
use crate::types::RawAttributeUpdate;

/// Source of raw attribute updates.
///
/// Implemented by whatever sits on top of the wireless transport. The feed
/// decides its own pacing; the driver simply awaits the next update.
#[async_trait::async_trait]
pub trait AttributeFeed: Send + 'static {
    /// Wait for the next attribute update
    ///
    /// Returns:
    /// - `Ok(Some(update))` - update received
    /// - `Ok(None)` - feed ended (link closed)
    /// - `Err(e)` - transient feed failure, the driver backs off and retries
    async fn next_update(&mut self) -> Result<Option<RawAttributeUpdate>>;
}

#[async_trait::async_trait]
impl AttributeFeed for mpsc::Receiver<RawAttributeUpdate> {
    async fn next_update(&mut self) -> Result<Option<RawAttributeUpdate>> {
        Ok(self.recv().await)
    }
}

/// Sending half of a [`ChannelFeed`]
pub type FeedSender = mpsc::Sender<Result<RawAttributeUpdate>>;

/// Channel-backed feed that can also carry transport errors.
pub struct ChannelFeed {
    rx: mpsc::Receiver<Result<RawAttributeUpdate>>,
}

impl ChannelFeed {
    /// Create a bounded feed and its sender.
    pub fn channel(capacity: usize) -> (FeedSender, ChannelFeed) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, ChannelFeed { rx })
    }
}

#[async_trait::async_trait]
impl AttributeFeed for ChannelFeed {
    async fn next_update(&mut self) -> Result<Option<RawAttributeUpdate>> {
        self.rx.recv().await.transpose()
    }
}
