//! Caller-facing response channel
//!
//! The front-end pushes the final reply and receives "still working" pings
//! through this trait. Pings are best-effort: the tracker ignores their errors
//! and stops waiting on a ping after one poll interval.

use async_trait::async_trait;
use parking_lot::Mutex;
use relay_foundation::Result;

/// Push interface back to whoever asked
#[async_trait]
pub trait ResponseChannel: Send + Sync {
    /// Deliver a reply (result, failure notice, or timeout notice)
    async fn send_reply(&self, text: &str) -> Result<()>;

    /// Keep the front-end's activity indicator alive
    async fn send_working(&self) -> Result<()>;
}

/// Channel that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChannel;

#[async_trait]
impl ResponseChannel for NoopChannel {
    async fn send_reply(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn send_working(&self) -> Result<()> {
        Ok(())
    }
}

/// Channel that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryChannel {
    replies: Mutex<Vec<String>>,
    working: Mutex<usize>,
    fail_working: bool,
    stall_working: bool,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose progress pings always fail
    pub fn failing_pings() -> Self {
        Self {
            fail_working: true,
            ..Self::default()
        }
    }

    /// A channel whose progress pings never complete
    pub fn stalled_pings() -> Self {
        Self {
            stall_working: true,
            ..Self::default()
        }
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().clone()
    }

    /// Progress pings attempted
    pub fn working_count(&self) -> usize {
        *self.working.lock()
    }
}

#[async_trait]
impl ResponseChannel for MemoryChannel {
    async fn send_reply(&self, text: &str) -> Result<()> {
        self.replies.lock().push(text.to_string());
        Ok(())
    }

    async fn send_working(&self) -> Result<()> {
        *self.working.lock() += 1;
        if self.stall_working {
            return std::future::pending().await;
        }
        if self.fail_working {
            return Err(relay_foundation::Error::Http("chat action rejected".into()));
        }
        Ok(())
    }
}
