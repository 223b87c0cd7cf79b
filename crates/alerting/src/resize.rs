//! Container Resize Notifications
//!
//! Visible graphs follow the width of their container. Each one holds a
//! [`ResizeSubscription`] while it is shown; dropping it unsubscribes.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Width used until the container has been measured
pub const DEFAULT_WIDTH: u32 = 500;

/// Publishes the container width to subscribed graphs
#[derive(Debug, Clone)]
pub struct ResizeBus {
    tx: Arc<watch::Sender<u32>>,
}

impl ResizeBus {
    pub fn new(width: u32) -> Self {
        let (tx, _) = watch::channel(width);
        Self { tx: Arc::new(tx) }
    }

    /// Publish a new container width
    pub fn resize(&self, width: u32) {
        let previous = self.tx.send_replace(width);
        if previous != width {
            debug!("Container resized {} -> {}", previous, width);
        }
    }

    pub fn width(&self) -> u32 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> ResizeSubscription {
        ResizeSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Live subscriptions
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ResizeBus {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

/// A graph's interest in container resizes, released on drop
#[derive(Debug)]
pub struct ResizeSubscription {
    rx: watch::Receiver<u32>,
}

impl ResizeSubscription {
    /// Latest published width
    pub fn width(&self) -> u32 {
        *self.rx.borrow()
    }

    /// Whether a width was published since the last [`changed`](Self::changed)
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next width; `None` once the bus is gone
    pub async fn changed(&mut self) -> Option<u32> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
