//! # Notification Sink Adapters
//!
//! Delivery targets for creation notifications. Transport is out of scope
//! for the core: the recording sink backs tests and replay, the tracing
//! sink bridges notifications into the log stream.

use crate::events::Notification;
use crate::ports::outbound::NotificationSink;
use async_trait::async_trait;
use std::sync::RwLock;
use tracing::info;

// =============================================================================
// RECORDING SINK
// =============================================================================

/// Sink that records every notification in order.
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    recorded: RwLock<Vec<Notification>>,
}

impl RecordingNotificationSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications recorded so far, in publication order.
    #[must_use]
    pub fn recorded(&self) -> Vec<Notification> {
        self.recorded.read().unwrap().clone()
    }

    /// Number of notifications recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recorded.read().unwrap().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recorded.read().unwrap().is_empty()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn publish(&self, notification: Notification) {
        self.recorded.write().unwrap().push(notification);
    }
}

// =============================================================================
// TRACING SINK
// =============================================================================

/// Sink that logs each notification's topic at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn publish(&self, notification: Notification) {
        info!(topic = notification.topic(), "notification published");
    }
}

// =============================================================================
// TESTS
// =============================================================================
