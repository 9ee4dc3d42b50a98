mod transport;

pub use transport::{OutputSink, ProcessTransport, TransportClient};

use crate::goal;
use crate::model::{DispatchOutcome, GoalMessage};

/// Serializes goals and hands each one to the transport exactly once.
pub struct GoalDispatcher<T: TransportClient> {
    topic: String,
    message_type: String,
    transport: T,
}

impl<T: TransportClient> GoalDispatcher<T> {
    pub fn new(topic: impl Into<String>, message_type: impl Into<String>, transport: T) -> Self {
        Self {
            topic: topic.into(),
            message_type: message_type.into(),
            transport,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Publish `message` once. There is no retry and no deduplication: calling
    /// this twice with the same message launches two publishes.
    pub fn dispatch(&self, message: GoalMessage) -> DispatchOutcome {
        let payload = goal::to_payload(&message);
        self.dispatch_payload(&payload)
    }

    fn dispatch_payload(&self, payload: &str) -> DispatchOutcome {
        tracing::debug!(topic = %self.topic, message_type = %self.message_type, "dispatching goal");
        match self
            .transport
            .publish_once(&self.topic, &self.message_type, payload)
        {
            Ok(()) => DispatchOutcome::Sent,
            Err(e) => {
                tracing::warn!(topic = %self.topic, "dispatch failed: {e}");
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}
