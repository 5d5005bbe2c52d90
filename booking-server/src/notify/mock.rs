//! Recording notification sink for tests

use async_trait::async_trait;
use parking_lot::Mutex;

use super::sink::{Channel, NotificationSink, NotifyError, OutboundMessage};

/// Sink double that records every delivery attempt.
///
/// `fail_channel` hace fallar un canal para verificar que el otro se
/// intenta igual.
#[derive(Default)]
pub struct RecordingSink {
    attempted: Mutex<Vec<OutboundMessage>>,
    delivered: Mutex<Vec<OutboundMessage>>,
    failing: Mutex<Vec<Channel>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_channel(&self, channel: Channel) {
        self.failing.lock().push(channel);
    }

    /// Every attempt, in order, including failed ones
    pub fn attempted(&self) -> Vec<OutboundMessage> {
        self.attempted.lock().clone()
    }

    pub fn delivered(&self) -> Vec<OutboundMessage> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
        self.attempted.lock().push(message.clone());
        if self.failing.lock().contains(&message.channel) {
            return Err(NotifyError::Rejected("forced failure".into()));
        }
        self.delivered.lock().push(message.clone());
        Ok(())
    }
}
