//! Notification sink trait and message types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::business::{NotificationSettings, NotificationTemplate};

/// Delivery channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Whatsapp,
}

/// Which configured template a message was rendered from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Confirmation,
    Reminder,
    Deposit,
}

impl TemplateKind {
    /// Template content/toggles for this kind in a settings blob
    pub fn template<'a>(&self, settings: &'a NotificationSettings) -> &'a NotificationTemplate {
        match self {
            TemplateKind::Confirmation => &settings.confirmation,
            TemplateKind::Reminder => &settings.reminder,
            TemplateKind::Deposit => &settings.deposit,
        }
    }
}

/// Rendered outbound message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub channel: Channel,
    pub kind: TemplateKind,
    /// Email address or phone number, según el canal
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery rejected: {0}")]
    Rejected(String),

    #[error("notification transport error: {0}")]
    Transport(String),
}

/// Delivery seam; implementations must not retry internally (at most
/// one attempt per state-machine invocation).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), NotifyError>;
}
