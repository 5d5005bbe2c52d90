//! Business (tenant) entity and its settings blob
//!
//! The settings blob is data-driven configuration stored as JSON on the
//! business row. Every field defaults so partially-filled blobs from the
//! dashboard still deserialize.

use serde::{Deserialize, Serialize};

/// Business (tenant) entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Business {
    pub id: String,
    /// Unique slug used in public URLs
    pub slug: String,
    pub name: String,
    /// IANA timezone, e.g. "America/Argentina/Buenos_Aires"
    pub timezone: String,
    /// Calendar integration credential; None = integration absent
    pub google_refresh_token: Option<String>,
    /// JSON settings blob (see [`BusinessSettings`])
    pub settings: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Business {
    /// Parse the settings blob, falling back to defaults on a corrupt blob
    pub fn parse_settings(&self) -> BusinessSettings {
        serde_json::from_str(&self.settings).unwrap_or_else(|e| {
            tracing::warn!(business = %self.slug, error = %e, "Corrupt settings blob, using defaults");
            BusinessSettings::default()
        })
    }
}

/// Resource-scoping policy for availability queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AvailabilityMode {
    /// Single shared resource: every event blocks the whole day
    #[default]
    #[serde(rename = "global")]
    Global,
    /// Parallel independent resources; untagged events block everyone
    #[serde(rename = "per_worker")]
    PerWorker,
}

/// Full settings blob stored on the business row
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BusinessSettings {
    #[serde(default)]
    pub booking: BookingPolicy,
    #[serde(default)]
    pub equipo: TeamSettings,
    #[serde(default)]
    pub servicios: ServiceCatalog,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

/// Confirmation / deposit policy
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingPolicy {
    /// When false, submissions auto-approve
    #[serde(default)]
    pub require_manual_confirmation: bool,
    #[serde(default)]
    pub request_deposit: bool,
    #[serde(default)]
    pub deposit_percentage: f64,
}

impl BookingPolicy {
    /// A deposit is only required when the flag is set AND the
    /// percentage is meaningful.
    pub fn deposit_required(&self) -> bool {
        self.request_deposit && self.deposit_percentage > 0.0
    }
}

/// Staff roster (equipo)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TeamSettings {
    #[serde(default)]
    pub availability_mode: AvailabilityMode,
    #[serde(default)]
    pub items: Vec<StaffMember>,
}

impl TeamSettings {
    pub fn find(&self, resource_id: &str) -> Option<&StaffMember> {
        self.items.iter().find(|m| m.id == resource_id)
    }
}

/// Staff member (bookable resource under `per_worker` mode)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    /// Payment alias (CVU/alias) included in deposit messages
    #[serde(default)]
    pub alias_cvu: Option<String>,
}

/// Service catalog (servicios)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceCatalog {
    #[serde(default)]
    pub items: Vec<ServiceItem>,
}

impl ServiceCatalog {
    /// Resolve a price by service title. First match wins; unknown
    /// services fall back to 0 (the operator sets the final price at
    /// approval time anyway).
    pub fn price_for(&self, title: &str) -> f64 {
        self.items
            .iter()
            .find(|s| s.titulo == title)
            .map(|s| s.precio)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceItem {
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub precio: f64,
}

/// Per-template notification toggles and content
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotificationSettings {
    #[serde(default)]
    pub confirmation: NotificationTemplate,
    #[serde(default)]
    pub reminder: NotificationTemplate,
    #[serde(default)]
    pub deposit: NotificationTemplate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub send_via_email: bool,
    #[serde(default)]
    pub send_via_whatsapp: bool,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub banner_url: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        Self {
            enabled: true,
            send_via_email: true,
            send_via_whatsapp: false,
            subject: String::new(),
            body: String::new(),
            banner_url: None,
        }
    }
}
