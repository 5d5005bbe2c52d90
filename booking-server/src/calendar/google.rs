//! Google Calendar client (REST v3)
//!
//! Implementa [`CalendarGateway`] sobre el calendario `primary` del
//! negocio. Cada negocio aporta su refresh token; los access tokens se
//! cachean por credencial y se renuevan de forma transparente. Un
//! rechazo del refresh sale como [`GatewayError::AuthExpired`].
//!
//! El tag de recurso viaja en `extendedProperties.private.resourceId`,
//! nunca codificado en el título del evento.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::gateway::{CalendarGateway, GatewayError, GatewayResult};
use crate::core::Config;
use shared::{CalendarEventData, EventDraft, TimeWindow};

/// Margen antes de la expiración real para no usar tokens al límite
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    /// Unix millis
    expires_at: i64,
}

/// Cliente del calendario de Google
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_base: String,
    /// Access tokens cacheados, por refresh token
    tokens: Mutex<HashMap<String, CachedToken>>,
}

impl GoogleCalendarClient {
    pub fn new(config: &Config) -> Self {
        Self::with_endpoints(
            &config.google_client_id,
            &config.google_client_secret,
            &config.google_token_url,
            &config.google_api_base,
        )
    }

    /// Constructor with explicit endpoints (tests point these at a
    /// local mock server)
    pub fn with_endpoints(
        client_id: &str,
        client_secret: &str,
        token_url: &str,
        api_base: &str,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token_url: token_url.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    // ========== Token handling ==========

    async fn access_token(&self, refresh_token: &str) -> GatewayResult<String> {
        let now = shared::util::now_millis();
        if let Some(cached) = self.tokens.lock().get(refresh_token)
            && cached.expires_at > now + TOKEN_EXPIRY_MARGIN_SECS * 1000
        {
            return Ok(cached.access_token.clone());
        }

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let resp = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GatewayError::AuthExpired(format!(
                "token refresh rejected with status {}",
                resp.status()
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("invalid token response: {e}")))?;

        let cached = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: now + token.expires_in * 1000,
        };
        self.tokens
            .lock()
            .insert(refresh_token.to_string(), cached);
        Ok(token.access_token)
    }

    fn invalidate(&self, refresh_token: &str) {
        self.tokens.lock().remove(refresh_token);
    }

    /// Ejecuta un request autenticado; ante un 401 descarta el token
    /// cacheado y reintenta una única vez con uno fresco.
    async fn send_authed<F>(
        &self,
        refresh_token: &str,
        mut build: F,
    ) -> GatewayResult<reqwest::Response>
    where
        F: FnMut(&str) -> reqwest::RequestBuilder,
    {
        let token = self.access_token(refresh_token).await?;
        let resp = build(&token)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        self.invalidate(refresh_token);
        let token = self.access_token(refresh_token).await?;
        build(&token)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/primary/events", self.api_base)
    }
}

#[async_trait::async_trait]
impl CalendarGateway for GoogleCalendarClient {
    async fn list_events(
        &self,
        credential: &str,
        window: TimeWindow,
    ) -> GatewayResult<Vec<CalendarEventData>> {
        let url = self.events_url();
        let time_min = window.start.to_rfc3339();
        let time_max = window.end.to_rfc3339();
        let resp = self
            .send_authed(credential, |token| {
                self.http
                    .get(&url)
                    .bearer_auth(token)
                    .query(&[
                        ("timeMin", time_min.as_str()),
                        ("timeMax", time_max.as_str()),
                        ("singleEvents", "true"),
                        ("maxResults", "250"),
                    ])
            })
            .await?;

        if !resp.status().is_success() {
            return Err(GatewayError::Remote(format!(
                "list events failed with status {}",
                resp.status()
            )));
        }

        let body: EventListResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("invalid event list: {e}")))?;

        Ok(body
            .items
            .into_iter()
            .filter_map(GoogleEvent::into_event_data)
            .collect())
    }

    async fn insert_event(&self, credential: &str, draft: &EventDraft) -> GatewayResult<String> {
        let url = self.events_url();
        let body = GoogleEventWrite::from_draft(draft);
        let resp = self
            .send_authed(credential, |token| {
                self.http.post(&url).bearer_auth(token).json(&body)
            })
            .await?;

        if !resp.status().is_success() {
            return Err(GatewayError::Remote(format!(
                "event insert failed with status {}",
                resp.status()
            )));
        }

        let created: GoogleEvent = resp
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("invalid insert response: {e}")))?;
        Ok(created.id)
    }

    async fn patch_event_time(
        &self,
        credential: &str,
        event_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> GatewayResult<()> {
        let url = format!("{}/{}", self.events_url(), event_id);
        let body = serde_json::json!({
            "start": {"dateTime": start.to_rfc3339()},
            "end": {"dateTime": end.to_rfc3339()},
        });
        let resp = self
            .send_authed(credential, |token| {
                self.http.patch(&url).bearer_auth(token).json(&body)
            })
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                Err(GatewayError::NotFound(event_id.to_string()))
            }
            s => Err(GatewayError::Remote(format!(
                "event patch failed with status {s}"
            ))),
        }
    }

    async fn delete_event(&self, credential: &str, event_id: &str) -> GatewayResult<()> {
        let url = format!("{}/{}", self.events_url(), event_id);
        let resp = self
            .send_authed(credential, |token| {
                self.http.delete(&url).bearer_auth(token)
            })
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                Err(GatewayError::NotFound(event_id.to_string()))
            }
            s => Err(GatewayError::Remote(format!(
                "event delete failed with status {s}"
            ))),
        }
    }
}

// ========== Wire types ==========

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    transparency: Option<String>,
    #[serde(default)]
    start: Option<GoogleEventTime>,
    #[serde(default)]
    end: Option<GoogleEventTime>,
    #[serde(default)]
    extended_properties: Option<ExtendedProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventTime {
    #[serde(default)]
    date_time: Option<DateTime<Utc>>,
    /// Eventos de día completo traen solo la fecha
    #[serde(default)]
    date: Option<chrono::NaiveDate>,
}

impl GoogleEventTime {
    fn instant(&self) -> Option<DateTime<Utc>> {
        self.date_time
            .or_else(|| self.date.map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ExtendedProperties {
    #[serde(default)]
    private: HashMap<String, String>,
}

impl GoogleEvent {
    /// Normalize a provider event; events without usable timestamps
    /// are dropped.
    fn into_event_data(self) -> Option<CalendarEventData> {
        let start = self.start.as_ref().and_then(GoogleEventTime::instant)?;
        let end = self.end.as_ref().and_then(GoogleEventTime::instant)?;
        let resource_id = self
            .extended_properties
            .and_then(|p| p.private.get("resourceId").cloned());
        Some(CalendarEventData {
            id: self.id,
            summary: self.summary.unwrap_or_default(),
            start,
            end,
            transparent: self.transparency.as_deref() == Some("transparent"),
            cancelled: self.status.as_deref() == Some("cancelled"),
            resource_id,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventWrite {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    start: serde_json::Value,
    end: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    transparency: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extended_properties: Option<ExtendedProperties>,
}

impl GoogleEventWrite {
    fn from_draft(draft: &EventDraft) -> Self {
        let extended_properties = draft.resource_id.as_ref().map(|rid| ExtendedProperties {
            private: HashMap::from([("resourceId".to_string(), rid.clone())]),
        });
        Self {
            summary: draft.summary.clone(),
            description: draft.description.clone(),
            start: serde_json::json!({"dateTime": draft.start.to_rfc3339()}),
            end: serde_json::json!({"dateTime": draft.end.to_rfc3339()}),
            transparency: draft.transparent.then_some("transparent"),
            extended_properties,
        }
    }
}
