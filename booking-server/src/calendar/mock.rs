//! In-memory calendar gateway for tests

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::gateway::{CalendarGateway, GatewayError, GatewayResult};
use shared::{CalendarEventData, EventDraft, TimeWindow};

/// Calendar double backed by a Vec of events.
///
/// Flags fuerzan fallas puntuales para ejercitar los caminos de error
/// de la máquina de estados.
#[derive(Default)]
pub struct MockCalendarGateway {
    events: Mutex<Vec<CalendarEventData>>,
    inserted: Mutex<Vec<EventDraft>>,
    next_id: AtomicU64,
    fail_insert: AtomicBool,
    fail_patch: AtomicBool,
    fail_delete: AtomicBool,
    expired: AtomicBool,
}

impl MockCalendarGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<CalendarEventData>) -> Self {
        let gateway = Self::new();
        *gateway.events.lock() = events;
        gateway
    }

    pub fn push_event(&self, event: CalendarEventData) {
        self.events.lock().push(event);
    }

    pub fn set_fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_patch(&self, fail: bool) {
        self.fail_patch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn set_expired(&self, expired: bool) {
        self.expired.store(expired, Ordering::SeqCst);
    }

    /// Drafts recibidos por `insert_event`, en orden
    pub fn inserted(&self) -> Vec<EventDraft> {
        self.inserted.lock().clone()
    }

    /// Current events (inserted ones included)
    pub fn events(&self) -> Vec<CalendarEventData> {
        self.events.lock().clone()
    }

    fn check_expired(&self) -> GatewayResult<()> {
        if self.expired.load(Ordering::SeqCst) {
            return Err(GatewayError::AuthExpired("refresh token revoked".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarGateway for MockCalendarGateway {
    async fn list_events(
        &self,
        _credential: &str,
        window: TimeWindow,
    ) -> GatewayResult<Vec<CalendarEventData>> {
        self.check_expired()?;
        Ok(self
            .events
            .lock()
            .iter()
            .filter(|e| e.window().overlaps(&window))
            .cloned()
            .collect())
    }

    async fn insert_event(&self, _credential: &str, draft: &EventDraft) -> GatewayResult<String> {
        self.check_expired()?;
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(GatewayError::Remote("insert rejected".into()));
        }
        let id = format!("mock-ev-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.inserted.lock().push(draft.clone());
        self.events.lock().push(CalendarEventData {
            id: id.clone(),
            summary: draft.summary.clone(),
            start: draft.start,
            end: draft.end,
            transparent: draft.transparent,
            cancelled: false,
            resource_id: draft.resource_id.clone(),
        });
        Ok(id)
    }

    async fn patch_event_time(
        &self,
        _credential: &str,
        event_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> GatewayResult<()> {
        self.check_expired()?;
        if self.fail_patch.load(Ordering::SeqCst) {
            return Err(GatewayError::Remote("patch rejected".into()));
        }
        let mut events = self.events.lock();
        match events.iter_mut().find(|e| e.id == event_id) {
            Some(event) => {
                event.start = start;
                event.end = end;
                Ok(())
            }
            None => Err(GatewayError::NotFound(event_id.to_string())),
        }
    }

    async fn delete_event(&self, _credential: &str, event_id: &str) -> GatewayResult<()> {
        self.check_expired()?;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(GatewayError::Remote("delete rejected".into()));
        }
        let mut events = self.events.lock();
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Err(GatewayError::NotFound(event_id.to_string()));
        }
        Ok(())
    }
}
