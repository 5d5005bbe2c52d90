//! Booking action handlers, one operation per file

pub mod approve;
pub mod block;
pub mod cancel;
pub mod deposit;
pub mod reschedule;
pub mod submit;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::availability;
use super::error::{BookingError, BookingResult};
use crate::calendar::CalendarGateway;
use crate::notify::TemplateKind;
use crate::utils::time;
use shared::{Appointment, Business, BusinessSettings, EventDraft, TimeWindow};

/// Shared context injected into every action (explicit dependencies;
/// no ambient handles)
pub struct ActionContext<'a> {
    pub pool: &'a SqlitePool,
    pub calendar: &'a dyn CalendarGateway,
    pub business: &'a Business,
    pub settings: &'a BusinessSettings,
}

impl ActionContext<'_> {
    /// Calendar credential, or `IntegrationMissing`
    pub fn credential(&self) -> BookingResult<&str> {
        self.business
            .google_refresh_token
            .as_deref()
            .ok_or(BookingError::IntegrationMissing)
    }

    /// Conflict check for a target slot: list events around the slot,
    /// drop transparent/cancelled, apply the availability scoping
    /// predicate. Any survivor → `SlotConflict`.
    pub async fn ensure_slot_free(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resource_id: Option<&str>,
        exclude_event: Option<&str>,
    ) -> BookingResult<()> {
        let credential = self.credential()?;
        let query = TimeWindow::new(
            start - chrono::Duration::days(1),
            end + chrono::Duration::days(1),
        );
        let events = self.calendar.list_events(credential, query).await?;

        let target = TimeWindow::new(start, end);
        let mode = self.settings.equipo.availability_mode;
        if availability::conflicts(&events, &target, mode, resource_id, exclude_event) {
            return Err(BookingError::SlotConflict);
        }
        Ok(())
    }

    /// Event draft for an appointment. El título compone
    /// "{servicio} - {profesional}" solo para display; la identidad
    /// del recurso viaja como tag estructurado.
    pub fn event_draft(&self, appointment: &Appointment) -> EventDraft {
        let worker = appointment
            .resource_id
            .as_deref()
            .and_then(|rid| self.settings.equipo.find(rid))
            .map(|m| m.nombre.as_str());
        let summary = match worker {
            Some(name) => format!("{} - {}", appointment.service, name),
            None => appointment.service.clone(),
        };
        let tz = time::parse_timezone(&self.business.timezone);
        let (fecha, hora) = time::local_date_time_strings(appointment.start_at, tz);
        EventDraft {
            summary,
            description: Some(format!(
                "{} ({}) - {} {}",
                appointment.client_name, appointment.client_email, fecha, hora
            )),
            start: appointment.start_at,
            end: appointment.end_at,
            resource_id: appointment.resource_id.clone(),
            transparent: false,
        }
    }
}

/// Result of a successful action: the row after the write plus the
/// client notifications to dispatch (after the authoritative write,
/// best-effort).
#[derive(Debug)]
pub struct ActionOutcome {
    pub appointment: Option<Appointment>,
    pub notifications: Vec<TemplateKind>,
    /// Aviso al staff de una solicitud pendiente
    pub staff_alert: bool,
}

impl ActionOutcome {
    pub fn silent(appointment: Option<Appointment>) -> Self {
        Self {
            appointment,
            notifications: Vec::new(),
            staff_alert: false,
        }
    }

    pub fn notifying(appointment: Appointment, kind: TemplateKind) -> Self {
        Self {
            appointment: Some(appointment),
            notifications: vec![kind],
            staff_alert: false,
        }
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use chrono::TimeZone;

    use crate::calendar::mock::MockCalendarGateway;
    use crate::db::DbService;
    use crate::db::repository::business as business_repo;
    use crate::notify::mock::RecordingSink;
    use shared::{BookingRequest, Business};

    pub async fn setup() -> (DbService, MockCalendarGateway, RecordingSink) {
        let db = DbService::new_in_memory().await.unwrap();
        (db, MockCalendarGateway::new(), RecordingSink::new())
    }

    pub async fn seed_business(
        pool: &sqlx::SqlitePool,
        settings: &str,
        token: Option<&str>,
    ) -> Business {
        let now = shared::util::now_millis();
        let business = Business {
            id: "biz-1".to_string(),
            slug: "estudio".to_string(),
            name: "Estudio Prueba".to_string(),
            timezone: "America/Argentina/Buenos_Aires".to_string(),
            google_refresh_token: token.map(String::from),
            settings: settings.to_string(),
            created_at: now,
            updated_at: now,
        };
        business_repo::upsert(pool, &business).await.unwrap();
        business
    }

    /// Solicitud válida: 14:00-15:00 UTC del 2026-03-10
    pub fn request(email: &str) -> BookingRequest {
        BookingRequest {
            client_name: "Ana".to_string(),
            client_email: email.to_string(),
            client_phone: Some("+54911".to_string()),
            message: None,
            photo_urls: None,
            start_at: chrono::Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap(),
            end_at: chrono::Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap(),
            service: "Corte".to_string(),
            resource_id: None,
        }
    }
}
