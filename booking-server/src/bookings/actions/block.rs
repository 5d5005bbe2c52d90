//! Operator overrides: manual booking and time blocks
//!
//! La reserva manual entra directamente confirmada (evento primero,
//! fila después). El bloqueo de agenda vive solo en el calendario,
//! sin fila de turno.

use super::{ActionContext, ActionOutcome};
use crate::bookings::error::{BookingError, BookingResult};
use crate::db::repository::appointment as appointment_repo;
use crate::notify::TemplateKind;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text,
    validate_required_text,
};
use chrono::{DateTime, Utc};
use shared::{Appointment, AppointmentStatus, BookingRequest, EventDraft};

pub struct CreateManualAction {
    pub request: BookingRequest,
    pub final_price: Option<f64>,
}

impl CreateManualAction {
    pub async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<ActionOutcome> {
        let req = &self.request;

        validate_required_text(&req.client_name, "client_name", MAX_NAME_LEN)?;
        validate_required_text(&req.service, "service", MAX_NAME_LEN)?;
        validate_email(&req.client_email)?;
        validate_optional_text(&req.client_phone, "client_phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&req.message, "message", MAX_NOTE_LEN)?;
        if req.start_at >= req.end_at {
            return Err(BookingError::Validation(
                "start_at must be before end_at".into(),
            ));
        }

        let price = self
            .final_price
            .unwrap_or_else(|| ctx.settings.servicios.price_for(&req.service));
        if !price.is_finite() || price < 0.0 {
            return Err(BookingError::Validation(format!(
                "Invalid final price: {price}"
            )));
        }

        let now = shared::util::now_millis();
        let mut appointment = Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            business_id: ctx.business.id.clone(),
            client_name: req.client_name.trim().to_string(),
            client_email: shared::util::normalize_email(&req.client_email),
            client_phone: req.client_phone.clone(),
            message: req.message.clone(),
            photo_urls: None,
            start_at: req.start_at,
            end_at: req.end_at,
            resource_id: req.resource_id.clone(),
            service: req.service.clone(),
            status: AppointmentStatus::Confirmado,
            event_id: None,
            final_price: price,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        };

        let credential = ctx.credential()?;
        let draft = ctx.event_draft(&appointment);
        let event_id = ctx.calendar.insert_event(credential, &draft).await?;
        appointment.event_id = Some(event_id);

        let stored = appointment_repo::upsert_by_client(ctx.pool, &appointment).await?;
        Ok(ActionOutcome::notifying(stored, TemplateKind::Confirmation))
    }
}

pub struct CreateBlockAction {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub resource_id: Option<String>,
    pub reason: Option<String>,
}

impl CreateBlockAction {
    pub async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<ActionOutcome> {
        if self.start >= self.end {
            return Err(BookingError::Validation(
                "start must be before end".into(),
            ));
        }
        validate_optional_text(&self.reason, "reason", MAX_NOTE_LEN)?;
        if let Some(resource_id) = &self.resource_id
            && ctx.settings.equipo.find(resource_id).is_none()
        {
            return Err(BookingError::Validation(format!(
                "Unknown resource: {resource_id}"
            )));
        }

        let worker = self
            .resource_id
            .as_deref()
            .and_then(|rid| ctx.settings.equipo.find(rid))
            .map(|m| m.nombre.as_str());
        let summary = match worker {
            Some(name) => format!("Bloqueado - {name}"),
            None => "Bloqueado".to_string(),
        };

        let credential = ctx.credential()?;
        let draft = EventDraft {
            summary,
            description: self.reason.clone(),
            start: self.start,
            end: self.end,
            resource_id: self.resource_id.clone(),
            transparent: false,
        };
        let event_id = ctx.calendar.insert_event(credential, &draft).await?;
        tracing::info!(
            business_id = %ctx.business.id,
            event_id = %event_id,
            "Created schedule block"
        );

        // El bloqueo no es un turno: no se persiste fila
        Ok(ActionOutcome::silent(None))
    }
}
