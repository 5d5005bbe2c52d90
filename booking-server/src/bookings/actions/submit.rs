//! Submit action: booking intake
//!
//! Valida la solicitud, dedup-upsertea por (negocio, email) y decide
//! el estado inicial según la configuración: `pending` si el negocio
//! aprueba a mano, si no auto-aprueba en el mismo paso.

use super::{ActionContext, ActionOutcome};
use crate::bookings::error::{BookingError, BookingResult};
use crate::db::repository::appointment as appointment_repo;
use crate::notify::TemplateKind;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_email,
    validate_optional_text, validate_required_text,
};
use shared::{Appointment, AppointmentStatus, BookingRequest};

pub struct SubmitAction {
    pub request: BookingRequest,
}

impl SubmitAction {
    pub async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<ActionOutcome> {
        let req = &self.request;

        // Rechazado antes de cualquier llamada externa
        validate_required_text(&req.client_name, "client_name", MAX_NAME_LEN)?;
        validate_required_text(&req.service, "service", MAX_NAME_LEN)?;
        validate_email(&req.client_email)?;
        validate_optional_text(&req.client_phone, "client_phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&req.message, "message", MAX_NOTE_LEN)?;
        if let Some(urls) = &req.photo_urls {
            for url in urls {
                validate_required_text(url, "photo_urls", MAX_URL_LEN)?;
            }
        }
        if req.start_at >= req.end_at {
            return Err(BookingError::Validation(
                "start_at must be before end_at".into(),
            ));
        }
        if let Some(resource_id) = &req.resource_id
            && ctx.settings.equipo.find(resource_id).is_none()
        {
            return Err(BookingError::Validation(format!(
                "Unknown resource: {resource_id}"
            )));
        }

        let email = shared::util::normalize_email(&req.client_email);
        let price = ctx.settings.servicios.price_for(&req.service);

        // La última solicitud pisa la anterior; si la fila vieja tenía
        // evento, se limpia el remoto para no dejar dos eventos vivos.
        // El event_id local se anula en el mismo paso: si el resto del
        // submit falla, la fila anterior no puede seguir apuntando a un
        // evento que ya no existe.
        if let Some(previous) =
            appointment_repo::find_by_client(ctx.pool, &ctx.business.id, &email).await?
            && let Some(event_id) = &previous.event_id
        {
            if let Some(credential) = ctx.business.google_refresh_token.as_deref()
                && let Err(e) = ctx.calendar.delete_event(credential, event_id).await
            {
                tracing::warn!(
                    appointment_id = %previous.id,
                    event_id = %event_id,
                    error = %e,
                    "Failed to delete superseded calendar event"
                );
            }
            appointment_repo::clear_event(ctx.pool, &previous.id).await?;
        }

        let now = shared::util::now_millis();
        let photo_urls = req
            .photo_urls
            .as_ref()
            .map(|urls| serde_json::to_string(urls).unwrap_or_default());
        let mut appointment = Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            business_id: ctx.business.id.clone(),
            client_name: req.client_name.trim().to_string(),
            client_email: email,
            client_phone: req.client_phone.clone(),
            message: req.message.clone(),
            photo_urls,
            start_at: req.start_at,
            end_at: req.end_at,
            resource_id: req.resource_id.clone(),
            service: req.service.clone(),
            status: AppointmentStatus::Pending,
            event_id: None,
            final_price: 0.0,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        };

        if ctx.settings.booking.require_manual_confirmation {
            let stored = appointment_repo::upsert_by_client(ctx.pool, &appointment).await?;
            return Ok(ActionOutcome {
                appointment: Some(stored),
                notifications: Vec::new(),
                staff_alert: true,
            });
        }

        // Auto-aprobación: mismo flujo que approve(), precio del catálogo
        appointment.final_price = price;
        if ctx.settings.booking.deposit_required() {
            // Commit remoto diferido hasta el pago de la seña
            ctx.credential()?;
            appointment.status = AppointmentStatus::EsperandoDeposito;
            let stored = appointment_repo::upsert_by_client(ctx.pool, &appointment).await?;
            return Ok(ActionOutcome::notifying(stored, TemplateKind::Deposit));
        }

        // Sin seña: remoto antes que local
        let credential = ctx.credential()?;
        let draft = ctx.event_draft(&appointment);
        let event_id = ctx.calendar.insert_event(credential, &draft).await?;

        appointment.status = AppointmentStatus::Confirmado;
        appointment.event_id = Some(event_id);
        let stored = appointment_repo::upsert_by_client(ctx.pool, &appointment).await?;
        Ok(ActionOutcome::notifying(stored, TemplateKind::Confirmation))
    }
}
