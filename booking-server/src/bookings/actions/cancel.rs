//! Cancel action
//!
//! La cancelación local es autoritativa: si el evento remoto ya no
//! existe (borrado a mano en el calendario) igual se cancela la fila.

use super::{ActionContext, ActionOutcome};
use crate::bookings::error::BookingResult;
use crate::db::repository::appointment as appointment_repo;
use shared::{Appointment, AppointmentStatus};

pub struct CancelAction {
    pub appointment: Appointment,
}

impl CancelAction {
    pub async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<ActionOutcome> {
        let appt = &self.appointment;

        if appt.status == AppointmentStatus::Cancelado {
            return Ok(ActionOutcome::silent(Some(appt.clone())));
        }

        // Limpieza remota best-effort
        if let Some(event_id) = &appt.event_id
            && let Some(credential) = ctx.business.google_refresh_token.as_deref()
            && let Err(e) = ctx.calendar.delete_event(credential, event_id).await
        {
            tracing::warn!(
                appointment_id = %appt.id,
                event_id = %event_id,
                error = %e,
                "Could not delete remote event while cancelling"
            );
        }

        appointment_repo::mark_cancelled(ctx.pool, &appt.id).await?;
        let stored = appointment_repo::find_by_id(ctx.pool, &appt.id)
            .await?
            .unwrap_or_else(|| {
                let mut updated = appt.clone();
                updated.status = AppointmentStatus::Cancelado;
                updated
            });
        Ok(ActionOutcome::silent(Some(stored)))
    }
}
