//! Reschedule action: move an already-committed appointment
//!
//! El remoto se mueve primero; la fila local solo cambia si el patch
//! fue aceptado. La duración original del turno se preserva.

use super::{ActionContext, ActionOutcome};
use crate::bookings::error::{BookingError, BookingResult};
use crate::db::repository::appointment as appointment_repo;
use chrono::{DateTime, Utc};
use shared::{Appointment, AppointmentStatus};

pub struct RescheduleAction {
    pub appointment: Appointment,
    pub new_start: DateTime<Utc>,
}

impl RescheduleAction {
    pub async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<ActionOutcome> {
        let appt = &self.appointment;

        if appt.status == AppointmentStatus::Cancelado {
            return Err(BookingError::InvalidOperation(
                "Cannot reschedule a cancelled appointment".into(),
            ));
        }
        // Sin evento no hay nada que mover: el commit diferido se
        // resuelve vía markDepositPaid, no acá
        let event_id = appt.event_id.as_deref().ok_or_else(|| {
            BookingError::InvalidOperation(
                "Appointment has no calendar event to reschedule".into(),
            )
        })?;

        let new_end = self.new_start + appt.duration();
        let credential = ctx.credential()?;

        ctx.calendar
            .patch_event_time(credential, event_id, self.new_start, new_end)
            .await?;

        appointment_repo::update_times(ctx.pool, &appt.id, self.new_start, new_end).await?;
        let stored = appointment_repo::find_by_id(ctx.pool, &appt.id)
            .await?
            .ok_or_else(|| BookingError::AppointmentNotFound(appt.id.clone()))?;
        Ok(ActionOutcome::silent(Some(stored)))
    }
}
