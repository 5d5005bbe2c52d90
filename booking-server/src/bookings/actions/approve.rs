//! Approve action: operator confirmation of a pending request
//!
//! Decide el estado destino según la política de seña. Sin seña el
//! evento se crea ya (remoto antes que local); con seña el commit al
//! calendario se difiere hasta `markDepositPaid`.

use super::{ActionContext, ActionOutcome};
use crate::bookings::error::{BookingError, BookingResult};
use crate::db::repository::appointment as appointment_repo;
use crate::notify::TemplateKind;
use shared::{Appointment, AppointmentStatus};

pub struct ApproveAction {
    pub appointment: Appointment,
    /// Precio fijado por el operador; sin valor se resuelve del catálogo
    pub final_price: Option<f64>,
}

impl ApproveAction {
    pub async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<ActionOutcome> {
        let appt = &self.appointment;

        if appt.status != AppointmentStatus::Pending {
            return Err(BookingError::InvalidOperation(format!(
                "Cannot approve appointment in status {:?}",
                appt.status
            )));
        }

        let price = self
            .final_price
            .unwrap_or_else(|| ctx.settings.servicios.price_for(&appt.service));
        if !price.is_finite() || price < 0.0 {
            return Err(BookingError::Validation(format!(
                "Invalid final price: {price}"
            )));
        }

        if ctx.settings.booking.deposit_required() {
            // Slot deliberadamente no retenido mientras el pago es incierto
            ctx.credential()?;
            appointment_repo::mark_awaiting_deposit(ctx.pool, &appt.id, price).await?;
            let stored = reload(ctx, &appt.id).await?;
            return Ok(ActionOutcome::notifying(stored, TemplateKind::Deposit));
        }

        // Sin seña: el evento debe existir antes de escribir confirmado
        let credential = ctx.credential()?;
        let mut updated = appt.clone();
        updated.final_price = price;
        let draft = ctx.event_draft(&updated);
        let event_id = ctx.calendar.insert_event(credential, &draft).await?;

        appointment_repo::mark_confirmed(ctx.pool, &appt.id, &event_id, price).await?;
        let stored = reload(ctx, &appt.id).await?;
        Ok(ActionOutcome::notifying(stored, TemplateKind::Confirmation))
    }
}

async fn reload(ctx: &ActionContext<'_>, id: &str) -> BookingResult<Appointment> {
    appointment_repo::find_by_id(ctx.pool, id)
        .await?
        .ok_or_else(|| BookingError::AppointmentNotFound(id.to_string()))
}
