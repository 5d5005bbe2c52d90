//! MarkDepositPaid action: the deferred calendar commit
//!
//! Único lugar donde un compromiso financiero (seña) y uno de
//! calendario se reconcilian. Como el slot nunca se retuvo, el
//! re-chequeo de conflicto es obligatorio antes de crear el evento.

use super::{ActionContext, ActionOutcome};
use crate::bookings::error::{BookingError, BookingResult};
use crate::db::repository::appointment as appointment_repo;
use crate::notify::TemplateKind;
use shared::{Appointment, AppointmentStatus};

pub struct MarkDepositPaidAction {
    pub appointment: Appointment,
}

impl MarkDepositPaidAction {
    pub async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<ActionOutcome> {
        let appt = &self.appointment;

        // Retry-safe: reconfirmar lo ya confirmado es un no-op
        if appt.status == AppointmentStatus::Confirmado && appt.event_id.is_some() {
            tracing::info!(
                appointment_id = %appt.id,
                "Deposit already reconciled, skipping"
            );
            return Ok(ActionOutcome::silent(Some(appt.clone())));
        }

        if appt.status != AppointmentStatus::EsperandoDeposito {
            return Err(BookingError::InvalidOperation(format!(
                "Cannot mark deposit paid in status {:?}",
                appt.status
            )));
        }

        // Otro actor pudo tomar el slot mientras se esperaba el pago
        ctx.ensure_slot_free(appt.start_at, appt.end_at, appt.resource_id.as_deref(), None)
            .await?;

        let credential = ctx.credential()?;
        let draft = ctx.event_draft(appt);
        let event_id = ctx.calendar.insert_event(credential, &draft).await?;

        appointment_repo::mark_confirmed(ctx.pool, &appt.id, &event_id, appt.final_price).await?;
        let stored = appointment_repo::find_by_id(ctx.pool, &appt.id)
            .await?
            .ok_or_else(|| BookingError::AppointmentNotFound(appt.id.clone()))?;
        Ok(ActionOutcome::notifying(stored, TemplateKind::Confirmation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::actions::submit::SubmitAction;
    use crate::bookings::actions::testutil::{request, seed_business, setup};
    use chrono::{TimeZone, Utc};
    use shared::CalendarEventData;

    const DEPOSIT_SETTINGS: &str =
        r#"{"booking": {"requestDeposit": true, "depositPercentage": 50},
            "servicios": {"items": [{"titulo": "Corte", "precio": 2000}]}}"#;

    async fn awaiting_deposit(ctx: &ActionContext<'_>) -> Appointment {
        SubmitAction {
            request: request("ana@mail.com"),
        }
        .execute(ctx)
        .await
        .unwrap()
        .appointment
        .unwrap()
    }

    #[tokio::test]
    async fn test_commit_after_payment() {
        let (db, calendar, _sink) = setup().await;
        let business = seed_business(&db.pool, DEPOSIT_SETTINGS, Some("rt-1")).await;
        let settings = business.parse_settings();
        let ctx = ActionContext {
            pool: &db.pool,
            calendar: &calendar,
            business: &business,
            settings: &settings,
        };
        let appt = awaiting_deposit(&ctx).await;
        assert!(appt.event_id.is_none());

        let outcome = MarkDepositPaidAction { appointment: appt }
            .execute(&ctx)
            .await
            .unwrap();

        let stored = outcome.appointment.unwrap();
        assert_eq!(stored.status, AppointmentStatus::Confirmado);
        assert!(stored.event_id.is_some());
        assert_eq!(stored.final_price, 2000.0);
        assert_eq!(outcome.notifications, vec![TemplateKind::Confirmation]);
        assert_eq!(calendar.inserted().len(), 1);
    }

    #[tokio::test]
    async fn test_conflict_fails_and_leaves_state_unchanged() {
        let (db, calendar, _sink) = setup().await;
        let business = seed_business(&db.pool, DEPOSIT_SETTINGS, Some("rt-1")).await;
        let settings = business.parse_settings();
        let ctx = ActionContext {
            pool: &db.pool,
            calendar: &calendar,
            business: &business,
            settings: &settings,
        };
        let appt = awaiting_deposit(&ctx).await;

        // Evento opaco ajeno ocupando el slot
        calendar.push_event(CalendarEventData {
            id: "ev-intruso".into(),
            summary: "Reserva manual".into(),
            start: Utc.with_ymd_and_hms(2026, 3, 10, 14, 30, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 3, 10, 15, 30, 0).unwrap(),
            transparent: false,
            cancelled: false,
            resource_id: None,
        });

        let result = MarkDepositPaidAction {
            appointment: appt.clone(),
        }
        .execute(&ctx)
        .await;
        assert!(matches!(result, Err(BookingError::SlotConflict)));

        let row = appointment_repo::find_by_id(&db.pool, &appt.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, AppointmentStatus::EsperandoDeposito);
        assert!(row.event_id.is_none());
    }

    #[tokio::test]
    async fn test_transparent_event_does_not_conflict() {
        let (db, calendar, _sink) = setup().await;
        let business = seed_business(&db.pool, DEPOSIT_SETTINGS, Some("rt-1")).await;
        let settings = business.parse_settings();
        let ctx = ActionContext {
            pool: &db.pool,
            calendar: &calendar,
            business: &business,
            settings: &settings,
        };
        let appt = awaiting_deposit(&ctx).await;

        calendar.push_event(CalendarEventData {
            id: "ev-recordatorio".into(),
            summary: "Recordatorio personal".into(),
            start: appt.start_at,
            end: appt.end_at,
            transparent: true,
            cancelled: false,
            resource_id: None,
        });

        let outcome = MarkDepositPaidAction { appointment: appt }
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(
            outcome.appointment.unwrap().status,
            AppointmentStatus::Confirmado
        );
    }

    #[tokio::test]
    async fn test_already_confirmed_is_a_noop() {
        let (db, calendar, _sink) = setup().await;
        let business = seed_business(&db.pool, DEPOSIT_SETTINGS, Some("rt-1")).await;
        let settings = business.parse_settings();
        let ctx = ActionContext {
            pool: &db.pool,
            calendar: &calendar,
            business: &business,
            settings: &settings,
        };
        let appt = awaiting_deposit(&ctx).await;

        let first = MarkDepositPaidAction { appointment: appt }
            .execute(&ctx)
            .await
            .unwrap()
            .appointment
            .unwrap();

        let outcome = MarkDepositPaidAction {
            appointment: first.clone(),
        }
        .execute(&ctx)
        .await
        .unwrap();

        // Sin evento duplicado ni notificación repetida
        assert_eq!(calendar.inserted().len(), 1);
        assert!(outcome.notifications.is_empty());
        assert_eq!(outcome.appointment.unwrap().event_id, first.event_id);
    }

    #[tokio::test]
    async fn test_deposit_from_pending_is_invalid() {
        let (db, calendar, _sink) = setup().await;
        let business = seed_business(
            &db.pool,
            r#"{"booking": {"requireManualConfirmation": true}}"#,
            Some("rt-1"),
        )
        .await;
        let settings = business.parse_settings();
        let ctx = ActionContext {
            pool: &db.pool,
            calendar: &calendar,
            business: &business,
            settings: &settings,
        };
        let pending = SubmitAction {
            request: request("ana@mail.com"),
        }
        .execute(&ctx)
        .await
        .unwrap()
        .appointment
        .unwrap();

        let result = MarkDepositPaidAction {
            appointment: pending,
        }
        .execute(&ctx)
        .await;
        assert!(matches!(result, Err(BookingError::InvalidOperation(_))));
    }
}
