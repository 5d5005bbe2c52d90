//! Periodic reminder sweep
//!
//! Barre los turnos confirmados que empiezan dentro de la ventana de
//! anticipación y despacha el recordatorio una sola vez por turno. El
//! flag `reminder_sent` se marca aunque el envío falle: un turno nunca
//! recibe dos barridos.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::db::repository::{appointment as appointment_repo, business as business_repo};
use crate::notify::{NotificationSink, TemplateKind, dispatcher};

pub struct ReminderSweep {
    pool: SqlitePool,
    notifier: Arc<dyn NotificationSink>,
    interval: Duration,
    lead: chrono::Duration,
}

impl ReminderSweep {
    pub fn new(
        pool: SqlitePool,
        notifier: Arc<dyn NotificationSink>,
        interval_secs: u64,
        lead_hours: i64,
    ) -> Self {
        Self {
            pool,
            notifier,
            interval: Duration::from_secs(interval_secs),
            lead: chrono::Duration::hours(lead_hours),
        }
    }

    /// Loop until the token is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            lead_hours = self.lead.num_hours(),
            "Reminder sweep started"
        );
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.sweep_once().await;
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Reminder sweep stopped");
                    break;
                }
            }
        }
    }

    pub async fn sweep_once(&self) {
        let now = Utc::now();
        let due = match appointment_repo::find_due_reminders(&self.pool, now, now + self.lead).await
        {
            Ok(due) => due,
            Err(e) => {
                tracing::error!(error = %e, "Reminder sweep query failed");
                return;
            }
        };
        if due.is_empty() {
            return;
        }
        tracing::debug!(count = due.len(), "Dispatching due reminders");

        for appointment in due {
            let business = match business_repo::find_by_id(&self.pool, &appointment.business_id)
                .await
            {
                Ok(Some(business)) => business,
                Ok(None) => {
                    tracing::warn!(
                        appointment_id = %appointment.id,
                        business_id = %appointment.business_id,
                        "Orphan appointment in reminder sweep, skipping"
                    );
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Business lookup failed in reminder sweep");
                    continue;
                }
            };
            let settings = business.parse_settings();

            dispatcher::dispatch(
                self.notifier.as_ref(),
                &business,
                &settings,
                &appointment,
                TemplateKind::Reminder,
            )
            .await;

            if let Err(e) = appointment_repo::mark_reminder_sent(&self.pool, &appointment.id).await
            {
                tracing::error!(
                    appointment_id = %appointment.id,
                    error = %e,
                    "Failed to mark reminder as sent"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::notify::mock::RecordingSink;
    use shared::{Appointment, AppointmentStatus, Business};

    async fn seed(pool: &SqlitePool, start_in_hours: i64) -> String {
        let now = shared::util::now_millis();
        business_repo::upsert(
            pool,
            &Business {
                id: "biz-1".into(),
                slug: "estudio".into(),
                name: "Estudio".into(),
                timezone: "UTC".into(),
                google_refresh_token: Some("rt-1".into()),
                settings: r#"{"notifications": {"reminder": {
                    "subject": "Recordatorio",
                    "body": "Mañana a las {hora} te esperamos, {nombre_cliente}."}}}"#
                    .into(),
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .unwrap();

        let start = Utc::now() + chrono::Duration::hours(start_in_hours);
        let appointment = Appointment {
            id: "a-1".into(),
            business_id: "biz-1".into(),
            client_name: "Ana".into(),
            client_email: "ana@mail.com".into(),
            client_phone: None,
            message: None,
            photo_urls: None,
            start_at: start,
            end_at: start + chrono::Duration::hours(1),
            resource_id: None,
            service: "Corte".into(),
            status: AppointmentStatus::Pending,
            event_id: None,
            final_price: 1000.0,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        };
        let stored = appointment_repo::upsert_by_client(pool, &appointment)
            .await
            .unwrap();
        appointment_repo::mark_confirmed(pool, &stored.id, "ev-1", 1000.0)
            .await
            .unwrap();
        stored.id
    }

    #[tokio::test]
    async fn test_sweep_sends_once() {
        let db = DbService::new_in_memory().await.unwrap();
        let id = seed(&db.pool, 12).await;
        let sink = Arc::new(RecordingSink::new());
        let sweep = ReminderSweep::new(
            db.pool.clone(),
            sink.clone() as Arc<dyn NotificationSink>,
            900,
            24,
        );

        sweep.sweep_once().await;
        let sent = sink.delivered();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("Ana"));

        let row = appointment_repo::find_by_id(&db.pool, &id)
            .await
            .unwrap()
            .unwrap();
        assert!(row.reminder_sent);

        // Segundo barrido: nada nuevo
        sweep.sweep_once().await;
        assert_eq!(sink.delivered().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_ignores_appointments_outside_lead() {
        let db = DbService::new_in_memory().await.unwrap();
        seed(&db.pool, 48).await;
        let sink = Arc::new(RecordingSink::new());
        let sweep = ReminderSweep::new(
            db.pool.clone(),
            sink.clone() as Arc<dyn NotificationSink>,
            900,
            24,
        );

        sweep.sweep_once().await;
        assert!(sink.delivered().is_empty());
    }
}
