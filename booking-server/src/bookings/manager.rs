//! Booking manager: operation orchestration
//!
//! Carga el tenant, arma el contexto, ejecuta la acción y recién
//! después del write autoritativo despacha las notificaciones. Las
//! operaciones devuelven envelopes discriminados, nunca errores de
//! transporte.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use super::actions::{
    ActionContext, ActionOutcome, approve::ApproveAction, block::CreateBlockAction,
    block::CreateManualAction, cancel::CancelAction, deposit::MarkDepositPaidAction,
    reschedule::RescheduleAction, submit::SubmitAction,
};
use super::availability;
use super::error::{BookingError, BookingResult};
use crate::calendar::CalendarGateway;
use crate::db::repository::{appointment as appointment_repo, business as business_repo};
use crate::notify::{NotificationSink, dispatcher};
use shared::{
    Appointment, AppointmentStatus, AvailabilityResponse, BookingRequest, Business,
    BusinessSettings, OperationResponse, SubmitResponse,
};

pub struct BookingManager {
    pool: SqlitePool,
    calendar: Arc<dyn CalendarGateway>,
    notifier: Arc<dyn NotificationSink>,
}

impl BookingManager {
    pub fn new(
        pool: SqlitePool,
        calendar: Arc<dyn CalendarGateway>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            pool,
            calendar,
            notifier,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========== Read path ==========

    pub async fn availability(
        &self,
        slug: &str,
        date: NaiveDate,
        resource_id: Option<&str>,
    ) -> BookingResult<AvailabilityResponse> {
        let (business, settings) = self.load_business(slug).await?;
        availability::resolve_day(
            self.calendar.as_ref(),
            &business,
            &settings,
            date,
            resource_id,
        )
        .await
    }

    pub async fn list_appointments(&self, slug: &str) -> BookingResult<Vec<Appointment>> {
        let (business, _) = self.load_business(slug).await?;
        Ok(appointment_repo::list_for_business(&self.pool, &business.id).await?)
    }

    // ========== Booking operations ==========

    pub async fn submit(&self, slug: &str, request: BookingRequest) -> SubmitResponse {
        let (business, settings) = match self.load_business(slug).await {
            Ok(loaded) => loaded,
            Err(e) => return SubmitResponse::error(e.code(), e.to_string()),
        };
        let ctx = self.context(&business, &settings);
        match (SubmitAction { request }).execute(&ctx).await {
            Ok(outcome) => {
                let pending = outcome
                    .appointment
                    .as_ref()
                    .is_some_and(|a| a.status == AppointmentStatus::Pending);
                let id = outcome
                    .appointment
                    .as_ref()
                    .map(|a| a.id.clone())
                    .unwrap_or_default();
                self.finish(&business, &settings, outcome).await;
                SubmitResponse::accepted(id, pending)
            }
            Err(e) => {
                tracing::warn!(business = %slug, error = %e, "Booking submission failed");
                SubmitResponse::error(e.code(), e.to_string())
            }
        }
    }

    pub async fn approve(
        &self,
        appointment_id: &str,
        final_price: Option<f64>,
    ) -> OperationResponse {
        let (appointment, business, settings) = match self.load_appointment(appointment_id).await {
            Ok(loaded) => loaded,
            Err(e) => return e.to_response(),
        };
        let ctx = self.context(&business, &settings);
        let result = ApproveAction {
            appointment,
            final_price,
        }
        .execute(&ctx)
        .await;
        self.settle(appointment_id, "approve", &business, &settings, result)
            .await
    }

    pub async fn mark_deposit_paid(&self, appointment_id: &str) -> OperationResponse {
        let (appointment, business, settings) = match self.load_appointment(appointment_id).await {
            Ok(loaded) => loaded,
            Err(e) => return e.to_response(),
        };
        let ctx = self.context(&business, &settings);
        let result = MarkDepositPaidAction { appointment }.execute(&ctx).await;
        self.settle(appointment_id, "mark_deposit_paid", &business, &settings, result)
            .await
    }

    pub async fn reschedule(
        &self,
        appointment_id: &str,
        new_start: DateTime<Utc>,
    ) -> OperationResponse {
        let (appointment, business, settings) = match self.load_appointment(appointment_id).await {
            Ok(loaded) => loaded,
            Err(e) => return e.to_response(),
        };
        let ctx = self.context(&business, &settings);
        let result = RescheduleAction {
            appointment,
            new_start,
        }
        .execute(&ctx)
        .await;
        self.settle(appointment_id, "reschedule", &business, &settings, result)
            .await
    }

    pub async fn cancel(&self, appointment_id: &str) -> OperationResponse {
        let (appointment, business, settings) = match self.load_appointment(appointment_id).await {
            Ok(loaded) => loaded,
            Err(e) => return e.to_response(),
        };
        let ctx = self.context(&business, &settings);
        let result = CancelAction { appointment }.execute(&ctx).await;
        self.settle(appointment_id, "cancel", &business, &settings, result)
            .await
    }

    // ========== Operator overrides ==========

    pub async fn manual_book(
        &self,
        slug: &str,
        request: BookingRequest,
        final_price: Option<f64>,
    ) -> OperationResponse {
        let (business, settings) = match self.load_business(slug).await {
            Ok(loaded) => loaded,
            Err(e) => return e.to_response(),
        };
        let ctx = self.context(&business, &settings);
        let result = CreateManualAction {
            request,
            final_price,
        }
        .execute(&ctx)
        .await;
        self.settle("-", "manual_book", &business, &settings, result)
            .await
    }

    pub async fn block(
        &self,
        slug: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resource_id: Option<String>,
        reason: Option<String>,
    ) -> OperationResponse {
        let (business, settings) = match self.load_business(slug).await {
            Ok(loaded) => loaded,
            Err(e) => return e.to_response(),
        };
        let ctx = self.context(&business, &settings);
        let result = CreateBlockAction {
            start,
            end,
            resource_id,
            reason,
        }
        .execute(&ctx)
        .await;
        self.settle("-", "block", &business, &settings, result).await
    }

    // ========== Internals ==========

    fn context<'a>(
        &'a self,
        business: &'a Business,
        settings: &'a BusinessSettings,
    ) -> ActionContext<'a> {
        ActionContext {
            pool: &self.pool,
            calendar: self.calendar.as_ref(),
            business,
            settings,
        }
    }

    async fn load_business(&self, slug: &str) -> BookingResult<(Business, BusinessSettings)> {
        let business = business_repo::find_by_slug(&self.pool, slug)
            .await?
            .ok_or_else(|| BookingError::BusinessNotFound(slug.to_string()))?;
        let settings = business.parse_settings();
        Ok((business, settings))
    }

    async fn load_appointment(
        &self,
        appointment_id: &str,
    ) -> BookingResult<(Appointment, Business, BusinessSettings)> {
        let (appointment, business) =
            appointment_repo::find_with_business(&self.pool, appointment_id)
                .await?
                .ok_or_else(|| BookingError::AppointmentNotFound(appointment_id.to_string()))?;
        let settings = business.parse_settings();
        Ok((appointment, business, settings))
    }

    /// Convert an action result into the response envelope, running the
    /// post-write side effects on success.
    async fn settle(
        &self,
        appointment_id: &str,
        operation: &str,
        business: &Business,
        settings: &BusinessSettings,
        result: BookingResult<ActionOutcome>,
    ) -> OperationResponse {
        match result {
            Ok(outcome) => {
                self.finish(business, settings, outcome).await;
                OperationResponse::success()
            }
            Err(e) => {
                tracing::warn!(
                    appointment_id = %appointment_id,
                    operation = %operation,
                    error = %e,
                    "Booking operation failed"
                );
                e.to_response()
            }
        }
    }

    /// Post-write side effects: best-effort, never alter the outcome
    async fn finish(
        &self,
        business: &Business,
        settings: &BusinessSettings,
        outcome: ActionOutcome,
    ) {
        let Some(appointment) = &outcome.appointment else {
            return;
        };
        for kind in &outcome.notifications {
            dispatcher::dispatch(
                self.notifier.as_ref(),
                business,
                settings,
                appointment,
                *kind,
            )
            .await;
        }
        if outcome.staff_alert {
            dispatcher::notify_staff_pending(self.notifier.as_ref(), business, settings, appointment)
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::mock::MockCalendarGateway;
    use crate::db::DbService;
    use crate::db::repository::business as business_repo;
    use crate::notify::mock::RecordingSink;
    use chrono::TimeZone;
    use shared::BookingErrorCode;
    use shared::CalendarEventData;

    struct Harness {
        db: DbService,
        calendar: Arc<MockCalendarGateway>,
        sink: Arc<RecordingSink>,
        manager: BookingManager,
    }

    async fn harness(settings: &str) -> Harness {
        let db = DbService::new_in_memory().await.unwrap();
        let calendar = Arc::new(MockCalendarGateway::new());
        let sink = Arc::new(RecordingSink::new());
        let manager = BookingManager::new(
            db.pool.clone(),
            calendar.clone() as Arc<dyn CalendarGateway>,
            sink.clone() as Arc<dyn NotificationSink>,
        );
        let now = shared::util::now_millis();
        business_repo::upsert(
            &db.pool,
            &Business {
                id: "biz-1".into(),
                slug: "estudio".into(),
                name: "Estudio Prueba".into(),
                timezone: "America/Argentina/Buenos_Aires".into(),
                google_refresh_token: Some("rt-1".into()),
                settings: settings.into(),
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .unwrap();
        Harness {
            db,
            calendar,
            sink,
            manager,
        }
    }

    fn request(service: &str) -> BookingRequest {
        BookingRequest {
            client_name: "Ana".into(),
            client_email: "ana@mail.com".into(),
            client_phone: Some("+54911".into()),
            message: None,
            photo_urls: None,
            start_at: Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap(),
            service: service.into(),
            resource_id: None,
        }
    }

    #[tokio::test]
    async fn test_auto_confirm_end_to_end() {
        let h = harness(
            r#"{"servicios": {"items": [{"titulo": "Haircut", "precio": 1000}]},
                "notifications": {"confirmation": {
                    "subject": "Confirmado",
                    "body": "Hola {nombre_cliente}, {servicio} por {precio}."}}}"#,
        )
        .await;

        let resp = h.manager.submit("estudio", request("Haircut")).await;
        assert!(resp.success);
        assert!(!resp.pending);

        let id = resp.appointment_id.unwrap();
        let row = appointment_repo::find_by_id(&h.db.pool, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, AppointmentStatus::Confirmado);
        assert_eq!(row.final_price, 1000.0);
        assert_eq!(h.calendar.inserted().len(), 1);

        // La confirmación salió después del write, con variables resueltas
        let sent = h.sink.delivered();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("Hola Ana"));
        assert!(sent[0].body.contains("$1000"));
    }

    #[tokio::test]
    async fn test_deposit_cycle_end_to_end() {
        let h = harness(
            r#"{"booking": {"requireManualConfirmation": true,
                            "requestDeposit": true, "depositPercentage": 50},
                "servicios": {"items": [{"titulo": "Color", "precio": 2000}]},
                "notifications": {
                    "deposit": {"subject": "Seña", "body": "Transferí {monto_senia}."},
                    "confirmation": {"subject": "Confirmado", "body": "Restan {precio_a_pagar}."}}}"#,
        )
        .await;

        let resp = h.manager.submit("estudio", request("Color")).await;
        assert!(resp.success);
        assert!(resp.pending);
        let id = resp.appointment_id.unwrap();

        let resp = h.manager.approve(&id, None).await;
        assert!(resp.success);
        let row = appointment_repo::find_by_id(&h.db.pool, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, AppointmentStatus::EsperandoDeposito);
        assert!(row.event_id.is_none());
        assert!(h.calendar.inserted().is_empty());

        // El mensaje de seña pide el 50% del precio
        let sent = h.sink.delivered();
        let deposit_msg = sent.last().unwrap();
        assert!(deposit_msg.body.contains("$1000"));

        let resp = h.manager.mark_deposit_paid(&id).await;
        assert!(resp.success);
        let row = appointment_repo::find_by_id(&h.db.pool, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, AppointmentStatus::Confirmado);
        assert!(row.event_id.is_some());
        assert_eq!(h.calendar.inserted().len(), 1);

        // La confirmación informa el saldo restante
        let sent = h.sink.delivered();
        assert!(sent.last().unwrap().body.contains("Restan $1000"));
    }

    #[tokio::test]
    async fn test_deposit_conflict_reported_as_slot_conflict() {
        let h = harness(
            r#"{"booking": {"requestDeposit": true, "depositPercentage": 50},
                "servicios": {"items": [{"titulo": "Color", "precio": 2000}]}}"#,
        )
        .await;

        let resp = h.manager.submit("estudio", request("Color")).await;
        let id = resp.appointment_id.unwrap();

        h.calendar.push_event(CalendarEventData {
            id: "ev-ajeno".into(),
            summary: "Otro turno".into(),
            start: Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap(),
            transparent: false,
            cancelled: false,
            resource_id: None,
        });

        let resp = h.manager.mark_deposit_paid(&id).await;
        assert!(!resp.success);
        assert_eq!(resp.error.unwrap().code, BookingErrorCode::SlotConflict);

        let row = appointment_repo::find_by_id(&h.db.pool, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, AppointmentStatus::EsperandoDeposito);
    }

    #[tokio::test]
    async fn test_cancel_with_remotely_deleted_event() {
        let h = harness("{}").await;

        let resp = h.manager.submit("estudio", request("Corte")).await;
        let id = resp.appointment_id.unwrap();

        // Evento borrado a mano en el calendario del negocio
        h.calendar.set_fail_delete(true);

        let resp = h.manager.cancel(&id).await;
        assert!(resp.success);
        let row = appointment_repo::find_by_id(&h.db.pool, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, AppointmentStatus::Cancelado);
    }

    #[tokio::test]
    async fn test_unknown_business_and_appointment() {
        let h = harness("{}").await;

        let resp = h.manager.submit("inexistente", request("Corte")).await;
        assert!(!resp.success);
        assert_eq!(
            resp.error.unwrap().code,
            BookingErrorCode::BusinessNotFound
        );

        let resp = h.manager.cancel("no-existe").await;
        assert!(!resp.success);
        assert_eq!(
            resp.error.unwrap().code,
            BookingErrorCode::AppointmentNotFound
        );
    }

    #[tokio::test]
    async fn test_pending_submission_alerts_staff() {
        let h = harness(
            r#"{"booking": {"requireManualConfirmation": true},
                "equipo": {"availabilityMode": "per_worker",
                           "items": [{"id": "w-1", "nombre": "Carla",
                                      "email": "carla@estudio.com"}]}}"#,
        )
        .await;

        let mut req = request("Corte");
        req.resource_id = Some("w-1".into());
        let resp = h.manager.submit("estudio", req).await;
        assert!(resp.success);
        assert!(resp.pending);

        let sent = h.sink.delivered();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "carla@estudio.com");
        assert!(sent[0].body.contains("Ana"));
    }
}
