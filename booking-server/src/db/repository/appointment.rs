//! Appointment Repository
//!
//! La clave natural es `(business_id, client_email)` (email ya
//! normalizado): la última solicitud del mismo cliente pisa la
//! anterior en vez de acumular historial.

use super::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use shared::{Appointment, Business};
use sqlx::SqlitePool;

const APPOINTMENT_SELECT: &str = "SELECT id, business_id, client_name, client_email, client_phone, message, photo_urls, start_at, end_at, resource_id, service, status, event_id, final_price, reminder_sent, created_at, updated_at FROM appointment";

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Appointment>> {
    let sql = format!("{} WHERE id = ?", APPOINTMENT_SELECT);
    let row = sqlx::query_as::<_, Appointment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Read-by-id with its owning business
pub async fn find_with_business(
    pool: &SqlitePool,
    id: &str,
) -> RepoResult<Option<(Appointment, Business)>> {
    let Some(appointment) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let business = super::business::find_by_id(pool, &appointment.business_id)
        .await?
        .ok_or_else(|| {
            RepoError::Database(format!(
                "Appointment {} references missing business {}",
                id, appointment.business_id
            ))
        })?;
    Ok(Some((appointment, business)))
}

pub async fn find_by_client(
    pool: &SqlitePool,
    business_id: &str,
    client_email: &str,
) -> RepoResult<Option<Appointment>> {
    let sql = format!(
        "{} WHERE business_id = ? AND client_email = ?",
        APPOINTMENT_SELECT
    );
    let row = sqlx::query_as::<_, Appointment>(&sql)
        .bind(business_id)
        .bind(client_email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_for_business(
    pool: &SqlitePool,
    business_id: &str,
) -> RepoResult<Vec<Appointment>> {
    let sql = format!(
        "{} WHERE business_id = ? ORDER BY start_at DESC",
        APPOINTMENT_SELECT
    );
    let rows = sqlx::query_as::<_, Appointment>(&sql)
        .bind(business_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Idempotent upsert keyed by `(business_id, client_email)`.
///
/// On conflict the existing row keeps its `id` and `created_at`; every
/// other field is overwritten by the new request. Returns the stored
/// row (with the surviving id).
pub async fn upsert_by_client(
    pool: &SqlitePool,
    appointment: &Appointment,
) -> RepoResult<Appointment> {
    sqlx::query(
        "INSERT INTO appointment (id, business_id, client_name, client_email, client_phone, message, photo_urls, start_at, end_at, resource_id, service, status, event_id, final_price, reminder_sent, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17) \
         ON CONFLICT (business_id, client_email) DO UPDATE SET \
             client_name = excluded.client_name, \
             client_phone = excluded.client_phone, \
             message = excluded.message, \
             photo_urls = excluded.photo_urls, \
             start_at = excluded.start_at, \
             end_at = excluded.end_at, \
             resource_id = excluded.resource_id, \
             service = excluded.service, \
             status = excluded.status, \
             event_id = excluded.event_id, \
             final_price = excluded.final_price, \
             reminder_sent = excluded.reminder_sent, \
             updated_at = excluded.updated_at",
    )
    .bind(&appointment.id)
    .bind(&appointment.business_id)
    .bind(&appointment.client_name)
    .bind(&appointment.client_email)
    .bind(&appointment.client_phone)
    .bind(&appointment.message)
    .bind(&appointment.photo_urls)
    .bind(appointment.start_at)
    .bind(appointment.end_at)
    .bind(&appointment.resource_id)
    .bind(&appointment.service)
    .bind(appointment.status)
    .bind(&appointment.event_id)
    .bind(appointment.final_price)
    .bind(appointment.reminder_sent)
    .bind(appointment.created_at)
    .bind(appointment.updated_at)
    .execute(pool)
    .await?;

    find_by_client(pool, &appointment.business_id, &appointment.client_email)
        .await?
        .ok_or_else(|| RepoError::Database("Upserted appointment not found".into()))
}

/// Transition to `confirmado` storing the remote event id
pub async fn mark_confirmed(
    pool: &SqlitePool,
    id: &str,
    event_id: &str,
    final_price: f64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE appointment SET status = 'confirmado', event_id = ?1, final_price = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(event_id)
    .bind(final_price)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Appointment {id} not found")));
    }
    Ok(())
}

/// Transition to `esperando_deposito`; the event is deliberately not
/// created at this point.
pub async fn mark_awaiting_deposit(
    pool: &SqlitePool,
    id: &str,
    final_price: f64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE appointment SET status = 'esperando_deposito', event_id = NULL, final_price = ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(final_price)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Appointment {id} not found")));
    }
    Ok(())
}

/// Drop the stored event id after its remote event was released (e.g.
/// a resubmit deleted the superseded event).
pub async fn clear_event(pool: &SqlitePool, id: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE appointment SET event_id = NULL, updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Appointment {id} not found")));
    }
    Ok(())
}

pub async fn mark_cancelled(pool: &SqlitePool, id: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE appointment SET status = 'cancelado', updated_at = ?1 WHERE id = ?2",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Appointment {id} not found")));
    }
    Ok(())
}

/// Move an appointment to a new slot; the reminder flag resets so the
/// sweep fires again for the new time.
pub async fn update_times(
    pool: &SqlitePool,
    id: &str,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE appointment SET start_at = ?1, end_at = ?2, reminder_sent = 0, updated_at = ?3 WHERE id = ?4",
    )
    .bind(start_at)
    .bind(end_at)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Appointment {id} not found")));
    }
    Ok(())
}

pub async fn mark_reminder_sent(pool: &SqlitePool, id: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE appointment SET reminder_sent = 1, updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Confirmed appointments starting inside `[from, until)` whose
/// reminder has not been sent yet
pub async fn find_due_reminders(
    pool: &SqlitePool,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> RepoResult<Vec<Appointment>> {
    let sql = format!(
        "{} WHERE status = 'confirmado' AND reminder_sent = 0 AND start_at >= ? AND start_at < ?",
        APPOINTMENT_SELECT
    );
    let rows = sqlx::query_as::<_, Appointment>(&sql)
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use chrono::TimeZone;
    use shared::AppointmentStatus;

    async fn seed_business(pool: &SqlitePool) -> String {
        let now = shared::util::now_millis();
        let business = Business {
            id: "biz-1".to_string(),
            slug: "estudio".to_string(),
            name: "Estudio Prueba".to_string(),
            timezone: "America/Argentina/Buenos_Aires".to_string(),
            google_refresh_token: Some("rt-1".to_string()),
            settings: "{}".to_string(),
            created_at: now,
            updated_at: now,
        };
        super::super::business::upsert(pool, &business).await.unwrap();
        business.id
    }

    fn sample(business_id: &str, email: &str) -> Appointment {
        let now = shared::util::now_millis();
        Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            business_id: business_id.to_string(),
            client_name: "Ana".to_string(),
            client_email: shared::util::normalize_email(email),
            client_phone: None,
            message: None,
            photo_urls: None,
            start_at: Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap(),
            resource_id: None,
            service: "Corte".to_string(),
            status: AppointmentStatus::Pending,
            event_id: None,
            final_price: 0.0,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_upsert_dedup_keeps_one_row_per_email() {
        let db = DbService::new_in_memory().await.unwrap();
        let business_id = seed_business(&db.pool).await;

        let first = sample(&business_id, "Ana@Mail.com ");
        let stored_first = upsert_by_client(&db.pool, &first).await.unwrap();

        // Mismo email con otra capitalización: pisa la fila anterior
        let mut second = sample(&business_id, " ana@mail.COM");
        second.client_name = "Ana María".to_string();
        second.service = "Color".to_string();
        let stored_second = upsert_by_client(&db.pool, &second).await.unwrap();

        // El id original sobrevive, los datos nuevos ganan
        assert_eq!(stored_second.id, stored_first.id);
        assert_eq!(stored_second.client_name, "Ana María");
        assert_eq!(stored_second.service, "Color");

        let all = list_for_business(&db.pool, &business_id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let db = DbService::new_in_memory().await.unwrap();
        let business_id = seed_business(&db.pool).await;
        let appt = upsert_by_client(&db.pool, &sample(&business_id, "ana@mail.com"))
            .await
            .unwrap();

        mark_awaiting_deposit(&db.pool, &appt.id, 2000.0).await.unwrap();
        let row = find_by_id(&db.pool, &appt.id).await.unwrap().unwrap();
        assert_eq!(row.status, AppointmentStatus::EsperandoDeposito);
        assert!(row.event_id.is_none());
        assert_eq!(row.final_price, 2000.0);

        mark_confirmed(&db.pool, &appt.id, "ev-1", 2000.0).await.unwrap();
        let row = find_by_id(&db.pool, &appt.id).await.unwrap().unwrap();
        assert_eq!(row.status, AppointmentStatus::Confirmado);
        assert_eq!(row.event_id.as_deref(), Some("ev-1"));

        mark_cancelled(&db.pool, &appt.id).await.unwrap();
        let row = find_by_id(&db.pool, &appt.id).await.unwrap().unwrap();
        assert_eq!(row.status, AppointmentStatus::Cancelado);
    }

    #[tokio::test]
    async fn test_update_times_resets_reminder_flag() {
        let db = DbService::new_in_memory().await.unwrap();
        let business_id = seed_business(&db.pool).await;
        let appt = upsert_by_client(&db.pool, &sample(&business_id, "ana@mail.com"))
            .await
            .unwrap();
        mark_confirmed(&db.pool, &appt.id, "ev-1", 1000.0).await.unwrap();
        mark_reminder_sent(&db.pool, &appt.id).await.unwrap();

        let new_start = Utc.with_ymd_and_hms(2026, 3, 12, 14, 0, 0).unwrap();
        let new_end = Utc.with_ymd_and_hms(2026, 3, 12, 15, 0, 0).unwrap();
        update_times(&db.pool, &appt.id, new_start, new_end).await.unwrap();

        let row = find_by_id(&db.pool, &appt.id).await.unwrap().unwrap();
        assert_eq!(row.start_at, new_start);
        assert!(!row.reminder_sent);
    }

    #[tokio::test]
    async fn test_find_due_reminders_window() {
        let db = DbService::new_in_memory().await.unwrap();
        let business_id = seed_business(&db.pool).await;
        let appt = upsert_by_client(&db.pool, &sample(&business_id, "ana@mail.com"))
            .await
            .unwrap();
        mark_confirmed(&db.pool, &appt.id, "ev-1", 1000.0).await.unwrap();

        let from = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap();
        let due = find_due_reminders(&db.pool, from, until).await.unwrap();
        assert_eq!(due.len(), 1);

        mark_reminder_sent(&db.pool, &appt.id).await.unwrap();
        let due = find_due_reminders(&db.pool, from, until).await.unwrap();
        assert!(due.is_empty());
    }
}
