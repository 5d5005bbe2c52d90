//! Conversión de fechas en el huso horario del negocio
//!
//! Toda conversión fecha local → UTC se hace acá; el resto del código
//! trabaja con `DateTime<Utc>`.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};
use shared::TimeWindow;

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse an IANA timezone, falling back to UTC on garbage
pub fn parse_timezone(tz: &str) -> Tz {
    tz.parse().unwrap_or_else(|_| {
        tracing::warn!("Unknown timezone '{}', falling back to UTC", tz);
        chrono_tz::UTC
    })
}

/// Local midnight of a date → UTC instant.
///
/// DST gap fallback: si la medianoche local no existe, se usa la
/// interpretación más tardía; último recurso, UTC directo.
pub fn local_day_start(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Query window for one local day, padded ± 1 day.
///
/// El padding evita truncar eventos cuyo timestamp UTC cae en la fecha
/// UTC vecina; el llamador filtra después por fecha local.
pub fn padded_day_window(date: NaiveDate, tz: Tz) -> TimeWindow {
    let start = local_day_start(date - chrono::Duration::days(1), tz);
    let end = local_day_start(date + chrono::Duration::days(2), tz);
    TimeWindow::new(start, end)
}

/// Local calendar date of a UTC instant
pub fn local_date_of(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Human-readable (fecha, hora) pair for notification templates
pub fn local_date_time_strings(instant: DateTime<Utc>, tz: Tz) -> (String, String) {
    let local = instant.with_timezone(&tz);
    (
        local.format("%d/%m/%Y").to_string(),
        local.format("%H:%M").to_string(),
    )
}
