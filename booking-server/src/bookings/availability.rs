//! Availability Resolver
//!
//! Camino de lectura puro: calcula los intervalos ocupados de un día
//! local consultando el gateway sobre una ventana con padding y
//! aplicando la política de recursos del negocio. El predicado de
//! scoping se comparte con el re-chequeo de conflicto del flujo de
//! seña.

use chrono::NaiveDate;

use super::error::{BookingError, BookingResult};
use crate::calendar::CalendarGateway;
use crate::utils::time;
use shared::business::AvailabilityMode;
use shared::{
    AvailabilityResponse, Business, BusinessSettings, BusyInterval, CalendarEventData, TimeWindow,
};

/// Whether an event blocks the queried resource under a scoping mode.
///
/// - `global`: todo evento bloquea (recurso único compartido).
/// - `per_worker`: un evento sin tag bloquea a todos (bloqueo manual /
///   tiempo ocupado ambiente); un evento con tag bloquea solo a ese
///   recurso. Una consulta sin recurso ve todo como bloqueante.
pub fn blocks_resource(
    mode: AvailabilityMode,
    event_resource: Option<&str>,
    queried_resource: Option<&str>,
) -> bool {
    match mode {
        AvailabilityMode::Global => true,
        AvailabilityMode::PerWorker => match (event_resource, queried_resource) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(tag), Some(wanted)) => tag == wanted,
        },
    }
}

/// Any non-transparent, non-cancelled event overlapping the window that
/// blocks the given resource?
///
/// `exclude_event` omite el evento propio del turno (reschedule).
pub fn conflicts(
    events: &[CalendarEventData],
    window: &TimeWindow,
    mode: AvailabilityMode,
    resource_id: Option<&str>,
    exclude_event: Option<&str>,
) -> bool {
    events.iter().any(|event| {
        event.blocks_time()
            && Some(event.id.as_str()) != exclude_event
            && blocks_resource(mode, event.resource_id.as_deref(), resource_id)
            && event.window().overlaps(window)
    })
}

/// Busy intervals for one local day of a business.
///
/// Consulta `fecha ± 1 día` para no truncar eventos cuyo timestamp UTC
/// cae en la fecha UTC vecina, y después filtra por la fecha *local*
/// de cada evento.
pub async fn resolve_day(
    calendar: &dyn CalendarGateway,
    business: &Business,
    settings: &BusinessSettings,
    date: NaiveDate,
    resource_id: Option<&str>,
) -> BookingResult<AvailabilityResponse> {
    let credential = business
        .google_refresh_token
        .as_deref()
        .ok_or(BookingError::IntegrationMissing)?;

    let tz = time::parse_timezone(&business.timezone);
    let mode = settings.equipo.availability_mode;
    let window = time::padded_day_window(date, tz);

    let events = calendar.list_events(credential, window).await?;

    let mut busy: Vec<BusyInterval> = events
        .into_iter()
        .filter(|e| e.blocks_time())
        .filter(|e| blocks_resource(mode, e.resource_id.as_deref(), resource_id))
        .filter(|e| time::local_date_of(e.start, tz) == date)
        .map(|e| BusyInterval {
            start: e.start,
            end: e.end,
        })
        .collect();
    busy.sort_by_key(|interval| interval.start);

    Ok(AvailabilityResponse {
        busy,
        timezone: business.timezone.clone(),
        mode: match mode {
            AvailabilityMode::Global => "global".to_string(),
            AvailabilityMode::PerWorker => "per_worker".to_string(),
        },
    })
}
