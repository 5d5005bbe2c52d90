//! Renderizado de plantillas de notificación
//!
//! Las plantillas vienen del blob de configuración del negocio y usan
//! placeholders `{variable}`. Los montos se formatean como `$1000` /
//! `$1234.50`.

use std::collections::HashMap;

use crate::utils::time;
use shared::business::BusinessSettings;
use shared::util::format_price;
use shared::{Appointment, Business};

/// Replace `{key}` placeholders; unknown placeholders are left as-is
pub fn render(text: &str, vars: &HashMap<String, String>) -> String {
    let mut out = text.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Variables disponibles para todas las plantillas de un turno.
///
/// `monto_senia` y `precio_a_pagar` se calculan con la política de
/// seña del negocio: seña = precio × porcentaje / 100, resto = precio
/// − seña. Sin seña configurada, `precio_a_pagar` es el precio total.
pub fn build_variables(
    business: &Business,
    settings: &BusinessSettings,
    appointment: &Appointment,
) -> HashMap<String, String> {
    let tz = time::parse_timezone(&business.timezone);
    let (fecha, hora) = time::local_date_time_strings(appointment.start_at, tz);

    let price = appointment.final_price;
    let deposit = if settings.booking.deposit_required() {
        price * settings.booking.deposit_percentage / 100.0
    } else {
        0.0
    };

    let mut vars = HashMap::from([
        ("nombre_cliente".to_string(), appointment.client_name.clone()),
        ("nombre_negocio".to_string(), business.name.clone()),
        ("servicio".to_string(), appointment.service.clone()),
        ("fecha".to_string(), fecha),
        ("hora".to_string(), hora),
        ("precio".to_string(), format_price(price)),
        ("monto_senia".to_string(), format_price(deposit)),
        ("precio_a_pagar".to_string(), format_price(price - deposit)),
    ]);

    // Datos de contacto del profesional asignado, si hay
    if let Some(resource_id) = &appointment.resource_id
        && let Some(member) = settings.equipo.find(resource_id)
    {
        vars.insert("profesional".to_string(), member.nombre.clone());
        if let Some(alias) = &member.alias_cvu {
            vars.insert("alias_cvu".to_string(), alias.clone());
        }
        if let Some(phone) = &member.telefono {
            vars.insert("telefono_profesional".to_string(), phone.clone());
        }
    }

    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use shared::AppointmentStatus;
    use shared::business::{BookingPolicy, StaffMember, TeamSettings};

    fn business() -> Business {
        Business {
            id: "biz-1".into(),
            slug: "estudio".into(),
            name: "Estudio Prueba".into(),
            timezone: "America/Argentina/Buenos_Aires".into(),
            google_refresh_token: Some("rt-1".into()),
            settings: "{}".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn appointment(price: f64) -> Appointment {
        Appointment {
            id: "a-1".into(),
            business_id: "biz-1".into(),
            client_name: "Ana".into(),
            client_email: "ana@mail.com".into(),
            client_phone: Some("+54911".into()),
            message: None,
            photo_urls: None,
            start_at: Utc.with_ymd_and_hms(2026, 3, 10, 18, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2026, 3, 10, 19, 0, 0).unwrap(),
            resource_id: Some("w-1".into()),
            service: "Color".into(),
            status: AppointmentStatus::EsperandoDeposito,
            event_id: None,
            final_price: price,
            reminder_sent: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_render_substitution() {
        let vars = HashMap::from([("nombre_cliente".to_string(), "Ana".to_string())]);
        assert_eq!(render("Hola {nombre_cliente}!", &vars), "Hola Ana!");
        // Placeholder desconocido queda intacto
        assert_eq!(render("{otro}", &vars), "{otro}");
    }

    #[test]
    fn test_deposit_variables_half_of_2000() {
        let settings = BusinessSettings {
            booking: BookingPolicy {
                require_manual_confirmation: true,
                request_deposit: true,
                deposit_percentage: 50.0,
            },
            equipo: TeamSettings {
                items: vec![StaffMember {
                    id: "w-1".into(),
                    nombre: "Maru".into(),
                    alias_cvu: Some("maru.pagos".into()),
                    telefono: Some("+54922".into()),
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        };

        let vars = build_variables(&business(), &settings, &appointment(2000.0));
        assert_eq!(vars["monto_senia"], "$1000");
        assert_eq!(vars["precio_a_pagar"], "$1000");
        assert_eq!(vars["precio"], "$2000");
        assert_eq!(vars["alias_cvu"], "maru.pagos");
        assert_eq!(vars["telefono_profesional"], "+54922");
        assert_eq!(vars["fecha"], "10/03/2026");
        assert_eq!(vars["hora"], "15:00");
    }

    #[test]
    fn test_no_deposit_pays_full_price() {
        let settings = BusinessSettings::default();
        let vars = build_variables(&business(), &settings, &appointment(1000.0));
        assert_eq!(vars["monto_senia"], "$0");
        assert_eq!(vars["precio_a_pagar"], "$1000");
    }
}
