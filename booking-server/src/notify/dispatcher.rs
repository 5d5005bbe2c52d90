//! Despacho best-effort por canal
//!
//! Cada canal se intenta de forma independiente después del write
//! autoritativo en la base; una falla se loguea y no afecta ni al otro
//! canal ni al resultado de la operación.

use super::sink::{Channel, NotificationSink, OutboundMessage, TemplateKind};
use super::template;
use shared::business::BusinessSettings;
use shared::{Appointment, Business};

/// Render and attempt delivery of one template to the client, per
/// enabled channel. Never fails.
pub async fn dispatch(
    sink: &dyn NotificationSink,
    business: &Business,
    settings: &BusinessSettings,
    appointment: &Appointment,
    kind: TemplateKind,
) {
    let tpl = kind.template(&settings.notifications);
    if !tpl.enabled {
        tracing::debug!(
            appointment_id = %appointment.id,
            "Notification template disabled, skipping"
        );
        return;
    }

    let vars = template::build_variables(business, settings, appointment);
    let subject = template::render(&tpl.subject, &vars);
    let body = template::render(&tpl.body, &vars);

    if tpl.send_via_email {
        let message = OutboundMessage {
            channel: Channel::Email,
            kind,
            to: appointment.client_email.clone(),
            subject: subject.clone(),
            body: body.clone(),
            banner_url: tpl.banner_url.clone(),
        };
        attempt(sink, &message, &appointment.id).await;
    }

    if tpl.send_via_whatsapp {
        match &appointment.client_phone {
            Some(phone) => {
                let message = OutboundMessage {
                    channel: Channel::Whatsapp,
                    kind,
                    to: phone.clone(),
                    subject,
                    body,
                    banner_url: tpl.banner_url.clone(),
                };
                attempt(sink, &message, &appointment.id).await;
            }
            None => tracing::debug!(
                appointment_id = %appointment.id,
                "WhatsApp enabled but client has no phone, skipping"
            ),
        }
    }
}

/// Aviso al staff de una solicitud pendiente de aprobación.
///
/// Va al mail del profesional asignado; sin profesional (o sin mail)
/// cae al primer miembro del equipo con mail cargado. Solo se omite si
/// nadie en el equipo tiene contacto.
pub async fn notify_staff_pending(
    sink: &dyn NotificationSink,
    business: &Business,
    settings: &BusinessSettings,
    appointment: &Appointment,
) {
    let staff_email = appointment
        .resource_id
        .as_deref()
        .and_then(|rid| settings.equipo.find(rid))
        .and_then(|m| m.email.clone())
        .or_else(|| {
            settings
                .equipo
                .items
                .iter()
                .find_map(|m| m.email.clone())
        });

    let Some(to) = staff_email else {
        tracing::warn!(
            appointment_id = %appointment.id,
            business = %business.slug,
            "No staff contact for pending request, skipping alert"
        );
        return;
    };

    let vars = template::build_variables(business, settings, appointment);
    let message = OutboundMessage {
        channel: Channel::Email,
        kind: TemplateKind::Confirmation,
        to,
        subject: format!("Nueva solicitud de turno - {}", business.name),
        body: template::render(
            "Solicitud de {nombre_cliente} para {servicio} el {fecha} a las {hora}. Requiere aprobación.",
            &vars,
        ),
        banner_url: None,
    };
    attempt(sink, &message, &appointment.id).await;
}

async fn attempt(sink: &dyn NotificationSink, message: &OutboundMessage, appointment_id: &str) {
    if let Err(e) = sink.deliver(message).await {
        tracing::warn!(
            appointment_id = %appointment_id,
            channel = ?message.channel,
            error = %e,
            "Notification delivery failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::mock::RecordingSink;
    use chrono::{TimeZone, Utc};
    use shared::AppointmentStatus;
    use shared::business::NotificationTemplate;

    fn business() -> Business {
        Business {
            id: "biz-1".into(),
            slug: "estudio".into(),
            name: "Estudio".into(),
            timezone: "UTC".into(),
            google_refresh_token: None,
            settings: "{}".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn appointment(phone: Option<&str>) -> Appointment {
        Appointment {
            id: "a-1".into(),
            business_id: "biz-1".into(),
            client_name: "Ana".into(),
            client_email: "ana@mail.com".into(),
            client_phone: phone.map(String::from),
            message: None,
            photo_urls: None,
            start_at: Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap(),
            resource_id: None,
            service: "Corte".into(),
            status: AppointmentStatus::Confirmado,
            event_id: Some("ev-1".into()),
            final_price: 1000.0,
            reminder_sent: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn settings_both_channels() -> BusinessSettings {
        let mut settings = BusinessSettings::default();
        settings.notifications.confirmation = NotificationTemplate {
            enabled: true,
            send_via_email: true,
            send_via_whatsapp: true,
            subject: "Turno confirmado".into(),
            body: "Hola {nombre_cliente}, tu turno de {servicio} quedó confirmado.".into(),
            banner_url: None,
        };
        settings
    }

    #[tokio::test]
    async fn test_both_channels_attempted_independently() {
        let sink = RecordingSink::new();
        sink.fail_channel(Channel::Email);

        dispatch(
            &sink,
            &business(),
            &settings_both_channels(),
            &appointment(Some("+54911")),
            TemplateKind::Confirmation,
        )
        .await;

        // El email falló pero WhatsApp igual se intentó
        let attempted = sink.attempted();
        assert_eq!(attempted.len(), 2);
        assert_eq!(attempted[0].channel, Channel::Email);
        assert_eq!(attempted[1].channel, Channel::Whatsapp);
        assert!(attempted[1].body.contains("Ana"));

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].channel, Channel::Whatsapp);
    }

    #[tokio::test]
    async fn test_disabled_template_sends_nothing() {
        let sink = RecordingSink::new();
        let mut settings = settings_both_channels();
        settings.notifications.confirmation.enabled = false;

        dispatch(
            &sink,
            &business(),
            &settings,
            &appointment(Some("+54911")),
            TemplateKind::Confirmation,
        )
        .await;

        assert!(sink.attempted().is_empty());
    }

    #[tokio::test]
    async fn test_staff_alert_falls_back_to_first_team_contact() {
        let sink = RecordingSink::new();
        let mut settings = BusinessSettings::default();
        settings.equipo.items = vec![
            shared::business::StaffMember {
                id: "w-1".into(),
                nombre: "Maru".into(),
                email: None,
                ..Default::default()
            },
            shared::business::StaffMember {
                id: "w-2".into(),
                nombre: "Carla".into(),
                email: Some("carla@estudio.com".into()),
                ..Default::default()
            },
        ];

        // Solicitud sin profesional asignado: igual hay aviso
        notify_staff_pending(&sink, &business(), &settings, &appointment(None)).await;

        let attempted = sink.attempted();
        assert_eq!(attempted.len(), 1);
        assert_eq!(attempted[0].to, "carla@estudio.com");
        assert!(attempted[0].body.contains("Requiere aprobación"));
    }

    #[tokio::test]
    async fn test_staff_alert_without_any_contact_is_skipped() {
        let sink = RecordingSink::new();
        let settings = BusinessSettings::default();

        notify_staff_pending(&sink, &business(), &settings, &appointment(None)).await;

        assert!(sink.attempted().is_empty());
    }

    #[tokio::test]
    async fn test_whatsapp_without_phone_is_skipped() {
        let sink = RecordingSink::new();

        dispatch(
            &sink,
            &business(),
            &settings_both_channels(),
            &appointment(None),
            TemplateKind::Confirmation,
        )
        .await;

        let attempted = sink.attempted();
        assert_eq!(attempted.len(), 1);
        assert_eq!(attempted[0].channel, Channel::Email);
    }
}
