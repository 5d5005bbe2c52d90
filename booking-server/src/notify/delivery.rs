//! HTTP delivery sink
//!
//! Entrega los mensajes a los puentes de email/WhatsApp (servicios
//! externos de la plataforma) vía POST JSON. Es el cableado de
//! producción detrás de [`NotificationSink`]; la máquina de estados
//! nunca lo ve directamente.

use async_trait::async_trait;

use super::sink::{Channel, NotificationSink, NotifyError, OutboundMessage};
use crate::core::Config;

pub struct HttpNotificationSink {
    http: reqwest::Client,
    email_url: Option<String>,
    whatsapp_url: Option<String>,
}

impl HttpNotificationSink {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            email_url: config.notify_email_url.clone(),
            whatsapp_url: config.notify_whatsapp_url.clone(),
        }
    }
}

#[async_trait]
impl NotificationSink for HttpNotificationSink {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
        let url = match message.channel {
            Channel::Email => self.email_url.as_deref(),
            Channel::Whatsapp => self.whatsapp_url.as_deref(),
        };
        let Some(url) = url else {
            return Err(NotifyError::Rejected(format!(
                "no bridge configured for channel {:?}",
                message.channel
            )));
        };

        let resp = self
            .http
            .post(url)
            .json(message)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NotifyError::Rejected(format!(
                "bridge responded with status {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::sink::TemplateKind;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message(channel: Channel) -> OutboundMessage {
        OutboundMessage {
            channel,
            kind: TemplateKind::Confirmation,
            to: "ana@mail.com".into(),
            subject: "Turno confirmado".into(),
            body: "Hola Ana".into(),
            banner_url: None,
        }
    }

    fn sink_with_email(url: &str) -> HttpNotificationSink {
        HttpNotificationSink {
            http: reqwest::Client::new(),
            email_url: Some(url.to_string()),
            whatsapp_url: None,
        }
    }

    #[tokio::test]
    async fn test_posts_message_to_bridge() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/email"))
            .and(body_string_contains("ana@mail.com"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let sink = sink_with_email(&format!("{}/email", server.uri()));
        sink.deliver(&message(Channel::Email)).await.unwrap();
    }

    #[tokio::test]
    async fn test_bridge_rejection_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/email"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = sink_with_email(&format!("{}/email", server.uri()));
        let result = sink.deliver(&message(Channel::Email)).await;
        assert!(matches!(result, Err(NotifyError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_channel_is_rejected() {
        let sink = sink_with_email("http://localhost:1/email");
        let result = sink.deliver(&message(Channel::Whatsapp)).await;
        assert!(matches!(result, Err(NotifyError::Rejected(_))));
    }
}
