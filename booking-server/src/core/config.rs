/// Configuración del servidor de turnos
///
/// # Variables de entorno
///
/// Todos los campos se pueden sobrescribir por entorno:
///
/// | Variable | Default | Descripción |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/booking | Directorio de trabajo (base de datos, logs) |
/// | HTTP_PORT | 3000 | Puerto del API HTTP |
/// | ENVIRONMENT | development | Entorno de ejecución |
/// | GOOGLE_CLIENT_ID | (vacío) | OAuth client id de la integración de calendario |
/// | GOOGLE_CLIENT_SECRET | (vacío) | OAuth client secret |
/// | GOOGLE_TOKEN_URL | https://oauth2.googleapis.com/token | Endpoint de refresh de tokens |
/// | GOOGLE_API_BASE | https://www.googleapis.com/calendar/v3 | Base del API de calendario |
/// | NOTIFY_EMAIL_URL | (sin configurar) | Puente de entrega de emails |
/// | NOTIFY_WHATSAPP_URL | (sin configurar) | Puente de entrega de WhatsApp |
/// | REMINDER_LEAD_HOURS | 24 | Anticipación de los recordatorios |
/// | REMINDER_INTERVAL_SECS | 900 | Período del barrido de recordatorios |
///
/// # Ejemplo
///
/// ```ignore
/// WORK_DIR=/data/booking HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directorio de trabajo; la base vive en `work_dir/booking.db`
    pub work_dir: String,
    /// Puerto del API HTTP
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,

    // === Integración de calendario ===
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_token_url: String,
    pub google_api_base: String,

    // === Puentes de notificación ===
    /// None = canal sin configurar (la entrega se rechaza)
    pub notify_email_url: Option<String>,
    pub notify_whatsapp_url: Option<String>,

    // === Recordatorios ===
    pub reminder_lead_hours: i64,
    pub reminder_interval_secs: u64,
}

impl Config {
    /// Carga desde variables de entorno, con defaults para lo ausente
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/booking".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            google_client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            google_token_url: std::env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".into()),
            google_api_base: std::env::var("GOOGLE_API_BASE")
                .unwrap_or_else(|_| "https://www.googleapis.com/calendar/v3".into()),

            notify_email_url: std::env::var("NOTIFY_EMAIL_URL").ok(),
            notify_whatsapp_url: std::env::var("NOTIFY_WHATSAPP_URL").ok(),

            reminder_lead_hours: std::env::var("REMINDER_LEAD_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            reminder_interval_secs: std::env::var("REMINDER_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
        }
    }

    /// Overrides puntuales, para tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
