use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::bookings::{BookingManager, ReminderSweep};
use crate::calendar::{CalendarGateway, GoogleCalendarClient};
use crate::core::Config;
use crate::db::DbService;
use crate::notify::{HttpNotificationSink, NotificationSink};

/// Estado del servidor: referencias compartidas a los servicios
///
/// Clonar es barato (Arc por dentro); cada handler recibe su copia vía
/// el extractor `State` de axum.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub manager: Arc<BookingManager>,
    notifier: Arc<dyn NotificationSink>,
    /// Token raíz de apagado para las tareas de fondo
    pub shutdown: CancellationToken,
}

impl ServerState {
    pub fn new(
        config: Config,
        pool: SqlitePool,
        manager: Arc<BookingManager>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            pool,
            manager,
            notifier,
            shutdown: CancellationToken::new(),
        }
    }

    /// Inicializa el estado completo: directorio de trabajo, base de
    /// datos y cableado de servicios.
    ///
    /// # Panics
    ///
    /// Si el directorio de trabajo no se puede crear o la base de datos
    /// no inicializa. Sin esas dos piezas el servidor no tiene razón de
    /// seguir corriendo.
    pub async fn initialize(config: &Config) -> Self {
        std::fs::create_dir_all(&config.work_dir).expect("Failed to create work directory");

        let db_path = PathBuf::from(&config.work_dir).join("booking.db");
        let db = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        let calendar: Arc<dyn CalendarGateway> = Arc::new(GoogleCalendarClient::new(config));
        let notifier: Arc<dyn NotificationSink> = Arc::new(HttpNotificationSink::new(config));
        let manager = Arc::new(BookingManager::new(
            db.pool.clone(),
            calendar,
            notifier.clone(),
        ));

        Self::new(config.clone(), db.pool, manager, notifier)
    }

    /// Lanza las tareas de fondo. Llamar antes de `Server::run()`.
    pub fn start_background_tasks(&self) {
        let sweep = ReminderSweep::new(
            self.pool.clone(),
            self.notifier.clone(),
            self.config.reminder_interval_secs,
            self.config.reminder_lead_hours,
        );
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            sweep.run(shutdown).await;
        });
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
