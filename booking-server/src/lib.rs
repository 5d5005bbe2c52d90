//! Booking Server - núcleo multi-tenant de reservas de turnos
//!
//! # Arquitectura
//!
//! - **Máquina de estados** (`bookings`): ciclo de vida del turno y sus
//!   operaciones, con el calendario remoto como fuente de verdad de
//!   disponibilidad
//! - **Gateway de calendario** (`calendar`): Google Calendar detrás de
//!   un trait, con dobles para tests
//! - **Notificaciones** (`notify`): plantillas, despacho best-effort y
//!   puentes HTTP de email/WhatsApp
//! - **Persistencia** (`db`): SQLite embebido vía sqlx, una fila por
//!   (negocio, email del cliente)
//! - **HTTP API** (`api`): rutas públicas de reserva y rutas del panel
//!
//! # Estructura
//!
//! ```text
//! booking-server/src/
//! ├── core/      # configuración, estado, servidor
//! ├── bookings/  # máquina de estados, disponibilidad, recordatorios
//! ├── calendar/  # gateway del calendario remoto
//! ├── notify/    # notificaciones salientes
//! ├── api/       # rutas y handlers HTTP
//! ├── db/        # pool y repositorios
//! └── utils/     # errores, logging, tiempo, validación
//! ```

pub mod api;
pub mod bookings;
pub mod calendar;
pub mod core;
pub mod db;
pub mod notify;
pub mod utils;

// Re-export de los tipos principales
pub use bookings::{BookingError, BookingManager, BookingResult, ReminderSweep};
pub use core::{Config, Server, ServerState};
pub use utils::logger::{init_logger, init_logger_with_file};
pub use utils::{AppError, AppResult};
