//! Appointment State Machine
//!
//! Ciclo de vida de un turno: `pending → {esperando_deposito |
//! confirmado}`, con `cancelado` alcanzable desde cualquier estado no
//! cancelado. Las operaciones coordinan el calendario remoto, la fila
//! local y las notificaciones con una disciplina de orden fija:
//! remoto antes que local para compromisos, commit remoto diferido
//! mientras el pago es incierto, y re-chequeo de conflicto antes del
//! commit diferido.

pub mod actions;
pub mod availability;
pub mod error;
pub mod manager;
pub mod reminder;

pub use error::{BookingError, BookingResult};
pub use manager::BookingManager;
pub use reminder::ReminderSweep;
