//! External Calendar Gateway
//!
//! Abstrae el calendario remoto detrás de [`CalendarGateway`]; el
//! resto del servidor nunca ve payloads del proveedor.

pub mod gateway;
pub mod google;
pub mod mock;

pub use gateway::{CalendarGateway, GatewayError, GatewayResult};
pub use google::GoogleCalendarClient;
