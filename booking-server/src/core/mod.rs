//! Núcleo del servidor: configuración, estado y arranque
//!
//! - [`Config`] - configuración por variables de entorno
//! - [`ServerState`] - estado compartido entre handlers
//! - [`Server`] - servidor HTTP

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
