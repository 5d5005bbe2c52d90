//! Notification Sink
//!
//! Mensajería saliente hacia el cliente y el staff. La máquina de
//! estados solo conoce el trait [`NotificationSink`]; las fallas de
//! entrega nunca revierten una transición.

pub mod delivery;
pub mod dispatcher;
pub mod mock;
pub mod sink;
pub mod template;

pub use delivery::HttpNotificationSink;
pub use sink::{Channel, NotificationSink, NotifyError, OutboundMessage, TemplateKind};
