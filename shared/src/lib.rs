//! Shared types for the booking platform
//!
//! Wire and domain types used by the booking server and its clients:
//! appointment entities, business settings, calendar event data,
//! operation responses and error codes.

pub mod appointment;
pub mod business;
pub mod calendar;
pub mod error;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use appointment::{Appointment, AppointmentStatus, BookingRequest};
pub use business::{AvailabilityMode, Business, BusinessSettings};
pub use calendar::{BusyInterval, CalendarEventData, EventDraft, TimeWindow};
pub use error::{BookingErrorCode, OperationError};
pub use response::{AvailabilityResponse, OperationResponse, SubmitResponse};
