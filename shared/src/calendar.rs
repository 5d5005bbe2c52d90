//! Calendar event wire types
//!
//! Simplified representation of remote calendar events, decoupled from
//! the provider's payloads. The resource tag travels as structured data
//! (never encoded into the event title).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open query window `[start, end)`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether this window overlaps another (half-open semantics)
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Remote calendar event (normalized)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventData {
    pub id: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Transparent events do not block availability
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub cancelled: bool,
    /// Staff resource tag; None = blocks the whole business
    #[serde(default)]
    pub resource_id: Option<String>,
}

impl CalendarEventData {
    /// Non-blocking events are filtered out of every availability and
    /// conflict computation.
    pub fn blocks_time(&self) -> bool {
        !self.transparent && !self.cancelled
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }
}

/// Event creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub resource_id: Option<String>,
    /// When true the event is created as transparent (non-blocking)
    #[serde(default)]
    pub transparent: bool,
}

/// Busy interval returned to booking clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, 0, 0).unwrap()
    }

    #[test]
    fn test_window_overlap_half_open() {
        let a = TimeWindow::new(t(10), t(11));
        assert!(a.overlaps(&TimeWindow::new(t(10), t(12))));
        assert!(a.overlaps(&TimeWindow::new(t(9), t(11))));
        // Touching edges do not overlap
        assert!(!a.overlaps(&TimeWindow::new(t(11), t(12))));
        assert!(!a.overlaps(&TimeWindow::new(t(9), t(10))));
    }

    #[test]
    fn test_blocks_time() {
        let mut event = CalendarEventData {
            id: "ev-1".into(),
            summary: "Corte - Maru".into(),
            start: t(10),
            end: t(11),
            transparent: false,
            cancelled: false,
            resource_id: None,
        };
        assert!(event.blocks_time());
        event.transparent = true;
        assert!(!event.blocks_time());
        event.transparent = false;
        event.cancelled = true;
        assert!(!event.blocks_time());
    }
}
