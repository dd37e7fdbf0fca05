//! Deterministic clock for service tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixtureClock(pub DateTime<Utc>);

impl FixtureClock {
    /// 2026-03-14T09:30:00Z.
    pub(crate) fn default_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
            .single()
            .unwrap_or_else(|| panic!("fixture timestamp is unambiguous"))
    }
}

impl Default for FixtureClock {
    fn default() -> Self {
        Self(Self::default_instant())
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
