//! Store clock
//!
//! Card timestamps and the "recent" statistics window are both measured
//! against the store's clock, so tests can pin it.

use chrono::{DateTime, Utc};

/// Source of the current time for a [`CardStore`](super::store::CardStore)
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
