//! Correlation ids for dispatches and sessions.
//!
//! A ULID sorts by creation time, so the id alone tells an operator when a
//! failed dispatch started.

use std::fmt;

use serde::{Serialize, Serializer};
use ulid::Ulid;

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct CorrelationId(Ulid);

impl CorrelationId {
    /// A new id stamped with the current time.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn started_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for CorrelationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
