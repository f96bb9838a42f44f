//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one ingested price fact.
///
/// UUIDv7 keeps fact ids time-ordered, so ids in logs read in ingestion order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactId(Uuid);

impl FactId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for FactId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for FactId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
