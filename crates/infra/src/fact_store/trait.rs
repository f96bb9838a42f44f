use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use priceforge_core::{FactId, PricingError};
use priceforge_pricing::{PriceFact, PriceKind, PriceWrite, Scope, ScopeFacts};

/// Fact store operation error.
///
/// These are **infrastructure errors**; the engine forwards them to its caller
/// as [`PricingError::Storage`] without interpretation.
#[derive(Debug, Error)]
pub enum FactStoreError {
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<FactStoreError> for PricingError {
    fn from(err: FactStoreError) -> Self {
        PricingError::storage(err.to_string())
    }
}

/// Outcome of one slot write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SlotWrite {
    /// The fact now occupies its slot.
    Applied(FactId),
    /// The slot already held a fact with a later `created_at`; the write was dropped.
    Superseded { current: FactId },
}

/// Per-slot price fact store.
///
/// ## Slot semantics
///
/// Each (scope, kind) pair is one slot holding at most one fact. `put` replaces
/// the slot atomically: concurrent readers observe either the old or the new
/// fact, never a mix. Writes to different slots must not block each other.
/// Same-slot writes are last-write-wins by `created_at`, not by arrival order.
///
/// ## Expiry
///
/// Expiry is passive. `load` may return expired facts; `read` filters them
/// against the caller's `now`. `purge_expired` is an optional compaction step
/// and never changes what `read` returns.
pub trait PriceFactStore: Send + Sync {
    /// Atomically place one fact into its (scope, kind) slot.
    fn put(&self, fact: PriceFact) -> Result<SlotWrite, FactStoreError>;

    /// Every fact currently held for exactly `scope`, expired or not.
    fn load(&self, scope: &Scope) -> Result<ScopeFacts, FactStoreError>;

    /// Physically drop facts expired at `now`; returns how many were removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, FactStoreError>;

    /// Write every price supplied in `write`, stamped `now`. Kinds left out of
    /// `write` keep their current facts.
    ///
    /// Each slot write is atomic on its own; there is no multi-slot transaction.
    fn write(
        &self,
        scope: &Scope,
        write: PriceWrite,
        now: DateTime<Utc>,
    ) -> Result<Vec<(PriceKind, SlotWrite)>, FactStoreError> {
        write
            .into_facts(scope, now)
            .into_iter()
            .map(|fact| {
                let kind = fact.kind;
                self.put(fact).map(|outcome| (kind, outcome))
            })
            .collect()
    }

    /// Live facts for exactly `scope` as of `now`.
    fn read(&self, scope: &Scope, now: DateTime<Utc>) -> Result<ScopeFacts, FactStoreError> {
        Ok(self.load(scope)?.live_at(now))
    }
}

impl<S> PriceFactStore for Arc<S>
where
    S: PriceFactStore + ?Sized,
{
    fn put(&self, fact: PriceFact) -> Result<SlotWrite, FactStoreError> {
        (**self).put(fact)
    }

    fn load(&self, scope: &Scope) -> Result<ScopeFacts, FactStoreError> {
        (**self).load(scope)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, FactStoreError> {
        (**self).purge_expired(now)
    }
}
