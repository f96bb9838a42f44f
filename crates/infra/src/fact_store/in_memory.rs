use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use priceforge_pricing::{PriceFact, PriceKind, Scope, ScopeFacts};

use super::r#trait::{FactStoreError, PriceFactStore, SlotWrite};

type Slot = RwLock<Option<Arc<PriceFact>>>;

/// The three slots of one scope, each behind its own lock.
#[derive(Debug, Default)]
struct ScopeSlots {
    normal: Slot,
    sale: Slot,
    promotion: Slot,
}

impl ScopeSlots {
    fn slot(&self, kind: PriceKind) -> &Slot {
        match kind {
            PriceKind::Normal => &self.normal,
            PriceKind::Sale => &self.sale,
            PriceKind::Promotion => &self.promotion,
        }
    }
}

fn poisoned(what: &str) -> FactStoreError {
    FactStoreError::LockPoisoned(what.to_string())
}

/// In-memory price fact store.
///
/// The scope map lock is only taken for writing the first time a scope is
/// seen (and during compaction). Slot writes lock just their own slot and swap
/// an `Arc`, so writers to different kinds or scopes never wait on each other
/// and readers never see a half-written fact.
#[derive(Debug, Default)]
pub struct InMemoryPriceFactStore {
    scopes: RwLock<HashMap<Scope, Arc<ScopeSlots>>>,
}

impl InMemoryPriceFactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self, scope: &Scope) -> Result<Option<Arc<ScopeSlots>>, FactStoreError> {
        let scopes = self.scopes.read().map_err(|_| poisoned("scope map"))?;
        Ok(scopes.get(scope).cloned())
    }

    fn slots_or_insert(&self, scope: &Scope) -> Result<Arc<ScopeSlots>, FactStoreError> {
        if let Some(slots) = self.slots(scope)? {
            return Ok(slots);
        }
        let mut scopes = self.scopes.write().map_err(|_| poisoned("scope map"))?;
        Ok(scopes.entry(scope.clone()).or_default().clone())
    }

    /// Number of facts physically held (expired ones included).
    pub fn fact_count(&self) -> Result<usize, FactStoreError> {
        let scopes = self.scopes.read().map_err(|_| poisoned("scope map"))?;
        let mut count = 0;
        for slots in scopes.values() {
            for kind in PriceKind::ALL {
                let slot = slots.slot(kind).read().map_err(|_| poisoned("slot"))?;
                count += usize::from(slot.is_some());
            }
        }
        Ok(count)
    }

    /// Number of scopes with slots allocated.
    pub fn scope_count(&self) -> Result<usize, FactStoreError> {
        let scopes = self.scopes.read().map_err(|_| poisoned("scope map"))?;
        Ok(scopes.len())
    }
}

impl PriceFactStore for InMemoryPriceFactStore {
    fn put(&self, fact: PriceFact) -> Result<SlotWrite, FactStoreError> {
        let slots = self.slots_or_insert(&fact.scope)?;
        let mut slot = slots.slot(fact.kind).write().map_err(|_| poisoned("slot"))?;

        if let Some(current) = slot.as_ref().filter(|current| !fact.supersedes(current)) {
            return Ok(SlotWrite::Superseded { current: current.id });
        }
        let id = fact.id;
        *slot = Some(Arc::new(fact));
        Ok(SlotWrite::Applied(id))
    }

    fn load(&self, scope: &Scope) -> Result<ScopeFacts, FactStoreError> {
        let Some(slots) = self.slots(scope)? else {
            return Ok(ScopeFacts::default());
        };

        let mut facts = ScopeFacts::default();
        for kind in PriceKind::ALL {
            let slot = slots.slot(kind).read().map_err(|_| poisoned("slot"))?;
            *facts.slot_mut(kind) = slot.as_deref().cloned();
        }
        Ok(facts)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, FactStoreError> {
        // Phase one clears slots under the map read lock only, so reads and
        // writes to other slots keep flowing.
        let mut purged = 0;
        let mut empty = Vec::new();
        {
            let scopes = self.scopes.read().map_err(|_| poisoned("scope map"))?;
            for (scope, slots) in scopes.iter() {
                let mut remaining = 0;
                for kind in PriceKind::ALL {
                    let mut slot = slots.slot(kind).write().map_err(|_| poisoned("slot"))?;
                    match slot.as_ref().map(|fact| fact.is_live_at(now)) {
                        Some(false) => {
                            *slot = None;
                            purged += 1;
                        }
                        Some(true) => remaining += 1,
                        None => {}
                    }
                }
                if remaining == 0 {
                    empty.push(scope.clone());
                }
            }
        }

        if empty.is_empty() {
            return Ok(purged);
        }

        // Phase two drops scopes that are still empty and that no writer holds.
        let mut scopes = self.scopes.write().map_err(|_| poisoned("scope map"))?;
        for scope in empty {
            let Some(slots) = scopes.get(&scope) else {
                continue;
            };
            if Arc::strong_count(slots) == 1 && slots_are_empty(slots)? {
                scopes.remove(&scope);
            }
        }
        Ok(purged)
    }
}

fn slots_are_empty(slots: &ScopeSlots) -> Result<bool, FactStoreError> {
    for kind in PriceKind::ALL {
        if slots.slot(kind).read().map_err(|_| poisoned("slot"))?.is_some() {
            return Ok(false);
        }
    }
    Ok(true)
}
