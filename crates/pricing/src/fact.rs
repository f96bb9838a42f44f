//! Price facts: the raw, individually-expiring records the store owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use priceforge_core::FactId;

use crate::money::Money;
use crate::scope::Scope;

/// Which slot of a scope a fact occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceKind {
    /// The standard ("original") price.
    Normal,
    Sale,
    Promotion,
}

impl PriceKind {
    pub const ALL: [PriceKind; 3] = [PriceKind::Normal, PriceKind::Sale, PriceKind::Promotion];

    pub fn as_str(self) -> &'static str {
        match self {
            PriceKind::Normal => "normal",
            PriceKind::Sale => "sale",
            PriceKind::Promotion => "promotion",
        }
    }

    pub fn is_special(self) -> bool {
        !matches!(self, PriceKind::Normal)
    }
}

impl core::fmt::Display for PriceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingested price for one (scope, kind) slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFact {
    pub id: FactId,
    pub scope: Scope,
    pub kind: PriceKind,
    pub price: Money,
    /// Only special prices expire; normal-price facts carry `None`.
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PriceFact {
    pub fn new(
        scope: Scope,
        kind: PriceKind,
        price: Money,
        expires_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: FactId::new(),
            scope,
            kind,
            price,
            expires_at: if kind.is_special() { expires_at } else { None },
            created_at,
        }
    }

    /// A fact is live until its expiry instant; `expires_at <= now` is absent.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    /// Last-write-wins by logical write time; equal timestamps go to the newcomer.
    pub fn supersedes(&self, current: &PriceFact) -> bool {
        self.created_at >= current.created_at
    }
}

/// The facts held for a single scope, one optional fact per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFacts {
    pub normal: Option<PriceFact>,
    pub sale: Option<PriceFact>,
    pub promotion: Option<PriceFact>,
}

impl ScopeFacts {
    pub fn get(&self, kind: PriceKind) -> Option<&PriceFact> {
        self.slot(kind).as_ref()
    }

    pub fn slot(&self, kind: PriceKind) -> &Option<PriceFact> {
        match kind {
            PriceKind::Normal => &self.normal,
            PriceKind::Sale => &self.sale,
            PriceKind::Promotion => &self.promotion,
        }
    }

    pub fn slot_mut(&mut self, kind: PriceKind) -> &mut Option<PriceFact> {
        match kind {
            PriceKind::Normal => &mut self.normal,
            PriceKind::Sale => &mut self.sale,
            PriceKind::Promotion => &mut self.promotion,
        }
    }

    /// Put a fact into its slot unless the slot already holds a newer one.
    ///
    /// Returns `true` when the fact was stored.
    pub fn insert(&mut self, fact: PriceFact) -> bool {
        let slot = self.slot_mut(fact.kind);
        if slot.as_ref().is_some_and(|current| !fact.supersedes(current)) {
            return false;
        }
        *slot = Some(fact);
        true
    }

    /// Copy of these facts with everything expired at `now` dropped.
    pub fn live_at(&self, now: DateTime<Utc>) -> ScopeFacts {
        let keep = |fact: &Option<PriceFact>| fact.as_ref().filter(|f| f.is_live_at(now)).cloned();
        ScopeFacts {
            normal: keep(&self.normal),
            sale: keep(&self.sale),
            promotion: keep(&self.promotion),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceFact> {
        [&self.normal, &self.sale, &self.promotion]
            .into_iter()
            .filter_map(Option::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn scope() -> Scope {
        Scope::for_channel("CDS-Website", "10138", "OE00001").unwrap()
    }

    fn money(vat: &str, non_vat: &str) -> Money {
        Money::new(vat, non_vat).unwrap()
    }

    #[test]
    fn normal_facts_never_expire() {
        let now = Utc::now();
        let fact = PriceFact::new(scope(), PriceKind::Normal, money("100", "90"), Some(now), now);
        assert_eq!(fact.expires_at, None);
        assert!(fact.is_live_at(now + Duration::days(365)));
    }

    #[test]
    fn special_fact_is_absent_at_its_expiry_instant() {
        let now = Utc::now();
        let expires = now + Duration::seconds(20);
        let fact = PriceFact::new(scope(), PriceKind::Sale, money("80", "72"), Some(expires), now);
        assert!(fact.is_live_at(now));
        assert!(fact.is_live_at(expires - Duration::milliseconds(1)));
        assert!(!fact.is_live_at(expires));
    }

    #[test]
    fn insert_keeps_newer_fact_on_stale_write() {
        let now = Utc::now();
        let newer = PriceFact::new(scope(), PriceKind::Normal, money("100", "90"), None, now);
        let older = PriceFact::new(
            scope(),
            PriceKind::Normal,
            money("1", "1"),
            None,
            now - Duration::seconds(1),
        );

        let mut facts = ScopeFacts::default();
        assert!(facts.insert(newer.clone()));
        assert!(!facts.insert(older));
        assert_eq!(facts.normal, Some(newer));
    }

    #[test]
    fn insert_touches_only_its_own_slot() {
        let now = Utc::now();
        let expires = Some(now + Duration::seconds(20));
        let mut facts = ScopeFacts::default();
        facts.insert(PriceFact::new(scope(), PriceKind::Sale, money("80", "72"), expires, now));
        facts.insert(PriceFact::new(scope(), PriceKind::Promotion, money("70", "63"), expires, now));

        assert!(facts.normal.is_none());
        assert_eq!(facts.get(PriceKind::Sale).map(|f| f.price.vat()), Some("80"));
        assert_eq!(facts.get(PriceKind::Promotion).map(|f| f.price.vat()), Some("70"));
        assert_eq!(facts.iter().count(), 2);
    }

    #[test]
    fn live_at_drops_expired_facts() {
        let now = Utc::now();
        let mut facts = ScopeFacts::default();
        facts.insert(PriceFact::new(scope(), PriceKind::Normal, money("100", "90"), None, now));
        facts.insert(PriceFact::new(
            scope(),
            PriceKind::Sale,
            money("80", "72"),
            Some(now + Duration::seconds(20)),
            now,
        ));

        let later = facts.live_at(now + Duration::seconds(21));
        assert!(later.normal.is_some());
        assert!(later.sale.is_none());
        assert!(!later.is_empty());
        assert!(ScopeFacts::default().is_empty());
    }
}
