//! Price service: the update gateway and the read path over one fact store.
//!
//! ```text
//! PriceUpdate ─ validate(now) ─▶ PriceFactStore::write          (update gateway)
//! (channel, store, sku) ─ resolve ─▶ read per scope ─▶ combine   (read path)
//! ```
//!
//! The service holds no state of its own besides its handles, so several
//! isolated instances can live side by side (tests do exactly that).

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use priceforge_core::{Clock, FactId, PricingError, PricingResult, SystemClock};
use priceforge_pricing::{
    resolve, CombinationEngine, EffectivePrice, Layer, NormalPricePolicy, PriceKind, PriceUpdate, Scope,
    ScopeFacts,
};

use crate::fact_store::{PriceFactStore, SlotWrite};

/// What an applied update did to each slot it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReceipt {
    pub scope: Scope,
    /// Kinds written, with the id of the fact now in each slot.
    pub applied: Vec<(PriceKind, FactId)>,
    /// Kinds whose slot already held a fact with a later write time.
    pub superseded: Vec<PriceKind>,
}

/// Effective price of one SKU in a batch read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuPrice {
    pub sku: String,
    pub price: EffectivePrice,
}

#[derive(Debug)]
pub struct PriceService<S, C = SystemClock> {
    store: S,
    clock: C,
    engine: CombinationEngine,
}

impl<S> PriceService<S, SystemClock>
where
    S: PriceFactStore,
{
    pub fn with_system_clock(store: S) -> Self {
        Self::new(store, SystemClock)
    }
}

impl<S, C> PriceService<S, C>
where
    S: PriceFactStore,
    C: Clock,
{
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            engine: CombinationEngine::default(),
        }
    }

    pub fn with_policy(mut self, policy: NormalPricePolicy) -> Self {
        self.engine = CombinationEngine::new(policy);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate `update` and write the prices it carries.
    pub fn apply_update(&self, update: &PriceUpdate) -> PricingResult<UpdateReceipt> {
        let now = self.clock.now();
        let validated = update.validate(now).inspect_err(|err| {
            warn!(
                store = %update.store,
                sku = %update.sku,
                channel = update.channel.as_deref().unwrap_or("*"),
                error = %err,
                "price update rejected"
            );
        })?;

        let outcomes = self.store.write(&validated.scope, validated.write, now)?;

        let mut receipt = UpdateReceipt {
            scope: validated.scope,
            applied: Vec::new(),
            superseded: Vec::new(),
        };
        for (kind, outcome) in outcomes {
            match outcome {
                SlotWrite::Applied(fact_id) => receipt.applied.push((kind, fact_id)),
                SlotWrite::Superseded { current } => {
                    debug!(
                        scope = %receipt.scope,
                        %kind,
                        current_fact = %current,
                        "slot already holds a newer fact"
                    );
                    receipt.superseded.push(kind);
                }
            }
        }

        debug!(scope = %receipt.scope, applied = ?receipt.applied, "price update applied");
        Ok(receipt)
    }

    /// Effective price right now.
    pub fn effective_price(&self, channel: Option<&str>, store: &str, sku: &str) -> PricingResult<EffectivePrice> {
        self.effective_price_at(channel, store, sku, self.clock.now())
    }

    /// Effective price as of `now`.
    pub fn effective_price_at(
        &self,
        channel: Option<&str>,
        store: &str,
        sku: &str,
        now: DateTime<Utc>,
    ) -> PricingResult<EffectivePrice> {
        let chain = resolve(channel, store, sku)?;
        let layers = chain
            .scopes()
            .into_iter()
            .map(|scope| -> PricingResult<Layer> { Ok(Layer::new(scope.clone(), self.store.read(scope, now)?)) })
            .collect::<PricingResult<Vec<_>>>()?;
        self.engine.combine(&layers, now)
    }

    /// Effective prices for several SKUs of one store, read at a single instant.
    ///
    /// SKUs without a live normal price are left out; any other error aborts the
    /// whole batch.
    pub fn effective_prices<T>(&self, channel: Option<&str>, store: &str, skus: &[T]) -> PricingResult<Vec<SkuPrice>>
    where
        T: AsRef<str>,
    {
        let now = self.clock.now();
        let mut prices = Vec::with_capacity(skus.len());
        for sku in skus {
            let sku = sku.as_ref();
            match self.effective_price_at(channel, store, sku, now) {
                Ok(price) => prices.push(SkuPrice {
                    sku: sku.trim().to_string(),
                    price,
                }),
                Err(PricingError::NotFound) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(prices)
    }

    /// Live facts held for exactly `scope`.
    pub fn facts(&self, scope: &Scope) -> PricingResult<ScopeFacts> {
        Ok(self.store.read(scope, self.clock.now())?)
    }

    /// Drop expired facts from the store. Reads are unaffected either way.
    pub fn compact(&self) -> PricingResult<usize> {
        let purged = self.store.purge_expired(self.clock.now())?;
        if purged > 0 {
            info!(purged, "expired price facts purged");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::Duration;
    use priceforge_core::ManualClock;
    use priceforge_pricing::{Money, SpecialKind};

    use crate::fact_store::{FactStoreError, InMemoryPriceFactStore};

    const CHANNEL: &str = "CDS-Website";
    const STORE: &str = "10138";
    const SKU: &str = "OE00001";

    fn money(vat: &str, non_vat: &str) -> Money {
        Money::new(vat, non_vat).unwrap()
    }

    fn setup() -> (PriceService<InMemoryPriceFactStore, Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = PriceService::new(InMemoryPriceFactStore::new(), clock.clone());
        (service, clock)
    }

    fn update(channel: Option<&str>, sku: &str) -> PriceUpdate {
        PriceUpdate {
            channel: channel.map(str::to_string),
            store: STORE.to_string(),
            sku: sku.to_string(),
            original_price: None,
            sale_price: None,
            promotion_price: None,
            special_price_end_time: None,
        }
    }

    fn base_price(service: &PriceService<InMemoryPriceFactStore, Arc<ManualClock>>, sku: &str) {
        service
            .apply_update(&PriceUpdate {
                original_price: Some(money("100", "90")),
                ..update(None, sku)
            })
            .unwrap();
    }

    #[test]
    fn write_from_a_lagging_clock_does_not_replace_newer_fact() {
        let (service, clock) = setup();
        base_price(&service, SKU);
        let current = service.facts(&Scope::base(STORE, SKU).unwrap()).unwrap().normal.map(|f| f.id);

        clock.advance(Duration::seconds(-5));
        let receipt = service
            .apply_update(&PriceUpdate {
                original_price: Some(money("1", "1")),
                ..update(None, SKU)
            })
            .unwrap();

        assert!(receipt.applied.is_empty());
        assert_eq!(receipt.superseded, vec![PriceKind::Normal]);
        let facts = service.facts(&receipt.scope).unwrap();
        assert_eq!(facts.normal.as_ref().map(|f| f.id), current);
        assert_eq!(facts.normal.map(|f| f.price.vat().to_string()), Some("100".to_string()));
    }

    #[test]
    fn sale_lifecycle_scenario() {
        let (service, clock) = setup();
        base_price(&service, SKU);

        let price = service.effective_price(Some(CHANNEL), STORE, SKU).unwrap();
        assert_eq!(price.normal_price, money("100", "90"));
        assert_eq!(price.special_price, None);

        service
            .apply_update(&PriceUpdate {
                sale_price: Some(money("80", "72")),
                special_price_end_time: Some(clock.now() + Duration::seconds(20)),
                ..update(Some(CHANNEL), SKU)
            })
            .unwrap();

        let price = service.effective_price(Some(CHANNEL), STORE, SKU).unwrap();
        assert_eq!(price.normal_price, money("100", "90"));
        let special = price.special_price.unwrap();
        assert_eq!(special.kind, SpecialKind::Sale);
        assert_eq!(special.price, money("80", "72"));

        clock.advance(Duration::seconds(21));
        let price = service.effective_price(Some(CHANNEL), STORE, SKU).unwrap();
        assert_eq!(price.special_price, None);
    }

    #[test]
    fn promotion_only_update_keeps_live_sale() {
        let (service, clock) = setup();
        base_price(&service, SKU);
        let end = clock.now() + Duration::seconds(60);

        service
            .apply_update(&PriceUpdate {
                sale_price: Some(money("80", "72")),
                special_price_end_time: Some(end),
                ..update(Some(CHANNEL), SKU)
            })
            .unwrap();

        let promotion = PriceUpdate {
            promotion_price: Some(money("85", "76")),
            special_price_end_time: Some(end),
            ..update(Some(CHANNEL), SKU)
        };
        let receipt = service.apply_update(&promotion).unwrap();
        let stored = service.facts(&receipt.scope).unwrap().promotion.map(|f| f.id);
        assert_eq!(receipt.applied.len(), 1);
        assert_eq!(receipt.applied.first().map(|(kind, _)| *kind), Some(PriceKind::Promotion));
        assert_eq!(receipt.applied.first().map(|(_, id)| *id), stored);
        let once = service.effective_price(Some(CHANNEL), STORE, SKU).unwrap();

        service.apply_update(&promotion).unwrap();
        let twice = service.effective_price(Some(CHANNEL), STORE, SKU).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.special_price.map(|s| s.kind), Some(SpecialKind::Promotion));

        let scope = Scope::for_channel(CHANNEL, STORE, SKU).unwrap();
        let facts = service.facts(&scope).unwrap();
        assert_eq!(facts.sale.map(|f| f.price), Some(money("80", "72")));
    }

    #[test]
    fn updates_to_one_sku_do_not_touch_another() {
        let (service, clock) = setup();
        base_price(&service, "OE00001");
        base_price(&service, "OE00002");

        service
            .apply_update(&PriceUpdate {
                original_price: Some(money("1", "1")),
                promotion_price: Some(money("50", "45")),
                special_price_end_time: Some(clock.now() + Duration::seconds(20)),
                ..update(Some(CHANNEL), "OE00001")
            })
            .unwrap();

        let other = service.effective_price(Some(CHANNEL), STORE, "OE00002").unwrap();
        assert_eq!(other.normal_price, money("100", "90"));
        assert_eq!(other.special_price, None);
    }

    #[test]
    fn missing_price_is_not_found() {
        let (service, _clock) = setup();
        let err = service.effective_price(Some(CHANNEL), STORE, SKU).unwrap_err();
        assert_eq!(err, PricingError::NotFound);
    }

    #[test]
    fn rejected_update_writes_nothing() {
        let (service, clock) = setup();
        let err = service
            .apply_update(&PriceUpdate {
                original_price: Some(money("100", "90")),
                sale_price: Some(money("80", "72")),
                special_price_end_time: Some(clock.now()),
                ..update(None, SKU)
            })
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidExpiry(_)));
        assert_eq!(service.store().fact_count().unwrap(), 0);

        let err = service.apply_update(&update(None, SKU)).unwrap_err();
        assert_eq!(err, PricingError::EmptyUpdate);
    }

    #[test]
    fn channel_override_policy_is_wired_through() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = PriceService::new(InMemoryPriceFactStore::new(), clock)
            .with_policy(NormalPricePolicy::ChannelOverride);
        base_price(&service, SKU);
        service
            .apply_update(&PriceUpdate {
                original_price: Some(money("95", "85")),
                ..update(Some(CHANNEL), SKU)
            })
            .unwrap();

        let price = service.effective_price(Some(CHANNEL), STORE, SKU).unwrap();
        assert_eq!(price.normal_price, money("95", "85"));
        let base_only = service.effective_price(None, STORE, SKU).unwrap();
        assert_eq!(base_only.normal_price, money("100", "90"));
    }

    #[test]
    fn batch_read_skips_unpriced_skus() {
        let (service, _clock) = setup();
        base_price(&service, "OE00001");
        base_price(&service, "OE00003");

        let prices = service
            .effective_prices(Some(CHANNEL), STORE, &["OE00001", "OE00002", " OE00003 "])
            .unwrap();
        let skus: Vec<_> = prices.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["OE00001", "OE00003"]);
    }

    #[test]
    fn batch_read_propagates_input_errors() {
        let (service, _clock) = setup();
        let err = service.effective_prices(Some(CHANNEL), STORE, &[""]).unwrap_err();
        assert!(matches!(err, PricingError::InvalidScope(_)));
    }

    #[test]
    fn compact_purges_expired_facts_without_changing_reads() {
        let (service, clock) = setup();
        base_price(&service, SKU);
        service
            .apply_update(&PriceUpdate {
                sale_price: Some(money("80", "72")),
                special_price_end_time: Some(clock.now() + Duration::seconds(20)),
                ..update(Some(CHANNEL), SKU)
            })
            .unwrap();

        clock.advance(Duration::seconds(30));
        let before = service.effective_price(Some(CHANNEL), STORE, SKU).unwrap();
        assert_eq!(service.compact().unwrap(), 1);
        let after = service.effective_price(Some(CHANNEL), STORE, SKU).unwrap();
        assert_eq!(before, after);
    }

    struct BrokenStore;

    impl PriceFactStore for BrokenStore {
        fn put(&self, _fact: priceforge_pricing::PriceFact) -> Result<SlotWrite, FactStoreError> {
            Err(FactStoreError::Backend("disk on fire".to_string()))
        }

        fn load(&self, _scope: &Scope) -> Result<ScopeFacts, FactStoreError> {
            Err(FactStoreError::Backend("disk on fire".to_string()))
        }

        fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, FactStoreError> {
            Ok(0)
        }
    }

    #[test]
    fn storage_faults_surface_as_storage_errors() {
        let service = PriceService::with_system_clock(BrokenStore);
        let err = service.effective_price(Some(CHANNEL), STORE, SKU).unwrap_err();
        assert_eq!(err, PricingError::Storage("backend failure: disk on fire".to_string()));

        let err = service
            .apply_update(&PriceUpdate {
                original_price: Some(money("100", "90")),
                ..update(None, SKU)
            })
            .unwrap_err();
        assert!(matches!(err, PricingError::Storage(_)));
    }
}
