//! Combination engine: merge the live facts of a scope chain into one
//! effective price.
//!
//! Rules, applied on every read against the caller's `now`:
//! - the normal price comes from the base scope (see [`NormalPricePolicy`])
//! - the special price comes from the channel scope only; promotion beats sale
//! - a fact with `expires_at <= now` does not exist for this read
//! - no live normal price anywhere in the chain is `NotFound`

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use priceforge_core::{PricingError, PricingResult};

use crate::fact::{PriceFact, PriceKind, ScopeFacts};
use crate::money::Money;
use crate::scope::Scope;

/// Which normal price wins when both the base and the channel scope hold one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalPricePolicy {
    /// The base normal price is always shown; channel normal prices are stored
    /// but only used when the base scope has none.
    #[default]
    BaseOnly,
    /// A live channel normal price replaces the base one.
    ChannelOverride,
}

impl FromStr for NormalPricePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" | "base-only" => Ok(Self::BaseOnly),
            "channel-override" => Ok(Self::ChannelOverride),
            other => Err(format!(
                "unknown normal price policy '{other}' (expected: base, channel-override)"
            )),
        }
    }
}

/// The two competing special-price kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialKind {
    Sale,
    Promotion,
}

impl From<SpecialKind> for PriceKind {
    fn from(kind: SpecialKind) -> Self {
        match kind {
            SpecialKind::Sale => PriceKind::Sale,
            SpecialKind::Promotion => PriceKind::Promotion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialPrice {
    pub kind: SpecialKind,
    pub price: Money,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SpecialPrice {
    fn from_fact(kind: SpecialKind, fact: &PriceFact) -> Self {
        Self {
            kind,
            price: fact.price.clone(),
            expires_at: fact.expires_at,
        }
    }
}

/// Read-time projection; computed per read and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePrice {
    pub normal_price: Money,
    pub special_price: Option<SpecialPrice>,
}

/// Facts read for one scope of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub scope: Scope,
    pub facts: ScopeFacts,
}

impl Layer {
    pub fn new(scope: Scope, facts: ScopeFacts) -> Self {
        Self { scope, facts }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombinationEngine {
    policy: NormalPricePolicy,
}

impl CombinationEngine {
    pub fn new(policy: NormalPricePolicy) -> Self {
        Self { policy }
    }

    /// Merge `layers` (base first, channel override last) into the price
    /// visible at `now`. Never mutates the facts it is given.
    pub fn combine(&self, layers: &[Layer], now: DateTime<Utc>) -> PricingResult<EffectivePrice> {
        let base = layers
            .iter()
            .find(|layer| layer.scope.is_base())
            .map(|layer| layer.facts.live_at(now))
            .unwrap_or_default();
        let channel = layers
            .iter()
            .rev()
            .find(|layer| !layer.scope.is_base())
            .map(|layer| layer.facts.live_at(now))
            .unwrap_or_default();

        let normal = match self.policy {
            NormalPricePolicy::BaseOnly => base.normal.as_ref().or(channel.normal.as_ref()),
            NormalPricePolicy::ChannelOverride => channel.normal.as_ref().or(base.normal.as_ref()),
        }
        .ok_or(PricingError::NotFound)?;

        let special_price = channel
            .promotion
            .as_ref()
            .map(|fact| SpecialPrice::from_fact(SpecialKind::Promotion, fact))
            .or_else(|| {
                channel
                    .sale
                    .as_ref()
                    .map(|fact| SpecialPrice::from_fact(SpecialKind::Sale, fact))
            });

        Ok(EffectivePrice {
            normal_price: normal.price.clone(),
            special_price,
        })
    }
}
