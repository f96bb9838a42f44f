//! Incoming price updates and the gateway rules that validate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use priceforge_core::{PricingError, PricingResult};

use crate::fact::{PriceFact, PriceKind};
use crate::money::Money;
use crate::scope::Scope;

/// Command: apply a (partial) price update to one scope.
///
/// Every price field is optional; fields left out keep whatever the store
/// already holds for that kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub channel: Option<String>,
    pub store: String,
    pub sku: String,
    pub original_price: Option<Money>,
    pub sale_price: Option<Money>,
    pub promotion_price: Option<Money>,
    pub special_price_end_time: Option<DateTime<Utc>>,
}

impl PriceUpdate {
    /// Check the update against the gateway rules as of `now`.
    ///
    /// - the scope must name a store and a SKU
    /// - at least one price must be present
    /// - a sale or promotion price needs an end time strictly after `now`
    ///
    /// An end time sent with only an original price is dropped: normal prices
    /// do not expire.
    pub fn validate(&self, now: DateTime<Utc>) -> PricingResult<ValidatedUpdate> {
        let scope = Scope::new(self.channel.as_deref(), &self.store, &self.sku)?;

        if self.original_price.is_none() && self.sale_price.is_none() && self.promotion_price.is_none() {
            return Err(PricingError::EmptyUpdate);
        }

        let has_special = self.sale_price.is_some() || self.promotion_price.is_some();
        let expires_at = if has_special {
            let end = self.special_price_end_time.ok_or_else(|| {
                PricingError::invalid_expiry("specialPriceEndTime is required with a sale or promotion price")
            })?;
            if end <= now {
                return Err(PricingError::invalid_expiry(format!(
                    "specialPriceEndTime {} is not after {}",
                    end.to_rfc3339(),
                    now.to_rfc3339()
                )));
            }
            Some(end)
        } else {
            None
        };

        Ok(ValidatedUpdate {
            scope,
            write: PriceWrite {
                normal: self.original_price.clone(),
                sale: self.sale_price.clone(),
                promotion: self.promotion_price.clone(),
                expires_at,
            },
        })
    }
}

/// The per-kind payload of a store write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceWrite {
    pub normal: Option<Money>,
    pub sale: Option<Money>,
    pub promotion: Option<Money>,
    /// Applies to the special prices of this write only.
    pub expires_at: Option<DateTime<Utc>>,
}

impl PriceWrite {
    pub fn is_empty(&self) -> bool {
        self.normal.is_none() && self.sale.is_none() && self.promotion.is_none()
    }

    /// Kinds this write touches, in slot order.
    pub fn kinds(&self) -> Vec<PriceKind> {
        PriceKind::ALL
            .into_iter()
            .filter(|kind| self.price(*kind).is_some())
            .collect()
    }

    pub fn price(&self, kind: PriceKind) -> Option<&Money> {
        match kind {
            PriceKind::Normal => self.normal.as_ref(),
            PriceKind::Sale => self.sale.as_ref(),
            PriceKind::Promotion => self.promotion.as_ref(),
        }
    }

    /// One fact per supplied price, all stamped `created_at`.
    pub fn into_facts(self, scope: &Scope, created_at: DateTime<Utc>) -> Vec<PriceFact> {
        let expires_at = self.expires_at;
        [
            (PriceKind::Normal, self.normal),
            (PriceKind::Sale, self.sale),
            (PriceKind::Promotion, self.promotion),
        ]
        .into_iter()
        .filter_map(|(kind, price)| {
            price.map(|price| PriceFact::new(scope.clone(), kind, price, expires_at, created_at))
        })
        .collect()
    }
}

/// An update that passed validation, ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpdate {
    pub scope: Scope,
    pub write: PriceWrite,
}
