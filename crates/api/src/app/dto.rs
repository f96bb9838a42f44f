use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use priceforge_core::{PricingError, PricingResult};
use priceforge_infra::SkuPrice;
use priceforge_pricing::{EffectivePrice, Money, PriceUpdate, SpecialKind};

// -------------------------
// Request DTOs
// -------------------------

/// Money as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyBody {
    pub vat: String,
    pub non_vat: String,
}

/// Money as sent by clients: components may be JSON strings or numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyInput {
    #[serde(default)]
    pub vat: serde_json::Value,
    #[serde(default)]
    pub non_vat: serde_json::Value,
}

impl MoneyInput {
    fn into_money(self) -> PricingResult<Money> {
        Money::new(decimal_text("vat", self.vat)?, decimal_text("nonVat", self.non_vat)?)
    }
}

fn decimal_text(name: &str, value: serde_json::Value) -> PricingResult<String> {
    match value {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        serde_json::Value::Null => Err(PricingError::invalid_price(format!("{name} is required"))),
        other => Err(PricingError::invalid_price(format!("{name} must be a decimal, got {other}"))),
    }
}

impl From<&Money> for MoneyBody {
    fn from(money: &Money) -> Self {
        Self {
            vat: money.vat().to_string(),
            non_vat: money.non_vat().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePriceRequest {
    pub channel: Option<String>,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub sku: String,
    pub original_price: Option<MoneyInput>,
    pub sale_price: Option<MoneyInput>,
    pub promotion_price: Option<MoneyInput>,
    /// RFC3339; parsed in `into_update` so a bad value is `InvalidExpiry`.
    pub special_price_end_time: Option<String>,
}

impl UpdatePriceRequest {
    pub fn into_update(self) -> PricingResult<PriceUpdate> {
        Ok(PriceUpdate {
            channel: normalize_channel(self.channel),
            store: self.store,
            sku: self.sku,
            original_price: self.original_price.map(MoneyInput::into_money).transpose()?,
            sale_price: self.sale_price.map(MoneyInput::into_money).transpose()?,
            promotion_price: self.promotion_price.map(MoneyInput::into_money).transpose()?,
            special_price_end_time: self
                .special_price_end_time
                .as_deref()
                .map(parse_end_time)
                .transpose()?,
        })
    }
}

fn parse_end_time(raw: &str) -> PricingResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| PricingError::invalid_expiry(format!("specialPriceEndTime '{raw}' is not RFC3339: {e}")))
}

/// `GET /prices?store=..&sku=A,B&channel=..`
#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub sku: String,
    pub channel: Option<String>,
}

impl PricesQuery {
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// The comma-separated SKU list without blank entries. A list with no SKU
    /// at all yields one blank SKU so the scope check reports it.
    pub fn skus(&self) -> Vec<&str> {
        let skus: Vec<&str> = self.sku.split(',').filter(|sku| !sku.trim().is_empty()).collect();
        if skus.is_empty() { vec![""] } else { skus }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub channel: Option<String>,
}

/// A blank `channel` means "no channel", not an invalid one.
pub fn normalize_channel(channel: Option<String>) -> Option<String> {
    channel.filter(|c| !c.trim().is_empty())
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialPriceBody {
    #[serde(rename = "type")]
    pub kind: SpecialKind,
    pub vat: String,
    pub non_vat: String,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDetail {
    pub store: String,
    pub sku: String,
    pub channel: Option<String>,
    pub price: MoneyBody,
    pub special_price: Option<SpecialPriceBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricesResponse {
    pub details: Vec<PriceDetail>,
}

pub fn price_detail(channel: Option<&str>, store: &str, sku: &str, price: &EffectivePrice) -> PriceDetail {
    PriceDetail {
        store: store.trim().to_string(),
        sku: sku.trim().to_string(),
        channel: channel.map(|c| c.trim().to_string()),
        price: MoneyBody::from(&price.normal_price),
        special_price: price.special_price.as_ref().map(|special| SpecialPriceBody {
            kind: special.kind,
            vat: special.price.vat().to_string(),
            non_vat: special.price.non_vat().to_string(),
            end_time: special.expires_at,
        }),
    }
}

pub fn prices_response(channel: Option<&str>, store: &str, prices: &[SkuPrice]) -> PricesResponse {
    PricesResponse {
        details: prices
            .iter()
            .map(|p| price_detail(channel, store, &p.sku, &p.price))
            .collect(),
    }
}
