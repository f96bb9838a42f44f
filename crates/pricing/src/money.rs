use serde::{Deserialize, Serialize};

use priceforge_core::{PricingError, PricingResult, ValueObject};

/// A price with and without VAT.
///
/// Components are kept as the caller's decimal strings and passed through the
/// engine untouched. They are checked lexically (no rounding, no range limit)
/// only to reject negative or non-numeric input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawMoney")]
pub struct Money {
    vat: String,
    non_vat: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMoney {
    vat: String,
    non_vat: String,
}

impl TryFrom<RawMoney> for Money {
    type Error = PricingError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Money::new(raw.vat, raw.non_vat)
    }
}

impl Money {
    pub fn new(vat: impl Into<String>, non_vat: impl Into<String>) -> PricingResult<Self> {
        let vat = vat.into();
        let non_vat = non_vat.into();
        check_component("vat", &vat)?;
        check_component("nonVat", &non_vat)?;
        Ok(Self { vat, non_vat })
    }

    pub fn vat(&self) -> &str {
        &self.vat
    }

    pub fn non_vat(&self) -> &str {
        &self.non_vat
    }
}

impl ValueObject for Money {}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (ex. VAT {})", self.vat, self.non_vat)
    }
}

/// Plain decimal notation: optional sign, digits, optional fraction.
fn check_component(name: &str, raw: &str) -> PricingResult<()> {
    let (negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int_part.len() + frac_part.len() == 0 || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(PricingError::invalid_price(format!("{name} '{raw}' is not a decimal")));
    }

    let non_zero = int_part.bytes().chain(frac_part.bytes()).any(|b| b != b'0');
    if negative && non_zero {
        return Err(PricingError::invalid_price(format!("{name} '{raw}' is negative")));
    }
    Ok(())
}
