//! Price scopes and the scope resolver.

use serde::{Deserialize, Serialize};

use priceforge_core::{PricingError, PricingResult, ValueObject};

/// Sales channel name (e.g. `CDS-Website`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(String);

impl Channel {
    pub fn new(name: impl AsRef<str>) -> PricingResult<Self> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(PricingError::invalid_scope("channel cannot be blank"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a price fact applies.
///
/// `channel == None` is the base scope, visible to every channel query for the
/// same store + SKU.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    channel: Option<Channel>,
    store: String,
    sku: String,
}

impl Scope {
    /// Build a scope, trimming surrounding whitespace from every part.
    pub fn new(channel: Option<&str>, store: &str, sku: &str) -> PricingResult<Self> {
        let store = store.trim();
        let sku = sku.trim();
        if store.is_empty() {
            return Err(PricingError::invalid_scope("store cannot be empty"));
        }
        if sku.is_empty() {
            return Err(PricingError::invalid_scope("SKU cannot be empty"));
        }
        Ok(Self {
            channel: channel.map(Channel::new).transpose()?,
            store: store.to_string(),
            sku: sku.to_string(),
        })
    }

    pub fn base(store: &str, sku: &str) -> PricingResult<Self> {
        Self::new(None, store, sku)
    }

    pub fn for_channel(channel: &str, store: &str, sku: &str) -> PricingResult<Self> {
        Self::new(Some(channel), store, sku)
    }

    pub fn channel(&self) -> Option<&Channel> {
        self.channel.as_ref()
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn is_base(&self) -> bool {
        self.channel.is_none()
    }

    /// The base scope for the same store + SKU.
    pub fn to_base(&self) -> Scope {
        Scope {
            channel: None,
            store: self.store.clone(),
            sku: self.sku.clone(),
        }
    }
}

impl ValueObject for Scope {}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.channel {
            Some(channel) => write!(f, "{channel}/{}/{}", self.store, self.sku),
            None => write!(f, "*/{}/{}", self.store, self.sku),
        }
    }
}

/// Ordered scopes consulted for one read: base first, then the channel
/// override (if a channel was requested).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeChain {
    base: Scope,
    channel: Option<Scope>,
}

impl ScopeChain {
    pub fn base(&self) -> &Scope {
        &self.base
    }

    pub fn channel(&self) -> Option<&Scope> {
        self.channel.as_ref()
    }

    /// Scopes in override order (later entries override earlier ones).
    pub fn scopes(&self) -> Vec<&Scope> {
        core::iter::once(&self.base).chain(self.channel.as_ref()).collect()
    }
}

/// Scope resolver: turn a read request into its ordered scope chain.
pub fn resolve(channel: Option<&str>, store: &str, sku: &str) -> PricingResult<ScopeChain> {
    let base = Scope::base(store, sku)?;
    let channel = match channel {
        Some(name) => Some(Scope::for_channel(name, store, sku)?),
        None => None,
    };
    Ok(ScopeChain { base, channel })
}
