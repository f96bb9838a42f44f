//! Configuration loading and representation.
//!
//! Everything comes from environment variables with safe defaults. A value that
//! does not parse is reported with `warn!` and replaced by its default, so a
//! typo never keeps the service from starting.

use core::str::FromStr;
use std::time::Duration;

use tracing::warn;

use priceforge_observability::LogFormat;
use priceforge_pricing::NormalPricePolicy;

pub const BIND_ADDR_VAR: &str = "PRICEFORGE_BIND_ADDR";
pub const LOG_FORMAT_VAR: &str = "PRICEFORGE_LOG_FORMAT";
pub const COMPACTION_INTERVAL_VAR: &str = "PRICEFORGE_COMPACTION_INTERVAL_SECS";
pub const NORMAL_PRICE_POLICY_VAR: &str = "PRICEFORGE_NORMAL_PRICE_POLICY";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_COMPACTION_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub bind_addr: String,
    pub log_format: LogFormat,
    /// `None` disables background compaction.
    pub compaction_interval: Option<Duration>,
    pub normal_price_policy: NormalPricePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_format: LogFormat::default(),
            compaction_interval: Some(Duration::from_secs(DEFAULT_COMPACTION_SECS)),
            normal_price_policy: NormalPricePolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = lookup(BIND_ADDR_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.bind_addr);

        let log_format = parse_or(&lookup, LOG_FORMAT_VAR, defaults.log_format);

        let compaction_interval = match parse_or(&lookup, COMPACTION_INTERVAL_VAR, DEFAULT_COMPACTION_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let normal_price_policy = parse_or(&lookup, NORMAL_PRICE_POLICY_VAR, defaults.normal_price_policy);

        Self {
            bind_addr,
            log_format,
            compaction_interval,
            normal_price_policy,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + core::fmt::Debug,
    T::Err: core::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(err) => {
            warn!(key, value = %raw, error = %err, ?default, "invalid config value; using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> EngineConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]), EngineConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (LOG_FORMAT_VAR, "pretty"),
            (COMPACTION_INTERVAL_VAR, "5"),
            (NORMAL_PRICE_POLICY_VAR, "channel-override"),
        ]);
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert_eq!(cfg.compaction_interval, Some(Duration::from_secs(5)));
        assert_eq!(cfg.normal_price_policy, NormalPricePolicy::ChannelOverride);
    }

    #[test]
    fn zero_interval_disables_compaction() {
        assert_eq!(config(&[(COMPACTION_INTERVAL_VAR, "0")]).compaction_interval, None);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let cfg = config(&[
            (BIND_ADDR_VAR, "  "),
            (LOG_FORMAT_VAR, "xml"),
            (COMPACTION_INTERVAL_VAR, "soon"),
            (NORMAL_PRICE_POLICY_VAR, "cheapest"),
        ]);
        assert_eq!(cfg, EngineConfig::default());
    }
}
