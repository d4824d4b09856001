//! Process configuration from `FLEET_GEO_*` environment variables.
//!
//! Every variable is optional; anything unset keeps the component default.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `FLEET_GEO_BIND` | listen address (`127.0.0.1:3000`) |
//! | `FLEET_GEO_SEED` | JSON seed file for the in-memory store |
//! | `FLEET_GEO_PDOK_URL` | PDOK locatieserver base URL |
//! | `FLEET_GEO_NOMINATIM_URL` | Nominatim base URL |
//! | `FLEET_GEO_NOMINATIM_INTERVAL_MS` | spacing between Nominatim requests |
//! | `FLEET_GEO_HTTP_TIMEOUT_MS` | per-request provider timeout |
//! | `FLEET_GEO_USER_AGENT` | User-Agent sent to both providers |
//! | `FLEET_GEO_CACHE_TTL_SECS` | geocode cache entry lifetime |
//! | `FLEET_GEO_CACHE_CAPACITY` | geocode cache size bound |
//! | `FLEET_GEO_CACHE_CLEANUP_SECS` | expired-entry sweep interval |
//! | `FLEET_GEO_MATCH_THRESHOLD` | minimum confidence to accept a match |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::geocode::{NominatimConfig, PdokConfig};
use crate::matcher::MatchConfig;

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but its value is unusable
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    /// Seed data for the store; an empty store when unset.
    pub seed_path: Option<PathBuf>,
    pub pdok: PdokConfig,
    pub nominatim: NominatimConfig,
    pub cache: CacheConfig,
    pub matcher: MatchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            seed_path: None,
            pdok: PdokConfig::default(),
            nominatim: NominatimConfig::default(),
            cache: CacheConfig::default(),
            matcher: MatchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let mut config = Self::default();

        if let Some(bind) = env.parse::<SocketAddr>("FLEET_GEO_BIND")? {
            config.bind = bind;
        }
        config.seed_path = env.get("FLEET_GEO_SEED").map(PathBuf::from);

        if let Some(url) = env.get("FLEET_GEO_PDOK_URL") {
            config.pdok = config.pdok.with_base_url(url);
        }
        if let Some(url) = env.get("FLEET_GEO_NOMINATIM_URL") {
            config.nominatim = config.nominatim.with_base_url(url);
        }
        if let Some(ms) = env.parse::<u64>("FLEET_GEO_NOMINATIM_INTERVAL_MS")? {
            config.nominatim = config.nominatim.with_min_interval(Duration::from_millis(ms));
        }
        if let Some(ms) = env.positive("FLEET_GEO_HTTP_TIMEOUT_MS")? {
            let timeout = Duration::from_millis(ms);
            config.pdok = config.pdok.with_timeout(timeout);
            config.nominatim = config.nominatim.with_timeout(timeout);
        }
        if let Some(agent) = env.get("FLEET_GEO_USER_AGENT") {
            config.pdok = config.pdok.with_user_agent(agent.clone());
            config.nominatim = config.nominatim.with_user_agent(agent);
        }

        if let Some(secs) = env.positive("FLEET_GEO_CACHE_TTL_SECS")? {
            config.cache = config.cache.with_ttl(Duration::from_secs(secs));
        }
        if let Some(capacity) = env.parse::<usize>("FLEET_GEO_CACHE_CAPACITY")? {
            config.cache = config.cache.with_max_capacity(capacity);
        }
        if let Some(secs) = env.positive("FLEET_GEO_CACHE_CLEANUP_SECS")? {
            config.cache = config.cache.with_cleanup_interval(Duration::from_secs(secs));
        }

        if let Some(threshold) = env.parse::<f64>("FLEET_GEO_MATCH_THRESHOLD")? {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::Invalid {
                    var: "FLEET_GEO_MATCH_THRESHOLD",
                    value: threshold.to_string(),
                    reason: "must be between 0 and 1".to_string(),
                });
            }
            config.matcher.accept_threshold = threshold;
        }

        Ok(config)
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Non-blank value of `var`, trimmed.
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, var: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.get(var) else {
            return Ok(None);
        };

        value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
    }

    /// Like `parse`, but zero is rejected.
    fn positive(&self, var: &'static str) -> Result<Option<u64>, ConfigError> {
        match self.parse::<u64>(var)? {
            Some(0) => Err(ConfigError::Invalid {
                var,
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            }),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:3000");
        assert!(config.seed_path.is_none());
        assert_eq!(config.cache.ttl, Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.cache.max_capacity, 1000);
        assert_eq!(config.nominatim.min_interval, Duration::from_millis(1000));
        assert_eq!(config.matcher, MatchConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("FLEET_GEO_BIND", "0.0.0.0:8080"),
            ("FLEET_GEO_SEED", "data/seed.json"),
            ("FLEET_GEO_PDOK_URL", "http://pdok.test"),
            ("FLEET_GEO_NOMINATIM_URL", "http://osm.test"),
            ("FLEET_GEO_NOMINATIM_INTERVAL_MS", "250"),
            ("FLEET_GEO_HTTP_TIMEOUT_MS", "1500"),
            ("FLEET_GEO_USER_AGENT", "acme-fleet/2"),
            ("FLEET_GEO_CACHE_TTL_SECS", "60"),
            ("FLEET_GEO_CACHE_CAPACITY", "10"),
            ("FLEET_GEO_CACHE_CLEANUP_SECS", "5"),
            ("FLEET_GEO_MATCH_THRESHOLD", "0.5"),
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.seed_path, Some(PathBuf::from("data/seed.json")));
        assert_eq!(config.pdok.base_url, "http://pdok.test");
        assert_eq!(config.nominatim.base_url, "http://osm.test");
        assert_eq!(config.nominatim.min_interval, Duration::from_millis(250));
        assert_eq!(config.pdok.timeout, Duration::from_millis(1500));
        assert_eq!(config.nominatim.timeout, Duration::from_millis(1500));
        assert_eq!(config.pdok.user_agent, "acme-fleet/2");
        assert_eq!(config.nominatim.user_agent, "acme-fleet/2");
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.max_capacity, 10);
        assert_eq!(config.cache.cleanup_interval, Duration::from_secs(5));
        assert_eq!(config.matcher.accept_threshold, 0.5);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = load(&[("FLEET_GEO_SEED", "  "), ("FLEET_GEO_CACHE_CAPACITY", "")]).unwrap();
        assert!(config.seed_path.is_none());
        assert_eq!(config.cache.max_capacity, 1000);
    }

    #[test]
    fn unparseable_value_names_the_variable() {
        let err = load(&[("FLEET_GEO_CACHE_CAPACITY", "lots")]).unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::Invalid { var: "FLEET_GEO_CACHE_CAPACITY", value, .. } if value == "lots"
        ));
        assert!(err.to_string().starts_with("invalid FLEET_GEO_CACHE_CAPACITY=\"lots\""));

        assert!(load(&[("FLEET_GEO_BIND", "localhost")]).is_err());
    }

    #[test]
    fn zero_durations_are_rejected() {
        assert!(load(&[("FLEET_GEO_CACHE_TTL_SECS", "0")]).is_err());
        assert!(load(&[("FLEET_GEO_CACHE_CLEANUP_SECS", "0")]).is_err());
        assert!(load(&[("FLEET_GEO_HTTP_TIMEOUT_MS", "0")]).is_err());
        // Zero capacity is a valid (disabled) cache
        assert_eq!(load(&[("FLEET_GEO_CACHE_CAPACITY", "0")]).unwrap().cache.max_capacity, 0);
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        assert!(load(&[("FLEET_GEO_MATCH_THRESHOLD", "1.5")]).is_err());
        assert!(load(&[("FLEET_GEO_MATCH_THRESHOLD", "-0.1")]).is_err());
    }
}
