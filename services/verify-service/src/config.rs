use anyhow::{Context, Result};
use idf_verification::DisclosurePolicy;
use std::net::SocketAddr;

pub const ADDR_VAR: &str = "IDENTIFI_VERIFY_ADDR";
pub const SCOPE_VAR: &str = "IDENTIFI_VERIFY_SCOPE";
pub const MIN_AGE_VAR: &str = "IDENTIFI_MIN_AGE";
pub const EXCLUDED_VAR: &str = "IDENTIFI_EXCLUDED_COUNTRIES";

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub policy: DisclosurePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or blank variables fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get(ADDR_VAR)
            .as_deref()
            .unwrap_or(DEFAULT_ADDR)
            .trim()
            .parse()
            .with_context(|| format!("{ADDR_VAR} is not a socket address"))?;

        let mut policy = DisclosurePolicy::default();
        if let Some(scope) = get(SCOPE_VAR) {
            policy.scope = scope.trim().to_owned();
        }
        if let Some(age) = get(MIN_AGE_VAR) {
            policy.minimum_age = age
                .trim()
                .parse()
                .with_context(|| format!("{MIN_AGE_VAR} must be an age in years"))?;
        }
        if let Some(countries) = get(EXCLUDED_VAR) {
            policy.excluded_countries = DisclosurePolicy::parse_countries(&countries);
        }

        Ok(Self { bind_addr, policy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.policy, DisclosurePolicy::default());
    }

    #[test]
    fn overrides_from_environment() {
        let config = Config::from_lookup(lookup(&[
            (ADDR_VAR, "127.0.0.1:9100"),
            (SCOPE_VAR, "staging-app"),
            (MIN_AGE_VAR, "18"),
            (EXCLUDED_VAR, "fra, prk"),
        ]))
        .expect("config");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9100");
        assert_eq!(config.policy.scope, "staging-app");
        assert_eq!(config.policy.minimum_age, 18);
        assert_eq!(config.policy.excluded_countries, vec!["FRA", "PRK"]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[(ADDR_VAR, "nowhere")])).is_err());
        assert!(Config::from_lookup(lookup(&[(MIN_AGE_VAR, "old")])).is_err());
    }
}
