// src/config.rs
use std::net::{IpAddr, Ipv4Addr};

use tracing::warn;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How many ports after `PORT` are tried when it is already taken.
pub const PORT_FALLBACK_RANGE: u16 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres connection string. Without it products live in memory.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        Self {
            database_url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", &lookup, DEFAULT_MAX_CONNECTIONS),
            host: parse_or("HOST", &lookup, DEFAULT_HOST),
            port: parse_or("PORT", &lookup, DEFAULT_PORT),
        }
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, %default, "Invalid setting, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]);

        assert_eq!(config.database_url, None);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn reads_values() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/products"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
        ]);

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/products"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config(&[("HOST", "not-an-ip"), ("PORT", "99999"), ("DATABASE_URL", "  ")]);

        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, None);
    }
}
