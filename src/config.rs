use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(anyhow::anyhow!("Unknown RATING_STORE: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub app_base_url: String,
    pub rate_limit_max_submissions: u64,
    pub rate_limit_window_secs: u64,
    pub session_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|s| !s.is_empty());

        let store: StoreBackend = get("RATING_STORE")
            .unwrap_or_else(|| "postgres".into())
            .parse()?;
        let database_url = match store {
            StoreBackend::Postgres => Some(required(get("DATABASE_URL"), "DATABASE_URL")?),
            StoreBackend::Memory => get("DATABASE_URL"),
        };

        Ok(Self {
            store,
            database_url,
            database_max_connections: get("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".into())
                .parse()?,
            redis_url: get("REDIS_URL"),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: get("PORT").unwrap_or_else(|| "8080".into()).parse()?,
            app_base_url: get("APP_BASE_URL").unwrap_or_else(|| "http://localhost".into()),
            rate_limit_max_submissions: get("RATE_LIMIT_MAX_SUBMISSIONS")
                .unwrap_or_else(|| "20".into())
                .parse()?,
            rate_limit_window_secs: get("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|| "3600".into())
                .parse()?,
            session_idle_secs: get("SESSION_IDLE_SECS")
                .unwrap_or_else(|| "1800".into())
                .parse()?,
        })
    }

    /// In-memory defaults for tests and local runs.
    pub fn memory() -> Self {
        Self {
            store: StoreBackend::Memory,
            database_url: None,
            database_max_connections: 10,
            redis_url: None,
            host: "127.0.0.1".into(),
            port: 8080,
            app_base_url: "http://localhost".into(),
            rate_limit_max_submissions: 20,
            rate_limit_window_secs: 3600,
            session_idle_secs: 1800,
        }
    }
}

fn required(value: Option<String>, key: &str) -> anyhow::Result<String> {
    value.ok_or_else(|| anyhow::anyhow!("Missing required env var: {}", key))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/lunch")])).unwrap();
        assert_eq!(config.store, StoreBackend::Postgres);
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.rate_limit_max_submissions, 20);
        assert_eq!(config.session_idle_secs, 1800);
    }

    #[test]
    fn memory_store_needs_no_database() {
        let config = Config::from_lookup(lookup(&[
            ("RATING_STORE", "memory"),
            ("PORT", "9000"),
            ("REDIS_URL", ""),
        ]))
        .unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.database_url, None);
        assert_eq!(config.port, 9000);
        assert_eq!(config.redis_url, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("RATING_STORE", "sqlite")])).is_err());
        assert!(Config::from_lookup(lookup(&[("RATING_STORE", "memory"), ("PORT", "http")])).is_err());
    }
}
