use crate::error::{ModLoggerError, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub slack: SlackConfig,
    pub audit: AuditConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub app_token: String,
}

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub log_path: PathBuf,
    pub event_queue_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub retention_secs: u64,
    pub sweep_interval_secs: u64,
    pub metadata_ttl_secs: u64,
}

impl CacheConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn metadata_ttl(&self) -> Duration {
        Duration::from_secs(self.metadata_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retention_secs: 24 * 60 * 60,
            sweep_interval_secs: 60 * 60,
            metadata_ttl_secs: 60 * 60,
        }
    }
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let slack = SlackConfig {
        bot_token: std::env::var("SLACK_BOT_TOKEN")
            .map_err(|_| ModLoggerError::Config("SLACK_BOT_TOKEN not set".to_string()))?,
        app_token: std::env::var("SLACK_APP_TOKEN")
            .map_err(|_| ModLoggerError::Config("SLACK_APP_TOKEN not set".to_string()))?,
    };

    let audit = AuditConfig {
        log_path: std::env::var("MOD_LOG_FILE")
            .unwrap_or_else(|_| "./mod_logs.txt".to_string())
            .into(),
        event_queue_capacity: parse_var("EVENT_QUEUE_CAPACITY", "1024")?,
    };

    let cache = CacheConfig {
        retention_secs: parse_var("CACHE_RETENTION_SECS", "86400")?,
        sweep_interval_secs: parse_var("CACHE_SWEEP_INTERVAL_SECS", "3600")?,
        metadata_ttl_secs: parse_var("METADATA_TTL_SECS", "3600")?,
    };

    if cache.sweep_interval_secs == 0 {
        return Err(ModLoggerError::Config(
            "CACHE_SWEEP_INTERVAL_SECS must be greater than zero".to_string(),
        ));
    }
    if audit.event_queue_capacity == 0 {
        return Err(ModLoggerError::Config(
            "EVENT_QUEUE_CAPACITY must be greater than zero".to_string(),
        ));
    }

    Ok(Settings {
        slack,
        audit,
        cache,
    })
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ModLoggerError::Config(format!("Invalid {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_defaults() {
        let cache = CacheConfig::default();
        assert_eq!(cache.retention(), Duration::from_secs(86400));
        assert_eq!(cache.sweep_interval(), Duration::from_secs(3600));
        assert_eq!(cache.metadata_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_var_uses_default() {
        let value: u64 = parse_var("SLACK_MOD_LOGGER_TEST_UNSET_VAR", "42").unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_var_rejects_garbage_default() {
        let result: Result<u64> = parse_var("SLACK_MOD_LOGGER_TEST_UNSET_VAR", "not-a-number");
        assert!(matches!(result, Err(ModLoggerError::Config(_))));
    }
}
