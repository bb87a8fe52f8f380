//! Runtime configuration loading from environment variables.
//!
//! All configuration values are loaded from `LEXILOAD_*` environment variables
//! with sensible defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `LEXILOAD_CACHE_MAX_BYTES` | 10485760 | Bundle cache budget (bytes) |
//! | `LEXILOAD_CACHE_TTL_SECS` | 1800 | Bundle lifetime before `sweep` removes it |
//! | `LEXILOAD_FETCH_CONCURRENCY` | 3 | Max concurrent HTTP fetches |
//! | `LEXILOAD_BATCH_SIZE` | 3 | Namespaces per route-preload batch |
//! | `LEXILOAD_BATCH_DELAY_MS` | 10 | Pause between route batches |
//! | `LEXILOAD_CONFIDENCE_THRESHOLD` | 60 | Prediction confidence needed to prefetch (0-100) |
//! | `LEXILOAD_DEBOUNCE_MS` | 300 | Interaction quiet period before predicting |
//! | `LEXILOAD_IDLE_STAGGER_MS` | 100 | Gap between idle-priority loads |
//! | `LEXILOAD_BASE_URL` | /locales | Resource endpoint root |
//! | `LEXILOAD_DEFAULT_LOCALE` | zh-CN | Locale used by orchestrated loads |
//! | `LEXILOAD_LOG_LEVEL` | info | Log filter directive |
//! | `LEXILOAD_LOG_FORMAT` | json | `json` or `pretty` |
//! | `LEXILOAD_LOG_FILE` | (unset) | Append logs to this file instead of stderr |

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::cache::StoreConfig;
use crate::fetch::HttpFetcherConfig;
use crate::loader::CoordinatorConfig;
use crate::preload::PreloadConfig;
use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_CACHE_MAX_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 1800;
pub const DEFAULT_BASE_URL: &str = "/locales";
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// Every variable this module reads.
pub const ENV_KEYS: &[&str] = &[
    "LEXILOAD_CACHE_MAX_BYTES",
    "LEXILOAD_CACHE_TTL_SECS",
    "LEXILOAD_FETCH_CONCURRENCY",
    "LEXILOAD_BATCH_SIZE",
    "LEXILOAD_BATCH_DELAY_MS",
    "LEXILOAD_CONFIDENCE_THRESHOLD",
    "LEXILOAD_DEBOUNCE_MS",
    "LEXILOAD_IDLE_STAGGER_MS",
    "LEXILOAD_BASE_URL",
    "LEXILOAD_DEFAULT_LOCALE",
    "LEXILOAD_LOG_LEVEL",
    "LEXILOAD_LOG_FORMAT",
    "LEXILOAD_LOG_FILE",
];

/// Serializes tests that mutate the process environment.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Effective runtime configuration summary (serializable).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub cache_max_bytes: usize,
    pub cache_ttl_secs: u64,
    pub fetch_concurrency: usize,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub confidence_threshold: u8,
    pub debounce_ms: u64,
    pub idle_stagger_ms: u64,
    pub base_url: String,
    pub default_locale: String,
    pub log_level: String,
    pub log_format: String,
    pub log_file: Option<String>,
}

/// All runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub store: StoreConfig,
    pub coordinator: CoordinatorConfig,
    pub fetcher: HttpFetcherConfig,
    pub preload: PreloadConfig,
    pub logging: LogConfig,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Non-empty string env var, or `default`.
fn parse_string(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => default.to_string(),
    }
}

fn load_store_config() -> StoreConfig {
    const MIN_BYTES: usize = 1024; // floor: 1 KiB
    let max_bytes = parse_usize("LEXILOAD_CACHE_MAX_BYTES", DEFAULT_CACHE_MAX_BYTES);
    StoreConfig {
        max_bytes: max_bytes.max(MIN_BYTES),
    }
}

fn load_coordinator_config() -> CoordinatorConfig {
    let ttl_secs = parse_u64("LEXILOAD_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS);
    let ttl_secs = ttl_secs.clamp(1, 7 * 24 * 3600);
    CoordinatorConfig {
        ttl: chrono::Duration::seconds(ttl_secs as i64),
    }
}

fn load_fetcher_config() -> HttpFetcherConfig {
    let max_connections = parse_usize("LEXILOAD_FETCH_CONCURRENCY", 3);
    HttpFetcherConfig {
        base_url: parse_string("LEXILOAD_BASE_URL", DEFAULT_BASE_URL),
        max_connections: max_connections.clamp(1, 64),
        ..Default::default()
    }
}

fn load_preload_config() -> PreloadConfig {
    let batch_size = parse_usize("LEXILOAD_BATCH_SIZE", 3).clamp(1, 32);
    let batch_delay_ms = parse_u64("LEXILOAD_BATCH_DELAY_MS", 10).min(10_000);
    let threshold = parse_u64("LEXILOAD_CONFIDENCE_THRESHOLD", 60).min(100) as u8;
    let debounce_ms = parse_u64("LEXILOAD_DEBOUNCE_MS", 300).min(60_000);
    let idle_stagger_ms = parse_u64("LEXILOAD_IDLE_STAGGER_MS", 100).min(10_000);

    PreloadConfig {
        locale: parse_string("LEXILOAD_DEFAULT_LOCALE", DEFAULT_LOCALE),
        batch_size,
        batch_delay: Duration::from_millis(batch_delay_ms),
        confidence_threshold: threshold,
        debounce: Duration::from_millis(debounce_ms),
        idle_stagger: Duration::from_millis(idle_stagger_ms),
    }
}

fn load_log_config() -> LogConfig {
    let format = parse_string("LEXILOAD_LOG_FORMAT", "json")
        .parse::<LogFormat>()
        .unwrap_or_default();
    let output_path = match parse_string("LEXILOAD_LOG_FILE", "") {
        path if path.is_empty() => None,
        path => Some(PathBuf::from(path)),
    };
    LogConfig {
        level: parse_string("LEXILOAD_LOG_LEVEL", "info"),
        format,
        output_path,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    EnvConfig {
        store: load_store_config(),
        coordinator: load_coordinator_config(),
        fetcher: load_fetcher_config(),
        preload: load_preload_config(),
        logging: load_log_config(),
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            cache_max_bytes: self.store.max_bytes,
            cache_ttl_secs: self.coordinator.ttl.num_seconds().max(0) as u64,
            fetch_concurrency: self.fetcher.max_connections,
            batch_size: self.preload.batch_size,
            batch_delay_ms: self.preload.batch_delay.as_millis() as u64,
            confidence_threshold: self.preload.confidence_threshold,
            debounce_ms: self.preload.debounce.as_millis() as u64,
            idle_stagger_ms: self.preload.idle_stagger.as_millis() as u64,
            base_url: self.fetcher.base_url.clone(),
            default_locale: self.preload.locale.clone(),
            log_level: self.logging.level.clone(),
            log_format: self.logging.format.as_str().to_string(),
            log_file: self
                .logging
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env_vars() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn test_defaults_are_sensible() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env_vars();
        let cfg = load();
        assert_eq!(cfg.store.max_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.coordinator.ttl.num_seconds(), 1800);
        assert_eq!(cfg.fetcher.max_connections, 3);
        assert_eq!(cfg.fetcher.base_url, "/locales");
        assert_eq!(cfg.preload.batch_size, 3);
        assert_eq!(cfg.preload.batch_delay, Duration::from_millis(10));
        assert_eq!(cfg.preload.confidence_threshold, 60);
        assert_eq!(cfg.preload.debounce, Duration::from_millis(300));
        assert_eq!(cfg.preload.idle_stagger, Duration::from_millis(100));
        assert_eq!(cfg.preload.locale, "zh-CN");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert!(cfg.logging.output_path.is_none());
    }

    #[test]
    fn test_log_file_reaches_log_config() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env_vars();
        std::env::set_var("LEXILOAD_LOG_FILE", " /var/log/lexiload/warm.log ");
        let cfg = load();
        assert_eq!(
            cfg.logging.output_path,
            Some(PathBuf::from("/var/log/lexiload/warm.log"))
        );
        assert_eq!(
            cfg.effective_config().log_file.as_deref(),
            Some("/var/log/lexiload/warm.log")
        );

        std::env::set_var("LEXILOAD_LOG_FILE", "   ");
        assert!(load().logging.output_path.is_none());
        clear_env_vars();
    }

    #[test]
    fn test_env_vars_override_defaults() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env_vars();
        std::env::set_var("LEXILOAD_CACHE_MAX_BYTES", "2048");
        std::env::set_var("LEXILOAD_BATCH_SIZE", "5");
        std::env::set_var("LEXILOAD_CONFIDENCE_THRESHOLD", "75");
        std::env::set_var("LEXILOAD_BASE_URL", "https://cdn.example.com/i18n");
        std::env::set_var("LEXILOAD_DEFAULT_LOCALE", "en-US");
        std::env::set_var("LEXILOAD_LOG_FORMAT", "pretty");
        let cfg = load();
        assert_eq!(cfg.store.max_bytes, 2048);
        assert_eq!(cfg.preload.batch_size, 5);
        assert_eq!(cfg.preload.confidence_threshold, 75);
        assert_eq!(cfg.fetcher.base_url, "https://cdn.example.com/i18n");
        assert_eq!(cfg.preload.locale, "en-US");
        assert_eq!(cfg.logging.format, LogFormat::Pretty);
        clear_env_vars();
    }

    #[test]
    fn test_invalid_env_falls_back_to_default() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env_vars();
        std::env::set_var("LEXILOAD_CACHE_MAX_BYTES", "lots");
        std::env::set_var("LEXILOAD_BATCH_SIZE", "-1");
        std::env::set_var("LEXILOAD_LOG_FORMAT", "xml");
        std::env::set_var("LEXILOAD_BASE_URL", "   ");
        let cfg = load();
        assert_eq!(cfg.store.max_bytes, DEFAULT_CACHE_MAX_BYTES);
        assert_eq!(cfg.preload.batch_size, 3);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.fetcher.base_url, DEFAULT_BASE_URL);
        clear_env_vars();
    }

    #[test]
    fn test_floors_and_clamps() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env_vars();
        std::env::set_var("LEXILOAD_CACHE_MAX_BYTES", "0");
        std::env::set_var("LEXILOAD_CACHE_TTL_SECS", "0");
        std::env::set_var("LEXILOAD_FETCH_CONCURRENCY", "0");
        std::env::set_var("LEXILOAD_BATCH_SIZE", "0");
        std::env::set_var("LEXILOAD_CONFIDENCE_THRESHOLD", "250");
        let cfg = load();
        assert!(cfg.store.max_bytes >= 1024, "cache budget must have floor");
        assert_eq!(cfg.coordinator.ttl.num_seconds(), 1);
        assert_eq!(cfg.fetcher.max_connections, 1);
        assert_eq!(cfg.preload.batch_size, 1);
        assert_eq!(cfg.preload.confidence_threshold, 100);
        clear_env_vars();
    }

    #[test]
    fn test_effective_config_mirrors_loaded_values() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env_vars();
        let eff = load().effective_config();
        assert_eq!(eff.cache_max_bytes, DEFAULT_CACHE_MAX_BYTES);
        assert_eq!(eff.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert_eq!(eff.fetch_concurrency, 3);
        assert_eq!(eff.batch_delay_ms, 10);
        assert_eq!(eff.debounce_ms, 300);
        assert_eq!(eff.idle_stagger_ms, 100);
        assert_eq!(eff.default_locale, DEFAULT_LOCALE);
        assert_eq!(eff.log_format, "json");
        assert_eq!(eff.log_file, None);
    }
}
