//! Config CLI subcommands: show, defaults, validate.
//!
//! These commands read configuration directly from environment variables.

use std::path::Path;

use crate::config::{self, EffectiveConfig};
use crate::telemetry::validate_filter;

/// Print effective config as key-value pairs to stdout.
pub fn run_show() {
    let cfg = config::load().effective_config();
    print_config(&cfg);
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    println!("LEXILOAD_CACHE_MAX_BYTES={}", config::DEFAULT_CACHE_MAX_BYTES);
    println!("LEXILOAD_CACHE_TTL_SECS={}", config::DEFAULT_CACHE_TTL_SECS);
    println!("LEXILOAD_FETCH_CONCURRENCY=3");
    println!("LEXILOAD_BATCH_SIZE=3");
    println!("LEXILOAD_BATCH_DELAY_MS=10");
    println!("LEXILOAD_CONFIDENCE_THRESHOLD=60");
    println!("LEXILOAD_DEBOUNCE_MS=300");
    println!("LEXILOAD_IDLE_STAGGER_MS=100");
    println!("LEXILOAD_BASE_URL={}", config::DEFAULT_BASE_URL);
    println!("LEXILOAD_DEFAULT_LOCALE={}", config::DEFAULT_LOCALE);
    println!("LEXILOAD_LOG_LEVEL=info");
    println!("LEXILOAD_LOG_FORMAT=json");
    println!("LEXILOAD_LOG_FILE=");
}

/// Warnings for values that load fine but will not behave as intended.
pub fn config_warnings(cfg: &EffectiveConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !(cfg.base_url.starts_with("http://") || cfg.base_url.starts_with("https://")) {
        warnings.push(format!(
            "LEXILOAD_BASE_URL ({}) is not an absolute http(s) URL; HTTP fetches will fail",
            cfg.base_url
        ));
    }
    if let Err(e) = validate_filter(&cfg.log_level) {
        warnings.push(format!("LEXILOAD_LOG_LEVEL: {}", e));
    }
    if let Some(file) = &cfg.log_file {
        let parent = Path::new(file).parent().filter(|p| !p.as_os_str().is_empty());
        if parent.is_some_and(|dir| !dir.is_dir()) {
            warnings.push(format!(
                "LEXILOAD_LOG_FILE ({}) is in a directory that does not exist",
                file
            ));
        }
    }
    if cfg.confidence_threshold >= 100 {
        warnings.push("LEXILOAD_CONFIDENCE_THRESHOLD is 100; predictions will never trigger".to_string());
    }

    warnings
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let cfg = config::load().effective_config();
    let warnings = config_warnings(&cfg);
    for warning in &warnings {
        eprintln!("WARNING: {}", warning);
    }

    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

fn print_config(cfg: &EffectiveConfig) {
    println!("LEXILOAD_CACHE_MAX_BYTES={}", cfg.cache_max_bytes);
    println!("LEXILOAD_CACHE_TTL_SECS={}", cfg.cache_ttl_secs);
    println!("LEXILOAD_FETCH_CONCURRENCY={}", cfg.fetch_concurrency);
    println!("LEXILOAD_BATCH_SIZE={}", cfg.batch_size);
    println!("LEXILOAD_BATCH_DELAY_MS={}", cfg.batch_delay_ms);
    println!("LEXILOAD_CONFIDENCE_THRESHOLD={}", cfg.confidence_threshold);
    println!("LEXILOAD_DEBOUNCE_MS={}", cfg.debounce_ms);
    println!("LEXILOAD_IDLE_STAGGER_MS={}", cfg.idle_stagger_ms);
    println!("LEXILOAD_BASE_URL={}", cfg.base_url);
    println!("LEXILOAD_DEFAULT_LOCALE={}", cfg.default_locale);
    println!("LEXILOAD_LOG_LEVEL={}", cfg.log_level);
    println!("LEXILOAD_LOG_FORMAT={}", cfg.log_format);
    println!("LEXILOAD_LOG_FILE={}", cfg.log_file.as_deref().unwrap_or(""));
}
