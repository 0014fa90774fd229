//! Config loader — reads `~/.stayclock/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.stayclock/config.json`
//! 3. Environment variables `STAYCLOCK_<SECTION>__<FIELD>` (override JSON)
//! 4. `LINE_CHANNEL_ACCESS_TOKEN` / `LINE_CHANNEL_SECRET`, only where still empty

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `STAYCLOCK_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `STAYCLOCK_BILLING__RATE_PER_HOUR` → `billing.rate_per_hour`
/// - `STAYCLOCK_BILLING__UTC_OFFSET_MINUTES` → `billing.utc_offset_minutes`
/// - `STAYCLOCK_BILLING__DISCOUNT_NOTICE` → `billing.discount_notice`
/// - `STAYCLOCK_ACCESS__ADMINS` → `access.admins` (comma-separated)
/// - `STAYCLOCK_CHANNELS__LINE__CHANNEL_ACCESS_TOKEN` → `channels.line.channel_access_token`
/// - `STAYCLOCK_CHANNELS__LINE__CHANNEL_SECRET` → `channels.line.channel_secret`
/// - `STAYCLOCK_GATEWAY__HOST` → `gateway.host`
/// - `STAYCLOCK_GATEWAY__PORT` → `gateway.port`
fn apply_env_overrides(mut config: Config) -> Config {
    // Billing
    if let Ok(val) = std::env::var("STAYCLOCK_BILLING__RATE_PER_HOUR") {
        match val.parse::<u64>() {
            Ok(rate) => config.billing.rate_per_hour = rate,
            Err(e) => warn!(value = %val, error = %e, "ignoring invalid hourly rate override"),
        }
    }
    if let Ok(val) = std::env::var("STAYCLOCK_BILLING__UTC_OFFSET_MINUTES") {
        if let Ok(n) = val.parse::<i32>() {
            config.billing.utc_offset_minutes = n;
        }
    }
    if let Ok(val) = std::env::var("STAYCLOCK_BILLING__DISCOUNT_NOTICE") {
        config.billing.discount_notice = val;
    }

    // Access
    if let Ok(val) = std::env::var("STAYCLOCK_ACCESS__ADMINS") {
        config.access.admins = parse_list(&val);
    }

    // LINE
    let line = &mut config.channels.line;
    if let Ok(val) = std::env::var("STAYCLOCK_CHANNELS__LINE__CHANNEL_ACCESS_TOKEN") {
        line.channel_access_token = val;
    }
    if let Ok(val) = std::env::var("STAYCLOCK_CHANNELS__LINE__CHANNEL_SECRET") {
        line.channel_secret = val;
    }
    if line.channel_access_token.is_empty() {
        if let Ok(val) = std::env::var("LINE_CHANNEL_ACCESS_TOKEN") {
            line.channel_access_token = val;
        }
    }
    if line.channel_secret.is_empty() {
        if let Ok(val) = std::env::var("LINE_CHANNEL_SECRET") {
            line.channel_secret = val;
        }
    }

    // Gateway
    if let Ok(val) = std::env::var("STAYCLOCK_GATEWAY__HOST") {
        config.gateway.host = val;
    }
    if let Ok(val) = std::env::var("STAYCLOCK_GATEWAY__PORT") {
        if let Ok(p) = val.parse::<u16>() {
            config.gateway.port = p;
        }
    }

    config
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
