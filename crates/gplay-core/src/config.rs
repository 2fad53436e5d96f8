use crate::app_config::AppConfig;
use crate::locale::Locale;
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable
/// config. Decoupled from the process environment so it can be tested with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let base_url = parse_base_url(&or_default("GPLAY_BASE_URL", "https://play.google.com"))?;
    let locale = Locale::new(
        or_default("GPLAY_LANG", "en"),
        or_default("GPLAY_COUNTRY", "us"),
    );
    let log_level = or_default("GPLAY_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("GPLAY_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("GPLAY_USER_AGENT", DEFAULT_USER_AGENT);
    let max_concurrent_chains = parse_usize("GPLAY_MAX_CONCURRENT_CHAINS", "4")?;
    let inter_request_delay_ms = parse_u64("GPLAY_INTER_REQUEST_DELAY_MS", "250")?;
    let max_retries = parse_u32("GPLAY_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("GPLAY_RETRY_BACKOFF_BASE_MS", "500")?;
    let max_pages = parse_usize("GPLAY_MAX_PAGES", "200")?;
    let strict_records = parse_bool(
        "GPLAY_STRICT_RECORDS",
        &or_default("GPLAY_STRICT_RECORDS", "false"),
    )?;

    Ok(AppConfig {
        base_url,
        locale,
        log_level,
        request_timeout_secs,
        user_agent,
        max_concurrent_chains,
        inter_request_delay_ms,
        max_retries,
        retry_backoff_base_ms,
        max_pages,
        strict_records,
    })
}

/// Accepts only `http`/`https` roots and strips any trailing slash.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: "GPLAY_BASE_URL".to_string(),
            reason: format!("\"{raw}\" is not an http(s) URL"),
        })
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("\"{other}\" is not a boolean"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
