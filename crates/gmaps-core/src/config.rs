use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
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
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; only malformed values are rejected.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        parse_flag(&raw).ok_or_else(|| invalid(var, format!("expected a boolean, got \"{raw}\"")))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| invalid(var, e.to_string()))
    };

    let lang = or_default("GMAPS_LANG", "en");
    if lang.trim().is_empty() {
        return Err(invalid("GMAPS_LANG", "must not be empty".to_string()));
    }

    let extract_email = parse_bool("GMAPS_EXTRACT_EMAIL", "false")?;
    let extract_extra_reviews = parse_bool("GMAPS_EXTRA_REVIEWS", "false")?;
    let log_level = or_default("GMAPS_LOG_LEVEL", "info");
    let nav_timeout_ms = parse_u64("GMAPS_NAV_TIMEOUT_MS", "5000")?;
    let review_fetch_timeout_secs = parse_u64("GMAPS_REVIEW_FETCH_TIMEOUT_SECS", "60")?;
    let email_timeout_secs = parse_u64("GMAPS_EMAIL_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("GMAPS_USER_AGENT", "gmaps-scraper/0.1");
    let concurrency = parse_usize("GMAPS_CONCURRENCY", "4")?;

    if concurrency == 0 {
        return Err(invalid(
            "GMAPS_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        lang,
        extract_email,
        extract_extra_reviews,
        log_level,
        nav_timeout_ms,
        review_fetch_timeout_secs,
        email_timeout_secs,
        user_agent,
        concurrency,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
