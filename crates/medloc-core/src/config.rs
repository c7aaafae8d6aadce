use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("MEDLOC_ENV", "development"))?;

    let bind_addr: SocketAddr = parse_as(
        "MEDLOC_BIND_ADDR",
        &or_default("MEDLOC_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("MEDLOC_LOG_LEVEL", "info");
    let frontend_url = or_default("MEDLOC_FRONTEND_URL", "http://localhost:5173");

    let db_max_connections: u32 = parse_as(
        "MEDLOC_DB_MAX_CONNECTIONS",
        &or_default("MEDLOC_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_as(
        "MEDLOC_DB_MIN_CONNECTIONS",
        &or_default("MEDLOC_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_as(
        "MEDLOC_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("MEDLOC_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let search_default_radius_km: f64 = parse_as(
        "MEDLOC_SEARCH_DEFAULT_RADIUS_KM",
        &or_default("MEDLOC_SEARCH_DEFAULT_RADIUS_KM", "10"),
    )?;
    if !search_default_radius_km.is_finite() || search_default_radius_km <= 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MEDLOC_SEARCH_DEFAULT_RADIUS_KM".to_string(),
            reason: format!("must be a positive number of kilometres, got {search_default_radius_km}"),
        });
    }

    let search_max_results: usize = parse_as(
        "MEDLOC_SEARCH_MAX_RESULTS",
        &or_default("MEDLOC_SEARCH_MAX_RESULTS", "50"),
    )?;
    if search_max_results == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MEDLOC_SEARCH_MAX_RESULTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let rate_limit_per_minute: usize = parse_as(
        "MEDLOC_RATE_LIMIT_PER_MINUTE",
        &or_default("MEDLOC_RATE_LIMIT_PER_MINUTE", "120"),
    )?;
    if rate_limit_per_minute == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MEDLOC_RATE_LIMIT_PER_MINUTE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        frontend_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        search_default_radius_km,
        search_max_results,
        rate_limit_per_minute,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MEDLOC_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
