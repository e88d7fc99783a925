use crate::app_config::{AppConfig, DataSource, Environment};
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
/// Parsing and validation are decoupled from the real environment so tests can
/// supply a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings are treated as unset so `.env` placeholders like `KEY=` work.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("AHAT_ENV", "development"))?;
    let data_source = match optional("AHAT_DATA_SOURCE") {
        Some(raw) => parse_data_source(&raw)?,
        None if env.is_development() => DataSource::Mock,
        None => DataSource::Database,
    };

    let database_url = optional("DATABASE_URL");
    if data_source == DataSource::Database && database_url.is_none() {
        return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
    }

    let bind_addr = parse_addr("AHAT_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("AHAT_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("AHAT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("AHAT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("AHAT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let request_timeout_secs = parse_u64("AHAT_REQUEST_TIMEOUT_SECS", "30")?;

    let deals_api_key = optional("SIXSEVENDEALS_API_KEY");
    let deals_api_url = or_default("SIXSEVENDEALS_API_URL", "https://sixsevendeals.com/api/v1");
    let deals_request_timeout_secs = parse_u64("AHAT_DEALS_REQUEST_TIMEOUT_SECS", "30")?;
    let deals_max_pages = parse_u32("AHAT_DEALS_MAX_PAGES", "5")?;

    Ok(AppConfig {
        env,
        data_source,
        database_url,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        request_timeout_secs,
        deals_api_key,
        deals_api_url,
        deals_request_timeout_secs,
        deals_max_pages,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "staging" => Ok(Environment::Staging),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AHAT_ENV".to_string(),
            reason: format!(
                "expected development, test, staging, or production; got '{other}'"
            ),
        }),
    }
}

fn parse_data_source(s: &str) -> Result<DataSource, ConfigError> {
    match s {
        "mock" => Ok(DataSource::Mock),
        "database" => Ok(DataSource::Database),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AHAT_DATA_SOURCE".to_string(),
            reason: format!("expected mock or database, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
