// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use reqwest::Url;
use std::env;
use std::time::Duration;

pub const DEFAULT_GATEWAY_BASE_URL: &str = "https://tokenized.sandbox.bka.sh/v1.2.0-beta";

#[derive(Clone)]
pub struct GatewayConfig {
  pub base_url: String,
  pub app_key: String,
  pub app_secret: String,
  pub username: String,
  pub password: String,
  pub timeout: Duration,
  pub currency: String,
}

impl std::fmt::Debug for GatewayConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GatewayConfig")
      .field("base_url", &self.base_url)
      .field("app_key", &"[REDACTED]")
      .field("app_secret", &"[REDACTED]")
      .field("username", &self.username)
      .field("password", &"[REDACTED]")
      .field("timeout", &self.timeout)
      .field("currency", &self.currency)
      .finish()
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  pub run_migrations: bool,
  pub app_base_url: String,

  pub gateway: GatewayConfig,

  /// Where the gateway sends the user agent (and its notification) after the hosted page.
  pub payment_callback_url: String,
  pub payment_success_url: String,
  pub payment_failure_url: String,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &"[REDACTED]")
      .field("database_max_connections", &self.database_max_connections)
      .field("run_migrations", &self.run_migrations)
      .field("app_base_url", &self.app_base_url)
      .field("gateway", &self.gateway)
      .field("payment_callback_url", &self.payment_callback_url)
      .field("payment_success_url", &self.payment_success_url)
      .field("payment_failure_url", &self.payment_failure_url)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source. `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| {
      lookup(var_name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };
    let get_or = |var_name: &str, default: &str| get_env(var_name).unwrap_or_else(|_| default.to_string());

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = get_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = get_or("DATABASE_MAX_CONNECTIONS", "10")
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let run_migrations = get_or("RUN_MIGRATIONS", "true")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;
    let app_base_url = get_env("APP_BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));
    let app_base_url = app_base_url.trim_end_matches('/').to_string();

    let timeout_secs = get_or("GATEWAY_TIMEOUT_SECS", "30")
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid GATEWAY_TIMEOUT_SECS: {}", e)))?;
    if timeout_secs == 0 {
      return Err(AppError::Config("GATEWAY_TIMEOUT_SECS must be at least 1".to_string()));
    }

    let gateway = GatewayConfig {
      base_url: require_url("GATEWAY_BASE_URL", get_or("GATEWAY_BASE_URL", DEFAULT_GATEWAY_BASE_URL))?
        .trim_end_matches('/')
        .to_string(),
      app_key: get_env("GATEWAY_APP_KEY")?,
      app_secret: get_env("GATEWAY_APP_SECRET")?,
      username: get_env("GATEWAY_USERNAME")?,
      password: get_env("GATEWAY_PASSWORD")?,
      timeout: Duration::from_secs(timeout_secs),
      currency: get_or("GATEWAY_CURRENCY", "BDT"),
    };

    let payment_callback_url = require_url(
      "PAYMENT_CALLBACK_URL",
      get_or("PAYMENT_CALLBACK_URL", &format!("{}/api/v1/payments/callback", app_base_url)),
    )?;
    let payment_success_url = require_url(
      "PAYMENT_SUCCESS_URL",
      get_or("PAYMENT_SUCCESS_URL", &format!("{}/payment/success", app_base_url)),
    )?;
    let payment_failure_url = require_url(
      "PAYMENT_FAILURE_URL",
      get_or("PAYMENT_FAILURE_URL", &format!("{}/payment/failure", app_base_url)),
    )?;

    let config = Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      run_migrations,
      app_base_url,
      gateway,
      payment_callback_url,
      payment_success_url,
      payment_failure_url,
    };
    tracing::info!("Application configuration loaded successfully.");
    tracing::debug!(config = ?config, "Loaded config details");
    Ok(config)
  }
}

fn require_url(var_name: &str, value: String) -> Result<String> {
  Url::parse(&value).map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e)))?;
  Ok(value)
}
