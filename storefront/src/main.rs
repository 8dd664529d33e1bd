// storefront/src/main.rs

use anyhow::Context;
use souk_storefront::config::AppConfig;
use souk_storefront::services::gateway::HttpGatewayClient;
use souk_storefront::state::AppState;
use souk_storefront::stores::{PgCartStore, PgCatalogStore, PgOrderStore};
use souk_storefront::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = Arc::new(AppConfig::from_env().context("loading configuration")?);
  tracing::debug!(config = ?app_config, "Configuration loaded.");

  let db_pool = PgPoolOptions::new()
    .max_connections(app_config.database_max_connections)
    .connect(&app_config.database_url)
    .await
    .context("connecting to the database")?;
  tracing::info!("Connected to the database.");

  if app_config.run_migrations {
    sqlx::migrate!("./migrations")
      .run(&db_pool)
      .await
      .context("running database migrations")?;
    tracing::info!("Database migrations applied.");
  }

  let gateway = HttpGatewayClient::new(&app_config.gateway).context("building the payment gateway client")?;

  let app_state = AppState::new(
    Arc::new(PgCatalogStore::new(db_pool.clone())),
    Arc::new(PgCartStore::new(db_pool.clone())),
    Arc::new(PgOrderStore::new(db_pool)),
    Arc::new(gateway),
    app_config.clone(),
  );

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await
  .context("running the HTTP server")?;

  Ok(())
}
