// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines::register_all_pipelines;
use crate::services::gateway::PaymentGateway;
use crate::stores::{CartStore, CatalogStore, OrderStore};
use souk_flow::Flows;
use std::sync::Arc;

/// Shared by every request. Stores and the gateway sit behind traits so tests can swap them.
#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<dyn CatalogStore>,
  pub carts: Arc<dyn CartStore>,
  pub orders: Arc<dyn OrderStore>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub flows: Arc<Flows<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the state and registers all pipelines on a fresh registry.
  pub fn new(
    catalog: Arc<dyn CatalogStore>,
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    config: Arc<AppConfig>,
  ) -> Self {
    let flows = Arc::new(Flows::<AppError>::new());
    register_all_pipelines(&flows);
    Self {
      catalog,
      carts,
      orders,
      gateway,
      flows,
      config,
    }
  }
}
