// storefront/src/pipelines/mod.rs

//! Order pipelines and their registration with the `souk_flow::Flows` registry.

use crate::errors::AppError;
use souk_flow::Flows;

pub mod contexts;
pub mod payment_initiation;

pub mod callback_pipeline;
pub mod place_order_pipeline;
pub mod retry_payment_pipeline;

/// Called once while building `AppState`.
pub fn register_all_pipelines(flows: &Flows<AppError>) {
  tracing::info!("Registering order pipelines...");

  place_order_pipeline::register_place_order_pipeline(flows);
  retry_payment_pipeline::register_retry_payment_pipeline(flows);
  callback_pipeline::register_callback_pipeline(flows);

  tracing::info!("All order pipelines registered.");
}
