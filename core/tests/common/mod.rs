// core/tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use souk_flow::{ContextData, FlowError, Handler, PipelineControl};
use tracing::Level;

/// A stand-in for a checkout context: steps append to `trail` and bump `total`.
#[derive(Clone, Debug, Default)]
pub struct CheckoutCtx {
  pub total: i64,
  pub trail: Vec<String>,
  pub stop_after: Option<String>,
  pub pays_online: bool,
}

#[derive(Clone, Debug, Default)]
pub struct RefundCtx {
  pub refunded: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
  #[error("flow error: {0}")]
  Flow(String),

  #[error("step rejected: {0}")]
  Rejected(String),
}

impl From<FlowError> for CheckoutError {
  fn from(err: FlowError) -> Self {
    CheckoutError::Flow(format!("{:?}", err))
  }
}

pub fn add_step(step_name: &'static str, amount: i64) -> Handler<CheckoutCtx, CheckoutError> {
  Box::new(move |ctx: ContextData<CheckoutCtx>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total += amount;
      guard.trail.push(step_name.to_string());
      if guard.stop_after.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn reject_step(step_name: &'static str, reason: &'static str) -> Handler<CheckoutCtx, CheckoutError> {
  Box::new(move |ctx: ContextData<CheckoutCtx>| {
    Box::pin(async move {
      ctx.write().trail.push(step_name.to_string());
      Err(CheckoutError::Rejected(reason.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
