// core/tests/error_handling_tests.rs
mod common;

use common::*;
use serial_test::serial;
use souk_flow::{ContextData, FlowError, Pipeline};

#[tokio::test]
#[serial]
async fn first_error_aborts_remaining_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<CheckoutCtx, CheckoutError>::new(&[
    ("validate", false, None),
    ("price", false, None),
    ("persist", false, None),
  ]);
  pipeline.on_root("validate", add_step("validate", 0));
  pipeline.on_root("price", reject_step("price", "unknown product"));
  pipeline.on_root("persist", add_step("persist", 0));

  let ctx = ContextData::new(CheckoutCtx::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Err(CheckoutError::Rejected("unknown product".to_string())));
  assert_eq!(ctx.read().trail, vec!["validate", "price"]);
}

#[tokio::test]
#[serial]
async fn error_in_before_phase_skips_on_and_after() {
  setup_tracing();
  let mut pipeline = Pipeline::<CheckoutCtx, CheckoutError>::new(&[("persist", false, None)]);
  pipeline.before_root("persist", reject_step("guard", "locked"));
  pipeline.on_root("persist", add_step("persist", 1));
  pipeline.after_root("persist", add_step("audit", 1));

  let ctx = ContextData::new(CheckoutCtx::default());
  assert!(pipeline.run(ctx.clone()).await.is_err());

  let guard = ctx.read();
  assert_eq!(guard.trail, vec!["guard"]);
  assert_eq!(guard.total, 0);
}

#[tokio::test]
#[serial]
async fn required_step_without_handlers_reports_handler_missing() {
  setup_tracing();
  let mut pipeline = Pipeline::<CheckoutCtx, CheckoutError>::new(&[("load", false, None), ("execute", false, None)]);
  pipeline.on_root("load", add_step("load", 0));

  let result = pipeline.run(ContextData::new(CheckoutCtx::default())).await;

  let expected = CheckoutError::from(FlowError::HandlerMissing {
    step_name: "execute".to_string(),
  });
  assert_eq!(result, Err(expected));
}

#[tokio::test]
#[serial]
async fn marking_a_step_optional_later_allows_it_to_stay_empty() {
  setup_tracing();
  let mut pipeline = Pipeline::<CheckoutCtx, CheckoutError>::new(&[("load", false, None), ("notify", false, None)]);
  pipeline.on_root("load", add_step("load", 0));
  pipeline.set_optional("notify", true);

  assert!(pipeline.run(ContextData::new(CheckoutCtx::default())).await.is_ok());
}

#[test]
fn anyhow_errors_become_handler_flow_errors() {
  let err: FlowError = anyhow::anyhow!("boom").into();
  assert!(matches!(err, FlowError::Handler { .. }));
  assert_eq!(err.to_string(), "Handler failed: boom");
}
