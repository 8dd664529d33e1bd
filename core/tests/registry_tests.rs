// core/tests/registry_tests.rs
mod common;

use common::*;
use serial_test::serial;
use souk_flow::{ContextData, Flows, Pipeline, PipelineControl, PipelineResult};

#[tokio::test]
#[serial]
async fn run_dispatches_by_context_type() {
  setup_tracing();
  let flows = Flows::<CheckoutError>::new();

  let mut checkout = Pipeline::<CheckoutCtx, CheckoutError>::new(&[("price", false, None)]);
  checkout.on_root("price", add_step("price", 42));
  flows.register_pipeline(checkout);

  let mut refund = Pipeline::<RefundCtx, CheckoutError>::new(&[("refund", false, None)]);
  refund.on_root("refund", |ctx: ContextData<RefundCtx>| {
    Box::pin(async move {
      ctx.write().refunded = true;
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });
  flows.register_pipeline(refund);

  assert!(flows.is_registered::<CheckoutCtx>());
  assert!(flows.is_registered::<RefundCtx>());

  let checkout_ctx = ContextData::new(CheckoutCtx::default());
  assert_eq!(flows.run(checkout_ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(checkout_ctx.read().total, 42);

  let refund_ctx = ContextData::new(RefundCtx::default());
  flows.run(refund_ctx.clone()).await.unwrap();
  assert!(refund_ctx.read().refunded);
}

#[tokio::test]
#[serial]
async fn run_without_registration_fails_with_not_registered() {
  setup_tracing();
  let flows = Flows::<CheckoutError>::new();

  let result = flows.run(ContextData::new(RefundCtx::default())).await;

  match result {
    Err(CheckoutError::Flow(msg)) => assert!(msg.contains("NotRegistered"), "unexpected message: {msg}"),
    other => panic!("expected NotRegistered, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn handler_errors_pass_through_the_registry() {
  setup_tracing();
  let flows = Flows::<CheckoutError>::new();
  let mut checkout = Pipeline::<CheckoutCtx, CheckoutError>::new(&[("price", false, None)]);
  checkout.on_root("price", reject_step("price", "out of stock"));
  flows.register_pipeline(checkout);

  let result = flows.run(ContextData::new(CheckoutCtx::default())).await;

  assert_eq!(result, Err(CheckoutError::Rejected("out of stock".to_string())));
}

#[tokio::test]
#[serial]
async fn registering_twice_replaces_the_pipeline() {
  setup_tracing();
  let flows = Flows::<CheckoutError>::new();

  let mut first = Pipeline::<CheckoutCtx, CheckoutError>::new(&[("price", false, None)]);
  first.on_root("price", add_step("first", 1));
  flows.register_pipeline(first);

  let mut second = Pipeline::<CheckoutCtx, CheckoutError>::new(&[("price", false, None)]);
  second.on_root("price", add_step("second", 2));
  flows.register_pipeline(second);

  let ctx = ContextData::new(CheckoutCtx::default());
  flows.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["second"]);
}
