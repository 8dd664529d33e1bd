// storefront/src/pipelines/retry_payment_pipeline.rs
use crate::errors::AppError;
use crate::pipelines::contexts::RetryPaymentCtxData;
use crate::pipelines::payment_initiation::open_payment_session;
use souk_flow::{ContextData, Flows, Pipeline, PipelineControl};
use tracing::info;

/// Re-opens a payment session for a gateway order whose first initiation failed.
pub fn register_retry_payment_pipeline(flows: &Flows<AppError>) {
  let mut p = Pipeline::<RetryPaymentCtxData, AppError>::new(&[
    ("load_retryable_order", false, None),
    ("initiate_gateway_payment", false, None),
  ]);

  p.on_root("load_retryable_order", |ctx_data: ContextData<RetryPaymentCtxData>| {
    Box::pin(async move {
      let (orders, user_id, order_id) = {
        let guard = ctx_data.read();
        (guard.app_state.orders.clone(), guard.user_id, guard.order_id)
      };

      // Someone else's order looks the same as a missing one.
      let order = orders
        .get(order_id)
        .await?
        .filter(|o| o.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", order_id)))?;

      if !order.awaits_payment_session() {
        return Err(AppError::Conflict(format!(
          "order {} cannot be paid again (status={:?}, payment_status={:?})",
          order_id, order.status, order.payment_status
        )));
      }

      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("initiate_gateway_payment", |ctx_data: ContextData<RetryPaymentCtxData>| {
    Box::pin(async move {
      let (app_state, order) = {
        let guard = ctx_data.read();
        (guard.app_state.clone(), guard.order.clone())
      };
      let order = order.ok_or_else(|| AppError::Internal("order missing before payment retry".to_string()))?;

      let session = open_payment_session(&app_state, &order).await?;
      info!(order_id = %order.id, transaction_id = %session.transaction_id, "Payment retry opened a new session.");
      {
        let mut guard = ctx_data.write();
        if let Some(stored) = guard.order.as_mut() {
          stored.external_transaction_id = Some(session.transaction_id.clone());
        }
        guard.payment_session = Some(session);
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  flows.register_pipeline(p);
  info!("Retry-payment pipeline registered.");
}
