// storefront/src/pipelines/callback_pipeline.rs
use crate::errors::AppError;
use crate::models::{PaymentStatus, ReportedStatus};
use crate::pipelines::contexts::CallbackCtxData;
use crate::services::redirect::payment_result_url;
use crate::stores::{PaymentVerdict, SettleOutcome};
use souk_flow::{ContextData, Flows, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{info, warn, Instrument};

/// Reconciles a gateway callback against the order that owns its transaction id.
///
/// The only status write is `OrderStore::settle_payment`, which moves an order out of
/// `pending` at most once. Everything after it reads the stored result, so a duplicate or
/// concurrent delivery ends with the same order state and the same redirect.
pub fn register_callback_pipeline(flows: &Flows<AppError>) {
  let execution_not_needed: SkipCondition<CallbackCtxData> = Arc::new(|ctx: ContextData<CallbackCtxData>| {
    ctx.with(|c| c.already_settled || c.reported != ReportedStatus::Success)
  });
  let settled_before_delivery: SkipCondition<CallbackCtxData> =
    Arc::new(|ctx: ContextData<CallbackCtxData>| ctx.with(|c| c.already_settled));
  // Only the delivery that completed the payment clears the cart. A late re-delivery must
  // not touch a cart the user has filled again since.
  let completion_not_applied_here: SkipCondition<CallbackCtxData> = Arc::new(|ctx: ContextData<CallbackCtxData>| {
    ctx.with(|c| {
      c.already_settled
        || c
          .order
          .as_ref()
          .map_or(true, |o| o.payment_status != PaymentStatus::Completed)
    })
  });

  let mut p = Pipeline::<CallbackCtxData, AppError>::new(&[
    ("load_order_for_transaction", false, None),
    ("detect_settled_order", false, None),
    ("execute_gateway_payment", false, Some(execution_not_needed)),
    ("apply_payment_verdict", false, Some(settled_before_delivery)),
    ("clear_cart_after_completion", true, Some(completion_not_applied_here)),
    ("select_redirect_target", false, None),
  ]);

  p.on_root("load_order_for_transaction", |ctx_data: ContextData<CallbackCtxData>| {
    Box::pin(async move {
      let (orders, transaction_id) = {
        let guard = ctx_data.read();
        (guard.app_state.orders.clone(), guard.transaction_id.clone())
      };

      match orders.find_by_transaction_id(&transaction_id).await? {
        Some(order) => {
          info!(transaction_id = %transaction_id, order_id = %order.id, "Callback matched an order.");
          ctx_data.write().order = Some(order);
          Ok::<_, AppError>(PipelineControl::Continue)
        }
        None => {
          info!(transaction_id = %transaction_id, "No order carries this transaction id; acknowledging without changes.");
          Ok(PipelineControl::Stop)
        }
      }
    })
  });

  p.on_root("detect_settled_order", |ctx_data: ContextData<CallbackCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let settled = guard.order.as_ref().map(|o| (o.id, o.payment_status)).filter(|(_, s)| s.is_terminal());
      if let Some((order_id, payment_status)) = settled {
        info!(
          transaction_id = %guard.transaction_id,
          order_id = %order_id,
          payment_status = ?payment_status,
          "Order already settled; callback is a re-delivery."
        );
        guard.already_settled = true;
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("execute_gateway_payment", |ctx_data: ContextData<CallbackCtxData>| {
    Box::pin(async move {
      let (gateway, transaction_id) = {
        let guard = ctx_data.read();
        (guard.app_state.gateway.clone(), guard.transaction_id.clone())
      };

      let span = tracing::info_span!("gateway::execute", transaction_id = %transaction_id);
      let result = gateway.execute_payment(&transaction_id).instrument(span).await;

      // Anything short of a confirmed completion settles as failed.
      let (execution, verdict) = match result {
        Ok(outcome) if outcome.is_completed() => {
          info!(transaction_id = %transaction_id, outcome = ?outcome, "Gateway confirmed the payment.");
          (Some(outcome), PaymentVerdict::Completed)
        }
        Ok(outcome) => {
          warn!(transaction_id = %transaction_id, outcome = ?outcome, "Gateway did not confirm the payment.");
          (Some(outcome), PaymentVerdict::Failed)
        }
        Err(e) if e.is_timeout() => {
          warn!(transaction_id = %transaction_id, error = %e, "Payment execution timed out; outcome unknown, settling as failed.");
          (None, PaymentVerdict::Failed)
        }
        Err(e) => {
          warn!(transaction_id = %transaction_id, error = %e, "Payment execution failed.");
          (None, PaymentVerdict::Failed)
        }
      };

      {
        let mut guard = ctx_data.write();
        guard.execution = execution;
        guard.verdict = Some(verdict);
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("apply_payment_verdict", |ctx_data: ContextData<CallbackCtxData>| {
    Box::pin(async move {
      let (orders, transaction_id, verdict) = {
        let guard = ctx_data.read();
        (
          guard.app_state.orders.clone(),
          guard.transaction_id.clone(),
          // A reported failure never reaches execution.
          guard.verdict.unwrap_or(PaymentVerdict::Failed),
        )
      };

      let outcome = orders.settle_payment(&transaction_id, verdict).await?;
      let mut guard = ctx_data.write();
      guard.verdict = Some(verdict);
      match outcome {
        SettleOutcome::Applied(order) => {
          info!(
            transaction_id = %transaction_id,
            order_id = %order.id,
            status = ?order.status,
            payment_status = ?order.payment_status,
            "Payment verdict applied."
          );
          guard.order = Some(order);
          Ok::<_, AppError>(PipelineControl::Continue)
        }
        SettleOutcome::AlreadySettled(order) => {
          info!(
            transaction_id = %transaction_id,
            order_id = %order.id,
            payment_status = ?order.payment_status,
            "A concurrent delivery settled the order first; keeping its result."
          );
          guard.order = Some(order);
          guard.already_settled = true;
          Ok(PipelineControl::Continue)
        }
        SettleOutcome::NoMatch => {
          warn!(transaction_id = %transaction_id, "Order vanished between lookup and settlement.");
          guard.order = None;
          Ok(PipelineControl::Stop)
        }
      }
    })
  });

  p.on_root("clear_cart_after_completion", |ctx_data: ContextData<CallbackCtxData>| {
    Box::pin(async move {
      let (carts, transaction_id, owner) = {
        let guard = ctx_data.read();
        (
          guard.app_state.carts.clone(),
          guard.transaction_id.clone(),
          guard.order.as_ref().map(|o| (o.id, o.user_id)),
        )
      };
      let Some((order_id, user_id)) = owner else {
        return Ok::<_, AppError>(PipelineControl::Continue);
      };

      match carts.clear_for_user(user_id).await {
        Ok(removed) => {
          info!(transaction_id = %transaction_id, order_id = %order_id, user_id = %user_id, removed, "Cart cleared.");
          ctx_data.write().cart_cleared = true;
        }
        Err(e) => {
          warn!(
            transaction_id = %transaction_id,
            order_id = %order_id,
            user_id = %user_id,
            error = %e,
            "Cart could not be cleared after a completed payment."
          );
        }
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("select_redirect_target", |ctx_data: ContextData<CallbackCtxData>| {
    Box::pin(async move {
      let (config, transaction_id, order) = {
        let guard = ctx_data.read();
        (guard.app_state.config.clone(), guard.transaction_id.clone(), guard.order.clone())
      };
      let order = order.ok_or_else(|| AppError::Internal("order missing before redirect selection".to_string()))?;

      let base = if order.payment_status == PaymentStatus::Completed {
        &config.payment_success_url
      } else {
        &config.payment_failure_url
      };
      let url = payment_result_url(base, &transaction_id, order.id)?;
      info!(transaction_id = %transaction_id, order_id = %order.id, redirect = %url, "Redirect target selected.");
      ctx_data.write().redirect_url = Some(url);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  flows.register_pipeline(p);
  info!("Callback pipeline registered.");
}
