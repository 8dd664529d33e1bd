// storefront/src/pipelines/payment_initiation.rs

use crate::errors::{AppError, Result};
use crate::models::Order;
use crate::services::gateway::{PaymentSession, PaymentSessionRequest};
use crate::state::AppState;
use tracing::{info, instrument, warn};

/// Opens a gateway payment session for `order` and records its transaction id.
///
/// Shared by order placement and payment retry. On a gateway failure the order
/// is left as it was (pending/pending, no transaction id). The transaction id
/// is written with a set-if-null update, so two racing initiations cannot both
/// attach one; the loser gets `Conflict` and its session is abandoned.
#[instrument(
  name = "payment::open_session",
  skip(app_state, order),
  fields(order_id = %order.id, amount = %order.total_amount)
)]
pub async fn open_payment_session(app_state: &AppState, order: &Order) -> Result<PaymentSession> {
  let request = PaymentSessionRequest {
    amount: order.total_amount,
    merchant_order_id: order.id.to_string(),
    payer_reference: order.user_id.to_string(),
    callback_url: app_state.config.payment_callback_url.clone(),
  };

  let session = app_state
    .gateway
    .create_payment_session(&request)
    .await
    .map_err(|source| {
      warn!(error = %source, "Payment session could not be created; order stays pending.");
      AppError::PaymentInitiation {
        order_id: order.id,
        source,
      }
    })?;

  let attached = app_state
    .orders
    .attach_transaction_id(order.id, &session.transaction_id)
    .await?;
  if !attached {
    warn!(transaction_id = %session.transaction_id, "Order already carries a transaction id; new session discarded.");
    return Err(AppError::Conflict(format!(
      "order {} already has a payment session",
      order.id
    )));
  }

  info!(transaction_id = %session.transaction_id, "Payment session attached to order.");
  Ok(session)
}
