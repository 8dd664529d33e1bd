// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use souk_flow::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CartLine, PaymentMethod, ShippingAddress};
use crate::pipelines::contexts::{PlaceOrderCtxData, RetryPaymentCtxData};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct PlaceOrderRequestPayload {
  /// Cart snapshot. When absent the user's persisted cart is used.
  pub items: Option<Vec<CartLine>>,
  pub shipping_address: ShippingAddress,
  pub payment_method: PaymentMethod,
}

#[instrument(
  name = "handler::place_order",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, payment_method = ?req_payload.payment_method)
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<PlaceOrderRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(PlaceOrderCtxData::new(
    app_state.get_ref().clone(),
    auth_user.user_id,
    payload.items,
    payload.shipping_address,
    payload.payment_method,
  ));

  match app_state.flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let guard = ctx_data.read();
      let order = guard.order.as_ref().ok_or_else(|| {
        warn!("Place-order pipeline completed without an order.");
        AppError::Internal("order was not created".to_string())
      })?;
      info!(order_id = %order.id, "Order placed.");

      Ok(HttpResponse::Created().json(json!({
        "orderId": order.id,
        "status": order.status,
        "paymentStatus": order.payment_status,
        "totalAmount": order.total_amount,
        "redirectUrl": guard.payment_session.as_ref().map(|s| s.redirect_url.clone()),
        "cartCleared": guard.cart_cleared,
      })))
    }
    PipelineResult::Stopped => {
      warn!("Place-order pipeline stopped before completion.");
      Err(AppError::Internal("order placement did not complete".to_string()))
    }
  }
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.orders.list_for_user(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(
  name = "handler::get_order",
  skip(app_state, path, auth_user),
  fields(user_id = %auth_user.user_id, order_id = %path)
)]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = app_state
    .orders
    .get(order_id)
    .await?
    .filter(|o| o.user_id == auth_user.user_id)
    .ok_or_else(|| AppError::NotFound(format!("order {} not found", order_id)))?;
  let items = app_state.orders.items_for(order_id).await?;

  Ok(HttpResponse::Ok().json(json!({ "order": order, "items": items })))
}

#[instrument(
  name = "handler::retry_payment",
  skip(app_state, path, auth_user),
  fields(user_id = %auth_user.user_id, order_id = %path)
)]
pub async fn retry_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let ctx_data = ContextData::new(RetryPaymentCtxData::new(
    app_state.get_ref().clone(),
    auth_user.user_id,
    order_id,
  ));

  app_state.flows.run(ctx_data.clone()).await?;

  let guard = ctx_data.read();
  let session = guard
    .payment_session
    .as_ref()
    .ok_or_else(|| AppError::Internal("payment retry finished without a session".to_string()))?;
  Ok(HttpResponse::Ok().json(json!({
    "orderId": order_id,
    "redirectUrl": session.redirect_url,
  })))
}
