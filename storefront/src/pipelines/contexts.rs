// storefront/src/pipelines/contexts.rs

//! Data structs the order pipelines run over. Handlers receive them wrapped in
//! `souk_flow::ContextData`; request handlers read the outputs back after the run.

use crate::models::{CartLine, NewOrderItem, Order, PaymentMethod, ReportedStatus, ShippingAddress};
use crate::services::gateway::{ExecutionOutcome, PaymentSession};
use crate::state::AppState;
use crate::stores::PaymentVerdict;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub shipping_address: ShippingAddress,
  pub payment_method: PaymentMethod,
  /// Filled from the request body when it carries lines, otherwise by `load_cart_snapshot`.
  pub cart_lines: Vec<CartLine>,
  pub lines_from_request: bool,

  pub priced_items: Vec<NewOrderItem>,
  pub total_amount: Decimal,
  pub order: Option<Order>,
  pub payment_session: Option<PaymentSession>,
  pub cart_cleared: bool,
}

impl PlaceOrderCtxData {
  pub fn new(
    app_state: AppState,
    user_id: Uuid,
    requested_lines: Option<Vec<CartLine>>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
  ) -> Self {
    let lines_from_request = requested_lines.is_some();
    Self {
      app_state,
      user_id,
      shipping_address,
      payment_method,
      cart_lines: requested_lines.unwrap_or_default(),
      lines_from_request,
      priced_items: Vec::new(),
      total_amount: Decimal::ZERO,
      order: None,
      payment_session: None,
      cart_cleared: false,
    }
  }
}

#[derive(Clone)]
pub struct RetryPaymentCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub order_id: Uuid,
  pub order: Option<Order>,
  pub payment_session: Option<PaymentSession>,
}

impl RetryPaymentCtxData {
  pub fn new(app_state: AppState, user_id: Uuid, order_id: Uuid) -> Self {
    Self {
      app_state,
      user_id,
      order_id,
      order: None,
      payment_session: None,
    }
  }
}

#[derive(Clone)]
pub struct CallbackCtxData {
  pub app_state: AppState,
  pub transaction_id: String,
  pub reported: ReportedStatus,

  /// `None` after the run means no order carries this transaction id.
  pub order: Option<Order>,
  /// The order was already terminal when this delivery arrived (or lost the settle race).
  pub already_settled: bool,
  pub execution: Option<ExecutionOutcome>,
  pub verdict: Option<PaymentVerdict>,
  pub cart_cleared: bool,
  pub redirect_url: Option<String>,
}

impl CallbackCtxData {
  pub fn new(app_state: AppState, transaction_id: String, reported: ReportedStatus) -> Self {
    Self {
      app_state,
      transaction_id,
      reported,
      order: None,
      already_settled: false,
      execution: None,
      verdict: None,
      cart_cleared: false,
      redirect_url: None,
    }
  }
}
