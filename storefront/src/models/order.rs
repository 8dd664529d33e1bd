// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

/// Fulfillment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_status_enum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
  Pending,
  Completed,
  Failed,
  Refunded,
}

impl PaymentStatus {
  /// Terminal for a given transaction id: the reconciler never writes past these.
  pub fn is_terminal(self) -> bool {
    !matches!(self, PaymentStatus::Pending)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_method_enum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
  Gateway,
  CashOnDelivery,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub total_amount: Decimal,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub payment_method: PaymentMethod,
  /// Set at most once, right after the gateway opens a payment session.
  pub external_transaction_id: Option<String>,
  pub shipping_address: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// A gateway order that never got a payment session can have one opened again.
  pub fn awaits_payment_session(&self) -> bool {
    self.payment_method == PaymentMethod::Gateway
      && self.status == OrderStatus::Pending
      && self.payment_status == PaymentStatus::Pending
      && self.external_transaction_id.is_none()
  }
}

/// Insert payload; status and payment_status always start at pending.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub id: Uuid,
  pub user_id: Uuid,
  pub total_amount: Decimal,
  pub payment_method: PaymentMethod,
  pub shipping_address: String,
}
