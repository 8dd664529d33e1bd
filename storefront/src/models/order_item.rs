// storefront/src/models/order_item.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  /// Catalog price frozen at order time.
  pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price: Decimal,
}

impl NewOrderItem {
  pub fn line_total(&self) -> Decimal {
    self.unit_price * Decimal::from(self.quantity)
  }
}
