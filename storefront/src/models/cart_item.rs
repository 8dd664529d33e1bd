// storefront/src/models/cart_item.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartItem {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub added_at: DateTime<Utc>,
}

/// One line of the cart snapshot handed to order placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
  pub product_id: Uuid,
  pub quantity: i32,
}

impl From<&CartItem> for CartLine {
  fn from(item: &CartItem) -> Self {
    CartLine {
      product_id: item.product_id,
      quantity: item.quantity,
    }
  }
}
