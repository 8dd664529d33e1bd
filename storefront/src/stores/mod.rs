// storefront/src/stores/mod.rs

//! Persistence ports used by the order flow, with Postgres and in-memory adapters.
//!
//! Order status columns are only ever written through `create_with_items`,
//! `confirm_cash_on_delivery` and the compare-and-set `settle_payment`.

pub mod memory;
pub mod postgres;

use crate::errors::Result;
use crate::models::{CartItem, NewOrder, NewOrderItem, Order, OrderItem, PaymentStatus};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

pub use memory::{InMemoryCartStore, InMemoryCatalogStore, InMemoryOrderStore};
pub use postgres::{PgCartStore, PgCatalogStore, PgOrderStore};

/// Terminal result the reconciler writes for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentVerdict {
  Completed,
  Failed,
}

impl PaymentVerdict {
  pub fn payment_status(self) -> PaymentStatus {
    match self {
      PaymentVerdict::Completed => PaymentStatus::Completed,
      PaymentVerdict::Failed => PaymentStatus::Failed,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettleOutcome {
  /// This call moved the order out of pending.
  Applied(Order),
  /// Another delivery got there first; the stored state is returned untouched.
  AlreadySettled(Order),
  NoMatch,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
  /// Current unit prices; ids with no product are absent from the map.
  async fn unit_prices(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  async fn lines_for_user(&self, user_id: Uuid) -> Result<Vec<CartItem>>;

  /// Returns the number of deleted lines. Clearing an empty cart is `Ok(0)`.
  async fn clear_for_user(&self, user_id: Uuid) -> Result<u64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Writes the order and all its items together, or nothing.
  async fn create_with_items(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<Order>;

  async fn get(&self, order_id: Uuid) -> Result<Option<Order>>;

  async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItem>>;

  async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;

  async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Order>>;

  /// Sets `external_transaction_id` only if it is still null. `false` means it was already set.
  async fn attach_transaction_id(&self, order_id: Uuid, transaction_id: &str) -> Result<bool>;

  /// pending -> processing for a cash-on-delivery order; `None` if the order is not in that state.
  async fn confirm_cash_on_delivery(&self, order_id: Uuid) -> Result<Option<Order>>;

  /// Compare-and-set on `payment_status = pending` for the gateway order owning `transaction_id`.
  async fn settle_payment(&self, transaction_id: &str, verdict: PaymentVerdict) -> Result<SettleOutcome>;
}
