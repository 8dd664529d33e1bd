// storefront/src/stores/postgres.rs

use super::{CartStore, CatalogStore, OrderStore, PaymentVerdict, SettleOutcome};
use crate::errors::{AppError, Result};
use crate::models::{CartItem, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, user_id, total_amount, status, payment_status, payment_method, \
   external_transaction_id, shipping_address, created_at, updated_at";

fn unique_violation_as_conflict(err: sqlx::Error, what: &str) -> AppError {
  match &err {
    sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict(what.to_string()),
    _ => AppError::Sqlx(err),
  }
}

#[derive(Clone)]
pub struct PgCatalogStore {
  pool: PgPool,
}

impl PgCatalogStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
  async fn unit_prices(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>> {
    let rows: Vec<(Uuid, Decimal)> = sqlx::query_as("SELECT id, price FROM products WHERE id = ANY($1)")
      .bind(product_ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows.into_iter().collect())
  }
}

#[derive(Clone)]
pub struct PgCartStore {
  pool: PgPool,
}

impl PgCartStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CartStore for PgCartStore {
  async fn lines_for_user(&self, user_id: Uuid) -> Result<Vec<CartItem>> {
    let items = sqlx::query_as::<_, CartItem>(
      "SELECT id, user_id, product_id, quantity, added_at FROM cart_items WHERE user_id = $1 ORDER BY added_at",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  async fn clear_for_user(&self, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }
}

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "order_store::create_with_items", skip(self, order, items), fields(order_id = %order.id, item_count = items.len()))]
  async fn create_with_items(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<Order> {
    let mut tx = self.pool.begin().await?;

    let stored = sqlx::query_as::<_, Order>(&format!(
      "INSERT INTO orders (id, user_id, total_amount, payment_method, shipping_address) \
       VALUES ($1, $2, $3, $4, $5) RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.total_amount)
    .bind(order.payment_method)
    .bind(&order.shipping_address)
    .fetch_one(&mut *tx)
    .await?;

    for item in &items {
      sqlx::query(
        "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4, $5)",
      )
      .bind(Uuid::new_v4())
      .bind(stored.id)
      .bind(item.product_id)
      .bind(item.quantity)
      .bind(item.unit_price)
      .execute(&mut *tx)
      .await?;
    }

    // An early return above drops `tx`, which rolls the order row back.
    tx.commit().await?;
    debug!("order and items committed");
    Ok(stored)
  }

  async fn get(&self, order_id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(order)
  }

  async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
      "SELECT id, order_id, product_id, quantity, unit_price FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(orders)
  }

  async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
      "SELECT {ORDER_COLUMNS} FROM orders WHERE external_transaction_id = $1"
    ))
    .bind(transaction_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(order)
  }

  #[instrument(name = "order_store::attach_transaction_id", skip(self), fields(order_id = %order_id, transaction_id = %transaction_id))]
  async fn attach_transaction_id(&self, order_id: Uuid, transaction_id: &str) -> Result<bool> {
    let result = sqlx::query(
      "UPDATE orders SET external_transaction_id = $2, updated_at = NOW() \
       WHERE id = $1 AND external_transaction_id IS NULL",
    )
    .bind(order_id)
    .bind(transaction_id)
    .execute(&self.pool)
    .await
    .map_err(|e| unique_violation_as_conflict(e, "transaction id already belongs to another order"))?;
    Ok(result.rows_affected() == 1)
  }

  #[instrument(name = "order_store::confirm_cash_on_delivery", skip(self), fields(order_id = %order_id))]
  async fn confirm_cash_on_delivery(&self, order_id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
      "UPDATE orders SET status = 'processing', updated_at = NOW() \
       WHERE id = $1 AND payment_method = 'cash_on_delivery' AND status = 'pending' \
       RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(order)
  }

  #[instrument(name = "order_store::settle_payment", skip(self), fields(transaction_id = %transaction_id, verdict = ?verdict))]
  async fn settle_payment(&self, transaction_id: &str, verdict: PaymentVerdict) -> Result<SettleOutcome> {
    let next_status: Option<OrderStatus> = match verdict {
      PaymentVerdict::Completed => Some(OrderStatus::Processing),
      PaymentVerdict::Failed => None,
    };

    let applied = sqlx::query_as::<_, Order>(&format!(
      "UPDATE orders SET payment_status = $2, status = COALESCE($3::order_status_enum, status), updated_at = NOW() \
       WHERE external_transaction_id = $1 AND payment_method = 'gateway' AND payment_status = 'pending' \
       RETURNING {ORDER_COLUMNS}"
    ))
    .bind(transaction_id)
    .bind(verdict.payment_status())
    .bind(next_status)
    .fetch_optional(&self.pool)
    .await?;

    if let Some(order) = applied {
      return Ok(SettleOutcome::Applied(order));
    }
    match self.find_by_transaction_id(transaction_id).await? {
      Some(order) => Ok(SettleOutcome::AlreadySettled(order)),
      None => Ok(SettleOutcome::NoMatch),
    }
  }
}
