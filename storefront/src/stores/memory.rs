// storefront/src/stores/memory.rs

use super::{CartStore, CatalogStore, OrderStore, PaymentVerdict, SettleOutcome};
use crate::errors::{AppError, Result};
use crate::models::{
  CartItem, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Product,
};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Product catalog held in memory. Used by tests and by local runs without a database.
#[derive(Default, Clone)]
pub struct InMemoryCatalogStore {
  products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryCatalogStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts a product with the given price and returns its id.
  pub async fn add_product(&self, name: &str, price: Decimal) -> Uuid {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      name: name.to_string(),
      description: None,
      price,
      stock_quantity: 100,
      created_at: now,
      updated_at: now,
    };
    let id = product.id;
    self.products.write().await.insert(id, product);
    id
  }

  pub async fn set_price(&self, product_id: Uuid, price: Decimal) -> bool {
    match self.products.write().await.get_mut(&product_id) {
      Some(product) => {
        product.price = price;
        product.updated_at = Utc::now();
        true
      }
      None => false,
    }
  }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
  async fn unit_prices(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>> {
    let products = self.products.read().await;
    Ok(
      product_ids
        .iter()
        .filter_map(|id| products.get(id).map(|p| (*id, p.price)))
        .collect(),
    )
  }
}

#[derive(Default, Clone)]
pub struct InMemoryCartStore {
  lines: Arc<RwLock<HashMap<Uuid, Vec<CartItem>>>>,
}

impl InMemoryCartStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Upserts a line; adding a product already in the cart replaces its quantity.
  pub async fn add_line(&self, user_id: Uuid, product_id: Uuid, quantity: i32) {
    let mut lines = self.lines.write().await;
    let cart = lines.entry(user_id).or_default();
    match cart.iter_mut().find(|item| item.product_id == product_id) {
      Some(item) => item.quantity = quantity,
      None => cart.push(CartItem {
        id: Uuid::new_v4(),
        user_id,
        product_id,
        quantity,
        added_at: Utc::now(),
      }),
    }
  }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
  async fn lines_for_user(&self, user_id: Uuid) -> Result<Vec<CartItem>> {
    Ok(self.lines.read().await.get(&user_id).cloned().unwrap_or_default())
  }

  async fn clear_for_user(&self, user_id: Uuid) -> Result<u64> {
    let removed = self.lines.write().await.remove(&user_id).unwrap_or_default();
    Ok(removed.len() as u64)
  }
}

#[derive(Default)]
struct OrderTables {
  orders: HashMap<Uuid, Order>,
  items: HashMap<Uuid, Vec<OrderItem>>,
}

impl OrderTables {
  fn by_transaction_id(&self, transaction_id: &str) -> Option<&Order> {
    self
      .orders
      .values()
      .find(|o| o.external_transaction_id.as_deref() == Some(transaction_id))
  }
}

/// Orders and items behind one lock, so every write below is atomic the way
/// the Postgres statements are.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
  tables: Arc<RwLock<OrderTables>>,
}

impl InMemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn order_count(&self) -> usize {
    self.tables.read().await.orders.len()
  }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
  async fn create_with_items(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<Order> {
    // Same checks the table constraints enforce.
    if order.total_amount <= Decimal::ZERO {
      return Err(AppError::Validation("order total must be positive".to_string()));
    }
    if let Some(bad) = items.iter().find(|i| i.quantity < 1 || i.unit_price <= Decimal::ZERO) {
      return Err(AppError::Validation(format!(
        "order item for product {} violates quantity/price constraints",
        bad.product_id
      )));
    }

    let mut tables = self.tables.write().await;
    if tables.orders.contains_key(&order.id) {
      return Err(AppError::Conflict(format!("order {} already exists", order.id)));
    }

    let now = Utc::now();
    let stored = Order {
      id: order.id,
      user_id: order.user_id,
      total_amount: order.total_amount,
      status: OrderStatus::Pending,
      payment_status: PaymentStatus::Pending,
      payment_method: order.payment_method,
      external_transaction_id: None,
      shipping_address: order.shipping_address,
      created_at: now,
      updated_at: now,
    };
    let stored_items = items
      .into_iter()
      .map(|item| OrderItem {
        id: Uuid::new_v4(),
        order_id: stored.id,
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price: item.unit_price,
      })
      .collect();

    tables.items.insert(stored.id, stored_items);
    tables.orders.insert(stored.id, stored.clone());
    Ok(stored)
  }

  async fn get(&self, order_id: Uuid) -> Result<Option<Order>> {
    Ok(self.tables.read().await.orders.get(&order_id).cloned())
  }

  async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    Ok(self.tables.read().await.items.get(&order_id).cloned().unwrap_or_default())
  }

  async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let tables = self.tables.read().await;
    let mut orders: Vec<Order> = tables.orders.values().filter(|o| o.user_id == user_id).cloned().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }

  async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Order>> {
    Ok(self.tables.read().await.by_transaction_id(transaction_id).cloned())
  }

  async fn attach_transaction_id(&self, order_id: Uuid, transaction_id: &str) -> Result<bool> {
    let mut tables = self.tables.write().await;
    if let Some(owner) = tables.by_transaction_id(transaction_id) {
      if owner.id != order_id {
        return Err(AppError::Conflict(format!(
          "transaction id {} already belongs to another order",
          transaction_id
        )));
      }
    }
    match tables.orders.get_mut(&order_id) {
      Some(order) if order.external_transaction_id.is_none() => {
        order.external_transaction_id = Some(transaction_id.to_string());
        order.updated_at = Utc::now();
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn confirm_cash_on_delivery(&self, order_id: Uuid) -> Result<Option<Order>> {
    let mut tables = self.tables.write().await;
    match tables.orders.get_mut(&order_id) {
      Some(order) if order.payment_method == PaymentMethod::CashOnDelivery && order.status == OrderStatus::Pending => {
        order.status = OrderStatus::Processing;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
      }
      _ => Ok(None),
    }
  }

  async fn settle_payment(&self, transaction_id: &str, verdict: PaymentVerdict) -> Result<SettleOutcome> {
    let mut tables = self.tables.write().await;
    let order = tables
      .orders
      .values_mut()
      .find(|o| o.external_transaction_id.as_deref() == Some(transaction_id));
    let Some(order) = order else {
      return Ok(SettleOutcome::NoMatch);
    };

    if order.payment_method != PaymentMethod::Gateway || order.payment_status != PaymentStatus::Pending {
      return Ok(SettleOutcome::AlreadySettled(order.clone()));
    }

    order.payment_status = verdict.payment_status();
    if verdict == PaymentVerdict::Completed {
      order.status = OrderStatus::Processing;
    }
    order.updated_at = Utc::now();
    Ok(SettleOutcome::Applied(order.clone()))
  }
}
