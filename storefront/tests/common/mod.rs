// storefront/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use souk_flow::ContextData;
use souk_storefront::config::AppConfig;
use souk_storefront::errors::{AppError, Result};
use souk_storefront::models::{CartItem, CartLine, PaymentMethod, ReportedStatus, ShippingAddress};
use souk_storefront::pipelines::contexts::{CallbackCtxData, PlaceOrderCtxData};
use souk_storefront::services::gateway::{
  AccessToken, ExecutionOutcome, GatewayError, PaymentGateway, PaymentSession, PaymentSessionRequest,
};
use souk_storefront::state::AppState;
use souk_storefront::stores::{CartStore, InMemoryCartStore, InMemoryCatalogStore, InMemoryOrderStore};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const SUCCESS_URL: &str = "https://shop.test/payment/success";
pub const FAILURE_URL: &str = "https://shop.test/payment/failure";

pub fn test_config() -> AppConfig {
  AppConfig::from_lookup(|name| {
    let value = match name {
      "DATABASE_URL" => "postgres://unused@localhost/unused",
      "APP_BASE_URL" => "https://shop.test",
      "GATEWAY_BASE_URL" => "https://gateway.test",
      "GATEWAY_APP_KEY" => "key",
      "GATEWAY_APP_SECRET" => "secret",
      "GATEWAY_USERNAME" => "merchant",
      "GATEWAY_PASSWORD" => "merchant-pass",
      "PAYMENT_SUCCESS_URL" => SUCCESS_URL,
      "PAYMENT_FAILURE_URL" => FAILURE_URL,
      _ => return None,
    };
    Some(value.to_string())
  })
  .expect("test config is valid")
}

#[derive(Debug, Clone)]
pub enum CreateScript {
  Session(&'static str),
  Reject,
}

#[derive(Debug, Clone, Copy)]
pub enum ExecuteScript {
  Completed,
  Declined,
  Indeterminate,
  Timeout,
  TransportError,
}

/// Gateway double. `create` answers come from a queue; once it is empty each
/// call opens a session with a generated id. `execute` always answers with the
/// current script, after an optional delay.
pub struct ScriptedGateway {
  creates: Mutex<VecDeque<CreateScript>>,
  execute: Mutex<ExecuteScript>,
  execute_delay: Mutex<Option<Duration>>,
  pub create_calls: AtomicUsize,
  pub execute_calls: AtomicUsize,
}

impl Default for ScriptedGateway {
  fn default() -> Self {
    Self {
      creates: Mutex::new(VecDeque::new()),
      execute: Mutex::new(ExecuteScript::Completed),
      execute_delay: Mutex::new(None),
      create_calls: AtomicUsize::new(0),
      execute_calls: AtomicUsize::new(0),
    }
  }
}

impl ScriptedGateway {
  pub fn push_create(&self, script: CreateScript) {
    self.creates.lock().unwrap().push_back(script);
  }

  pub fn set_execute(&self, script: ExecuteScript) {
    *self.execute.lock().unwrap() = script;
  }

  pub fn set_execute_delay(&self, delay: Duration) {
    *self.execute_delay.lock().unwrap() = Some(delay);
  }

  pub fn creates(&self) -> usize {
    self.create_calls.load(Ordering::SeqCst)
  }

  pub fn executes(&self) -> usize {
    self.execute_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
  async fn acquire_access_token(&self) -> std::result::Result<AccessToken, GatewayError> {
    Ok(AccessToken("scripted-token".to_string()))
  }

  async fn create_payment_session(
    &self,
    request: &PaymentSessionRequest,
  ) -> std::result::Result<PaymentSession, GatewayError> {
    let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let script = self.creates.lock().unwrap().pop_front();
    let transaction_id = match script {
      Some(CreateScript::Session(id)) => id.to_string(),
      Some(CreateScript::Reject) => {
        return Err(GatewayError::Request(format!(
          "2001 invalid amount for {}",
          request.merchant_order_id
        )))
      }
      None => format!("TXN-AUTO-{}", n),
    };
    Ok(PaymentSession {
      redirect_url: format!("https://gateway.test/pay/{}", transaction_id),
      transaction_id,
    })
  }

  async fn execute_payment(&self, transaction_id: &str) -> std::result::Result<ExecutionOutcome, GatewayError> {
    self.execute_calls.fetch_add(1, Ordering::SeqCst);
    let delay = *self.execute_delay.lock().unwrap();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    let script = *self.execute.lock().unwrap();
    match script {
      ExecuteScript::Completed => Ok(ExecutionOutcome::Completed {
        provider_trx_id: Some(format!("PRV-{}", transaction_id)),
      }),
      ExecuteScript::Declined => Ok(ExecutionOutcome::Declined {
        status: "2056 insufficient balance".to_string(),
      }),
      ExecuteScript::Indeterminate => Ok(ExecutionOutcome::Indeterminate {
        status: "Initiated".to_string(),
      }),
      ExecuteScript::Timeout => Err(GatewayError::Timeout { operation: "execute" }),
      ExecuteScript::TransportError => Err(GatewayError::Request("connection reset".to_string())),
    }
  }
}

/// Reads work; clearing always fails.
pub struct FailingCartStore {
  pub inner: InMemoryCartStore,
}

#[async_trait]
impl CartStore for FailingCartStore {
  async fn lines_for_user(&self, user_id: Uuid) -> Result<Vec<CartItem>> {
    self.inner.lines_for_user(user_id).await
  }

  async fn clear_for_user(&self, _user_id: Uuid) -> Result<u64> {
    Err(AppError::Internal("cart table locked".to_string()))
  }
}

/// App state over in-memory stores plus handles to inspect them.
pub struct Harness {
  pub state: AppState,
  pub catalog: InMemoryCatalogStore,
  pub carts: InMemoryCartStore,
  pub orders: InMemoryOrderStore,
  pub gateway: Arc<ScriptedGateway>,
}

impl Harness {
  pub fn new() -> Self {
    let carts = InMemoryCartStore::new();
    Self::build(carts.clone(), Arc::new(carts))
  }

  /// Same as `new`, but clearing the cart fails.
  pub fn with_failing_cart_clear() -> Self {
    let carts = InMemoryCartStore::new();
    Self::build(carts.clone(), Arc::new(FailingCartStore { inner: carts }))
  }

  fn build(carts: InMemoryCartStore, cart_store: Arc<dyn CartStore>) -> Self {
    setup_tracing();
    let catalog = InMemoryCatalogStore::new();
    let orders = InMemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::default());
    let state = AppState::new(
      Arc::new(catalog.clone()),
      cart_store,
      Arc::new(orders.clone()),
      gateway.clone(),
      Arc::new(test_config()),
    );
    Self {
      state,
      catalog,
      carts,
      orders,
      gateway,
    }
  }

  pub async fn place_order(
    &self,
    user_id: Uuid,
    lines: Option<Vec<CartLine>>,
    method: PaymentMethod,
  ) -> Result<ContextData<PlaceOrderCtxData>> {
    let ctx = ContextData::new(PlaceOrderCtxData::new(
      self.state.clone(),
      user_id,
      lines,
      address(),
      method,
    ));
    self.state.flows.run(ctx.clone()).await?;
    Ok(ctx)
  }

  pub async fn callback(&self, transaction_id: &str, reported: ReportedStatus) -> Result<ContextData<CallbackCtxData>> {
    let ctx = ContextData::new(CallbackCtxData::new(
      self.state.clone(),
      transaction_id.to_string(),
      reported,
    ));
    self.state.flows.run(ctx.clone()).await?;
    Ok(ctx)
  }
}

pub fn address() -> ShippingAddress {
  ShippingAddress {
    name: "Rahim Uddin".to_string(),
    phone: "01700000000".to_string(),
    address_line: "House 12, Road 5".to_string(),
    city: "Dhaka".to_string(),
  }
}

pub fn line(product_id: Uuid, quantity: i32) -> CartLine {
  CartLine { product_id, quantity }
}
