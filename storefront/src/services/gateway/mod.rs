// storefront/src/services/gateway/mod.rs

//! Payment gateway port and its tokenized-checkout HTTP implementation.
//!
//! The protocol is two-legged: every payment operation first obtains a fresh
//! bearer token, then calls the operation endpoint with it. Tokens are never
//! cached between operations.

pub mod http_client;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

pub use http_client::HttpGatewayClient;

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("GatewayAuthError: {0}")]
  Auth(String),

  #[error("GatewayRequestError: {0}")]
  Request(String),

  #[error("GatewayRequestError: {operation} timed out")]
  Timeout { operation: &'static str },
}

impl GatewayError {
  pub fn is_timeout(&self) -> bool {
    matches!(self, GatewayError::Timeout { .. })
  }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

impl fmt::Debug for AccessToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("AccessToken([REDACTED])")
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSessionRequest {
  pub amount: Decimal,
  pub merchant_order_id: String,
  pub payer_reference: String,
  pub callback_url: String,
}

/// A hosted payment page opened by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
  pub transaction_id: String,
  pub redirect_url: String,
}

/// Provider classification of an execute call. Only `Completed` settles an order as paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
  Completed { provider_trx_id: Option<String> },
  /// The provider answered with a rejection status code.
  Declined { status: String },
  /// Accepted by the provider but not in a completed state.
  Indeterminate { status: String },
}

impl ExecutionOutcome {
  pub fn is_completed(&self) -> bool {
    matches!(self, ExecutionOutcome::Completed { .. })
  }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn acquire_access_token(&self) -> Result<AccessToken, GatewayError>;

  /// Opens a payment session. A rejection is returned as an error and is not retried here.
  async fn create_payment_session(&self, request: &PaymentSessionRequest) -> Result<PaymentSession, GatewayError>;

  async fn execute_payment(&self, transaction_id: &str) -> Result<ExecutionOutcome, GatewayError>;
}
