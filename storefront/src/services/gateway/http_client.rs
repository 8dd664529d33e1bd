// storefront/src/services/gateway/http_client.rs

use super::{AccessToken, ExecutionOutcome, GatewayError, PaymentGateway, PaymentSession, PaymentSessionRequest};
use crate::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

const SUCCESS_CODE: &str = "0000";
const COMPLETED: &str = "Completed";
const CHECKOUT_MODE: &str = "0011";
const INTENT_SALE: &str = "sale";

#[derive(Serialize)]
struct GrantRequest<'a> {
  app_key: &'a str,
  app_secret: &'a str,
}

#[derive(Deserialize)]
struct GrantResponse {
  id_token: Option<String>,
  #[serde(rename = "statusMessage", alias = "msg")]
  status_message: Option<String>,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
  mode: &'a str,
  #[serde(rename = "payerReference")]
  payer_reference: &'a str,
  #[serde(rename = "callbackURL")]
  callback_url: &'a str,
  amount: String,
  currency: &'a str,
  intent: &'a str,
  #[serde(rename = "merchantInvoiceNumber")]
  merchant_invoice_number: &'a str,
}

#[derive(Deserialize)]
struct CreateResponse {
  #[serde(rename = "statusCode", alias = "errorCode")]
  status_code: Option<String>,
  #[serde(rename = "statusMessage", alias = "errorMessage")]
  status_message: Option<String>,
  #[serde(rename = "paymentID")]
  payment_id: Option<String>,
  #[serde(rename = "bkashURL")]
  redirect_url: Option<String>,
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
  #[serde(rename = "paymentID")]
  payment_id: &'a str,
}

#[derive(Deserialize)]
struct ExecuteResponse {
  #[serde(rename = "statusCode", alias = "errorCode")]
  status_code: Option<String>,
  #[serde(rename = "statusMessage", alias = "errorMessage")]
  status_message: Option<String>,
  #[serde(rename = "transactionStatus")]
  transaction_status: Option<String>,
  #[serde(rename = "trxID")]
  trx_id: Option<String>,
}

/// reqwest client for the tokenized-checkout API. Every request carries the configured timeout.
pub struct HttpGatewayClient {
  client: reqwest::Client,
  base_url: String,
  app_key: String,
  app_secret: String,
  username: String,
  password: String,
  currency: String,
}

impl HttpGatewayClient {
  pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
    let client = reqwest::Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| GatewayError::Request(format!("failed to build HTTP client: {e}")))?;

    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      app_key: config.app_key.clone(),
      app_secret: config.app_secret.clone(),
      username: config.username.clone(),
      password: config.password.clone(),
      currency: config.currency.clone(),
    })
  }

  fn endpoint(&self, path: &str) -> String {
    format!("{}/tokenized/checkout/{}", self.base_url, path)
  }

  fn authorized(&self, path: &str, token: &AccessToken) -> RequestBuilder {
    self
      .client
      .post(self.endpoint(path))
      .header("Accept", "application/json")
      .header("Authorization", token.0.as_str())
      .header("X-App-Key", self.app_key.as_str())
  }

  async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<(StatusCode, String), GatewayError> {
    let response = request.send().await.map_err(|e| transport_error(operation, e))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| transport_error(operation, e))?;
    debug!(operation, status = %status, "gateway response received");
    Ok((status, body))
  }
}

fn transport_error(operation: &'static str, err: reqwest::Error) -> GatewayError {
  if err.is_timeout() {
    warn!(operation, "gateway call timed out");
    GatewayError::Timeout { operation }
  } else {
    GatewayError::Request(format!("{operation}: {err}"))
  }
}

/// Amounts go over the wire with exactly two decimal places.
pub(crate) fn format_amount(amount: Decimal) -> String {
  format!(
    "{:.2}",
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
  )
}

fn describe(code: Option<&str>, message: Option<&str>) -> String {
  format!("{} {}", code.unwrap_or("no-code"), message.unwrap_or("no message")).trim().to_string()
}

#[async_trait]
impl PaymentGateway for HttpGatewayClient {
  #[instrument(name = "gateway::acquire_access_token", skip(self))]
  async fn acquire_access_token(&self) -> Result<AccessToken, GatewayError> {
    let request = self
      .client
      .post(self.endpoint("token/grant"))
      .header("Accept", "application/json")
      .header("username", self.username.as_str())
      .header("password", self.password.as_str())
      .json(&GrantRequest {
        app_key: &self.app_key,
        app_secret: &self.app_secret,
      });
    let (status, body) = self.send("token_grant", request).await?;

    if !status.is_success() {
      return Err(GatewayError::Auth(format!("token grant returned HTTP {status}")));
    }
    let parsed: GrantResponse =
      serde_json::from_str(&body).map_err(|e| GatewayError::Auth(format!("malformed token grant response: {e}")))?;
    match parsed.id_token.filter(|t| !t.is_empty()) {
      Some(token) => Ok(AccessToken(token)),
      None => Err(GatewayError::Auth(format!(
        "token grant response carried no id_token ({})",
        parsed.status_message.unwrap_or_default()
      ))),
    }
  }

  #[instrument(
    name = "gateway::create_payment_session",
    skip(self, request),
    fields(merchant_order_id = %request.merchant_order_id, amount = %request.amount)
  )]
  async fn create_payment_session(&self, request: &PaymentSessionRequest) -> Result<PaymentSession, GatewayError> {
    let token = self.acquire_access_token().await?;
    let body = CreateRequest {
      mode: CHECKOUT_MODE,
      payer_reference: &request.payer_reference,
      callback_url: &request.callback_url,
      amount: format_amount(request.amount),
      currency: &self.currency,
      intent: INTENT_SALE,
      merchant_invoice_number: &request.merchant_order_id,
    };
    let (status, raw) = self.send("create_payment", self.authorized("create", &token).json(&body)).await?;

    if !status.is_success() {
      return Err(GatewayError::Request(format!("create payment returned HTTP {status}: {raw}")));
    }
    let parsed: CreateResponse = serde_json::from_str(&raw)
      .map_err(|e| GatewayError::Request(format!("malformed create payment response: {e}")))?;
    if parsed.status_code.as_deref() != Some(SUCCESS_CODE) {
      return Err(GatewayError::Request(format!(
        "create payment rejected: {}",
        describe(parsed.status_code.as_deref(), parsed.status_message.as_deref())
      )));
    }
    match (parsed.payment_id, parsed.redirect_url) {
      (Some(transaction_id), Some(redirect_url)) if !transaction_id.is_empty() => {
        info!(transaction_id = %transaction_id, "payment session created");
        Ok(PaymentSession {
          transaction_id,
          redirect_url,
        })
      }
      _ => Err(GatewayError::Request(
        "create payment response is missing paymentID or redirect URL".to_string(),
      )),
    }
  }

  #[instrument(name = "gateway::execute_payment", skip(self), fields(transaction_id = %transaction_id))]
  async fn execute_payment(&self, transaction_id: &str) -> Result<ExecutionOutcome, GatewayError> {
    let token = self.acquire_access_token().await?;
    let request = self.authorized("execute", &token).json(&ExecuteRequest {
      payment_id: transaction_id,
    });
    let (status, raw) = self.send("execute_payment", request).await?;

    if !status.is_success() {
      return Err(GatewayError::Request(format!("execute payment returned HTTP {status}: {raw}")));
    }
    let parsed: ExecuteResponse = serde_json::from_str(&raw)
      .map_err(|e| GatewayError::Request(format!("malformed execute payment response: {e}")))?;

    let outcome = if parsed.status_code.as_deref() == Some(SUCCESS_CODE) {
      match parsed.transaction_status.as_deref() {
        Some(COMPLETED) => ExecutionOutcome::Completed {
          provider_trx_id: parsed.trx_id,
        },
        other => ExecutionOutcome::Indeterminate {
          status: other.unwrap_or("missing transactionStatus").to_string(),
        },
      }
    } else {
      ExecutionOutcome::Declined {
        status: describe(parsed.status_code.as_deref(), parsed.status_message.as_deref()),
      }
    };
    info!(outcome = ?outcome, "payment execution classified");
    Ok(outcome)
  }
}
