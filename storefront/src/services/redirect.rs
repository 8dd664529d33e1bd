// storefront/src/services/redirect.rs

use crate::errors::{AppError, Result};
use reqwest::Url;
use uuid::Uuid;

/// Appends `transactionId` and `orderId` to a configured success/failure page.
pub fn payment_result_url(base: &str, transaction_id: &str, order_id: Uuid) -> Result<String> {
  let mut url = Url::parse(base).map_err(|e| AppError::Config(format!("Invalid redirect URL '{}': {}", base, e)))?;
  url
    .query_pairs_mut()
    .append_pair("transactionId", transaction_id)
    .append_pair("orderId", &order_id.to_string());
  Ok(url.into())
}
