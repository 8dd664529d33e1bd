// storefront/src/models/callback.rs

use crate::errors::AppError;
use serde::Deserialize;

/// Raw parameters the gateway attaches to its callback, from the query string or a form body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
  #[serde(rename = "paymentID", alias = "paymentId")]
  pub payment_id: Option<String>,
  #[serde(rename = "transactionId")]
  pub transaction_id: Option<String>,
  pub status: Option<String>,
}

impl CallbackParams {
  /// Fields present in `self` win; gaps are filled from `fallback`.
  pub fn or(self, fallback: CallbackParams) -> CallbackParams {
    CallbackParams {
      payment_id: self.payment_id.or(fallback.payment_id),
      transaction_id: self.transaction_id.or(fallback.transaction_id),
      status: self.status.or(fallback.status),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedStatus {
  Success,
  Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedCallback {
  MissingTransactionId,
  UnrecognisedStatus {
    transaction_id: String,
    status: Option<String>,
  },
}

impl From<MalformedCallback> for AppError {
  fn from(malformed: MalformedCallback) -> Self {
    match malformed {
      MalformedCallback::MissingTransactionId => AppError::MissingCorrelation,
      MalformedCallback::UnrecognisedStatus { transaction_id, status } => AppError::MalformedCallback(format!(
        "unrecognised status {:?} for transaction {}",
        status.unwrap_or_default(),
        transaction_id
      )),
    }
  }
}

/// Callback parameters after boundary parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
  Success(String),
  Failure(String),
  Malformed(MalformedCallback),
}

impl CallbackOutcome {
  pub fn parse(params: &CallbackParams) -> CallbackOutcome {
    fn present(field: &Option<String>) -> Option<&str> {
      field.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
    let transaction_id = present(&params.payment_id).or_else(|| present(&params.transaction_id));
    let Some(transaction_id) = transaction_id else {
      return CallbackOutcome::Malformed(MalformedCallback::MissingTransactionId);
    };

    let status = params.status.as_deref().map(|s| s.trim().to_ascii_lowercase());
    match status.as_deref() {
      Some("success") => CallbackOutcome::Success(transaction_id.to_string()),
      Some("failure" | "failed" | "cancel" | "cancelled") => CallbackOutcome::Failure(transaction_id.to_string()),
      _ => CallbackOutcome::Malformed(MalformedCallback::UnrecognisedStatus {
        transaction_id: transaction_id.to_string(),
        status: params.status.clone(),
      }),
    }
  }

  /// `(transaction_id, reported)` for well-formed callbacks.
  pub fn into_report(self) -> Result<(String, ReportedStatus), MalformedCallback> {
    match self {
      CallbackOutcome::Success(tx) => Ok((tx, ReportedStatus::Success)),
      CallbackOutcome::Failure(tx) => Ok((tx, ReportedStatus::Failure)),
      CallbackOutcome::Malformed(reason) => Err(reason),
    }
  }
}
