// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use souk_flow::FlowError;
use thiserror::Error;
use uuid::Uuid;

use crate::services::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Invalid Cart: {0}")]
  InvalidCart(String),

  #[error("Callback is missing its transaction id")]
  MissingCorrelation,

  #[error("Malformed Callback: {0}")]
  MalformedCallback(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  /// The order row exists and stays pending/pending; the caller may retry initiation.
  #[error("Payment initiation failed for order {order_id}: {source}")]
  PaymentInitiation {
    order_id: Uuid,
    #[source]
    source: GatewayError,
  },

  #[error("Payment Gateway Error: {0}")]
  Gateway(#[from] GatewayError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::InvalidCart(_) | AppError::MissingCorrelation | AppError::MalformedCallback(_) => {
        StatusCode::BAD_REQUEST
      }
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::PaymentInitiation { .. } | AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Migrate(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }

    let body = match self {
      AppError::Validation(m) | AppError::InvalidCart(m) | AppError::MalformedCallback(m) => json!({"error": m}),
      AppError::MissingCorrelation => json!({"error": "transaction id is required"}),
      AppError::Auth(m) | AppError::NotFound(m) | AppError::Conflict(m) => json!({"error": m}),
      AppError::PaymentInitiation { order_id, source } => json!({
        "error": "Payment could not be initiated; the order is kept and payment can be retried",
        "orderId": order_id,
        "detail": source.to_string(),
      }),
      AppError::Gateway(e) => json!({"error": "Payment provider error", "detail": e.to_string()}),
      AppError::Config(m) => json!({"error": "Configuration issue", "detail": m}),
      AppError::Sqlx(_) | AppError::Migrate(_) => json!({"error": "Database operation failed"}),
      AppError::Workflow { source } => {
        tracing::error!(flow_error = ?source, "Workflow error details");
        json!({"error": "Workflow processing error"})
      }
      AppError::Internal(m) => json!({"error": "An internal error occurred", "detail": m}),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
