// storefront/src/web/extractors.rs

use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;

/// Caller identity taken from the `X-User-ID` header.
///
/// Identity is owned by an upstream provider; this service only trusts the header it forwards.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

pub const USER_ID_HEADER: &str = "X-User-ID";

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let user_id = req
      .headers()
      .get(USER_ID_HEADER)
      .and_then(|value| value.to_str().ok())
      .and_then(|raw| Uuid::parse_str(raw.trim()).ok());

    match user_id {
      Some(user_id) => ready(Ok(AuthenticatedUser { user_id })),
      None => {
        warn!("Missing or invalid X-User-ID header.");
        ready(Err(AppError::Auth("missing or invalid X-User-ID header".to_string())))
      }
    }
  }
}
