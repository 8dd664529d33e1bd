// storefront/src/web/handlers/payment_handlers.rs

use actix_web::http::header;
use actix_web::{web, Either, HttpResponse};
use serde_json::json;
use souk_flow::ContextData;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{CallbackOutcome, CallbackParams};
use crate::pipelines::contexts::CallbackCtxData;
use crate::state::AppState;

#[instrument(name = "handler::payment_callback_get", skip(app_state, query))]
pub async fn payment_callback_get_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CallbackParams>,
) -> Result<HttpResponse, AppError> {
  reconcile_callback(&app_state, query.into_inner()).await
}

/// The body may be a form or JSON. Body fields win over query parameters when both are present.
#[instrument(name = "handler::payment_callback_post", skip(app_state, query, body))]
pub async fn payment_callback_post_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CallbackParams>,
  body: Option<Either<web::Form<CallbackParams>, web::Json<CallbackParams>>>,
) -> Result<HttpResponse, AppError> {
  let params = match body {
    Some(Either::Left(form)) => form.into_inner().or(query.into_inner()),
    Some(Either::Right(json)) => json.into_inner().or(query.into_inner()),
    None => query.into_inner(),
  };
  reconcile_callback(&app_state, params).await
}

async fn reconcile_callback(app_state: &AppState, params: CallbackParams) -> Result<HttpResponse, AppError> {
  let (transaction_id, reported) = CallbackOutcome::parse(&params).into_report()?;
  info!(transaction_id = %transaction_id, reported = ?reported, "Payment callback received.");

  let ctx_data = ContextData::new(CallbackCtxData::new(app_state.clone(), transaction_id.clone(), reported));
  app_state.flows.run(ctx_data.clone()).await?;

  let guard = ctx_data.read();
  if guard.order.is_none() {
    // Acknowledged so the gateway stops re-delivering.
    return Ok(HttpResponse::Ok().json(json!({
      "status": "acknowledged",
      "matched": false,
      "transactionId": transaction_id,
    })));
  }

  let location = guard
    .redirect_url
    .clone()
    .ok_or_else(|| AppError::Internal("callback finished without a redirect target".to_string()))?;
  Ok(HttpResponse::Found().insert_header((header::LOCATION, location)).finish())
}
