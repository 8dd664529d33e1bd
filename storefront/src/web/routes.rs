// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{order_handlers, payment_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::place_order_handler))
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}/payment", web::post().to(order_handlers::retry_payment_handler)),
      )
      // The gateway redirects the browser here, so both verbs are accepted.
      .service(
        web::resource("/payments/callback")
          .route(web::get().to(payment_handlers::payment_callback_get_handler))
          .route(web::post().to(payment_handlers::payment_callback_post_handler)),
      ),
  );
}
