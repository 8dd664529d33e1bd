// storefront/tests/place_order_tests.rs
mod common;

use common::{line, CreateScript, Harness};
use rust_decimal_macros::dec;
use souk_flow::ContextData;
use souk_storefront::errors::AppError;
use souk_storefront::models::{OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress};
use souk_storefront::pipelines::contexts::{PlaceOrderCtxData, RetryPaymentCtxData};
use souk_storefront::stores::{CartStore, OrderStore};
use uuid::Uuid;

#[tokio::test]
async fn cash_on_delivery_order_is_processing_and_clears_cart() {
  let h = Harness::new();
  let user = Uuid::new_v4();
  let product = h.catalog.add_product("Panjabi", dec!(500)).await;
  h.carts.add_line(user, product, 2).await;

  let ctx = h
    .place_order(user, Some(vec![line(product, 2)]), PaymentMethod::CashOnDelivery)
    .await
    .unwrap();

  let guard = ctx.read();
  let order = guard.order.as_ref().unwrap();
  assert_eq!(order.total_amount, dec!(1000));
  assert_eq!(order.status, OrderStatus::Processing);
  assert_eq!(order.payment_status, PaymentStatus::Pending);
  assert!(order.external_transaction_id.is_none());
  assert!(guard.payment_session.is_none());
  assert!(guard.cart_cleared);
  assert!(h.carts.lines_for_user(user).await.unwrap().is_empty());
  assert_eq!(h.gateway.creates(), 0);
}

#[tokio::test]
async fn gateway_order_stores_transaction_id_and_keeps_cart() {
  let h = Harness::new();
  let user = Uuid::new_v4();
  let product = h.catalog.add_product("Saree", dec!(1000)).await;
  h.carts.add_line(user, product, 1).await;
  h.gateway.push_create(CreateScript::Session("TXN1"));

  let ctx = h
    .place_order(user, Some(vec![line(product, 1)]), PaymentMethod::Gateway)
    .await
    .unwrap();

  let (order_id, redirect) = {
    let guard = ctx.read();
    let session = guard.payment_session.as_ref().unwrap();
    assert_eq!(session.transaction_id, "TXN1");
    assert!(!guard.cart_cleared);
    (guard.order.as_ref().unwrap().id, session.redirect_url.clone())
  };
  assert_eq!(redirect, "https://gateway.test/pay/TXN1");

  let stored = h.orders.get(order_id).await.unwrap().unwrap();
  assert_eq!(stored.external_transaction_id.as_deref(), Some("TXN1"));
  assert_eq!(stored.status, OrderStatus::Pending);
  assert_eq!(stored.payment_status, PaymentStatus::Pending);
  assert_eq!(h.carts.lines_for_user(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn gateway_rejection_keeps_order_pending_without_transaction() {
  let h = Harness::new();
  let user = Uuid::new_v4();
  let product = h.catalog.add_product("Lungi", dec!(350)).await;
  h.gateway.push_create(CreateScript::Reject);

  let result = h.place_order(user, Some(vec![line(product, 1)]), PaymentMethod::Gateway).await;

  let Err(AppError::PaymentInitiation { order_id, .. }) = result else {
    panic!("expected PaymentInitiation, got {:?}", result.map(|_| ()));
  };
  let stored = h.orders.get(order_id).await.unwrap().unwrap();
  assert_eq!(stored.status, OrderStatus::Pending);
  assert_eq!(stored.payment_status, PaymentStatus::Pending);
  assert!(stored.external_transaction_id.is_none());
  assert_eq!(h.orders.items_for(order_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_cart_is_rejected_before_anything_is_written() {
  let h = Harness::new();

  let result = h.place_order(Uuid::new_v4(), Some(vec![]), PaymentMethod::Gateway).await;

  assert!(matches!(result, Err(AppError::InvalidCart(_))));
  assert_eq!(h.orders.order_count().await, 0);
  assert_eq!(h.gateway.creates(), 0);
}

#[tokio::test]
async fn unknown_product_and_bad_quantity_are_validation_errors() {
  let h = Harness::new();
  let user = Uuid::new_v4();
  let product = h.catalog.add_product("Gamcha", dec!(120)).await;

  let unknown = h
    .place_order(user, Some(vec![line(Uuid::new_v4(), 1)]), PaymentMethod::CashOnDelivery)
    .await;
  assert!(matches!(unknown, Err(AppError::Validation(msg)) if msg.contains("not in the catalog")));

  let zero = h.place_order(user, Some(vec![line(product, 0)]), PaymentMethod::CashOnDelivery).await;
  assert!(matches!(zero, Err(AppError::Validation(_))));

  let duplicate = h
    .place_order(user, Some(vec![line(product, 1), line(product, 2)]), PaymentMethod::CashOnDelivery)
    .await;
  assert!(matches!(duplicate, Err(AppError::Validation(msg)) if msg.contains("more than once")));

  assert_eq!(h.orders.order_count().await, 0);
}

#[tokio::test]
async fn blank_shipping_field_is_rejected() {
  let h = Harness::new();
  let product = h.catalog.add_product("Tupi", dec!(80)).await;
  let ctx = ContextData::new(PlaceOrderCtxData::new(
    h.state.clone(),
    Uuid::new_v4(),
    Some(vec![line(product, 1)]),
    ShippingAddress {
      city: "   ".to_string(),
      ..common::address()
    },
    PaymentMethod::CashOnDelivery,
  ));

  let result = h.state.flows.run(ctx).await;

  assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("city")));
}

#[tokio::test]
async fn item_prices_are_frozen_at_order_time() {
  let h = Harness::new();
  let user = Uuid::new_v4();
  let shirt = h.catalog.add_product("Shirt", dec!(750.50)).await;
  let socks = h.catalog.add_product("Socks", dec!(99.99)).await;

  let ctx = h
    .place_order(
      user,
      Some(vec![line(shirt, 1), line(socks, 3)]),
      PaymentMethod::CashOnDelivery,
    )
    .await
    .unwrap();
  let order_id = ctx.read().order.as_ref().unwrap().id;

  h.catalog.set_price(shirt, dec!(900)).await;

  let order = h.orders.get(order_id).await.unwrap().unwrap();
  assert_eq!(order.total_amount, dec!(1050.47));
  let items = h.orders.items_for(order_id).await.unwrap();
  assert_eq!(items.len(), 2);
  let shirt_item = items.iter().find(|i| i.product_id == shirt).unwrap();
  assert_eq!(shirt_item.unit_price, dec!(750.50));
}

#[tokio::test]
async fn persisted_cart_is_used_when_request_has_no_lines() {
  let h = Harness::new();
  let user = Uuid::new_v4();
  let product = h.catalog.add_product("Kurta", dec!(1200)).await;
  h.carts.add_line(user, product, 2).await;

  let ctx = h.place_order(user, None, PaymentMethod::CashOnDelivery).await.unwrap();

  let guard = ctx.read();
  assert_eq!(guard.cart_lines.len(), 1);
  assert_eq!(guard.order.as_ref().unwrap().total_amount, dec!(2400));
}

#[tokio::test]
async fn empty_persisted_cart_is_invalid() {
  let h = Harness::new();

  let result = h.place_order(Uuid::new_v4(), None, PaymentMethod::Gateway).await;

  assert!(matches!(result, Err(AppError::InvalidCart(_))));
}

#[tokio::test]
async fn payment_can_be_retried_after_failed_initiation() {
  let h = Harness::new();
  let user = Uuid::new_v4();
  let product = h.catalog.add_product("Shawl", dec!(2200)).await;
  h.gateway.push_create(CreateScript::Reject);
  h.gateway.push_create(CreateScript::Session("TXN-RETRY"));

  let Err(AppError::PaymentInitiation { order_id, .. }) =
    h.place_order(user, Some(vec![line(product, 1)]), PaymentMethod::Gateway).await
  else {
    panic!("first initiation should fail");
  };

  let retry = ContextData::new(RetryPaymentCtxData::new(h.state.clone(), user, order_id));
  h.state.flows.run(retry.clone()).await.unwrap();

  assert_eq!(
    retry.read().payment_session.as_ref().unwrap().transaction_id,
    "TXN-RETRY"
  );
  let stored = h.orders.get(order_id).await.unwrap().unwrap();
  assert_eq!(stored.external_transaction_id.as_deref(), Some("TXN-RETRY"));
  assert_eq!(h.orders.order_count().await, 1);
}

#[tokio::test]
async fn retry_is_refused_once_a_session_exists_or_for_other_users() {
  let h = Harness::new();
  let user = Uuid::new_v4();
  let product = h.catalog.add_product("Cap", dec!(150)).await;
  let ctx = h
    .place_order(user, Some(vec![line(product, 1)]), PaymentMethod::Gateway)
    .await
    .unwrap();
  let order_id = ctx.read().order.as_ref().unwrap().id;

  let again = ContextData::new(RetryPaymentCtxData::new(h.state.clone(), user, order_id));
  assert!(matches!(h.state.flows.run(again).await, Err(AppError::Conflict(_))));

  let stranger = ContextData::new(RetryPaymentCtxData::new(h.state.clone(), Uuid::new_v4(), order_id));
  assert!(matches!(h.state.flows.run(stranger).await, Err(AppError::NotFound(_))));

  assert_eq!(h.gateway.creates(), 1);
}

#[tokio::test]
async fn total_beyond_stored_precision_is_rejected() {
  let h = Harness::new();
  let user = Uuid::new_v4();
  let generator = h.catalog.add_product("Generator", dec!(5000000000)).await;

  let result = h
    .place_order(user, Some(vec![line(generator, 3)]), PaymentMethod::CashOnDelivery)
    .await;

  assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("exceeds the maximum")));
  assert_eq!(h.orders.order_count().await, 0);

  let ok = h
    .place_order(user, Some(vec![line(generator, 1)]), PaymentMethod::CashOnDelivery)
    .await
    .unwrap();
  assert_eq!(ok.read().order.as_ref().unwrap().total_amount, dec!(5000000000));
}
