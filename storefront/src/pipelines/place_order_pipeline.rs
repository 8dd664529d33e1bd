// storefront/src/pipelines/place_order_pipeline.rs
use crate::errors::AppError;
use crate::models::{CartLine, NewOrder, NewOrderItem, PaymentMethod};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::pipelines::payment_initiation::open_payment_session;
use rust_decimal::Decimal;
use souk_flow::{ContextData, Flows, Pipeline, PipelineControl, SkipCondition};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Largest amount an `orders.total_amount NUMERIC(12,2)` column can hold.
fn max_order_total() -> Decimal {
  Decimal::new(999_999_999_999, 2)
}

pub fn register_place_order_pipeline(flows: &Flows<AppError>) {
  let lines_supplied: SkipCondition<PlaceOrderCtxData> =
    Arc::new(|ctx: ContextData<PlaceOrderCtxData>| ctx.with(|c| c.lines_from_request));
  let not_gateway: SkipCondition<PlaceOrderCtxData> =
    Arc::new(|ctx: ContextData<PlaceOrderCtxData>| ctx.with(|c| c.payment_method != PaymentMethod::Gateway));
  let not_cash_on_delivery: SkipCondition<PlaceOrderCtxData> =
    Arc::new(|ctx: ContextData<PlaceOrderCtxData>| ctx.with(|c| c.payment_method != PaymentMethod::CashOnDelivery));

  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    ("load_cart_snapshot", false, Some(lines_supplied)),
    ("validate_order_request", false, None),
    ("price_cart_lines", false, None),
    ("persist_order_with_items", false, None),
    ("initiate_gateway_payment", false, Some(not_gateway)),
    ("confirm_cash_on_delivery", false, Some(not_cash_on_delivery)),
  ]);

  // Step 1: read the persisted cart when the request did not carry one
  p.on_root("load_cart_snapshot", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (carts, user_id) = {
        let guard = ctx_data.read();
        (guard.app_state.carts.clone(), guard.user_id)
      };

      let lines: Vec<CartLine> = carts.lines_for_user(user_id).await?.iter().map(CartLine::from).collect();
      info!(user_id = %user_id, line_count = lines.len(), "Loaded persisted cart as order snapshot.");
      ctx_data.write().cart_lines = lines;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 2
  p.on_root("validate_order_request", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (lines, address) = {
        let guard = ctx_data.read();
        (guard.cart_lines.clone(), guard.shipping_address.clone())
      };

      if lines.is_empty() {
        return Err(AppError::InvalidCart("cart is empty".to_string()));
      }
      let mut seen = HashSet::with_capacity(lines.len());
      for line in &lines {
        if line.quantity < 1 {
          return Err(AppError::Validation(format!(
            "quantity for product {} must be at least 1",
            line.product_id
          )));
        }
        if !seen.insert(line.product_id) {
          return Err(AppError::Validation(format!(
            "product {} appears more than once in the cart",
            line.product_id
          )));
        }
      }
      address.validate()?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 3: unit prices are read now and frozen into the items
  p.on_root("price_cart_lines", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (catalog, lines) = {
        let guard = ctx_data.read();
        (guard.app_state.catalog.clone(), guard.cart_lines.clone())
      };

      let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
      let prices = catalog.unit_prices(&product_ids).await?;

      let mut items = Vec::with_capacity(lines.len());
      for line in &lines {
        let unit_price = prices
          .get(&line.product_id)
          .copied()
          .ok_or_else(|| AppError::Validation(format!("product {} is not in the catalog", line.product_id)))?;
        items.push(NewOrderItem {
          product_id: line.product_id,
          quantity: line.quantity,
          unit_price,
        });
      }
      let total_amount: Decimal = items.iter().map(NewOrderItem::line_total).sum();
      if total_amount <= Decimal::ZERO {
        return Err(AppError::Validation("order total must be positive".to_string()));
      }
      if total_amount > max_order_total() {
        return Err(AppError::Validation(format!(
          "order total {} exceeds the maximum of {}",
          total_amount,
          max_order_total()
        )));
      }

      {
        let mut guard = ctx_data.write();
        guard.priced_items = items;
        guard.total_amount = total_amount;
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 4
  p.on_root("persist_order_with_items", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (orders, new_order, items) = {
        let guard = ctx_data.read();
        (
          guard.app_state.orders.clone(),
          NewOrder {
            id: Uuid::new_v4(),
            user_id: guard.user_id,
            total_amount: guard.total_amount,
            payment_method: guard.payment_method,
            shipping_address: guard.shipping_address.formatted(),
          },
          guard.priced_items.clone(),
        )
      };

      let order = orders.create_with_items(new_order, items).await?;
      info!(
        order_id = %order.id,
        user_id = %order.user_id,
        total_amount = %order.total_amount,
        payment_method = ?order.payment_method,
        "Order created with status=pending, payment_status=pending."
      );
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 5 (gateway only)
  p.on_root("initiate_gateway_payment", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (app_state, order) = {
        let guard = ctx_data.read();
        (guard.app_state.clone(), guard.order.clone())
      };
      let order = order.ok_or_else(|| AppError::Internal("order missing before payment initiation".to_string()))?;

      let session = open_payment_session(&app_state, &order).await?;
      {
        let mut guard = ctx_data.write();
        if let Some(stored) = guard.order.as_mut() {
          stored.external_transaction_id = Some(session.transaction_id.clone());
        }
        guard.payment_session = Some(session);
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 6 (cash on delivery only)
  p.on_root("confirm_cash_on_delivery", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (app_state, order_id, user_id) = {
        let guard = ctx_data.read();
        (guard.app_state.clone(), guard.order.as_ref().map(|o| o.id), guard.user_id)
      };
      let order_id =
        order_id.ok_or_else(|| AppError::Internal("order missing before cash-on-delivery confirmation".to_string()))?;

      let confirmed = app_state
        .orders
        .confirm_cash_on_delivery(order_id)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("order {} is no longer pending", order_id)))?;
      info!(order_id = %order_id, "Cash-on-delivery order moved to processing; payment collected on delivery.");

      let cart_cleared = match app_state.carts.clear_for_user(user_id).await {
        Ok(removed) => {
          info!(order_id = %order_id, user_id = %user_id, removed, "Cart cleared.");
          true
        }
        Err(e) => {
          warn!(order_id = %order_id, user_id = %user_id, error = %e, "Cart could not be cleared after cash-on-delivery order.");
          false
        }
      };

      {
        let mut guard = ctx_data.write();
        guard.order = Some(confirmed);
        guard.cart_cleared = cart_cleared;
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  flows.register_pipeline(p);
  info!("Place-order pipeline registered.");
}
