// storefront/src/models/mod.rs

//! Records owned or read by the order flow, plus the request-side value types
//! (shipping address, cart snapshot lines, parsed gateway callbacks).

pub mod callback;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod shipping;

pub use callback::{CallbackOutcome, CallbackParams, MalformedCallback, ReportedStatus};
pub use cart_item::{CartItem, CartLine};
pub use order::{NewOrder, Order, OrderStatus, PaymentMethod, PaymentStatus};
pub use order_item::{NewOrderItem, OrderItem};
pub use product::Product;
pub use shipping::ShippingAddress;
