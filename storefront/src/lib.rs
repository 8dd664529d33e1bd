// storefront/src/lib.rs

//! Storefront order and payment service: order placement, gateway payment
//! sessions and callback reconciliation, served over actix-web.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod stores;
pub mod web;
