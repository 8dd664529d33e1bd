// storefront/src/services/mod.rs

pub mod gateway;
pub mod redirect;
