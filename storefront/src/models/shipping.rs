// storefront/src/models/shipping.rs

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
  pub name: String,
  pub phone: String,
  pub address_line: String,
  pub city: String,
}

impl ShippingAddress {
  /// Every field must be present; the first blank one is named in the error.
  pub fn validate(&self) -> Result<()> {
    let fields = [
      ("name", &self.name),
      ("phone", &self.phone),
      ("address_line", &self.address_line),
      ("city", &self.city),
    ];
    for (field, value) in fields {
      if value.trim().is_empty() {
        return Err(AppError::Validation(format!("shipping_address.{} is required", field)));
      }
    }
    Ok(())
  }

  /// Snapshot string stored on the order.
  pub fn formatted(&self) -> String {
    format!(
      "{}, {}, {}, {}",
      self.name.trim(),
      self.phone.trim(),
      self.address_line.trim(),
      self.city.trim()
    )
  }
}
