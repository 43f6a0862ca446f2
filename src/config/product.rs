use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Product {
    pub name: String,
    pub price: Decimal,
    /// Percentage in [0, 100]
    #[serde(default)]
    pub tax_rate: Decimal,
    pub unit: String,
    #[serde(default)]
    pub hsn_code: Option<String>,
}

impl Product {
    pub fn validate(&self, id: &str) -> Result<()> {
        if self.price < Decimal::ZERO {
            return Err(BillingError::InvalidProduct {
                product: id.to_string(),
                reason: format!("price {} must not be negative", self.price),
            });
        }
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE_HUNDRED {
            return Err(BillingError::InvalidProduct {
                product: id.to_string(),
                reason: format!("tax_rate {} must be between 0 and 100", self.tax_rate),
            });
        }
        Ok(())
    }
}
