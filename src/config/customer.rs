use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub gstno: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub billing_address: String,
    /// Falls back to the billing address on the invoice when absent
    #[serde(default)]
    pub shipping_address: Option<String>,
}
