use serde::{Deserialize, Serialize};

use crate::pdf::PageFormat;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub organization: Organization,
    pub invoice: InvoiceSettings,
    pub pdf: PdfSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub gstno: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_no: Option<String>,
    #[serde(default)]
    pub ifsc: Option<String>,
    #[serde(default)]
    pub bank_branch: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceSettings {
    pub number_format: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    pub due_days: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
    #[serde(default)]
    pub page: PageFormat,
    /// Raster resolution used when snapshotting the invoice layout
    #[serde(default = "default_ppi")]
    pub ppi: u32,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_ppi() -> u32 {
    144
}
