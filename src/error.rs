use std::path::PathBuf;
use thiserror::Error;

use crate::money::Money;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Config directory not found at {0}. Run 'billify init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Customer '{0}' not found in customers.toml")]
    CustomerNotFound(String),

    #[error("Product '{0}' not found in products.toml")]
    ProductNotFound(String),

    #[error("Invalid product '{product}': {reason}")]
    InvalidProduct { product: String, reason: String },

    #[error("Invalid quantity '{qty}' for product '{item}': {reason}")]
    InvalidQuantity {
        item: String,
        qty: String,
        reason: String,
    },

    #[error("Invalid unit price '{price}' for product '{item}': {reason}")]
    InvalidUnitPrice {
        item: String,
        price: String,
        reason: String,
    },

    #[error("Invalid item format '{0}'. Expected 'product:quantity' or 'product:quantity@price' (e.g., 'consulting:8')")]
    InvalidItemFormat(String),

    #[error("No items specified. Use --item <product>:<quantity> to add line items.")]
    NoItems,

    #[error("Amount {0} is out of range for words (must be below 100 crore)")]
    InvalidRange(Money),

    #[error("Amount {0} is negative")]
    NegativeAmount(String),

    #[error("Rendering unavailable: {0}. Re-run the export to retry.")]
    RenderUnavailable(String),

    #[error("Invalid page size {width_in}in x {height_in}in")]
    InvalidPageSize { width_in: f64, height_in: f64 },

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Invoice '{0}' not found in history")]
    InvoiceNotFound(String),

    #[error("Invalid invoice index '{0}'. Use 'billify list' to see available invoices.")]
    InvalidInvoiceIndex(String),

    #[error("Invoice file not found: {0}")]
    InvoiceFileNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, BillingError>;
