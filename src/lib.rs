pub mod config;
pub mod error;
pub mod invoice;
pub mod money;
pub mod pdf;

pub use config::{Config, Customer, InvoiceRecord, Organization, Product, State};
pub use error::{BillingError, Result};
pub use invoice::{
    amount_to_words, compute_invoice_total, compute_invoice_totals, compute_line_totals,
    InvoiceData, LineItem, LineTotals, ProductLookup,
};
pub use money::Money;
pub use pdf::{export_invoice, paginate, PageSize, PaginatedDocument, Rasterize};
