mod generator;
pub mod totals;
mod view;
pub mod words;

pub use generator::{
    configured_rasterizer, format_invoice_number, generate_invoice, get_invoice_path,
    next_invoice_number, parse_item_input, quote_items, regenerate_invoice, resolve_line_items,
    GenerateOptions, IssuedInvoice, Quote,
};
pub use totals::{
    compute_invoice_total, compute_invoice_totals, compute_line_totals, InvoiceTotals, LineItem,
    LineTotals, ProductLookup,
};
pub use view::{format_decimal, line_name, InvoiceData, InvoiceLineView};
pub use words::{amount_to_words, decimal_to_words, integer_to_words};
