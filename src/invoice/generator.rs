use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::{
    load_config, load_customers, load_products, load_state, resolve_output_dir, save_state,
    Config, InvoiceRecord, Product, State,
};
use crate::error::{BillingError, Result};
use crate::invoice::totals::{compute_invoice_totals, InvoiceTotals, LineItem, ProductLookup};
use crate::invoice::view::InvoiceData;
use crate::invoice::words::amount_to_words;
use crate::pdf::{export_invoice, PaginatedDocument, Rasterize, TypstRasterizer};

/// Item input like "consulting:8" or "consulting:8@2000" before catalog lookup
#[derive(Debug, PartialEq)]
pub struct ItemInput<'a> {
    pub product_id: &'a str,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
}

/// Parse item input like "consulting:8" or "consulting:8@2000"
pub fn parse_item_input(input: &str) -> Result<ItemInput<'_>> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 2 || parts[0].is_empty() {
        return Err(BillingError::InvalidItemFormat(input.to_string()));
    }

    let product_id = parts[0];
    let (qty_str, price_str) = match parts[1].split_once('@') {
        Some((qty, price)) => (qty, Some(price)),
        None => (parts[1], None),
    };

    let quantity = Decimal::from_str(qty_str).map_err(|_| BillingError::InvalidQuantity {
        item: product_id.to_string(),
        qty: qty_str.to_string(),
        reason: "must be a number".to_string(),
    })?;

    let unit_price = price_str
        .map(|price| {
            Decimal::from_str(price).map_err(|_| BillingError::InvalidUnitPrice {
                item: product_id.to_string(),
                price: price.to_string(),
                reason: "must be a number".to_string(),
            })
        })
        .transpose()?;

    Ok(ItemInput {
        product_id,
        quantity,
        unit_price,
    })
}

/// Turn item inputs into line items, taking default prices from the catalog.
///
/// With `require_products`, every product must exist. Otherwise an unknown
/// product is accepted when the input carries an explicit price; its line
/// is then taxed at zero and flagged by the totals.
pub fn resolve_line_items(
    inputs: &[String],
    catalog: &HashMap<String, Product>,
    require_products: bool,
) -> Result<Vec<LineItem>> {
    inputs
        .iter()
        .map(|input| {
            let parsed = parse_item_input(input)?;
            let product = catalog.get_product(parsed.product_id);
            let unit_price = match (product, parsed.unit_price) {
                (Some(_), Some(price)) => price,
                (Some(product), None) => product.price,
                (None, Some(price)) if !require_products => price,
                (None, _) => {
                    return Err(BillingError::ProductNotFound(parsed.product_id.to_string()))
                }
            };
            LineItem::new(parsed.product_id, parsed.quantity, unit_price)
        })
        .collect()
}

/// Format invoice number from template
pub fn format_invoice_number(format: &str, year: u32, seq: u32) -> String {
    format
        .replace("{year}", &year.to_string())
        .replace("{seq:04}", &format!("{:04}", seq))
        .replace("{seq:05}", &format!("{:05}", seq))
        .replace("{seq:03}", &format!("{:03}", seq))
}

/// Number and sequence the next invoice issued in `year` will get
pub fn next_invoice_number(config: &Config, state: &State, year: u32) -> (String, u32) {
    let seq = state.counter.next_sequence(year);
    (
        format_invoice_number(&config.invoice.number_format, year, seq),
        seq,
    )
}

/// Rasterizer configured from the [pdf] section of config.toml
pub fn configured_rasterizer(cfg_dir: &Path) -> Result<TypstRasterizer> {
    let config = load_config(cfg_dir)?;
    Ok(TypstRasterizer::new(config.pdf.page.size(), config.pdf.ppi))
}

fn pdf_file_name(invoice_number: &str) -> String {
    format!("invoice-{}.pdf", invoice_number)
}

#[derive(Debug, Default)]
pub struct GenerateOptions {
    /// Invoice date (default: today)
    pub inv_date: Option<NaiveDate>,
    /// Custom output file path (default: output_dir/invoice-<number>.pdf)
    pub output: Option<PathBuf>,
}

/// Result of writing an invoice PDF
#[derive(Debug)]
pub struct IssuedInvoice {
    pub record: InvoiceRecord,
    pub totals: InvoiceTotals,
    pub total_in_words: String,
    pub pdf_path: PathBuf,
    pub document: PaginatedDocument,
}

/// Generate a new invoice: compute totals, export the PDF, then record it.
pub fn generate_invoice<R: Rasterize + ?Sized>(
    cfg_dir: &Path,
    customer_id: &str,
    items_input: &[String],
    options: GenerateOptions,
    rasterizer: &R,
) -> Result<IssuedInvoice> {
    if items_input.is_empty() {
        return Err(BillingError::NoItems);
    }

    // Load all config
    let config = load_config(cfg_dir)?;
    let customers = load_customers(cfg_dir)?;
    let catalog = load_products(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let customer = customers
        .get(customer_id)
        .ok_or_else(|| BillingError::CustomerNotFound(customer_id.to_string()))?;

    let items = resolve_line_items(items_input, &catalog, true)?;

    let inv_date = options.inv_date.unwrap_or_else(|| Local::now().date_naive());
    let year = inv_date.year() as u32;
    let (invoice_number, seq) = next_invoice_number(&config, &state, year);

    let due_date = inv_date
        .checked_add_signed(chrono::Duration::days(config.invoice.due_days as i64))
        .unwrap_or(inv_date);

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    std::fs::create_dir_all(&output_dir)?;

    let (pdf_path, file) = match options.output {
        Some(path) => {
            let file = path.display().to_string();
            (path, file)
        }
        None => {
            let file = pdf_file_name(&invoice_number);
            (output_dir.join(&file), file)
        }
    };

    let mut record = InvoiceRecord {
        number: invoice_number,
        customer: customer_id.to_string(),
        inv_date,
        due_date,
        items,
        total_amount: Default::default(),
        is_paid: false,
        paid_date: None,
        file,
    };

    let (invoice_data, totals) = InvoiceData::build(
        &record,
        &config.organization,
        customer,
        &catalog,
        &config.invoice.currency_symbol,
    )?;
    record.total_amount = totals.total;

    let document = export_invoice(&invoice_data, rasterizer, config.pdf.page.size(), &pdf_path)?;

    // Update state only once the PDF exists
    state.counter.last_number = seq;
    state.counter.last_year = year;
    state.history.push(record.clone());
    save_state(cfg_dir, &state)?;

    log::info!(
        "generated {} ({} page(s)) at {}",
        record.number,
        document.page_count(),
        pdf_path.display()
    );

    Ok(IssuedInvoice {
        record,
        totals,
        total_in_words: invoice_data.total_in_words,
        pdf_path,
        document,
    })
}

/// Regenerate an existing invoice from stored data, optionally replacing its
/// line items. The stored total is always recomputed.
pub fn regenerate_invoice<R: Rasterize + ?Sized>(
    cfg_dir: &Path,
    invoice_number: &str,
    new_items: Option<&[String]>,
    rasterizer: &R,
) -> Result<IssuedInvoice> {
    let config = load_config(cfg_dir)?;
    let customers = load_customers(cfg_dir)?;
    let catalog = load_products(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    // Find the invoice in history
    let entry_idx = state
        .history
        .iter()
        .position(|e| e.number == invoice_number)
        .ok_or_else(|| BillingError::InvoiceNotFound(invoice_number.to_string()))?;

    let mut record = state.history[entry_idx].clone();

    if let Some(inputs) = new_items {
        if inputs.is_empty() {
            return Err(BillingError::NoItems);
        }
        record.items = resolve_line_items(inputs, &catalog, true)?;
    } else if record.items.is_empty() {
        return Err(BillingError::NoItems);
    }

    let customer = customers
        .get(&record.customer)
        .ok_or_else(|| BillingError::CustomerNotFound(record.customer.clone()))?;

    let (invoice_data, totals) = InvoiceData::build(
        &record,
        &config.organization,
        customer,
        &catalog,
        &config.invoice.currency_symbol,
    )?;
    record.total_amount = totals.total;

    let pdf_path = invoice_file_path(&config, cfg_dir, &record);
    if let Some(parent) = pdf_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let document = export_invoice(&invoice_data, rasterizer, config.pdf.page.size(), &pdf_path)?;

    state.history[entry_idx] = record.clone();
    save_state(cfg_dir, &state)?;

    Ok(IssuedInvoice {
        record,
        totals,
        total_in_words: invoice_data.total_in_words,
        pdf_path,
        document,
    })
}

fn invoice_file_path(config: &Config, cfg_dir: &Path, record: &InvoiceRecord) -> PathBuf {
    let file = Path::new(&record.file);
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        resolve_output_dir(&config.pdf.output_dir, cfg_dir).join(file)
    }
}

/// Get the PDF path for an invoice
pub fn get_invoice_path(cfg_dir: &Path, invoice_number: &str) -> Result<PathBuf> {
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let entry = state
        .history
        .iter()
        .find(|e| e.number == invoice_number)
        .ok_or_else(|| BillingError::InvoiceNotFound(invoice_number.to_string()))?;

    let pdf_path = invoice_file_path(&config, cfg_dir, entry);
    if !pdf_path.exists() {
        return Err(BillingError::InvoiceFileNotFound(pdf_path));
    }

    Ok(pdf_path)
}

/// Draft totals for items that are not saved anywhere
#[derive(Debug)]
pub struct Quote {
    pub items: Vec<LineItem>,
    pub totals: InvoiceTotals,
    pub total_in_words: String,
}

/// Price a draft invoice. Unknown products are allowed when given an
/// explicit price and come back flagged.
pub fn quote_items(catalog: &HashMap<String, Product>, items_input: &[String]) -> Result<Quote> {
    if items_input.is_empty() {
        return Err(BillingError::NoItems);
    }

    let items = resolve_line_items(items_input, catalog, false)?;
    let totals = compute_invoice_totals(&items, catalog);
    let total_in_words = amount_to_words(totals.total)?;

    Ok(Quote {
        items,
        totals,
        total_in_words,
    })
}
