use serde::Serialize;

use crate::config::{Customer, InvoiceRecord, Organization, Product};
use crate::error::Result;
use crate::invoice::totals::{compute_invoice_totals, InvoiceTotals, LineItem, ProductLookup};
use crate::invoice::words::amount_to_words;

/// A line item as printed on the invoice. Amounts are preformatted so the
/// layout never does arithmetic.
#[derive(Debug, Serialize)]
pub struct InvoiceLineView {
    pub index: usize,
    pub name: String,
    pub hsn_code: Option<String>,
    pub unit_price: String,
    pub quantity: String,
    pub unit: String,
    pub taxable_amount: String,
    pub tax_rate: String,
    pub tax_amount: String,
    pub amount: String,
    pub missing_product: bool,
}

/// Complete invoice data handed to the rasterizer
#[derive(Debug, Serialize)]
pub struct InvoiceData {
    pub number: String,
    pub inv_date: String,
    pub due_date: String,
    pub organization: Organization,
    pub customer: Customer,
    pub items: Vec<InvoiceLineView>,
    pub taxable_amount: String,
    pub tax_amount: String,
    pub total: String,
    pub total_in_words: String,
    pub currency_symbol: String,
    pub payment_terms: String,
    pub is_paid: bool,
}

impl InvoiceData {
    /// Build the printable view of a stored invoice, recomputing its totals
    /// from the catalog.
    pub fn build<C: ProductLookup + ?Sized>(
        record: &InvoiceRecord,
        organization: &Organization,
        customer: &Customer,
        catalog: &C,
        currency_symbol: &str,
    ) -> Result<(InvoiceData, InvoiceTotals)> {
        let totals = compute_invoice_totals(&record.items, catalog);
        let items = record
            .items
            .iter()
            .zip(&totals.lines)
            .enumerate()
            .map(|(idx, (item, line))| {
                let product = catalog.get_product(&item.product_id);
                InvoiceLineView {
                    index: idx + 1,
                    name: line_name(item, product),
                    hsn_code: product.and_then(|p| p.hsn_code.clone()),
                    unit_price: format_decimal(item.unit_price),
                    quantity: format_decimal(item.quantity),
                    unit: product.map(|p| p.unit.clone()).unwrap_or_default(),
                    taxable_amount: line.taxable_amount.to_string(),
                    tax_rate: format_decimal(line.tax_rate),
                    tax_amount: line.tax_amount.to_string(),
                    amount: line.line_total.to_string(),
                    missing_product: line.missing_product,
                }
            })
            .collect();

        let mut customer = customer.clone();
        if customer.shipping_address.is_none() {
            customer.shipping_address = Some(customer.billing_address.clone());
        }

        let data = InvoiceData {
            number: record.number.clone(),
            inv_date: record.inv_date.format("%d/%m/%Y").to_string(),
            due_date: record.due_date.format("%d/%m/%Y").to_string(),
            organization: organization.clone(),
            customer,
            items,
            taxable_amount: totals.taxable_amount.to_string(),
            tax_amount: totals.tax_amount.to_string(),
            total: totals.total.to_string(),
            total_in_words: amount_to_words(totals.total)?,
            currency_symbol: currency_symbol.to_string(),
            payment_terms: payment_terms(record),
            is_paid: record.is_paid,
        };

        Ok((data, totals))
    }
}

/// Display name for a line, marking lines whose product record is gone
pub fn line_name(item: &LineItem, product: Option<&Product>) -> String {
    match product {
        Some(product) => product.name.clone(),
        None => format!("{} (missing product)", item.product_id),
    }
}

/// Decimal without trailing zeros: 2.50 -> "2.5", 18.00 -> "18"
pub fn format_decimal(value: rust_decimal::Decimal) -> String {
    value.normalize().to_string()
}

fn payment_terms(record: &InvoiceRecord) -> String {
    let days = (record.due_date - record.inv_date).num_days();
    if days <= 0 {
        "Due on receipt".to_string()
    } else {
        format!("Net {days} days")
    }
}
