//! Per-line tax and invoice totals.
//!
//! Everything here is pure: the product catalog is passed in by the caller
//! and nothing is read from or written to disk.
//!
//! A line whose product cannot be found is still totalled, with a tax rate
//! of zero, and comes back flagged through [`LineTotals::missing_product`]
//! so that the caller can mark it before the invoice is issued.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::Product;
use crate::error::{BillingError, Result};
use crate::money::Money;

/// Largest taxable value a single line may carry (one lakh crore rupees).
pub const MAX_LINE_RUPEES: i64 = 1_000_000_000_000;

/// One line of an invoice being composed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "product")]
    pub product_id: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl LineItem {
    /// Build a line item, rejecting non-positive quantities, negative unit
    /// prices and lines worth more than [`MAX_LINE_RUPEES`].
    pub fn new(product_id: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Result<Self> {
        let product_id = product_id.into();
        if quantity <= Decimal::ZERO {
            return Err(BillingError::InvalidQuantity {
                item: product_id,
                qty: quantity.to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if unit_price < Decimal::ZERO {
            return Err(BillingError::InvalidUnitPrice {
                item: product_id,
                price: unit_price.to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        let within_limit = quantity
            .checked_mul(unit_price)
            .is_some_and(|value| value <= Decimal::from(MAX_LINE_RUPEES));
        if !within_limit {
            return Err(BillingError::InvalidQuantity {
                item: product_id,
                qty: quantity.to_string(),
                reason: format!("line amount must not exceed {MAX_LINE_RUPEES} rupees"),
            });
        }
        Ok(Self {
            product_id,
            quantity,
            unit_price,
        })
    }

    fn taxable_value(&self) -> Decimal {
        self.quantity
            .checked_mul(self.unit_price)
            .unwrap_or(Decimal::MAX)
    }
}

/// Source of product records for tax lookup.
pub trait ProductLookup {
    fn get_product(&self, product_id: &str) -> Option<&Product>;
}

impl ProductLookup for HashMap<String, Product> {
    fn get_product(&self, product_id: &str) -> Option<&Product> {
        self.get(product_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotals {
    pub taxable_amount: Money,
    /// Rate actually applied; zero when the product is missing
    pub tax_rate: Decimal,
    pub tax_amount: Money,
    pub line_total: Money,
    pub missing_product: bool,
}

/// Totals for one line. `product` is `None` when the catalog has no record
/// for `item.product_id`; tax is then zero and the line is flagged.
pub fn compute_line_totals(item: &LineItem, product: Option<&Product>) -> LineTotals {
    let tax_rate = match product {
        Some(product) => product.tax_rate,
        None => {
            log::warn!(
                "product '{}' not found; line taxed at 0%",
                item.product_id
            );
            Decimal::ZERO
        }
    };

    let taxable = item.taxable_value();
    let taxable_amount = Money::from_decimal(taxable);
    let tax = taxable
        .checked_mul(tax_rate)
        .map_or(Decimal::MAX, |value| value / Decimal::ONE_HUNDRED);
    let tax_amount = Money::from_decimal(tax);

    LineTotals {
        taxable_amount,
        tax_rate,
        tax_amount,
        line_total: taxable_amount + tax_amount,
        missing_product: product.is_none(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvoiceTotals {
    /// Same order as the input items
    pub lines: Vec<LineTotals>,
    pub taxable_amount: Money,
    pub tax_amount: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// Indices of lines priced without a product record
    pub fn missing_products(&self) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.missing_product)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn has_missing_products(&self) -> bool {
        self.lines.iter().any(|line| line.missing_product)
    }
}

pub fn compute_invoice_totals<C: ProductLookup + ?Sized>(items: &[LineItem], catalog: &C) -> InvoiceTotals {
    let lines: Vec<LineTotals> = items
        .iter()
        .map(|item| compute_line_totals(item, catalog.get_product(&item.product_id)))
        .collect();

    InvoiceTotals {
        taxable_amount: lines.iter().map(|l| l.taxable_amount).sum(),
        tax_amount: lines.iter().map(|l| l.tax_amount).sum(),
        total: lines.iter().map(|l| l.line_total).sum(),
        lines,
    }
}

/// Invoice grand total: the sum of line totals. An empty list totals zero.
pub fn compute_invoice_total<C: ProductLookup + ?Sized>(items: &[LineItem], catalog: &C) -> Money {
    compute_invoice_totals(items, catalog).total
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn product(price: &str, tax_rate: &str) -> Product {
        Product {
            name: "Widget".to_string(),
            price: dec(price),
            tax_rate: dec(tax_rate),
            unit: "piece".to_string(),
            hsn_code: None,
        }
    }

    #[test]
    fn line_totals_apply_tax() {
        let item = LineItem::new("widget", dec("3"), dec("100")).unwrap();
        let totals = compute_line_totals(&item, Some(&product("100", "18")));
        assert_eq!(totals.taxable_amount, Money::from_paise(30_000));
        assert_eq!(totals.tax_amount, Money::from_paise(5_400));
        assert_eq!(totals.line_total, Money::from_paise(35_400));
        assert!(!totals.missing_product);
    }

    #[test]
    fn tax_rounds_half_up() {
        // 1 x 0.25 at 10% = 0.025 tax
        let item = LineItem::new("widget", dec("1"), dec("0.25")).unwrap();
        let totals = compute_line_totals(&item, Some(&product("0.25", "10")));
        assert_eq!(totals.tax_amount, Money::from_paise(3));
        assert_eq!(totals.line_total, Money::from_paise(28));
    }

    #[test]
    fn missing_product_is_taxed_at_zero_and_flagged() {
        let item = LineItem::new("ghost", dec("2"), dec("50")).unwrap();
        let totals = compute_line_totals(&item, None);
        assert_eq!(totals.tax_rate, Decimal::ZERO);
        assert_eq!(totals.tax_amount, Money::ZERO);
        assert_eq!(totals.line_total, Money::from_paise(10_000));
        assert!(totals.missing_product);
    }

    #[test]
    fn rejects_invalid_line_items() {
        assert!(matches!(
            LineItem::new("widget", Decimal::ZERO, dec("1")),
            Err(BillingError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            LineItem::new("widget", dec("1"), dec("-0.01")),
            Err(BillingError::InvalidUnitPrice { .. })
        ));
        assert!(LineItem::new("widget", dec("1"), Decimal::ZERO).is_ok());
    }

    #[test]
    fn rejects_lines_too_large_to_total() {
        let err = LineItem::new("widget", dec("100000000000000000"), dec("1")).unwrap_err();
        assert!(matches!(err, BillingError::InvalidQuantity { .. }));
        assert!(err.to_string().contains("must not exceed"));
        assert!(LineItem::new("widget", dec("1000000000000"), dec("1")).is_ok());
    }

    #[test]
    fn oversized_stored_lines_saturate() {
        // Stored items bypass LineItem::new
        let item = LineItem {
            product_id: "widget".to_string(),
            quantity: dec("100000000000000000"),
            unit_price: dec("1"),
        };
        let totals = compute_line_totals(&item, Some(&product("1", "18")));
        assert_eq!(totals.line_total, Money::from_paise(i64::MAX));
        assert!(totals.line_total >= totals.taxable_amount);
    }

    #[test]
    fn invoice_totals_report_missing_lines() {
        let mut catalog = HashMap::new();
        catalog.insert("widget".to_string(), product("10", "5"));
        let items = vec![
            LineItem::new("widget", dec("2"), dec("10")).unwrap(),
            LineItem::new("ghost", dec("1"), dec("7")).unwrap(),
        ];

        let totals = compute_invoice_totals(&items, &catalog);
        assert_eq!(totals.taxable_amount, Money::from_paise(2_700));
        assert_eq!(totals.tax_amount, Money::from_paise(100));
        assert_eq!(totals.total, Money::from_paise(2_800));
        assert_eq!(totals.missing_products(), vec![1]);
    }

    #[test]
    fn empty_invoice_totals_zero() {
        let catalog: HashMap<String, Product> = HashMap::new();
        assert_eq!(compute_invoice_total(&[], &catalog), Money::ZERO);
    }
}
