use billify::invoice::{
    amount_to_words, compute_invoice_total, compute_invoice_totals, compute_line_totals, LineItem,
};
use billify::{BillingError, Money, Product};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn product(name: &str, price: &str, tax_rate: &str) -> Product {
    Product {
        name: name.to_string(),
        price: dec(price),
        tax_rate: dec(tax_rate),
        unit: "piece".to_string(),
        hsn_code: None,
    }
}

fn catalog() -> HashMap<String, Product> {
    let mut catalog = HashMap::new();
    catalog.insert("consulting".to_string(), product("Consulting", "2500", "18"));
    catalog.insert("brochure".to_string(), product("Brochure", "45.50", "12"));
    catalog.insert("book".to_string(), product("Book", "399", "0"));
    catalog.insert("service".to_string(), product("Service", "0.07", "28"));
    catalog
}

#[test]
fn line_total_matches_gross_formula_within_a_paisa() {
    let quantities = ["1", "2", "3.5", "7", "0.333", "125"];
    let prices = ["0", "0.01", "0.07", "45.50", "99.99", "2500", "12345.67"];
    let rates = ["0", "5", "12", "18", "28", "100", "7.25"];

    for q in quantities {
        for p in prices {
            for t in rates {
                let item = LineItem::new("x", dec(q), dec(p)).unwrap();
                let totals = compute_line_totals(&item, Some(&product("X", p, t)));
                let expected = dec(q) * dec(p) * (Decimal::ONE + dec(t) / Decimal::ONE_HUNDRED);
                let diff = (totals.line_total.to_decimal() - expected).abs();
                assert!(
                    diff <= dec("0.01"),
                    "q={q} p={p} t={t}: got {} expected {expected}",
                    totals.line_total
                );
                assert_eq!(totals.line_total, totals.taxable_amount + totals.tax_amount);
            }
        }
    }
}

#[test]
fn empty_invoice_totals_zero() {
    assert_eq!(compute_invoice_total(&[], &catalog()), Money::ZERO);
    let totals = compute_invoice_totals(&[], &catalog());
    assert!(totals.lines.is_empty());
    assert!(!totals.has_missing_products());
}

#[test]
fn invoice_total_is_order_independent() {
    let catalog = catalog();
    let mut items = vec![
        LineItem::new("consulting", dec("1.5"), dec("2500")).unwrap(),
        LineItem::new("brochure", dec("333"), dec("45.50")).unwrap(),
        LineItem::new("book", dec("2"), dec("399")).unwrap(),
        LineItem::new("service", dec("11"), dec("0.07")).unwrap(),
        LineItem::new("unknown", dec("1"), dec("10.10")).unwrap(),
    ];

    let expected = compute_invoice_total(&items, &catalog);
    for _ in 0..items.len() {
        items.rotate_left(1);
        assert_eq!(compute_invoice_total(&items, &catalog), expected);
    }
    items.reverse();
    assert_eq!(compute_invoice_total(&items, &catalog), expected);
}

#[test]
fn total_is_sum_of_line_totals() {
    let catalog = catalog();
    let items = vec![
        LineItem::new("consulting", dec("2"), dec("2500")).unwrap(),
        LineItem::new("brochure", dec("10"), dec("45.50")).unwrap(),
    ];
    let totals = compute_invoice_totals(&items, &catalog);
    // 5000 + 900, 455 + 54.60
    assert_eq!(totals.lines[0].line_total, Money::from_paise(590_000));
    assert_eq!(totals.lines[1].line_total, Money::from_paise(50_960));
    assert_eq!(totals.total, Money::from_paise(640_960));
    assert_eq!(totals.taxable_amount + totals.tax_amount, totals.total);
}

#[test]
fn missing_product_degrades_to_zero_tax() {
    let items = vec![
        LineItem::new("consulting", dec("1"), dec("2500")).unwrap(),
        LineItem::new("retired", dec("4"), dec("100")).unwrap(),
    ];
    let totals = compute_invoice_totals(&items, &catalog());
    assert_eq!(totals.missing_products(), vec![1]);
    assert_eq!(totals.lines[1].tax_amount, Money::ZERO);
    assert_eq!(totals.total, Money::from_paise(295_000 + 40_000));
}

#[test]
fn words_for_documented_amounts() {
    assert_eq!(amount_to_words(Money::ZERO).unwrap(), "Zero Rupees  Only");
    assert_eq!(
        amount_to_words(Money::from_decimal(dec("1234.50"))).unwrap(),
        "One Thousand Two Hundred And Thirty-Four Rupees And Fifty Paise Only"
    );
    assert_eq!(
        amount_to_words(Money::from_decimal(dec("100000"))).unwrap(),
        "One Lakh Rupees  Only"
    );
    assert_eq!(
        amount_to_words(Money::from_decimal(dec("12345678.09"))).unwrap(),
        "One Crore Twenty-Three Lakh Forty-Five Thousand Six Hundred And Seventy-Eight Rupees And Nine Paise Only"
    );
}

#[test]
fn words_reject_out_of_range_amounts() {
    for amount in ["1000000000", "1000000000.01", "5000000000"] {
        let err = amount_to_words(Money::from_decimal(dec(amount))).unwrap_err();
        assert!(matches!(err, BillingError::InvalidRange(_)), "{amount}");
    }
    assert!(amount_to_words(Money::from_decimal(dec("999999999.99"))).is_ok());
}
