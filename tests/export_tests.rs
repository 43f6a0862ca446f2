//! End-to-end invoice export with an in-memory rasterizer standing in for
//! the Typst CLI.

use std::cell::Cell;
use std::fs;
use std::path::Path;

use billify::config::{
    load_state, CONFIG_TEMPLATE, CUSTOMERS_TEMPLATE, PRODUCTS_TEMPLATE,
};
use billify::invoice::{amount_to_words, generate_invoice, regenerate_invoice, GenerateOptions};
use billify::pdf::{page_height_px, PageSize};
use billify::{BillingError, InvoiceData, Money, Rasterize, Result};
use chrono::NaiveDate;
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

const SNAPSHOT_WIDTH: u32 = 400;

/// Produces a snapshot one and a bit A4 pages tall.
struct FakeRasterizer {
    extra_rows: u32,
    calls: Cell<usize>,
}

impl FakeRasterizer {
    fn new(extra_rows: u32) -> Self {
        Self {
            extra_rows,
            calls: Cell::new(0),
        }
    }
}

impl Rasterize for FakeRasterizer {
    fn rasterize(&self, invoice: &InvoiceData) -> Result<RgbaImage> {
        self.calls.set(self.calls.get() + 1);
        assert!(!invoice.items.is_empty());
        let height = page_height_px(SNAPSHOT_WIDTH, PageSize::A4) + self.extra_rows;
        Ok(RgbaImage::from_pixel(SNAPSHOT_WIDTH, height, Rgba([30, 60, 90, 255])))
    }
}

struct UnavailableRasterizer;

impl Rasterize for UnavailableRasterizer {
    fn rasterize(&self, _invoice: &InvoiceData) -> Result<RgbaImage> {
        Err(BillingError::RenderUnavailable("no drawing surface".to_string()))
    }
}

fn init_config(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("config.toml"), CONFIG_TEMPLATE).unwrap();
    fs::write(dir.join("customers.toml"), CUSTOMERS_TEMPLATE).unwrap();
    fs::write(dir.join("products.toml"), PRODUCTS_TEMPLATE).unwrap();
}

fn items(inputs: &[&str]) -> Vec<String> {
    inputs.iter().map(|s| s.to_string()).collect()
}

fn options() -> GenerateOptions {
    GenerateOptions {
        inv_date: NaiveDate::from_ymd_opt(2026, 3, 1),
        output: None,
    }
}

#[test]
fn three_items_export_to_two_pages() {
    let temp_dir = TempDir::new().unwrap();
    let cfg = temp_dir.path().join("billify");
    init_config(&cfg);

    let rasterizer = FakeRasterizer::new(90);
    let issued = generate_invoice(
        &cfg,
        "example-customer",
        &items(&["consulting:2", "web-design:1", "brochure:10"]),
        options(),
        &rasterizer,
    )
    .unwrap();

    // 5900.00 + 17700.00 + 509.60
    let line_totals: Vec<Money> = issued.totals.lines.iter().map(|l| l.line_total).collect();
    assert_eq!(
        line_totals,
        vec![
            Money::from_paise(590_000),
            Money::from_paise(1_770_000),
            Money::from_paise(50_960)
        ]
    );
    assert_eq!(issued.totals.total, Money::from_paise(2_410_960));
    assert_eq!(
        issued.total_in_words,
        "Twenty-Four Thousand One Hundred And Nine Rupees And Sixty Paise Only"
    );
    assert_eq!(amount_to_words(issued.totals.total).unwrap(), issued.total_in_words);

    assert_eq!(issued.document.page_count(), 2);
    assert_eq!(
        issued.document.pages[0].band.height_px,
        page_height_px(SNAPSHOT_WIDTH, PageSize::A4)
    );
    assert_eq!(issued.document.pages[1].band.height_px, 90);

    assert_eq!(issued.record.number, "INV-2026-0001");
    assert_eq!(issued.record.due_date, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
    assert_eq!(issued.pdf_path, cfg.join("output").join("invoice-INV-2026-0001.pdf"));
    let bytes = fs::read(&issued.pdf_path).unwrap();
    assert_eq!(&bytes[0..5], b"%PDF-");

    let state = load_state(&cfg).unwrap();
    assert_eq!(state.counter.last_number, 1);
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].total_amount, issued.totals.total);
    assert_eq!(state.history[0].items.len(), 3);
}

#[test]
fn sequence_continues_within_the_year() {
    let temp_dir = TempDir::new().unwrap();
    let cfg = temp_dir.path().join("billify");
    init_config(&cfg);
    let rasterizer = FakeRasterizer::new(1);

    for expected in ["INV-2026-0001", "INV-2026-0002"] {
        let issued = generate_invoice(
            &cfg,
            "example-customer",
            &items(&["consulting:1"]),
            options(),
            &rasterizer,
        )
        .unwrap();
        assert_eq!(issued.record.number, expected);
    }
    assert_eq!(rasterizer.calls.get(), 2);
}

#[test]
fn render_failure_leaves_no_invoice_behind() {
    let temp_dir = TempDir::new().unwrap();
    let cfg = temp_dir.path().join("billify");
    init_config(&cfg);

    let err = generate_invoice(
        &cfg,
        "example-customer",
        &items(&["consulting:1"]),
        options(),
        &UnavailableRasterizer,
    )
    .unwrap_err();

    assert!(matches!(err, BillingError::RenderUnavailable(_)));
    assert!(err.to_string().contains("retry"));
    assert!(!cfg.join("output").join("invoice-INV-2026-0001.pdf").exists());
    assert!(load_state(&cfg).unwrap().history.is_empty());
}

#[test]
fn submission_rejects_unknown_products_and_empty_invoices() {
    let temp_dir = TempDir::new().unwrap();
    let cfg = temp_dir.path().join("billify");
    init_config(&cfg);
    let rasterizer = FakeRasterizer::new(1);

    let err = generate_invoice(&cfg, "example-customer", &[], options(), &rasterizer).unwrap_err();
    assert!(matches!(err, BillingError::NoItems));

    let err = generate_invoice(
        &cfg,
        "example-customer",
        &items(&["ghost:1@100"]),
        options(),
        &rasterizer,
    )
    .unwrap_err();
    assert!(matches!(err, BillingError::ProductNotFound(_)));
    assert_eq!(rasterizer.calls.get(), 0);
}

#[test]
fn regenerate_recomputes_total_after_catalog_change() {
    let temp_dir = TempDir::new().unwrap();
    let cfg = temp_dir.path().join("billify");
    init_config(&cfg);
    let rasterizer = FakeRasterizer::new(10);

    let issued = generate_invoice(
        &cfg,
        "example-customer",
        &items(&["consulting:1", "brochure:2"]),
        options(),
        &rasterizer,
    )
    .unwrap();
    // 2950.00 + 101.92
    assert_eq!(issued.totals.total, Money::from_paise(305_192));

    // Drop the brochure product: its line keeps its price but loses its tax
    let products = PRODUCTS_TEMPLATE.replace("[brochure]", "[retired-brochure]");
    fs::write(cfg.join("products.toml"), products).unwrap();

    let regenerated = regenerate_invoice(&cfg, &issued.record.number, None, &rasterizer).unwrap();
    assert_eq!(regenerated.totals.missing_products(), vec![1]);
    assert_eq!(regenerated.totals.total, Money::from_paise(295_000 + 9_100));

    let state = load_state(&cfg).unwrap();
    assert_eq!(state.history[0].total_amount, regenerated.totals.total);
}

#[test]
fn edit_replaces_items() {
    let temp_dir = TempDir::new().unwrap();
    let cfg = temp_dir.path().join("billify");
    init_config(&cfg);
    let rasterizer = FakeRasterizer::new(10);

    let issued = generate_invoice(
        &cfg,
        "example-customer",
        &items(&["consulting:1"]),
        options(),
        &rasterizer,
    )
    .unwrap();

    let new_items = items(&["consulting:3@2000"]);
    let edited =
        regenerate_invoice(&cfg, &issued.record.number, Some(&new_items), &rasterizer).unwrap();
    // 6000 + 1080
    assert_eq!(edited.record.total_amount, Money::from_paise(708_000));
    assert_eq!(load_state(&cfg).unwrap().history[0].items[0].quantity.to_string(), "3");
}
