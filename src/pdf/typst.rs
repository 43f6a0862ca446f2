use std::path::Path;
use std::process::Command;

use image::RgbaImage;

use crate::error::{BillingError, Result};
use crate::invoice::InvoiceData;
use crate::pdf::paginate::PageSize;
use crate::pdf::Rasterize;

/// Embedded Typst template for the invoice layout.
/// The page is as wide as the target paper and as tall as its content, so
/// compiling it yields a single tall snapshot to be paginated afterwards.
const INVOICE_TEMPLATE: &str = r##"// Invoice Layout
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  width: data.page_width_in * 1in,
  height: auto,
  margin: (x: 0.45in, y: 0.45in),
  fill: white,
)

#set text(font: "Helvetica", size: 10pt)

#let money(amount) = data.currency_symbol + " " + amount
#let accent = rgb("#1d4ed8")

// Header with organization details
#text(size: 20pt, weight: "bold", fill: accent)[Invoice \# #data.number]
#v(0.2em)
#text(size: 15pt, weight: "bold")[#data.organization.name]
#if data.organization.gstno != none [
  \ #text(weight: "bold")[GSTIN #data.organization.gstno]
]
\ #data.organization.address, #data.organization.city, #data.organization.state #data.organization.zip
\ #if data.organization.phone != none [*Mobile* #data.organization.phone #h(1em)] *Email* #data.organization.email

#v(0.8em)
#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  [*Invoice Date:* #data.inv_date],
  [*Due Date:* #data.due_date],
)

#v(0.8em)
#grid(
  columns: (1fr, 1fr, 1fr),
  gutter: 1em,
  [
    #text(weight: "bold")[Customer Detail:]
    \ #data.customer.name
    #if data.customer.gstno != none [ \ #data.customer.gstno ]
    \ #data.customer.email
  ],
  [
    #text(weight: "bold")[Billing Address:]
    \ #data.customer.billing_address
  ],
  [
    #text(weight: "bold")[Shipping Address:]
    \ #data.customer.shipping_address
  ],
)

#v(1.2em)

// Line items table
#table(
  columns: (auto, 1fr, auto, auto, auto, auto, auto),
  align: (center, left, right, right, right, right, right),
  stroke: none,
  inset: 7pt,
  fill: (x, y) => if y == 0 { rgb("#dbeafe") } else { rgb("#eff6ff") },

  // Header
  [*\#*], [*Item*], [*Rate / Item*], [*Qty*], [*Taxable Value*], [*Tax Amount*], [*Amount*],

  // Items
  ..data.items.map(item => (
    str(item.index),
    {
      if item.missing_product {
        text(fill: rgb("#b91c1c"))[#item.name]
      } else {
        item.name
      }
      if item.hsn_code != none {
        linebreak()
        text(size: 8pt, fill: luma(90))[HSN #item.hsn_code]
      }
    },
    money(item.unit_price),
    if item.unit == "" { item.quantity } else { item.quantity + " " + item.unit },
    money(item.taxable_amount),
    money(item.tax_amount) + " (" + item.tax_rate + "%)",
    money(item.amount),
  )).flatten(),

  table.cell(colspan: 4, fill: white)[*Total*],
  table.cell(fill: white)[#money(data.taxable_amount)],
  table.cell(fill: white)[#money(data.tax_amount)],
  table.cell(fill: white)[*#money(data.total)*],
)

#v(0.8em)
#align(right)[
  #text(size: 9pt)[*Total amount (in words):* #data.total_in_words]
]
#line(length: 100%, stroke: 0.8pt + accent)

#if data.organization.bank_name != none [
  #v(2em)
  #text(weight: "bold")[Bank Details:]
  #v(0.3em)
  #grid(
    columns: (auto, auto),
    column-gutter: 1em,
    row-gutter: 0.4em,
    [Bank:], [*#data.organization.bank_name*],
    [Account No:], [*#data.organization.account_no*],
    [IFSC Code:], [*#data.organization.ifsc*],
    [Branch:], [*#data.organization.bank_branch*],
  )
]

#v(1em)
#text(weight: "bold")[Payment Terms:] #data.payment_terms
#if data.is_paid [
  #h(1em) #text(weight: "bold", fill: rgb("#15803d"))[PAID]
]

#v(2em)
#block(width: 100%, fill: rgb("#eff6ff"), inset: 10pt, radius: 6pt)[
  #align(center)[Generated By: #text(weight: "bold", fill: accent)[Billify]]
]
"##;

/// Rasterizes the invoice layout with the Typst CLI's PNG output.
#[derive(Debug, Clone, Copy)]
pub struct TypstRasterizer {
    pub page: PageSize,
    pub ppi: u32,
}

impl TypstRasterizer {
    pub fn new(page: PageSize, ppi: u32) -> Self {
        Self { page, ppi }
    }

    fn compile(&self, invoice: &InvoiceData, work_dir: &Path) -> Result<RgbaImage> {
        let mut json = serde_json::to_value(invoice)
            .map_err(|e| BillingError::PdfGeneration(e.to_string()))?;
        json["page_width_in"] = serde_json::json!(self.page.width_in);

        let json_path = work_dir.join("data.json");
        std::fs::write(&json_path, json.to_string())?;

        // Template with relative JSON path (data.json is in same directory)
        let template_content = INVOICE_TEMPLATE.replace("DATA_JSON_PATH", "data.json");
        let template_path = work_dir.join("invoice.typ");
        std::fs::write(&template_path, &template_content)?;

        let png_path = work_dir.join("invoice.png");
        let output = Command::new("typst")
            .arg("compile")
            .arg("--root")
            .arg(work_dir)
            .arg("--format")
            .arg("png")
            .arg("--ppi")
            .arg(self.ppi.to_string())
            .arg(&template_path)
            .arg(&png_path)
            .output()
            .map_err(|e| BillingError::RenderUnavailable(format!("could not run typst: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BillingError::RenderUnavailable(format!(
                "typst failed: {}",
                stderr.trim()
            )));
        }

        let snapshot = image::open(&png_path)
            .map_err(|e| BillingError::RenderUnavailable(format!("unreadable snapshot: {e}")))?;
        log::debug!(
            "rasterized {} at {} ppi: {}x{} px",
            invoice.number,
            self.ppi,
            snapshot.width(),
            snapshot.height()
        );
        Ok(snapshot.to_rgba8())
    }
}

impl Rasterize for TypstRasterizer {
    fn rasterize(&self, invoice: &InvoiceData) -> Result<RgbaImage> {
        // Check if typst is available
        if Command::new("typst").arg("--version").output().is_err() {
            return Err(BillingError::RenderUnavailable(
                "typst not found; install it from https://typst.app/ or run: cargo install typst-cli"
                    .to_string(),
            ));
        }

        let work_dir = std::env::temp_dir().join(format!("billify-{}", std::process::id()));
        std::fs::create_dir_all(&work_dir)?;

        let result = self.compile(invoice, &work_dir);

        // Clean up temp files
        let _ = std::fs::remove_dir_all(&work_dir);

        result
    }
}
