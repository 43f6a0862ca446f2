pub mod document;
pub mod paginate;
mod typst;

pub use document::render_pdf;
pub use paginate::{
    paginate, page_height_px, plan_bands, Band, Page, PageFormat, PageSize, PaginatedDocument,
};
pub use typst::TypstRasterizer;

use image::RgbaImage;
use std::path::Path;

use crate::error::{BillingError, Result};
use crate::invoice::InvoiceData;

/// Renders an invoice layout into a single full-height raster snapshot.
pub trait Rasterize {
    fn rasterize(&self, invoice: &InvoiceData) -> Result<RgbaImage>;
}

/// Rasterize, paginate and write `invoice` as a PDF at `output_path`.
///
/// The file is only written once every page has been produced, so a failed
/// export leaves nothing behind.
pub fn export_invoice<R: Rasterize + ?Sized>(
    invoice: &InvoiceData,
    rasterizer: &R,
    page: PageSize,
    output_path: &Path,
) -> Result<PaginatedDocument> {
    let snapshot = rasterizer.rasterize(invoice)?;
    let document = paginate(&snapshot, page)?;
    let bytes = render_pdf(&document, &format!("Invoice {}", invoice.number))?;
    std::fs::write(output_path, bytes)?;
    Ok(document)
}

/// Paginate an existing PNG/JPEG snapshot into a PDF at `output_path`.
pub fn export_snapshot(
    snapshot_path: &Path,
    page: PageSize,
    output_path: &Path,
) -> Result<PaginatedDocument> {
    let snapshot = image::open(snapshot_path)
        .map_err(|e| {
            BillingError::RenderUnavailable(format!(
                "could not read {}: {e}",
                snapshot_path.display()
            ))
        })?
        .to_rgba8();

    let document = paginate(&snapshot, page)?;
    let title = snapshot_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Document".to_string());
    let bytes = render_pdf(&document, &title)?;
    std::fs::write(output_path, bytes)?;
    Ok(document)
}
