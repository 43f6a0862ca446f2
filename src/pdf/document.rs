//! PDF assembly: one PDF page per paginated band, using `printpdf`
//! (v0.8 ops-based API).

use std::io::Cursor;

use image::ImageFormat;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, XObjectTransform,
};

use crate::error::{BillingError, Result};
use crate::pdf::paginate::PaginatedDocument;

const POINTS_PER_INCH: f32 = 72.0;
const MM_PER_INCH: f32 = 25.4;

/// Render a paginated document into PDF bytes. Page `i` of the output shows
/// band `i`, stretched to the page's full width and height.
pub fn render_pdf(document: &PaginatedDocument, title: &str) -> Result<Vec<u8>> {
    if document.pages.is_empty() {
        return Err(BillingError::PdfGeneration(
            "document has no pages".to_string(),
        ));
    }

    let mut doc = PdfDocument::new(title);
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let mut pages = Vec::with_capacity(document.pages.len());

    for page in &document.pages {
        let mut png = Vec::new();
        page.image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| BillingError::PdfGeneration(format!("page {}: {e}", page.band.index + 1)))?;

        let raw = RawImage::decode_from_bytes(&png, &mut warnings)
            .map_err(|e| BillingError::PdfGeneration(format!("page {}: {e}", page.band.index + 1)))?;
        let xobj_id = doc.add_image(&raw);

        let width_pt = page.width_in as f32 * POINTS_PER_INCH;
        let height_pt = page.height_in as f32 * POINTS_PER_INCH;
        let (px_width, px_height) = page.image.dimensions();

        // At dpi=72 printpdf renders 1 px = 1 pt, so scale = page_pt / px.
        let ops = vec![Op::UseXobject {
            id: xobj_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                dpi: Some(72.0),
                scale_x: Some(width_pt / px_width as f32),
                scale_y: Some(height_pt / px_height as f32),
                rotate: None,
            },
        }];

        pages.push(PdfPage::new(
            Mm(page.width_in as f32 * MM_PER_INCH),
            Mm(page.height_in as f32 * MM_PER_INCH),
            ops,
        ));
    }

    for warning in &warnings {
        log::debug!("printpdf: {warning:?}");
    }

    doc.with_pages(pages);
    Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
}
