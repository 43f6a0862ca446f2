//! Slicing a tall invoice snapshot into page-sized bands.
//!
//! The snapshot's pixel width is kept as-is and the page height in pixels
//! follows from the physical page's aspect ratio. Bands are cut at fixed
//! heights, so a row of the layout may straddle a page break. The last band
//! holds whatever is left and its page is shortened to match.

use image::{Rgb, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};

/// Physical page dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width_in: 8.27,
        height_in: 11.69,
    };
    pub const LETTER: PageSize = PageSize {
        width_in: 8.5,
        height_in: 11.0,
    };
    pub const LEGAL: PageSize = PageSize {
        width_in: 8.5,
        height_in: 14.0,
    };

    fn validate(self) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.width_in) && valid(self.height_in) {
            Ok(())
        } else {
            Err(BillingError::InvalidPageSize {
                width_in: self.width_in,
                height_in: self.height_in,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageFormat {
    pub fn size(self) -> PageSize {
        match self {
            PageFormat::A4 => PageSize::A4,
            PageFormat::Letter => PageSize::LETTER,
            PageFormat::Legal => PageSize::LEGAL,
        }
    }
}

/// A horizontal slice of the source snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub index: usize,
    pub top_px: u32,
    pub height_px: u32,
}

/// One output page: the band composed over white plus its physical size.
#[derive(Debug, Clone)]
pub struct Page {
    pub band: Band,
    pub image: RgbImage,
    pub width_in: f64,
    pub height_in: f64,
}

#[derive(Debug, Clone)]
pub struct PaginatedDocument {
    pub page_size: PageSize,
    pub source_width_px: u32,
    pub source_height_px: u32,
    pub page_height_px: u32,
    /// In source order, page 0 first
    pub pages: Vec<Page>,
}

impl PaginatedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Pixel height of a full page for a snapshot `source_width_px` wide.
pub fn page_height_px(source_width_px: u32, page: PageSize) -> u32 {
    (source_width_px as f64 * page.height_in / page.width_in).floor() as u32
}

/// Full bands of `page_height_px`, then one shorter band for the remainder
/// if the height does not divide evenly. `page_height_px` must be non-zero.
pub fn plan_bands(source_height_px: u32, page_height_px: u32) -> Vec<Band> {
    let full_pages = source_height_px / page_height_px;
    let remainder = source_height_px % page_height_px;

    let mut bands: Vec<Band> = (0..full_pages)
        .map(|i| Band {
            index: i as usize,
            top_px: i * page_height_px,
            height_px: page_height_px,
        })
        .collect();

    if remainder != 0 {
        bands.push(Band {
            index: full_pages as usize,
            top_px: full_pages * page_height_px,
            height_px: remainder,
        });
    }

    bands
}

/// Physical height of the page holding `band`. Short bands keep the page
/// width and scale the height to the band's aspect ratio.
pub fn band_height_in(band: &Band, page_height_px: u32, source_width_px: u32, page: PageSize) -> f64 {
    if band.height_px == page_height_px {
        page.height_in
    } else {
        band.height_px as f64 * page.width_in / source_width_px as f64
    }
}

/// Split `source` into pages of `page` size. Either every page is produced or
/// an error is returned.
pub fn paginate(source: &RgbaImage, page: PageSize) -> Result<PaginatedDocument> {
    page.validate()?;

    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(BillingError::RenderUnavailable(format!(
            "snapshot is empty ({width}x{height} px)"
        )));
    }

    let page_px = page_height_px(width, page);
    if page_px == 0 {
        return Err(BillingError::InvalidPageSize {
            width_in: page.width_in,
            height_in: page.height_in,
        });
    }

    let pages: Vec<Page> = plan_bands(height, page_px)
        .into_iter()
        .map(|band| Page {
            image: compose_on_white(source, &band),
            width_in: page.width_in,
            height_in: band_height_in(&band, page_px, width, page),
            band,
        })
        .collect();

    log::debug!(
        "paginated {width}x{height} px snapshot into {} page(s) of {page_px} px",
        pages.len()
    );

    Ok(PaginatedDocument {
        page_size: page,
        source_width_px: width,
        source_height_px: height,
        page_height_px: page_px,
        pages,
    })
}

/// Copy one band onto an opaque white canvas of the band's exact size.
fn compose_on_white(source: &RgbaImage, band: &Band) -> RgbImage {
    RgbImage::from_fn(source.width(), band.height_px, |x, y| {
        let [r, g, b, a] = source.get_pixel(x, band.top_px + y).0;
        Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
    })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u32, alpha as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}
