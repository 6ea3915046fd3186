//! MuPDF backed engine (PDF, EPUB, XPS, FB2, CBZ and the other formats MuPDF reads)

use std::path::Path;

use mupdf::{DisplayList, Document, Matrix, Pixmap};

use super::{Colorspace, OpenedDocument, PageGeometry, Raster, RenderEngine};
use crate::error::EngineFault;

#[derive(Debug, Default, Clone, Copy)]
pub struct MuPdfEngine;

impl MuPdfEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn page_no(page: usize) -> Result<i32, EngineFault> {
    i32::try_from(page).map_err(|_| EngineFault::generic(format!("page {page} out of range")))
}

impl RenderEngine for MuPdfEngine {
    type Document = Document;
    type DisplayList = DisplayList;

    fn open(&self, path: &Path) -> Result<OpenedDocument<Document>, EngineFault> {
        let document = Document::open(path.to_string_lossy().as_ref())?;
        let page_count = document.page_count()?;
        let page_count = usize::try_from(page_count)
            .map_err(|_| EngineFault::generic(format!("invalid page count {page_count}")))?;
        Ok(OpenedDocument {
            document,
            page_count,
        })
    }

    fn page_geometry(&self, document: &Document, page: usize) -> Result<PageGeometry, EngineFault> {
        let bounds = document.load_page(page_no(page)?)?.bounds()?;
        Ok(PageGeometry::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0))
    }

    fn display_list(&self, document: &Document, page: usize) -> Result<DisplayList, EngineFault> {
        let page = document.load_page(page_no(page)?)?;
        Ok(page.to_display_list(true)?)
    }

    fn rasterize(
        &self,
        list: &DisplayList,
        scale: f32,
        colorspace: Colorspace,
    ) -> Result<Raster, EngineFault> {
        let cs = match colorspace {
            Colorspace::Gray => mupdf::Colorspace::device_gray(),
            Colorspace::Rgb => mupdf::Colorspace::device_rgb(),
        };
        let pixmap = list.to_pixmap(&Matrix::new_scale(scale, scale), &cs, false)?;
        let pixels = packed_samples(&pixmap, colorspace.channels())?;
        Ok(Raster {
            pixels,
            width: pixmap.width(),
            height: pixmap.height(),
            colorspace,
        })
    }
}

fn packed_samples(pixmap: &Pixmap, channels: usize) -> Result<Vec<u8>, EngineFault> {
    let n = pixmap.n() as usize;
    if n != channels {
        return Err(EngineFault::generic(format!(
            "Unexpected pixmap format: {n} channels, wanted {channels}"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err(EngineFault::generic("Pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(row_bytes * height);
    for y in 0..height {
        let row_start = y * stride;
        out.extend_from_slice(&samples[row_start..row_start + row_bytes]);
    }
    Ok(out)
}
