//! Rendering engine contract
//!
//! The viewer never decodes documents itself. Everything it needs from a
//! decoder goes through [`RenderEngine`]: open a file, ask for a page's size,
//! build a page display list and rasterize that list at some scale.

#[cfg(feature = "pdf")]
mod mupdf_engine;

#[cfg(feature = "pdf")]
pub use mupdf_engine::MuPdfEngine;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineFault;

/// Color model used when rasterizing a page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Colorspace {
    #[serde(rename = "DeviceGray")]
    Gray,
    #[default]
    #[serde(rename = "DeviceRGB")]
    Rgb,
}

impl Colorspace {
    /// The other colorspace
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Gray => Self::Rgb,
            Self::Rgb => Self::Gray,
        }
    }

    /// Bytes per pixel in a packed raster
    #[must_use]
    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }

    /// Name stored in the history file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gray => "DeviceGray",
            Self::Rgb => "DeviceRGB",
        }
    }
}

/// Page size in engine units (points at the reference DPI)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Rasterized page.
///
/// Pixels are packed row by row without padding, one byte per pixel for
/// [`Colorspace::Gray`] and three (R, G, B) for [`Colorspace::Rgb`].
#[derive(Clone)]
pub struct Raster {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub colorspace: Colorspace,
}

impl Raster {
    /// RGB value of the pixel at (x, y), `None` outside the raster
    #[must_use]
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let n = self.colorspace.channels();
        let offset = (y as usize * self.width as usize + x as usize) * n;
        let px = self.pixels.get(offset..offset + n)?;
        match self.colorspace {
            Colorspace::Gray => Some((px[0], px[0], px[0])),
            Colorspace::Rgb => Some((px[0], px[1], px[2])),
        }
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("colorspace", &self.colorspace)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Freshly opened document handle with its page count
pub struct OpenedDocument<D> {
    pub document: D,
    pub page_count: usize,
}

/// Document decoding and rasterization capability
pub trait RenderEngine {
    /// Engine-side handle of an open document
    type Document;
    /// Resolution independent list of drawing operations for one page
    type DisplayList;

    fn open(&self, path: &Path) -> Result<OpenedDocument<Self::Document>, EngineFault>;

    fn page_geometry(
        &self,
        document: &Self::Document,
        page: usize,
    ) -> Result<PageGeometry, EngineFault>;

    fn display_list(
        &self,
        document: &Self::Document,
        page: usize,
    ) -> Result<Self::DisplayList, EngineFault>;

    /// Rasterize at `scale` engine pixels per unit
    fn rasterize(
        &self,
        list: &Self::DisplayList,
        scale: f32,
        colorspace: Colorspace,
    ) -> Result<Raster, EngineFault>;

    /// Release engine resources held for `document`
    fn close(&self, document: Self::Document) {
        drop(document);
    }
}
