//! Page raster drawn with half-block cells
//!
//! Every terminal cell shows two raster rows: the upper one as the
//! foreground of `▀`, the lower one as its background.

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::engine::Raster;

const UPPER_HALF_BLOCK: &str = "▀";

/// Raster pixels one terminal cell covers
pub const PIXELS_PER_CELL: (u16, u16) = (1, 2);

/// Draws a raster centered in the area, cropped from the top left when larger
pub struct PageImage<'a> {
    raster: &'a Raster,
}

impl<'a> PageImage<'a> {
    pub fn new(raster: &'a Raster) -> Self {
        Self { raster }
    }
}

impl Widget for PageImage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let raster = self.raster;
        let cols = raster.width.min(u32::from(area.width)) as u16;
        let rows = raster.height.div_ceil(2).min(u32::from(area.height)) as u16;
        let left = area.x + (area.width - cols) / 2;
        let top = area.y + (area.height - rows) / 2;

        for row in 0..rows {
            for col in 0..cols {
                let x = u32::from(col);
                let y = u32::from(row) * 2;
                let Some(cell) = buf.cell_mut((left + col, top + row)) else {
                    continue;
                };
                cell.set_symbol(UPPER_HALF_BLOCK);
                if let Some((r, g, b)) = raster.rgb_at(x, y) {
                    cell.set_fg(Color::Rgb(r, g, b));
                }
                match raster.rgb_at(x, y + 1) {
                    Some((r, g, b)) => cell.set_bg(Color::Rgb(r, g, b)),
                    None => cell.set_bg(Color::Reset),
                };
            }
        }
    }
}
