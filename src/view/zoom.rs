//! Zoom policy
//!
//! Engine geometry is defined at [`REFERENCE_DPI`]. A zoom of 1.0 means the
//! page shows at its physical size on a display of `display_dpi`, so every
//! conversion between "logical" zoom and engine scale goes through the ratio
//! of the two.

/// Resolution of the engine coordinate space (PDF points)
pub const REFERENCE_DPI: f32 = 72.0;

/// Multiplier applied by one zoom in step (zoom out divides by it)
pub const ZOOM_STEP: f32 = 1.25;

/// Pure zoom computations
pub struct ZoomPolicy;

impl ZoomPolicy {
    /// Zoom that fits a page into the viewport.
    ///
    /// A page larger than the viewport shrinks until it fits. A page that is
    /// smaller in both directions is magnified until one side touches the
    /// viewport edge. The result is divided by the DPI correction so that
    /// [`ZoomPolicy::apply_dpi_correction`] gives back the fitting scale.
    #[must_use]
    pub fn fit_zoom(
        page_width: f32,
        page_height: f32,
        viewport_width: f32,
        viewport_height: f32,
        display_dpi: f32,
    ) -> f32 {
        Self::fit_zoom_at(
            page_width,
            page_height,
            viewport_width,
            viewport_height,
            display_dpi,
            REFERENCE_DPI,
        )
    }

    /// [`ZoomPolicy::fit_zoom`] with an explicit engine reference DPI
    #[must_use]
    pub fn fit_zoom_at(
        page_width: f32,
        page_height: f32,
        viewport_width: f32,
        viewport_height: f32,
        display_dpi: f32,
        reference_dpi: f32,
    ) -> f32 {
        let fit_width = viewport_width / page_width;
        let fit_height = viewport_height / page_height;

        let mut zoom = 1.0_f32.min(fit_width).min(fit_height);
        if zoom == 1.0 {
            zoom = fit_width.min(fit_height);
        }

        zoom / (display_dpi / reference_dpi)
    }

    /// Engine scale for a logical zoom on a display of `display_dpi`
    #[must_use]
    pub fn apply_dpi_correction(zoom: f32, display_dpi: f32) -> f32 {
        Self::apply_dpi_correction_at(zoom, display_dpi, REFERENCE_DPI)
    }

    #[must_use]
    pub fn apply_dpi_correction_at(zoom: f32, display_dpi: f32, reference_dpi: f32) -> f32 {
        zoom * (display_dpi / reference_dpi)
    }

    /// One step larger
    #[must_use]
    pub fn step_in(zoom: f32) -> f32 {
        zoom * ZOOM_STEP
    }

    /// One step smaller
    #[must_use]
    pub fn step_out(zoom: f32) -> f32 {
        zoom / ZOOM_STEP
    }
}
