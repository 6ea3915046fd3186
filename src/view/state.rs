//! Navigation and display state of one open document

use std::path::Path;
use std::rc::Rc;

use log::{debug, info, warn};

use super::cache::PageRenderCache;
use super::zoom::ZoomPolicy;
use crate::engine::{Colorspace, Raster, RenderEngine};
use crate::error::{BrowseError, EngineFault, Result};
use crate::history::ViewSnapshot;

/// Screen area available for a page, in display pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Initial state for [`ViewState::open`]
#[derive(Clone, Debug)]
pub struct OpenOptions {
    pub page_index: usize,
    pub zoom: f32,
    pub colorspace: Colorspace,
    pub display_dpi: f32,
    pub viewport: Viewport,
    pub location: Option<(i32, i32)>,
    /// Display list cache bound, 0 keeps every page
    pub cache_capacity: usize,
}

impl OpenOptions {
    /// First page, natural size, RGB
    #[must_use]
    pub fn new(display_dpi: f32, viewport: Viewport) -> Self {
        Self {
            page_index: 0,
            zoom: 1.0,
            colorspace: Colorspace::Rgb,
            display_dpi,
            viewport,
            location: None,
            cache_capacity: 0,
        }
    }

    /// Take page, zoom, colorspace and window location from a saved snapshot
    #[must_use]
    pub fn seeded_from(mut self, snapshot: &ViewSnapshot) -> Self {
        self.page_index = snapshot.page;
        self.zoom = snapshot.zoom;
        self.colorspace = snapshot.colorspace;
        self.location = Some(snapshot.location);
        self
    }

    #[must_use]
    pub fn page(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    #[must_use]
    pub fn zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    #[must_use]
    pub fn colorspace(mut self, colorspace: Colorspace) -> Self {
        self.colorspace = colorspace;
        self
    }

    #[must_use]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

/// Commands that modify a view
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewCommand {
    NextPage,
    PreviousPage,
    /// 1-based page number, clamped into the document
    GoToPage(i64),
    FirstPage,
    ZoomIn,
    ZoomOut,
    ZoomFit,
    Zoom100,
    SetZoom(f32),
    ToggleColorspace,
    SetViewport(Viewport),
}

/// Work the front end has to do after a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    RenderCurrentPage,
    UpdateTitle,
}

/// One open document: where the reader is and how the page is shown
pub struct ViewState<E: RenderEngine> {
    engine: Rc<E>,
    document: E::Document,
    path: String,
    page_count: usize,
    current_page: usize,
    zoom: f32,
    colorspace: Colorspace,
    display_dpi: f32,
    viewport: Viewport,
    location: Option<(i32, i32)>,
    cache: PageRenderCache<E::DisplayList>,
    last_rendered: Option<usize>,
}

impl<E: RenderEngine> ViewState<E> {
    /// Open `path` through the engine
    pub fn open(engine: Rc<E>, path: &str, options: OpenOptions) -> Result<Self> {
        let opened = engine
            .open(Path::new(path))
            .map_err(|e| BrowseError::document_open(path, e))?;

        if opened.page_count == 0 {
            engine.close(opened.document);
            return Err(BrowseError::document_open(
                path,
                EngineFault::generic("document has no pages"),
            ));
        }

        let zoom = if options.zoom.is_finite() && options.zoom > 0.0 {
            options.zoom
        } else {
            warn!("Ignoring invalid zoom {} for {path}", options.zoom);
            1.0
        };

        let current_page = options.page_index.min(opened.page_count - 1);
        info!(
            "Opened {path}: {} pages, page {}, zoom {zoom}",
            opened.page_count,
            current_page + 1
        );

        Ok(Self {
            engine,
            document: opened.document,
            path: path.to_string(),
            page_count: opened.page_count,
            current_page,
            zoom,
            colorspace: options.colorspace,
            display_dpi: options.display_dpi,
            viewport: options.viewport,
            location: options.location,
            cache: PageRenderCache::with_capacity(options.cache_capacity),
            last_rendered: None,
        })
    }

    /// Reopen a document where a previous session left it
    pub fn from_snapshot(
        engine: Rc<E>,
        snapshot: &ViewSnapshot,
        viewport: Viewport,
        display_dpi: f32,
    ) -> Result<Self> {
        let options = OpenOptions::new(display_dpi, viewport).seeded_from(snapshot);
        Self::open(engine, &snapshot.file_name, options)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Current page (0-based)
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn colorspace(&self) -> Colorspace {
        self.colorspace
    }

    pub fn display_dpi(&self) -> f32 {
        self.display_dpi
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn window_location(&self) -> Option<(i32, i32)> {
        self.location
    }

    pub fn set_window_location(&mut self, location: Option<(i32, i32)>) {
        self.location = location;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Number of pages with a cached display list
    pub fn cached_pages(&self) -> usize {
        self.cache.len()
    }

    /// Rasterize the current page at the current zoom and colorspace.
    ///
    /// If the engine fails and an earlier page rendered fine, the view moves
    /// back to that page before the error is returned.
    pub fn render_current_page(&mut self) -> Result<Raster> {
        let page = self.current_page;
        let scale = ZoomPolicy::apply_dpi_correction(self.zoom, self.display_dpi);
        let colorspace = self.colorspace;
        let engine = &self.engine;
        let document = &self.document;

        let result = self
            .cache
            .get_or_create(page, |p| engine.display_list(document, p))
            .and_then(|list| engine.rasterize(list, scale, colorspace));

        match result {
            Ok(raster) => {
                debug!(
                    "Rendered {} page {} at scale {scale}: {}x{}",
                    self.path,
                    page + 1,
                    raster.width,
                    raster.height
                );
                self.last_rendered = Some(page);
                Ok(raster)
            }
            Err(source) => {
                if let Some(previous) = self.last_rendered {
                    warn!(
                        "Rendering page {} of {} failed, staying on page {}",
                        page + 1,
                        self.path,
                        previous + 1
                    );
                    self.current_page = previous;
                }
                Err(BrowseError::RenderFailure { page, source })
            }
        }
    }

    /// Advance one page, wrapping from the last page to the first
    pub fn next_page(&mut self) {
        self.current_page = (self.current_page + 1) % self.page_count;
    }

    /// Go back one page, wrapping from the first page to the last
    pub fn previous_page(&mut self) {
        self.current_page = (self.current_page + self.page_count - 1) % self.page_count;
    }

    /// Jump to a 1-based page number, clamping out of range numbers
    pub fn go_to_page(&mut self, one_based: i64) {
        let last = self.page_count - 1;
        self.current_page = match usize::try_from(one_based.saturating_sub(1)) {
            Ok(page) => page.min(last),
            Err(_) => 0,
        };
    }

    pub fn set_zoom(&mut self, zoom: f32) -> Result<()> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(BrowseError::InvalidZoom(zoom));
        }
        self.zoom = zoom;
        Ok(())
    }

    /// Zoom in one step. At the edge of the `f32` range the zoom stays put.
    pub fn zoom_in(&mut self) {
        self.step_zoom(ZoomPolicy::step_in(self.zoom));
    }

    pub fn zoom_out(&mut self) {
        self.step_zoom(ZoomPolicy::step_out(self.zoom));
    }

    fn step_zoom(&mut self, zoom: f32) {
        if self.set_zoom(zoom).is_err() {
            debug!("Zoom step for {} stopped at {}", self.path, self.zoom);
        }
    }

    pub fn zoom_100(&mut self) {
        self.zoom = 1.0;
    }

    pub fn toggle_colorspace(&mut self) {
        self.colorspace = self.colorspace.toggled();
    }

    /// Fit the current page into `viewport` and remember the viewport
    pub fn fit_to_viewport(&mut self, viewport: Viewport) -> Result<()> {
        let page = self.current_page;
        let geometry = self
            .engine
            .page_geometry(&self.document, page)
            .map_err(|source| BrowseError::RenderFailure { page, source })?;

        self.viewport = viewport;
        self.set_zoom(ZoomPolicy::fit_zoom(
            geometry.width,
            geometry.height,
            viewport.width,
            viewport.height,
            self.display_dpi,
        ))?;
        debug!("Fit zoom for {} page {}: {}", self.path, page + 1, self.zoom);
        Ok(())
    }

    /// Apply a command and report what needs redrawing
    pub fn apply(&mut self, command: ViewCommand) -> Result<Vec<Effect>> {
        let page_before = self.current_page;
        let zoom_before = self.zoom;

        match command {
            ViewCommand::NextPage => self.next_page(),
            ViewCommand::PreviousPage => self.previous_page(),
            ViewCommand::GoToPage(n) => self.go_to_page(n),
            ViewCommand::FirstPage => self.go_to_page(1),
            ViewCommand::ZoomIn => self.zoom_in(),
            ViewCommand::ZoomOut => self.zoom_out(),
            ViewCommand::ZoomFit => self.fit_to_viewport(self.viewport)?,
            ViewCommand::Zoom100 => self.zoom_100(),
            ViewCommand::SetZoom(zoom) => self.set_zoom(zoom)?,
            ViewCommand::ToggleColorspace => {
                self.toggle_colorspace();
                return Ok(vec![Effect::RenderCurrentPage]);
            }
            ViewCommand::SetViewport(viewport) => {
                self.set_viewport(viewport);
                return Ok(vec![]);
            }
        }

        if self.current_page != page_before || self.zoom.to_bits() != zoom_before.to_bits() {
            Ok(vec![Effect::RenderCurrentPage, Effect::UpdateTitle])
        } else {
            Ok(vec![])
        }
    }

    /// Window title for this view
    pub fn title(&self) -> String {
        format!(
            "Page {} of {} from file {}; zoom = {:.6}",
            self.current_page + 1,
            self.page_count,
            self.path,
            self.zoom
        )
    }

    /// Persistable record of this view.
    ///
    /// An unknown window location, or one with a zero coordinate, is stored
    /// as `(0, 0)`.
    pub fn snapshot(&self) -> ViewSnapshot {
        let location = match self.location {
            Some((x, y)) if x != 0 && y != 0 => (x, y),
            _ => (0, 0),
        };
        ViewSnapshot {
            file_name: self.path.clone(),
            page: self.current_page,
            zoom: self.zoom,
            colorspace: self.colorspace,
            location,
        }
    }

    /// Release the engine document
    pub fn close(self) {
        info!("Closing {}", self.path);
        let Self {
            engine, document, ..
        } = self;
        engine.close(document);
    }
}
