//! One open document: page cache, zoom rules and navigation state

mod cache;
mod state;
mod zoom;

pub use cache::PageRenderCache;
pub use state::{Effect, OpenOptions, ViewCommand, ViewState, Viewport};
pub use zoom::{REFERENCE_DPI, ZOOM_STEP, ZoomPolicy};
