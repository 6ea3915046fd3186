pub mod app;
pub mod engine;
pub mod error;
pub mod event_source;
pub mod history;
pub mod keymap;
pub mod notification;
pub mod panic_handler;
pub mod session;
pub mod settings;
pub mod theme;
pub mod view;
pub mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use app::{App, run_app_with_event_source};
pub use error::{BrowseError, EngineFault, Result};
pub use history::{HistoryStore, ViewSnapshot};
pub use session::{BrowserSession, Event, Outcome, SessionConfig, StartSource, ViewId};
pub use view::{ViewState, Viewport};
