//! Set of open views and their reconciliation with the history store

use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info, warn};

use crate::engine::{Raster, RenderEngine};
use crate::error::{BrowseError, EngineFault, Result};
use crate::history::{HistoryStore, ViewSnapshot};
use crate::view::{OpenOptions, ViewCommand, ViewState, Viewport};

/// Identifier of an open view, stable for the view's lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// User actions, already translated from raw input
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Close the active view
    Quit,
    /// Close every view and remember them as the session
    QuitAll,
    FocusChanged(ViewId),
    OpenFile(PathBuf),
    OpenFromHistory(String),
    NextPage,
    PreviousPage,
    /// 1-based page number
    GoToPage(i64),
    GoToFirstPage,
    ZoomIn,
    ZoomOut,
    ZoomFit,
    Zoom100,
    ToggleColorspace,
    ShowHelp,
}

/// What the front end should do after an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing visible changed
    Unchanged,
    /// Render the active view again
    Redraw,
    /// A view was closed; `last` means no views are left
    Closed { last: bool },
    /// Every view was closed, leave the application
    Exit,
    ShowHelp,
}

/// How [`BrowserSession::start`] found the first document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartSource {
    /// Restored this many views from the last session
    Session(usize),
    History,
    CommandLine,
    Prompt,
}

/// Display parameters shared by every view of a session
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub display_dpi: f32,
    pub viewport: Viewport,
    pub cache_capacity: usize,
}

impl SessionConfig {
    #[must_use]
    pub fn new(display_dpi: f32, viewport: Viewport) -> Self {
        Self {
            display_dpi,
            viewport,
            cache_capacity: 0,
        }
    }

    #[must_use]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    fn open_options(&self) -> OpenOptions {
        OpenOptions::new(self.display_dpi, self.viewport).cache_capacity(self.cache_capacity)
    }
}

struct OpenView<E: RenderEngine> {
    id: ViewId,
    state: ViewState<E>,
}

/// Open documents of one application run.
///
/// Views are kept most-recently-opened first. Whenever at least one view is
/// open, exactly one of them is active.
pub struct BrowserSession<E: RenderEngine> {
    engine: Rc<E>,
    history: HistoryStore,
    config: SessionConfig,
    views: Vec<OpenView<E>>,
    active: Option<ViewId>,
    next_id: u64,
    persist_failures: Vec<BrowseError>,
}

impl<E: RenderEngine> BrowserSession<E> {
    pub fn new(engine: Rc<E>, history: HistoryStore, config: SessionConfig) -> Self {
        Self {
            engine,
            history,
            config,
            views: Vec::new(),
            active: None,
            next_id: 1,
            persist_failures: Vec::new(),
        }
    }

    /// Open the first document(s).
    ///
    /// Tries, in order: the documents of the last session, the most recent
    /// history entry, `cli_path`, and finally whatever `prompt` returns.
    /// Session and history entries that no longer open are skipped.
    pub fn start<P>(&mut self, cli_path: Option<&Path>, prompt: P) -> Result<StartSource>
    where
        P: FnOnce() -> Option<PathBuf>,
    {
        let session: Vec<String> = self.history.session_paths().to_vec();
        if !session.is_empty() {
            // oldest first, so the most recent one ends up in front and active
            let mut restored = 0;
            for path in session.iter().rev() {
                match self.open_into_front(path) {
                    Ok(_) => restored += 1,
                    Err(e) => warn!("Skipping session document: {e}"),
                }
            }
            if restored > 0 {
                info!("Restored {restored} of {} session documents", session.len());
                return Ok(StartSource::Session(restored));
            }
        }

        if let Some(path) = self.history.most_recent().map(|s| s.file_name.clone()) {
            match self.open_into_front(&path) {
                Ok(_) => return Ok(StartSource::History),
                Err(e) => warn!("Cannot resume most recent document: {e}"),
            }
        }

        if let Some(path) = cli_path {
            if !path.is_file() {
                return Err(BrowseError::NoDocument);
            }
            self.open_into_front(&path.to_string_lossy())?;
            return Ok(StartSource::CommandLine);
        }

        match prompt() {
            Some(path) => {
                self.open_into_front(&path.to_string_lossy())?;
                Ok(StartSource::Prompt)
            }
            None => Err(BrowseError::NoDocument),
        }
    }

    /// Open `path` as a new active view, resuming its saved state if there is one.
    ///
    /// The state of the currently active view is written to the history first.
    pub fn open_new(&mut self, path: &str) -> Result<ViewId> {
        self.remember_active();
        self.open_into_front(path)
    }

    /// Open a document picked from the history list
    pub fn open_from_history(&mut self, path: &str) -> Result<ViewId> {
        if !Path::new(path).is_file() {
            return Err(BrowseError::document_open(
                path,
                EngineFault::generic("file no longer exists"),
            ));
        }
        self.open_new(path)
    }

    fn open_into_front(&mut self, path: &str) -> Result<ViewId> {
        let mut options = self.config.open_options();
        if let Some(snapshot) = self.history.find(path) {
            debug!("Resuming {path} from history");
            options = options.seeded_from(snapshot);
        }
        let state = ViewState::open(self.engine.clone(), path, options)?;

        let id = ViewId(self.next_id);
        self.next_id += 1;
        self.views.insert(0, OpenView { id, state });
        self.active = Some(id);
        Ok(id)
    }

    pub fn activate(&mut self, id: ViewId) -> Result<()> {
        if !self.views.iter().any(|v| v.id == id) {
            return Err(BrowseError::UnknownView(id));
        }
        debug!("Activating view {id:?}");
        self.active = Some(id);
        Ok(())
    }

    /// Close the active view after saving its state.
    ///
    /// Returns `true` when no views remain.
    pub fn close_active(&mut self) -> Result<bool> {
        let Some(id) = self.active else {
            return Ok(self.views.is_empty());
        };
        let index = self.index_of(id)?;

        self.remember_active();
        let view = self.views.remove(index);
        view.state.close();

        self.active = self.views.first().map(|v| v.id);
        let last = self.views.is_empty();
        info!("Closed view {id:?}, {} remaining", self.views.len());
        Ok(last)
    }

    /// Save every open view as the session and close them all
    pub fn close_all(&mut self) {
        let paths: Vec<String> = self
            .views
            .iter()
            .map(|v| v.state.path().to_string())
            .collect();
        let snapshots: Vec<ViewSnapshot> = self.views.iter().map(|v| v.state.snapshot()).collect();

        if let Err(e) = self.history.save_session(paths, snapshots) {
            self.persist_failures.push(e);
        }

        for view in self.views.drain(..) {
            view.state.close();
        }
        self.active = None;
    }

    fn remember_active(&mut self) {
        let Some(snapshot) = self.active_view().map(ViewState::snapshot) else {
            return;
        };
        if let Err(e) = self.history.update(snapshot) {
            self.persist_failures.push(e);
        }
    }

    /// Persistence errors since the last call, oldest first
    pub fn take_persist_failures(&mut self) -> Vec<BrowseError> {
        std::mem::take(&mut self.persist_failures)
    }

    /// Apply one user action
    pub fn dispatch(&mut self, event: Event) -> Result<Outcome> {
        debug!("Event: {event:?}");
        let command = match event {
            Event::Quit => {
                let last = self.close_active()?;
                return Ok(Outcome::Closed { last });
            }
            Event::QuitAll => {
                self.close_all();
                return Ok(Outcome::Exit);
            }
            Event::FocusChanged(id) => {
                self.activate(id)?;
                return Ok(Outcome::Redraw);
            }
            Event::OpenFile(path) => {
                self.open_new(&path.to_string_lossy())?;
                return Ok(Outcome::Redraw);
            }
            Event::OpenFromHistory(path) => {
                self.open_from_history(&path)?;
                return Ok(Outcome::Redraw);
            }
            Event::ShowHelp => return Ok(Outcome::ShowHelp),
            Event::NextPage => ViewCommand::NextPage,
            Event::PreviousPage => ViewCommand::PreviousPage,
            Event::GoToPage(n) => ViewCommand::GoToPage(n),
            Event::GoToFirstPage => ViewCommand::FirstPage,
            Event::ZoomIn => ViewCommand::ZoomIn,
            Event::ZoomOut => ViewCommand::ZoomOut,
            Event::ZoomFit => ViewCommand::ZoomFit,
            Event::Zoom100 => ViewCommand::Zoom100,
            Event::ToggleColorspace => ViewCommand::ToggleColorspace,
        };

        let Some(view) = self.active_view_mut() else {
            return Ok(Outcome::Unchanged);
        };
        let effects = view.apply(command)?;
        Ok(if effects.is_empty() {
            Outcome::Unchanged
        } else {
            Outcome::Redraw
        })
    }

    /// Render the active view, `None` when nothing is open
    pub fn render_active(&mut self) -> Result<Option<Raster>> {
        match self.active_view_mut() {
            Some(view) => view.render_current_page().map(Some),
            None => Ok(None),
        }
    }

    /// Update the available page area of every view
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.config.viewport = viewport;
        for view in &mut self.views {
            view.state.set_viewport(viewport);
        }
    }

    fn index_of(&self, id: ViewId) -> Result<usize> {
        self.views
            .iter()
            .position(|v| v.id == id)
            .ok_or(BrowseError::UnknownView(id))
    }

    pub fn active_id(&self) -> Option<ViewId> {
        self.active
    }

    pub fn active_view(&self) -> Option<&ViewState<E>> {
        let id = self.active?;
        self.views.iter().find(|v| v.id == id).map(|v| &v.state)
    }

    pub fn active_view_mut(&mut self) -> Option<&mut ViewState<E>> {
        let id = self.active?;
        self.views
            .iter_mut()
            .find(|v| v.id == id)
            .map(|v| &mut v.state)
    }

    pub fn view(&self, id: ViewId) -> Option<&ViewState<E>> {
        self.views.iter().find(|v| v.id == id).map(|v| &v.state)
    }

    /// Open views, most recently opened first
    pub fn view_ids(&self) -> Vec<ViewId> {
        self.views.iter().map(|v| v.id).collect()
    }

    /// The view after the active one in open order, wrapping around
    pub fn next_view_id(&self) -> Option<ViewId> {
        let index = self.active.and_then(|id| self.index_of(id).ok())?;
        self.views.get((index + 1) % self.views.len()).map(|v| v.id)
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
