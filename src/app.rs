//! Terminal front end: input modes, drawing and the event loop

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event as TermEvent, KeyEvent, KeyEventKind};
use log::{debug, info};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::engine::{Raster, RenderEngine};
use crate::error::BrowseError;
use crate::event_source::EventSource;
use crate::keymap::{self, Action};
use crate::notification::{Severity, StatusLine};
use crate::session::{BrowserSession, Event, Outcome};
use crate::theme::OCEANIC_NEXT;
use crate::view::Viewport;
use crate::widget::help_popup::{HelpPopup, HelpPopupAction};
use crate::widget::history_popup::{HistoryPopup, HistoryPopupAction};
use crate::widget::page_image::{PIXELS_PER_CELL, PageImage};
use crate::widget::prompt::{InputPrompt, PromptAction, PromptKind};

const TICK_RATE: Duration = Duration::from_millis(100);
/// Title bar and status line
const CHROME_ROWS: u16 = 2;

enum Mode {
    Normal,
    Prompt(InputPrompt),
    History(HistoryPopup),
    Help(HelpPopup),
}

pub struct App<E: RenderEngine> {
    session: BrowserSession<E>,
    mode: Mode,
    raster: Option<Raster>,
    pub status: StatusLine,
    should_quit: bool,
}

impl<E: RenderEngine> App<E> {
    /// Front end over a session that already has its first view open
    pub fn new(session: BrowserSession<E>) -> Self {
        Self {
            session,
            mode: Mode::Normal,
            raster: None,
            status: StatusLine::new(),
            should_quit: false,
        }
    }

    /// Fit viewport of the page area on a terminal of `columns` x `rows`
    pub fn page_viewport(columns: u16, rows: u16) -> Viewport {
        let (px, py) = PIXELS_PER_CELL;
        let page_rows = rows.saturating_sub(CHROME_ROWS).max(1);
        Viewport::new(
            f32::from(columns.max(1).saturating_mul(px)),
            f32::from(page_rows.saturating_mul(py)),
        )
    }

    pub fn session(&self) -> &BrowserSession<E> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut BrowserSession<E> {
        &mut self.session
    }

    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_prompting(&self) -> bool {
        matches!(self.mode, Mode::Prompt(_))
    }

    pub fn is_showing_help(&self) -> bool {
        matches!(self.mode, Mode::Help(_))
    }

    pub fn is_picking_history(&self) -> bool {
        matches!(self.mode, Mode::History(_))
    }

    /// Terminal size changed: every view gets the new page area
    pub fn resize(&mut self, columns: u16, rows: u16) {
        let viewport = Self::page_viewport(columns, rows);
        debug!("Resize to {columns}x{rows}, viewport {viewport:?}");
        self.session.set_viewport(viewport);
        self.refresh();
    }

    /// Render the active view again
    pub fn refresh(&mut self) {
        match self.session.render_active() {
            Ok(raster) => self.raster = raster,
            Err(e) => {
                self.status.report(&e);
                // the view is back on its last good page, which is cached
                self.raster = self.session.render_active().ok().flatten();
            }
        }
    }

    pub fn handle_event(&mut self, event: TermEvent) -> Result<()> {
        match event {
            TermEvent::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            TermEvent::Mouse(mouse) if matches!(self.mode, Mode::Normal) => {
                match keymap::action_for_mouse(&mouse) {
                    Some(action) => self.perform(action),
                    None => Ok(()),
                }
            }
            TermEvent::Resize(columns, rows) => {
                self.resize(columns, rows);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => match keymap::action_for_key(&key) {
                Some(action) => self.perform(action),
                None => Ok(()),
            },
            Mode::Prompt(mut prompt) => match prompt.handle_key(key) {
                Some(PromptAction::Submit(kind, text)) => self.submit_prompt(kind, text),
                Some(PromptAction::Cancel) => Ok(()),
                None => {
                    self.mode = Mode::Prompt(prompt);
                    Ok(())
                }
            },
            Mode::History(mut popup) => match popup.handle_key(key) {
                Some(HistoryPopupAction::Open(path)) => {
                    self.dispatch(Event::OpenFromHistory(path))?;
                    Ok(())
                }
                Some(HistoryPopupAction::Close) => Ok(()),
                None => {
                    self.mode = Mode::History(popup);
                    Ok(())
                }
            },
            Mode::Help(mut help) => {
                if !matches!(help.handle_key(key), Some(HelpPopupAction::Close)) {
                    self.mode = Mode::Help(help);
                }
                Ok(())
            }
        }
    }

    fn perform(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Session(event) => {
                self.dispatch(event)?;
            }
            Action::PromptOpenFile => self.mode = Mode::Prompt(InputPrompt::new(PromptKind::OpenFile)),
            Action::PromptPage => self.mode = Mode::Prompt(InputPrompt::new(PromptKind::GoToPage)),
            Action::PickFromHistory => {
                let popup = HistoryPopup::new(self.session.history().history());
                if popup.is_empty() {
                    self.status.info("History is empty");
                } else {
                    self.mode = Mode::History(popup);
                }
            }
            Action::FocusNext => {
                if let Some(id) = self.session.next_view_id() {
                    self.dispatch(Event::FocusChanged(id))?;
                }
            }
        }
        Ok(())
    }

    fn submit_prompt(&mut self, kind: PromptKind, text: String) -> Result<()> {
        match kind {
            PromptKind::OpenFile => {
                let path = text.trim();
                if path.is_empty() {
                    return Ok(());
                }
                if !self.dispatch(Event::OpenFile(PathBuf::from(path)))? {
                    // let the user fix the path
                    self.mode = Mode::Prompt(InputPrompt::with_text(PromptKind::OpenFile, path));
                }
            }
            PromptKind::GoToPage => match keymap::parse_page_number(&text) {
                Some(page) => {
                    self.dispatch(Event::GoToPage(page))?;
                }
                None => self.status.warn(format!("Not a page number: {text}")),
            },
        }
        Ok(())
    }

    /// Send an event to the session; `Ok(false)` when it failed recoverably
    fn dispatch(&mut self, event: Event) -> Result<bool> {
        let succeeded = match self.session.dispatch(event) {
            Ok(outcome) => {
                self.apply_outcome(outcome);
                true
            }
            Err(e) if e.is_recoverable() => {
                self.status.report(&e);
                if matches!(e, BrowseError::RenderFailure { .. }) {
                    self.refresh();
                }
                false
            }
            Err(e) => return Err(e.into()),
        };

        if !self.should_quit {
            for failure in self.session.take_persist_failures() {
                self.status.report(&failure);
            }
        }
        Ok(succeeded)
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Unchanged => {}
            Outcome::Redraw => self.refresh(),
            Outcome::Closed { last: true } | Outcome::Exit => {
                info!("No views left, leaving");
                self.should_quit = true;
            }
            Outcome::Closed { last: false } => self.refresh(),
            Outcome::ShowHelp => self.mode = Mode::Help(HelpPopup::new()),
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let [title_area, page_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(f.area());

        self.draw_title(f, title_area);
        f.render_widget(
            Block::default().style(Style::default().bg(OCEANIC_NEXT.base_00)),
            page_area,
        );
        if let Some(raster) = &self.raster {
            f.render_widget(PageImage::new(raster), page_area);
        }
        self.draw_status(f, status_area);

        let area = f.area();
        match &mut self.mode {
            Mode::Normal => {}
            Mode::Prompt(prompt) => prompt.render(f, area),
            Mode::History(popup) => popup.render(f, area),
            Mode::Help(help) => help.render(f, area),
        }
    }

    fn draw_title(&self, f: &mut Frame, area: Rect) {
        let title = self
            .session
            .active_view()
            .map(|view| view.title())
            .unwrap_or_default();
        let position = match self.session.active_id() {
            Some(id) if self.session.view_count() > 1 => {
                let index = self
                    .session
                    .view_ids()
                    .iter()
                    .position(|v| *v == id)
                    .unwrap_or(0);
                format!(" [{}/{}]", index + 1, self.session.view_count())
            }
            _ => String::new(),
        };

        let line = Line::from(vec![
            Span::styled(
                format!(" {title}"),
                Style::default()
                    .fg(OCEANIC_NEXT.base_06)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(position, Style::default().fg(OCEANIC_NEXT.base_0d)),
        ]);
        f.render_widget(
            Paragraph::new(line).style(Style::default().bg(OCEANIC_NEXT.base_01)),
            area,
        );
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let line = match self.status.current() {
            Some(n) => {
                let color = match n.severity {
                    Severity::Info => OCEANIC_NEXT.base_0b,
                    Severity::Warning => OCEANIC_NEXT.base_0a,
                    Severity::Error => OCEANIC_NEXT.base_08,
                };
                Line::from(Span::styled(
                    format!(" {}", n.text),
                    Style::default().fg(color),
                ))
            }
            None => Line::from(Span::styled(
                " F1 help  o open  h history  q close  Esc quit",
                Style::default().fg(OCEANIC_NEXT.base_03),
            )),
        };
        f.render_widget(
            Paragraph::new(line).style(Style::default().bg(OCEANIC_NEXT.base_01)),
            area,
        );
    }
}

pub fn run_app_with_event_source<B, E>(
    terminal: &mut Terminal<B>,
    app: &mut App<E>,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
    E: RenderEngine,
{
    let size = terminal.size()?;
    app.resize(size.width, size.height);
    let mut needs_redraw = true;

    loop {
        let mut events_processed = 0;
        while event_source.poll(Duration::ZERO)? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;
            app.handle_event(event)?;
            if app.should_quit() {
                return Ok(());
            }
        }

        if events_processed > 0 || app.status.expire() {
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
            needs_redraw = false;
        }

        if events_processed == 0 {
            event_source.poll(TICK_RATE)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_excludes_chrome_rows() {
        let viewport = App::<crate::test_utils::FakeEngine>::page_viewport(80, 24);
        assert_eq!(viewport, Viewport::new(80.0, 44.0));

        let tiny = App::<crate::test_utils::FakeEngine>::page_viewport(0, 1);
        assert_eq!(tiny, Viewport::new(1.0, 2.0));
    }
}
