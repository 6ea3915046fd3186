use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

use super::centered_rect;
use crate::history::ViewSnapshot;
use crate::theme::OCEANIC_NEXT;

pub enum HistoryPopupAction {
    Open(String),
    Close,
}

/// Picker over the history records, most recent first
pub struct HistoryPopup {
    items: Vec<HistoryItem>,
    state: ListState,
}

struct HistoryItem {
    title: String,
    path: String,
    page: usize,
}

impl HistoryPopup {
    pub fn new(history: &[ViewSnapshot]) -> Self {
        let items: Vec<HistoryItem> = history
            .iter()
            .map(|record| HistoryItem {
                title: record
                    .file_name
                    .rsplit(['/', '\\'])
                    .next()
                    .unwrap_or(&record.file_name)
                    .to_string(),
                path: record.file_name.clone(),
                page: record.page,
            })
            .collect();

        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }

        HistoryPopup { items, state }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 80, area);
        f.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| {
                ListItem::new(Line::from(vec![
                    Span::styled(&item.title, Style::default().fg(OCEANIC_NEXT.base_05)),
                    Span::styled(
                        format!("  p. {}", item.page + 1),
                        Style::default().fg(OCEANIC_NEXT.base_03),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(" History ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(OCEANIC_NEXT.base_0c))
                    .style(Style::default().bg(OCEANIC_NEXT.base_00)),
            )
            .highlight_style(
                Style::default()
                    .bg(OCEANIC_NEXT.base_02)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        f.render_stateful_widget(list, popup_area, &mut self.state);
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn selected_path(&self) -> Option<&str> {
        self.state
            .selected()
            .and_then(|i| self.items.get(i))
            .map(|item| item.path.as_str())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<HistoryPopupAction> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.next();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous();
                None
            }
            KeyCode::Enter => Some(match self.selected_path() {
                Some(path) => HistoryPopupAction::Open(path.to_string()),
                None => HistoryPopupAction::Close,
            }),
            KeyCode::Esc | KeyCode::Char('q') => Some(HistoryPopupAction::Close),
            _ => None,
        }
    }
}
