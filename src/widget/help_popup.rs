use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::content_sized_rect;
use crate::keymap::HELP_TEXT;
use crate::theme::OCEANIC_NEXT;

pub enum HelpPopupAction {
    Close,
}

/// Key binding reference
pub struct HelpPopup {
    scroll_offset: usize,
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpPopup {
    pub fn new() -> Self {
        HelpPopup { scroll_offset: 0 }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let max_content_width = HELP_TEXT
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(60);
        // two spaces of margin on both sides plus the borders
        let width = (max_content_width + 6) as u16;
        let height = (HELP_TEXT.lines().count() + 2) as u16;
        let popup_area = content_sized_rect(width, height, area);

        f.render_widget(Clear, popup_area);

        let lines: Vec<Line> = HELP_TEXT
            .lines()
            .skip(self.scroll_offset)
            .map(|line| {
                Line::from(Span::styled(
                    format!("  {line}"),
                    Style::default().fg(OCEANIC_NEXT.base_05),
                ))
            })
            .collect();

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(" Help - Press F1 or Esc to close ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(OCEANIC_NEXT.base_0c))
                .style(Style::default().bg(OCEANIC_NEXT.base_00)),
        );

        f.render_widget(paragraph, popup_area);
    }

    pub fn scroll_down(&mut self) {
        let max_lines = HELP_TEXT.lines().count();
        if self.scroll_offset < max_lines.saturating_sub(1) {
            self.scroll_offset += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<HelpPopupAction> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_down();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_up();
                None
            }
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => Some(HelpPopupAction::Close),
            _ => None,
        }
    }
}
