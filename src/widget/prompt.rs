use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::content_sized_rect;
use crate::theme::OCEANIC_NEXT;

/// What the typed text is for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    OpenFile,
    GoToPage,
}

impl PromptKind {
    fn title(self) -> &'static str {
        match self {
            Self::OpenFile => " Open file ",
            Self::GoToPage => " Go to page ",
        }
    }
}

pub enum PromptAction {
    Submit(PromptKind, String),
    Cancel,
}

/// Single line text input shown over the page
pub struct InputPrompt {
    kind: PromptKind,
    input: String,
}

impl InputPrompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    /// Prompt that starts with `text` already typed
    pub fn with_text(kind: PromptKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            input: text.into(),
        }
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PromptAction> {
        match key.code {
            KeyCode::Enter => Some(PromptAction::Submit(
                self.kind,
                std::mem::take(&mut self.input),
            )),
            KeyCode::Esc => Some(PromptAction::Cancel),
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) => {
                if self.kind == PromptKind::OpenFile || c.is_ascii_digit() || c == '-' {
                    self.input.push(c);
                }
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let width = area.width.saturating_mul(3) / 4;
        let popup_area = content_sized_rect(width.max(20), 3, area);
        f.render_widget(Clear, popup_area);

        // keep the end of long paths visible
        let visible = popup_area.width.saturating_sub(3) as usize;
        let skip = self.input.chars().count().saturating_sub(visible);
        let shown: String = self.input.chars().skip(skip).collect();

        let paragraph = Paragraph::new(Line::from(Span::styled(
            shown.clone(),
            Style::default().fg(OCEANIC_NEXT.base_06),
        )))
        .block(
            Block::default()
                .title(self.kind.title())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(OCEANIC_NEXT.base_0d))
                .style(Style::default().bg(OCEANIC_NEXT.base_01)),
        );
        f.render_widget(paragraph, popup_area);
        f.set_cursor_position(Position::new(
            popup_area.x + 1 + shown.chars().count() as u16,
            popup_area.y + 1,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    #[test]
    fn page_prompt_accepts_only_numbers() {
        let mut prompt = InputPrompt::new(PromptKind::GoToPage);
        for c in "1a2".chars() {
            prompt.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(prompt.input(), "12");
        prompt.handle_key(key(KeyCode::Backspace));

        match prompt.handle_key(key(KeyCode::Enter)) {
            Some(PromptAction::Submit(PromptKind::GoToPage, text)) => assert_eq!(text, "1"),
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn escape_cancels() {
        let mut prompt = InputPrompt::with_text(PromptKind::OpenFile, "/tmp/x.pdf");
        assert_eq!(prompt.kind(), PromptKind::OpenFile);
        assert!(matches!(
            prompt.handle_key(key(KeyCode::Esc)),
            Some(PromptAction::Cancel)
        ));
    }
}
