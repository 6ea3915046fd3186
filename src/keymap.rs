//! Terminal input to session events

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};

use crate::session::Event;

/// What a key or mouse action asks the front end to do
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Forward directly to the session
    Session(Event),
    /// Ask for a file path, then open it
    PromptOpenFile,
    /// Ask for a page number, then go there
    PromptPage,
    /// Show the history list and open the chosen entry
    PickFromHistory,
    /// Activate the next open view
    FocusNext,
}

pub const HELP_TEXT: &str = "\
Navigation
  Right, Up, PageDown, wheel down   next page
  Left, Down, PageUp, wheel up      previous page
  Home                              first page
  g                                 go to page number

Display
  +                                 zoom in
  -                                 zoom out
  f, *                              fit page to screen
  0                                 zoom 100%
  c                                 toggle gray / color

Documents
  o                                 open a file
  h                                 open from history
  Tab                               next open document
  q                                 close this document
  Esc                               close all and quit
  F1                                this help";

/// Translate a key press; release and repeat events are ignored
pub fn action_for_key(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let event = match key.code {
        KeyCode::Right | KeyCode::Up | KeyCode::PageDown => Event::NextPage,
        KeyCode::Left | KeyCode::Down | KeyCode::PageUp => Event::PreviousPage,
        KeyCode::Home => Event::GoToFirstPage,
        KeyCode::Char('c') => Event::ToggleColorspace,
        KeyCode::Char('+') => Event::ZoomIn,
        KeyCode::Char('-') => Event::ZoomOut,
        KeyCode::Char('f' | '*') => Event::ZoomFit,
        KeyCode::Char('0') => Event::Zoom100,
        KeyCode::Char('q') => Event::Quit,
        KeyCode::Esc => Event::QuitAll,
        KeyCode::F(1) => Event::ShowHelp,
        KeyCode::Char('o') => return Some(Action::PromptOpenFile),
        KeyCode::Char('g') => return Some(Action::PromptPage),
        KeyCode::Char('h') => return Some(Action::PickFromHistory),
        KeyCode::Tab => return Some(Action::FocusNext),
        _ => return None,
    };
    Some(Action::Session(event))
}

/// Translate a mouse event; only the vertical wheel is used
pub fn action_for_mouse(mouse: &MouseEvent) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(Action::Session(Event::NextPage)),
        MouseEventKind::ScrollUp => Some(Action::Session(Event::PreviousPage)),
        _ => None,
    }
}

/// Parse a page number typed by the user
pub fn parse_page_number(input: &str) -> Option<i64> {
    input.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind,
            state: KeyEventState::empty(),
        }
    }

    fn press(code: KeyCode) -> Option<Action> {
        action_for_key(&key(code, KeyEventKind::Press))
    }

    #[test]
    fn paging_keys() {
        for code in [KeyCode::Right, KeyCode::Up, KeyCode::PageDown] {
            assert_eq!(press(code), Some(Action::Session(Event::NextPage)));
        }
        for code in [KeyCode::Left, KeyCode::Down, KeyCode::PageUp] {
            assert_eq!(press(code), Some(Action::Session(Event::PreviousPage)));
        }
    }

    #[test]
    fn zoom_keys() {
        assert_eq!(press(KeyCode::Char('*')), press(KeyCode::Char('f')));
        assert_eq!(
            press(KeyCode::Char('0')),
            Some(Action::Session(Event::Zoom100))
        );
    }

    #[test]
    fn prompts_and_focus() {
        assert_eq!(press(KeyCode::Char('o')), Some(Action::PromptOpenFile));
        assert_eq!(press(KeyCode::Char('g')), Some(Action::PromptPage));
        assert_eq!(press(KeyCode::Tab), Some(Action::FocusNext));
        assert_eq!(press(KeyCode::Char('x')), None);
    }

    #[test]
    fn key_release_is_ignored() {
        assert_eq!(
            action_for_key(&key(KeyCode::Char('q'), KeyEventKind::Release)),
            None
        );
    }

    #[test]
    fn horizontal_wheel_is_ignored() {
        let mouse = MouseEvent {
            kind: MouseEventKind::ScrollLeft,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::empty(),
        };
        assert_eq!(action_for_mouse(&mouse), None);
    }

    #[test]
    fn page_numbers() {
        assert_eq!(parse_page_number(" 12 "), Some(12));
        assert_eq!(parse_page_number("-3"), Some(-3));
        assert_eq!(parse_page_number("twelve"), None);
    }
}
