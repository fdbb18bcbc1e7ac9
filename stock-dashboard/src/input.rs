//! Keyboard handling
//!
//! A notification blocks every key except the ones dismissing it. The
//! overlay comes next, then the board.

use crossterm::event::KeyCode;

use crate::{dashboard::Dashboard, types::DashboardEvent};

/// What the main loop should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    Emit(DashboardEvent),
}

/// Apply `code` to the dashboard; `columns` is the width of the card grid
pub fn handle_key(dashboard: &mut Dashboard, code: KeyCode, columns: usize) -> KeyAction {
    if dashboard.notification().is_some() {
        if matches!(code, KeyCode::Enter | KeyCode::Esc) {
            dashboard.close_top();
        }
        return KeyAction::None;
    }

    if dashboard.overlay().is_visible() {
        return match code {
            KeyCode::Esc | KeyCode::Enter => {
                dashboard.close_top();
                KeyAction::None
            }
            KeyCode::Char('q') => KeyAction::Quit,
            _ => KeyAction::None,
        };
    }

    let step = isize::try_from(columns.max(1)).unwrap_or(1);
    let board = dashboard.board_mut();
    match code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Left | KeyCode::Char('h') => {
            board.select_prev();
            KeyAction::None
        }
        KeyCode::Right | KeyCode::Char('l') => {
            board.select_next();
            KeyAction::None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            board.select_offset(-step);
            KeyAction::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            board.select_offset(step);
            KeyAction::None
        }
        KeyCode::Enter => board
            .activate_selected()
            .map_or(KeyAction::None, KeyAction::Emit),
        _ => KeyAction::None,
    }
}
