use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::ui::nav::Route;

/// What a terminal key means at the app level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Quit,
    NextView,
    PreviousView,
    Goto(Route),
    /// Passed to the current view unchanged
    View(KeyCode),
    None,
}

/// Map a key event to an app command.
///
/// Only keys a form never needs are global: Tab/Shift-Tab, F1-F5, Esc and Ctrl+C.
/// Everything else is handed to the current view.
pub fn map_key(key: KeyEvent) -> AppCommand {
    if key.kind == KeyEventKind::Release {
        return AppCommand::None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => AppCommand::Quit,
        KeyCode::Esc => AppCommand::Quit,
        KeyCode::Tab => AppCommand::NextView,
        KeyCode::BackTab => AppCommand::PreviousView,
        KeyCode::F(n @ 1..=5) => AppCommand::Goto(Route::ALL[(n - 1) as usize]),
        code => AppCommand::View(code),
    }
}
