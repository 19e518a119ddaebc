//! Keyboard form editing shared by the booking, profile and admin views.

use crossterm::event::KeyCode;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Single-line text input with a cursor
#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    pub label: &'static str,
    value: String,
    /// Cursor position in chars
    cursor: usize,
}

impl TextField {
    pub fn new(label: &'static str, initial: &str) -> Self {
        Self {
            label,
            value: initial.to_string(),
            cursor: initial.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.chars().count();
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_index(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    /// Apply an editing key; returns false for keys that don't edit text
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.value.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            _ => return false,
        }
        true
    }

    /// Value with a `|` at the cursor
    pub fn display_with_cursor(&self) -> String {
        let mut result = self.value.clone();
        result.insert(self.byte_index(self.cursor), '|');
        result
    }

    pub fn render(&self, focused: bool) -> Line<'static> {
        let value = if focused {
            self.display_with_cursor()
        } else {
            self.value.clone()
        };
        field_line(self.label, value, focused)
    }
}

/// Which row of a form has the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRing {
    index: usize,
    len: usize,
}

impl FocusRing {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is(&self, row: usize) -> bool {
        self.index == row
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn previous(&mut self) {
        if self.len > 0 {
            self.index = if self.index == 0 { self.len - 1 } else { self.index - 1 };
        }
    }
}

pub fn field_line(label: &str, value: String, focused: bool) -> Line<'static> {
    let marker = if focused { "▶ " } else { "  " };
    let value_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        Span::styled(marker.to_string(), value_style),
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::styled(value, value_style),
    ])
}

/// Left/Right choice row, e.g. `Role: < Cleaner >`
pub fn choice_line(label: &str, choice: &str, focused: bool) -> Line<'static> {
    let shown = if focused {
        format!("< {} >", choice)
    } else {
        choice.to_string()
    };
    field_line(label, shown, focused)
}

pub fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Black).bg(Color::Blue).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Blue)
    };
    Line::from(vec![
        Span::raw(if focused { "▶ " } else { "  " }),
        Span::styled(format!("[ {} ]", label), style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_editing() {
        let mut field = TextField::new("City", "Austn");
        field.handle_key(KeyCode::Left);
        field.handle_key(KeyCode::Char('i'));
        assert_eq!(field.value(), "Austin");
        assert_eq!(field.display_with_cursor(), "Austi|n");

        field.handle_key(KeyCode::End);
        field.handle_key(KeyCode::Backspace);
        assert_eq!(field.value(), "Austi");
        assert!(!field.handle_key(KeyCode::Enter));
    }

    #[test]
    fn test_text_field_multibyte() {
        let mut field = TextField::new("Name", "Zoë");
        field.handle_key(KeyCode::Backspace);
        field.handle_key(KeyCode::Char('e'));
        assert_eq!(field.value(), "Zoe");
        field.handle_key(KeyCode::Home);
        field.handle_key(KeyCode::Delete);
        assert_eq!(field.value(), "oe");
    }

    #[test]
    fn test_focus_ring_wraps() {
        let mut focus = FocusRing::new(3);
        focus.previous();
        assert_eq!(focus.index(), 2);
        focus.next();
        assert!(focus.is(0));
    }
}
