use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

/// What a key press did to a text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    Submit,
    Cancel,
    Changed,
    Ignored,
}

/// Single-line text input with a cursor.
#[derive(Debug, Default)]
pub struct TextInput {
    pub value: String,
    /// Cursor position in characters.
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// The part of the value that fits in `width` cells with the cursor
    /// still on screen, and how many leading characters were scrolled off.
    pub fn visible(&self, width: usize) -> (usize, String) {
        // the cursor needs a cell of its own past the last character
        let offset = (self.cursor + 1).saturating_sub(width);
        let text = self.value.chars().skip(offset).take(width).collect();
        (offset, text)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
        let len = self.value.chars().count();
        match key.code {
            KeyCode::Enter => InputResult::Submit,
            KeyCode::Esc => InputResult::Cancel,
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let idx = self.byte_index(self.cursor);
                    self.value.remove(idx);
                }
                InputResult::Changed
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    let idx = self.byte_index(self.cursor);
                    self.value.remove(idx);
                }
                InputResult::Changed
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                InputResult::Ignored
            }
            KeyCode::Right => {
                if self.cursor < len {
                    self.cursor += 1;
                }
                InputResult::Ignored
            }
            KeyCode::Home => {
                self.cursor = 0;
                InputResult::Ignored
            }
            KeyCode::End => {
                self.cursor = len;
                InputResult::Ignored
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'u' {
                    self.clear();
                } else {
                    let idx = self.byte_index(self.cursor);
                    self.value.insert(idx, c);
                    self.cursor += 1;
                }
                InputResult::Changed
            }
            _ => InputResult::Ignored,
        }
    }

    /// Render as a bordered field. The terminal cursor is placed only when
    /// the field is focused.
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        label: &str,
        placeholder: &str,
        focused: bool,
    ) {
        let border_style = if focused {
            THEME.border_focused_style()
        } else {
            THEME.border_style()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {label} "));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let (offset, visible) = self.visible(inner.width as usize);
        let text = if self.value.is_empty() {
            Span::styled(placeholder.to_string(), THEME.muted_style())
        } else {
            Span::styled(visible, Style::default().fg(THEME.text))
        };
        frame.render_widget(Paragraph::new(text), inner);

        if focused && inner.width > 0 {
            let column = (self.cursor - offset) as u16;
            frame.set_cursor_position((inner.x + column, inner.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInput, s: &str) {
        for c in s.chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = TextInput::new();
        type_str(&mut input, "0.15");
        assert_eq!(input.value, "0.15");
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value, "0.1");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut input = TextInput::with_value("Conf");
        input.handle_key(key(KeyCode::Home));
        type_str(&mut input, "Web3 ");
        assert_eq!(input.value, "Web3 Conf");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut input = TextInput::new();
        type_str(&mut input, "Café");
        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.value, "Caf");
    }

    #[test]
    fn test_ctrl_u_clears() {
        let mut input = TextInput::with_value("abc");
        input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(input.value.is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_short_value_not_scrolled() {
        let input = TextInput::with_value("Conf");
        assert_eq!(input.visible(10), (0, "Conf".to_string()));
    }

    #[test]
    fn test_long_value_scrolls_to_cursor() {
        let address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        let mut input = TextInput::with_value(address);
        let (offset, text) = input.visible(20);
        assert_eq!(offset, 23);
        assert_eq!(text, &address[23..]);
        assert!(input.cursor() - offset < 20);

        input.handle_key(key(KeyCode::Home));
        let (offset, text) = input.visible(20);
        assert_eq!(offset, 0);
        assert_eq!(text, &address[..20]);
    }

    #[test]
    fn test_submit_and_cancel() {
        let mut input = TextInput::new();
        assert_eq!(input.handle_key(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle_key(key(KeyCode::Esc)), InputResult::Cancel);
    }
}
