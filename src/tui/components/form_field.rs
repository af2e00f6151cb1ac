//! Single-line text field shared by the modal forms.
//!
//! The cursor always sits at the end; forms only need append and erase.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::event::TuiEvent;
use crate::tui::palette::Palette;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormField {
    pub value: String,
    max_chars: Option<usize>,
}

impl FormField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            max_chars: None,
        }
    }

    pub fn with_max_chars(mut self, max: usize) -> Self {
        self.max_chars = Some(max);
        self
    }

    /// Apply an editing event. Returns true if the value changed.
    ///
    /// `accept` filters typed and pasted characters.
    pub fn edit(&mut self, event: &TuiEvent, accept: impl Fn(char) -> bool) -> bool {
        let before = self.value.len();
        match event {
            TuiEvent::InputChar(c) if accept(*c) => self.push(*c),
            TuiEvent::Paste(text) => text.chars().filter(|&c| accept(c)).for_each(|c| self.push(c)),
            TuiEvent::Backspace => {
                self.value.pop();
            }
            _ => {}
        }
        self.value.len() != before
    }

    fn push(&mut self, c: char) {
        if self
            .max_chars
            .is_some_and(|max| self.value.chars().count() >= max)
        {
            return;
        }
        self.value.push(c);
    }

    /// `label: value█`, with the caret only on the focused field.
    pub fn line(&self, label: &str, placeholder: &str, focused: bool, palette: &Palette) -> Line<'static> {
        let label_style = if focused {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            palette.muted_style()
        };
        let mut spans = vec![Span::styled(format!("{label}: "), label_style)];
        if self.value.is_empty() && !placeholder.is_empty() {
            spans.push(Span::styled(placeholder.to_string(), palette.muted_style()));
        } else {
            spans.push(Span::styled(self.value.clone(), Style::default().fg(palette.fg)));
        }
        if focused {
            spans.push(Span::styled("█", Style::default().fg(palette.accent)));
        }
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any(_: char) -> bool {
        true
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut field = FormField::default();
        assert!(field.edit(&TuiEvent::InputChar('h'), any));
        assert!(field.edit(&TuiEvent::InputChar('i'), any));
        assert_eq!(field.value, "hi");
        assert!(field.edit(&TuiEvent::Backspace, any));
        assert_eq!(field.value, "h");
        assert!(!field.edit(&TuiEvent::CursorLeft, any));
    }

    #[test]
    fn test_filter_rejects_characters() {
        let mut field = FormField::new("1");
        assert!(!field.edit(&TuiEvent::InputChar('x'), |c| c.is_ascii_digit()));
        assert!(field.edit(&TuiEvent::Paste("2a3".into()), |c| c.is_ascii_digit()));
        assert_eq!(field.value, "123");
    }

    #[test]
    fn test_max_chars() {
        let mut field = FormField::default().with_max_chars(2);
        field.edit(&TuiEvent::Paste("abc".into()), any);
        assert_eq!(field.value, "ab");
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut field = FormField::default();
        assert!(!field.edit(&TuiEvent::Backspace, any));
    }
}
