//! # InputBox Component
//!
//! The composer: multi-line text entry with a live character counter.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, Ctrl+J newlines)
//! - Handle editing (backspace, delete, cursor and word movement)
//! - Enforce the message length ceiling; pastes are truncated to fit
//! - Emit `Submit` on Enter when the composer allows it
//!
//! ## State Management
//!
//! The buffer is internal state. `busy` and `dimmed` are props from the
//! application / TUI state. Cursor position and scroll state are encapsulated
//! in `CursorState`.

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::core::composer;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::palette::Palette;

use cursor::CursorState;
use text_wrap::{
    MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, inner_width, next_char_boundary, next_word_boundary,
    prev_char_boundary, prev_word_boundary, wrap_line_count, wrapped_spans,
};

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    /// Text or cursor changed
    ContentChanged,
}

/// Text input component with character counter.
///
/// # Props
///
/// - `busy`: a chat reply is outstanding; Enter does nothing
/// - `dimmed`: Cursor mode is active
/// - `palette`: theme colors
pub struct InputBox {
    pub buffer: String,
    pub busy: bool,
    pub dimmed: bool,
    pub palette: Palette,
    cursor: CursorState,
}

impl InputBox {
    pub fn new(palette: Palette) -> Self {
        Self {
            buffer: String::new(),
            busy: false,
            dimmed: false,
            palette,
            cursor: CursorState::new(),
        }
    }

    /// Replace the buffer (follow-up selection) and park the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = composer::clamp_insertion("", text).to_string();
        self.cursor.pos = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor.reset();
    }

    /// Required height for the current buffer, clamped to viewport limits.
    /// Returns value in range [1 + VERTICAL_OVERHEAD, MAX_VISIBLE_LINES + VERTICAL_OVERHEAD].
    pub fn calculate_height(&self, content_width: u16) -> u16 {
        let width = inner_width(content_width);
        let content_lines = wrap_line_count(&self.buffer, width);
        content_lines.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// Insert `text` at the cursor, truncated to the length ceiling.
    fn insert(&mut self, text: &str) -> Option<InputEvent> {
        let fitted = composer::clamp_insertion(&self.buffer, text);
        if fitted.is_empty() {
            return None;
        }
        self.buffer.insert_str(self.cursor.pos, fitted);
        self.cursor.pos += fitted.len();
        Some(InputEvent::ContentChanged)
    }

    /// Move the cursor to `pos`, reporting whether it moved.
    fn move_to(&mut self, pos: usize) -> Option<InputEvent> {
        (self.cursor.pos != pos).then(|| {
            self.cursor.pos = pos;
            InputEvent::ContentChanged
        })
    }

    fn visible_text(&self, content_width: u16) -> String {
        if self.cursor.scroll_offset == 0 {
            return self.buffer.clone();
        }
        let width = inner_width(content_width);
        if width == 0 {
            return String::new();
        }
        wrapped_spans(&self.buffer, width)
            .iter()
            .skip(self.cursor.scroll_offset as usize)
            .take(MAX_VISIBLE_LINES as usize)
            .map(|s| &self.buffer[s.start..s.end()])
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState};

        let total_lines = wrap_line_count(&self.buffer, inner_width(area.width));
        if total_lines <= MAX_VISIBLE_LINES {
            return;
        }

        // ScrollbarState content_length is max scrollable position, not total items
        let max_scroll = total_lines.saturating_sub(MAX_VISIBLE_LINES);
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(max_scroll as usize)
            .position(self.cursor.scroll_offset as usize);

        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.cursor.last_content_width = area.width;
        self.cursor.update_scroll_offset(&self.buffer, area.width);

        let mut border_style = Style::default().fg(self.palette.user);
        if self.dimmed {
            border_style = border_style.add_modifier(Modifier::DIM);
        }
        let title = if self.busy {
            "Message (waiting for reply...)"
        } else {
            "Message"
        };
        let counter_style = if composer::remaining(&self.buffer) == 0 {
            Style::default().fg(self.palette.error)
        } else {
            self.palette.muted_style()
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title)
            .title_bottom(
                Line::styled(format!(" {} ", composer::counter_label(&self.buffer)), counter_style)
                    .right_aligned(),
            )
            .padding(Padding::horizontal(1));

        let input = Paragraph::new(self.visible_text(area.width))
            .block(block)
            .style(Style::default().fg(self.palette.fg));

        frame.render_widget(input, area);
        self.render_scrollbar(frame, area);

        if !self.dimmed {
            frame.set_cursor_position(self.cursor.screen_pos(&self.buffer, area));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => self.insert(c.encode_utf8(&mut [0; 4])),
            TuiEvent::Paste(text) => {
                let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
                self.insert(&normalized)
            }
            TuiEvent::Backspace => {
                if self.cursor.pos == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(prev..self.cursor.pos);
                self.cursor.pos = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete => {
                if self.cursor.pos >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(self.cursor.pos..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft if self.cursor.pos > 0 => {
                self.move_to(prev_char_boundary(&self.buffer, self.cursor.pos))
            }
            TuiEvent::CursorRight if self.cursor.pos < self.buffer.len() => {
                self.move_to(next_char_boundary(&self.buffer, self.cursor.pos))
            }
            TuiEvent::WordLeft => self.move_to(prev_word_boundary(&self.buffer, self.cursor.pos)),
            TuiEvent::WordRight => self.move_to(next_word_boundary(&self.buffer, self.cursor.pos)),
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor.pos]
                    .rfind('\n')
                    .map_or(0, |i| i + 1);
                self.move_to(line_start)
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor.pos..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor.pos + i);
                self.move_to(line_end)
            }
            TuiEvent::CursorUp => self
                .cursor
                .move_vertically(&self.buffer, -1, self.cursor.last_content_width)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorDown => self
                .cursor
                .move_vertically(&self.buffer, 1, self.cursor.last_content_width)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::Submit => {
                if !composer::can_submit(&self.buffer, self.busy) {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor.reset();
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::composer::MAX_MESSAGE_CHARS;
    use crate::core::theme::Theme;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn input() -> InputBox {
        InputBox::new(Palette::for_theme(Theme::Dark))
    }

    fn rendered(input: &mut InputBox, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| input.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_handle_input() {
        let mut input = input();
        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('a')),
            Some(InputEvent::ContentChanged)
        );
        input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(input.buffer, "ab");
        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.buffer, "a");
    }

    #[test]
    fn test_submit_clears_buffer() {
        let mut input = input();
        input.set_text("hello");
        assert_eq!(
            input.handle_event(&TuiEvent::Submit),
            Some(InputEvent::Submit("hello".into()))
        );
        assert!(input.buffer.is_empty());
    }

    #[test]
    fn test_submit_blocked_while_busy_or_blank() {
        let mut input = input();
        input.set_text("   ");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);

        input.set_text("question");
        input.busy = true;
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.buffer, "question");
    }

    #[test]
    fn test_typing_stops_at_ceiling() {
        let mut input = input();
        input.set_text(&"a".repeat(MAX_MESSAGE_CHARS));
        assert_eq!(input.handle_event(&TuiEvent::InputChar('b')), None);
        assert_eq!(input.buffer.chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_paste_is_truncated_to_fit() {
        let mut input = input();
        input.set_text(&"a".repeat(MAX_MESSAGE_CHARS - 3));
        input.handle_event(&TuiEvent::Paste("xyz123".into()));
        assert_eq!(input.buffer.chars().count(), MAX_MESSAGE_CHARS);
        assert!(input.buffer.ends_with("xyz"));
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut input = input();
        input.handle_event(&TuiEvent::Paste("a\r\nb".into()));
        assert_eq!(input.buffer, "a\nb");
    }

    #[test]
    fn test_set_text_moves_cursor_to_end() {
        let mut input = input();
        input.set_text("follow-up");
        input.handle_event(&TuiEvent::InputChar('?'));
        assert_eq!(input.buffer, "follow-up?");
    }

    #[test]
    fn test_home_end_and_words() {
        let mut input = input();
        input.set_text("one two\nthree");
        input.handle_event(&TuiEvent::CursorHome);
        input.handle_event(&TuiEvent::InputChar('>'));
        assert_eq!(input.buffer, "one two\n>three");

        input.handle_event(&TuiEvent::CursorUp);
        input.handle_event(&TuiEvent::CursorEnd);
        input.handle_event(&TuiEvent::WordLeft);
        input.handle_event(&TuiEvent::InputChar('_'));
        assert_eq!(input.buffer, "one _two\n>three");
    }

    #[test]
    fn test_delete_at_end_is_noop() {
        let mut input = input();
        input.set_text("ab");
        assert_eq!(input.handle_event(&TuiEvent::Delete), None);
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::Delete);
        assert_eq!(input.buffer, "a");
    }

    #[test]
    fn test_height_grows_then_caps() {
        let mut input = input();
        assert_eq!(input.calculate_height(40), 1 + VERTICAL_OVERHEAD);
        input.set_text("1\n2\n3");
        assert_eq!(input.calculate_height(40), 3 + VERTICAL_OVERHEAD);
        input.set_text("1\n2\n3\n4\n5\n6\n7\n8");
        assert_eq!(input.calculate_height(40), MAX_VISIBLE_LINES + VERTICAL_OVERHEAD);
    }

    #[test]
    fn test_render_shows_counter() {
        let mut input = input();
        input.set_text("hello");
        let text = rendered(&mut input, 40, 3);
        assert!(text.contains("5 / 4000"));
        assert!(text.contains("hello"));
    }

    #[test]
    fn test_render_shows_busy_title() {
        let mut input = input();
        input.busy = true;
        assert!(rendered(&mut input, 50, 3).contains("waiting for reply"));
    }
}
