//! Cursor position tracking and navigation for the InputBox.
//!
//! `CursorState` owns the cursor byte offset and scroll offset. The text is
//! owned by `InputBox` and passed in explicitly.

use ratatui::layout::Rect;

use super::text_wrap::{
    BORDER_OFFSET, LineSpan, MAX_VISIBLE_LINES, inner_width, wrapped_spans,
};

pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
    /// First visible wrapped line (0 when content fits)
    pub scroll_offset: u16,
    /// Width from the last render, used for vertical movement between frames
    pub last_content_width: u16,
}

impl CursorState {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            last_content_width: Self::DEFAULT_WIDTH,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll_offset = 0;
    }

    /// Wrapped line index and character column of the cursor.
    fn locate(&self, spans: &[LineSpan], buffer: &str) -> (usize, usize) {
        let line = spans
            .partition_point(|s| s.start <= self.pos)
            .saturating_sub(1);
        let start = spans.get(line).map_or(0, |s| s.start).min(self.pos);
        (line, buffer[start..self.pos].chars().count())
    }

    /// Move one wrapped line up (`direction < 0`) or down, keeping the column
    /// where possible. Returns `false` at the first/last line.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16, content_width: u16) -> bool {
        let width = inner_width(content_width);
        if width == 0 || buffer.is_empty() {
            return false;
        }
        let spans = wrapped_spans(buffer, width);
        let (line, column) = self.locate(&spans, buffer);
        let target = if direction < 0 {
            match line.checked_sub(1) {
                Some(t) => t,
                None => return false,
            }
        } else if line + 1 < spans.len() {
            line + 1
        } else {
            return false;
        };

        let span = spans[target];
        let text = &buffer[span.start..span.end()];
        self.pos = span.start
            + text
                .char_indices()
                .nth(column)
                .map_or(text.len(), |(i, _)| i);
        true
    }

    /// Wrapped line (0-based) the cursor is on.
    pub fn calculate_line(&self, buffer: &str, content_width: u16) -> u16 {
        let width = inner_width(content_width);
        if width == 0 {
            return 0;
        }
        self.locate(&wrapped_spans(buffer, width), buffer).0 as u16
    }

    /// Keep the cursor line inside the visible window.
    pub fn update_scroll_offset(&mut self, buffer: &str, content_width: u16) {
        let width = inner_width(content_width);
        let total_lines = if width == 0 {
            1
        } else {
            wrapped_spans(buffer, width).len() as u16
        };
        if total_lines <= MAX_VISIBLE_LINES {
            self.scroll_offset = 0;
            return;
        }

        let cursor_line = self.calculate_line(buffer, content_width);
        if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = cursor_line.saturating_sub(MAX_VISIBLE_LINES - 1);
        }
    }

    /// Screen position (column, row) of the cursor inside `area`.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        let origin = (area.x + BORDER_OFFSET + 1, area.y + BORDER_OFFSET);
        if width == 0 {
            return origin;
        }
        let (line, column) = self.locate(&wrapped_spans(buffer, width), buffer);
        let row = (line as u16).saturating_sub(self.scroll_offset);
        let col = (column as u16).min(width);
        (origin.0 + col, origin.1 + row)
    }
}
