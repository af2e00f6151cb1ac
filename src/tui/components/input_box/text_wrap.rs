//! Text wrapping helpers and dimensional constants for the InputBox.
//!
//! Stateless; shared by `InputBox` and `CursorState`.

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Maximum visible content lines before internal scrolling kicks in
pub(super) const MAX_VISIBLE_LINES: u16 = 5;
/// Offset from area edge to content (border width)
pub(super) const BORDER_OFFSET: u16 = 1;

/// A wrapped display line as a byte range of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct LineSpan {
    pub start: usize,
    pub len: usize,
}

impl LineSpan {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Build textwrap options configured for the input box inner width.
pub(super) fn wrap_options(inner_width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(inner_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Inner content width after subtracting border/padding overhead (0 if too narrow).
pub(super) fn inner_width(content_width: u16) -> u16 {
    content_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Locate every wrapped line of `text` inside `text`.
///
/// textwrap drops the whitespace a soft wrap breaks on, so each line is
/// searched for from the end of the previous one. Always returns at least one
/// span, and a trailing newline gets its own empty line.
pub(super) fn wrapped_spans(text: &str, width: u16) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    if width > 0 {
        let bytes = text.as_bytes();
        let mut offset = 0;
        for line in textwrap::wrap(text, wrap_options(width)) {
            let start = text[offset..]
                .find(line.as_ref())
                .map_or(offset, |i| offset + i);
            spans.push(LineSpan {
                start,
                len: line.len(),
            });
            offset = start + line.len();
            let rest = &text[offset..];
            offset += rest.len() - rest.trim_start_matches([' ', '\t']).len();
            if bytes.get(offset) == Some(&b'\n') {
                offset += 1;
            }
        }
    }
    if text.ends_with('\n') && spans.last().is_none_or(|s| s.end() < text.len()) {
        spans.push(LineSpan {
            start: text.len(),
            len: 0,
        });
    }
    if spans.is_empty() {
        spans.push(LineSpan { start: 0, len: 0 });
    }
    spans
}

/// Number of wrapped lines for `text` (at least 1).
pub(super) fn wrap_line_count(text: &str, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    wrapped_spans(text, width).len() as u16
}

/// Byte offset of the previous character boundary before `pos` in `text`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset of the next character boundary after `pos` in `text`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the word before `pos` (readline `backward-word`).
pub(super) fn prev_word_boundary(text: &str, pos: usize) -> usize {
    let mut chars = text[..pos].char_indices().rev().peekable();
    while chars.next_if(|&(_, c)| !is_word_char(c)).is_some() {}
    let mut boundary = 0;
    while let Some(&(i, c)) = chars.peek() {
        if !is_word_char(c) {
            boundary = i + c.len_utf8();
            break;
        }
        boundary = i;
        chars.next();
    }
    boundary
}

/// End of the word after `pos` (readline `forward-word`).
pub(super) fn next_word_boundary(text: &str, pos: usize) -> usize {
    let mut chars = text[pos..].char_indices().peekable();
    while chars.next_if(|&(_, c)| !is_word_char(c)).is_some() {}
    while chars.next_if(|&(_, c)| is_word_char(c)).is_some() {}
    chars.peek().map_or(text.len(), |&(i, _)| pos + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines<'a>(text: &'a str, width: u16) -> Vec<&'a str> {
        wrapped_spans(text, width)
            .iter()
            .map(|s| &text[s.start..s.end()])
            .collect()
    }

    #[test]
    fn wrap_line_count_basics() {
        assert_eq!(wrap_line_count("", 80), 1);
        assert_eq!(wrap_line_count("hello", 0), 1);
        assert_eq!(wrap_line_count("hello", 80), 1);
        assert_eq!(wrap_line_count("aaaaaaaaaa", 5), 2);
        assert_eq!(wrap_line_count("a\nb\nc", 80), 3);
    }

    #[test]
    fn wrap_line_count_trailing_newline_adds_line() {
        assert_eq!(wrap_line_count("hello\n", 80), 2);
        assert_eq!(wrap_line_count("aaaaaaaaaa\n", 5), 3);
    }

    #[test]
    fn spans_skip_whitespace_eaten_by_soft_wrap() {
        assert_eq!(lines("hello world", 6), vec!["hello", "world"]);
        let spans = wrapped_spans("hello world", 6);
        assert_eq!(spans[1].start, 6);
    }

    #[test]
    fn spans_follow_hard_newlines() {
        let spans = wrapped_spans("ab\n\ncd", 80);
        assert_eq!(
            spans,
            vec![
                LineSpan { start: 0, len: 2 },
                LineSpan { start: 3, len: 0 },
                LineSpan { start: 4, len: 2 },
            ]
        );
    }

    #[test]
    fn spans_for_empty_text() {
        assert_eq!(wrapped_spans("", 10), vec![LineSpan { start: 0, len: 0 }]);
    }

    #[test]
    fn char_boundaries_respect_multibyte() {
        let s = "café";
        assert_eq!(prev_char_boundary(s, 5), 3);
        assert_eq!(prev_char_boundary(s, 3), 2);
        assert_eq!(next_char_boundary(s, 3), 5);
        assert_eq!(next_char_boundary("abc", 2), 3);

        let emoji = "a🔥b";
        assert_eq!(prev_char_boundary(emoji, 5), 1);
        assert_eq!(next_char_boundary(emoji, 1), 5);
    }

    #[test]
    fn word_boundaries() {
        assert_eq!(prev_word_boundary("hello world", 11), 6);
        assert_eq!(prev_word_boundary("hello world", 6), 0);
        assert_eq!(prev_word_boundary("foo.bar", 7), 4);
        assert_eq!(prev_word_boundary("hello_world test", 12), 0);
        assert_eq!(prev_word_boundary("hello", 0), 0);

        assert_eq!(next_word_boundary("hello world", 0), 5);
        assert_eq!(next_word_boundary("hello world", 5), 11);
        assert_eq!(next_word_boundary("foo.bar", 0), 3);
        assert_eq!(next_word_boundary("café latte", 0), 5);
        assert_eq!(next_word_boundary("hello", 5), 5);
    }
}
