//! Composer rules shared by the input widget and the reducer.

/// Hard ceiling on a single chat message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

pub fn char_count(input: &str) -> usize {
    input.chars().count()
}

/// Live counter text, e.g. `"12 / 4000"`.
pub fn counter_label(input: &str) -> String {
    format!("{} / {}", char_count(input), MAX_MESSAGE_CHARS)
}

/// Submission is allowed only for non-blank input while no chat request is outstanding.
pub fn can_submit(input: &str, busy: bool) -> bool {
    !busy && !input.trim().is_empty()
}

/// How many more characters fit before the ceiling.
pub fn remaining(input: &str) -> usize {
    MAX_MESSAGE_CHARS.saturating_sub(char_count(input))
}

/// Cut `text` so that appending it to `input` stays within the ceiling.
pub fn clamp_insertion<'a>(input: &str, text: &'a str) -> &'a str {
    let room = remaining(input);
    match text.char_indices().nth(room) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
