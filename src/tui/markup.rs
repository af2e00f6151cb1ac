//! Assistant markup → ratatui `Text` renderer.
//!
//! Replies arrive as Markdown mixed with a small HTML subset (`<strong>`,
//! `<b>`, `<em>`, `<h1>`..`<h3>`, `<ul>`, `<li>`, `<br>`, `<p>`). The HTML
//! tags are first rewritten into their Markdown equivalents, then the whole
//! reply goes through `pulldown_cmark`. Unknown tags are dropped; character
//! references are decoded by the Markdown parser. Fenced code blocks get
//! syntect highlighting.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::tui::palette::Palette;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Render assistant markup with the given palette.
///
/// Returns owned text (`'static`) so callers aren't constrained by input lifetime.
pub fn render(content: &str, palette: &Palette) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);

    let source = html_to_markdown(content);
    let mut w = Writer::new(palette);
    for event in Parser::new_ext(&source, opts) {
        w.handle(event);
    }
    w.text
}

// ── HTML subset ─────────────────────────────────────────────────────────────

/// Rewrite the backend's HTML subset into Markdown. Fenced code is left untouched.
fn html_to_markdown(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_fence = false;
    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            out.push_str(line);
            continue;
        }
        if in_fence {
            out.push_str(line);
        } else {
            rewrite_tags(line, &mut out);
        }
    }
    out
}

fn rewrite_tags(line: &str, out: &mut String) {
    let mut rest = line;
    // After a block-level tag, leading whitespace would turn into an
    // indented code block.
    let mut skip_space = false;
    while let Some(start) = rest.find('<') {
        push_text(&rest[..start], out, &mut skip_space);
        let after = &rest[start..];
        match parse_tag(after) {
            Some((tag, len)) => {
                let replacement = tag.markdown();
                out.push_str(replacement);
                skip_space = tag.is_block();
                rest = &after[len..];
            }
            None => {
                push_text("<", out, &mut skip_space);
                rest = &after[1..];
            }
        }
    }
    push_text(rest, out, &mut skip_space);
}

fn push_text(text: &str, out: &mut String, skip_space: &mut bool) {
    if *skip_space {
        let trimmed = text.trim_start_matches([' ', '\t']);
        if !trimmed.is_empty() {
            *skip_space = false;
        }
        out.push_str(trimmed);
    } else {
        out.push_str(text);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HtmlTag<'a> {
    name: &'a str,
    closing: bool,
}

impl HtmlTag<'_> {
    fn markdown(&self) -> &'static str {
        let name = self.name.to_ascii_lowercase();
        match (name.as_str(), self.closing) {
            ("strong" | "b", _) => "**",
            ("em" | "i", _) => "*",
            ("h1", false) => "\n\n# ",
            ("h2", false) => "\n\n## ",
            ("h3", false) => "\n\n### ",
            ("h1" | "h2" | "h3", true) => "\n\n",
            ("p" | "ul" | "ol" | "div", _) => "\n\n",
            ("li", false) => "\n- ",
            ("li", true) => "",
            ("br", _) => "  \n",
            _ => "",
        }
    }

    fn is_block(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        matches!(
            name.as_str(),
            "h1" | "h2" | "h3" | "p" | "ul" | "ol" | "li" | "br" | "div"
        )
    }
}

/// Recognise `<name ...>`, `</name>` or `<name/>` at the start of `s`.
/// Returns the tag and its byte length.
fn parse_tag(s: &str) -> Option<(HtmlTag<'_>, usize)> {
    let end = s.find('>')?;
    let inner = &s[1..end];
    if inner.contains('<') {
        return None;
    }
    let (closing, body) = match inner.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, inner),
    };
    let name_len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    let name = &body[..name_len];
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let tail = &body[name_len..];
    if !(tail.is_empty() || tail.starts_with([' ', '/', '\t'])) {
        return None;
    }
    Some((HtmlTag { name, closing }, end + 1))
}

// ── Writer ──────────────────────────────────────────────────────────────────

struct Writer<'p> {
    text: Text<'static>,
    palette: &'p Palette,
    /// Inline style stack (bold, italic, heading text, etc.). Styles compose
    /// via `patch` so nested bold+italic works.
    styles: Vec<Style>,
    /// Per-line prefix spans (blockquote and code block `│`).
    line_prefixes: Vec<Span<'static>>,
    /// List nesting: None = unordered, Some(n) = ordered at index n.
    list_indices: Vec<Option<u64>>,
    highlighter: Option<HighlightLines<'static>>,
    /// Inside a fenced code block without a known syntax.
    in_plain_code: bool,
    /// Stored link URL, appended after the link text closes.
    link_url: Option<String>,
    /// Whether the next block element should be preceded by a blank line.
    needs_newline: bool,
}

impl<'p> Writer<'p> {
    fn new(palette: &'p Palette) -> Self {
        Self {
            text: Text::default(),
            palette,
            styles: vec![],
            line_prefixes: vec![],
            list_indices: vec![],
            highlighter: None,
            in_plain_code: false,
            link_url: None,
            needs_newline: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.palette.fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn muted(&self) -> Style {
        self.palette.muted_style()
    }

    fn link_style(&self) -> Style {
        Style::default()
            .fg(self.palette.accent)
            .add_modifier(Modifier::UNDERLINED)
    }

    fn push_line(&mut self, line: Line<'static>) {
        let mut out = line;
        for pfx in self.line_prefixes.iter().rev().cloned() {
            out.spans.insert(0, pfx);
        }
        self.text.lines.push(out);
    }

    fn push_span(&mut self, span: Span<'static>) {
        if let Some(line) = self.text.lines.last_mut() {
            line.push_span(span);
        } else {
            self.push_line(Line::from(vec![span]));
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
            self.needs_newline = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.inline_code(c),
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.push_line(Line::default()),
            Event::Rule => {
                self.blank_line_if_needed();
                let rule = Span::styled("─".repeat(40), self.muted());
                self.push_line(Line::from(rule));
                self.needs_newline = true;
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_span(Span::raw(marker));
            }
            // Leftover HTML (comments, unsupported constructs) is dropped.
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                let hs = heading_style(self.palette.accent, level);
                self.push_line(Line::default());
                self.push_style(hs);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.line_prefixes.push(Span::styled("│ ", self.muted()));
                self.push_style(
                    Style::default()
                        .fg(self.palette.fg)
                        .add_modifier(Modifier::DIM | Modifier::ITALIC),
                );
            }
            Tag::CodeBlock(kind) => self.open_code_block(kind),
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                self.push_line(Line::default());
                let depth = self.list_indices.len().saturating_sub(1);
                let indent = "  ".repeat(depth);
                let muted = self.muted();
                if let Some(idx) = self.list_indices.last_mut() {
                    let marker = match idx {
                        None => format!("{indent}• "),
                        Some(n) => {
                            let s = format!("{indent}{n}. ");
                            *n += 1;
                            s
                        }
                    };
                    self.push_span(Span::styled(marker, muted));
                }
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(self.link_style());
            }
            _ => {}
        }
    }

    fn open_code_block(&mut self, kind: CodeBlockKind<'_>) {
        if !self.text.lines.is_empty() {
            self.push_line(Line::default());
        }
        let lang = match &kind {
            CodeBlockKind::Fenced(l) => l.as_ref(),
            CodeBlockKind::Indented => "",
        };

        let bs = self.muted();
        let top = if lang.is_empty() {
            Line::from(Span::styled("╭──", bs))
        } else {
            Line::from(vec![
                Span::styled("╭── ", bs),
                Span::styled(lang.to_owned(), bs.add_modifier(Modifier::BOLD)),
                Span::styled(" ──", bs),
            ])
        };
        self.push_line(top);
        self.line_prefixes.push(Span::styled("│ ", bs));

        if !lang.is_empty()
            && let Some(syn) = SYNTAX_SET.find_syntax_by_token(lang)
            && let Some(theme) = THEME_SET.themes.get(self.palette.syntax_theme)
        {
            self.highlighter = Some(HighlightLines::new(syn, theme));
        }
        if self.highlighter.is_none() {
            self.in_plain_code = true;
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_newline = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::BlockQuote(_) => {
                self.line_prefixes.pop();
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.highlighter = None;
                self.in_plain_code = false;
                self.line_prefixes.pop();
                let bottom = Span::styled("╰──", self.muted());
                self.push_line(Line::from(bottom));
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                self.needs_newline = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    let style = self.link_style();
                    self.push_span(Span::raw(" ("));
                    self.push_span(Span::styled(url, style));
                    self.push_span(Span::raw(")"));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui renders \t as zero-width
        let text = cow.replace('\t', "    ");

        // Take the highlighter out: highlight_line borrows it while push_line borrows self.
        if let Some(mut hl) = self.highlighter.take() {
            for line in LinesWithEndings::from(text.as_str()) {
                if let Ok(ranges) = hl.highlight_line(line, &SYNTAX_SET) {
                    let spans: Vec<Span<'static>> = ranges
                        .into_iter()
                        .filter_map(|(hl_style, frag)| {
                            let content = frag.trim_end_matches('\n').to_owned();
                            if content.is_empty() {
                                return None;
                            }
                            let fg = Color::Rgb(
                                hl_style.foreground.r,
                                hl_style.foreground.g,
                                hl_style.foreground.b,
                            );
                            Some(Span::styled(content, Style::default().fg(fg)))
                        })
                        .collect();
                    self.push_line(Line::from(spans));
                }
            }
            self.highlighter = Some(hl);
            return;
        }

        if self.in_plain_code {
            let code_style = Style::default().fg(self.palette.code_fg);
            for line in text.lines() {
                self.push_line(Line::from(Span::styled(line.to_owned(), code_style)));
            }
            return;
        }

        let style = self.style();
        self.push_span(Span::styled(text, style));
    }

    fn inline_code(&mut self, cow: CowStr<'_>) {
        let style = Style::default()
            .fg(self.palette.code_fg)
            .bg(self.palette.code_bg);
        self.push_span(Span::styled(cow.to_string(), style));
    }
}

fn heading_style(color: Color, level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::default()
            .fg(color)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => Style::default().fg(color).add_modifier(Modifier::BOLD),
        _ => Style::default()
            .fg(color)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

/// Flatten rendered text into plain lines (tests and height checks).
#[cfg(test)]
pub(crate) fn plain_lines(text: &Text<'_>) -> Vec<String> {
    text.lines
        .iter()
        .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
        .collect()
}
