use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::study::{FlashcardSet, OptionMark, Quiz, option_letter};
use crate::core::transcript::{Body, Message, Role};
use crate::tui::component::Component;
use crate::tui::markup;
use crate::tui::palette::Palette;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
pub(crate) const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
pub(crate) const VERTICAL_OVERHEAD: u16 = 2;
/// Only follow-ups reachable with a single digit are listed.
pub const MAX_FOLLOW_UPS: usize = 9;
/// Height of the typing indicator row.
pub const TYPING_HEIGHT: u16 = 3;

const FOCUS_MARKER: &str = "▶ ";
const NO_MARKER: &str = "  ";

/// A stateless component that renders one transcript entry.
///
/// # Design
///
/// `MessageView` is a **transient component**: it's created fresh each frame with
/// the data it needs. Selection and the focused quiz question / flashcard are
/// passed in from `MessageListState`.
///
/// # Height Calculation
///
/// [`calculate_height`](Self::calculate_height) builds the same `Text` the
/// render pass uses and asks `Paragraph::line_count` for the wrapped height, so
/// the list can lay out the scroll canvas without rendering anything.
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    pub palette: &'a Palette,
    /// Whether this message is selected in Cursor mode
    pub is_selected: bool,
    /// Focused item inside a quiz or flashcard set
    pub focus: Option<usize>,
}

impl<'a> MessageView<'a> {
    pub fn new(
        message: &'a Message,
        palette: &'a Palette,
        is_selected: bool,
        focus: Option<usize>,
    ) -> Self {
        Self {
            message,
            palette,
            is_selected,
            focus,
        }
    }

    pub fn calculate_height(message: &Message, palette: &Palette, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Degenerate case: terminal too narrow for borders + padding.
            return 1;
        }
        // The focus marker has the same width as its placeholder, so focus never
        // changes the height.
        let text = content(message, palette, None);
        let lines = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .line_count(content_width) as u16;
        lines.max(1) + VERTICAL_OVERHEAD
    }

    fn title(&self) -> &'static str {
        match (&self.message.role, &self.message.body) {
            (Role::User, _) => "you",
            (Role::Assistant, Body::Text(_)) => "edubot",
            (Role::Assistant, Body::Quiz(_)) => "edubot · quiz",
            (Role::Assistant, Body::Flashcards(_)) => "edubot · flashcards",
        }
    }

    fn color_style(&self) -> Style {
        let color = match (&self.message.role, &self.message.body) {
            (Role::User, _) => self.palette.user,
            (Role::Assistant, Body::Text(_)) => self.palette.assistant,
            (Role::Assistant, _) => self.palette.study,
        };
        Style::default().fg(color)
    }

    /// Key hint shown on the bottom border while selected.
    fn hint(&self) -> Option<&'static str> {
        match &self.message.body {
            Body::Quiz(_) => Some(" [ ] question · A-Z answer "),
            Body::Flashcards(_) => Some(" [ ] card · Space flip · s shuffle · r reset "),
            Body::Text(_) if !self.message.follow_ups.is_empty() => Some(" 1-9 use follow-up "),
            Body::Text(_) => None,
        }
    }
}

/// Number of items focus can move between inside `message`.
pub fn focusable_items(message: &Message) -> usize {
    match &message.body {
        Body::Quiz(quiz) => quiz.questions.len(),
        Body::Flashcards(set) => set.len(),
        Body::Text(_) => 0,
    }
}

fn content(message: &Message, palette: &Palette, focus: Option<usize>) -> Text<'static> {
    match &message.body {
        Body::Text(text) => match message.role {
            Role::User => Text::styled(text.trim().to_owned(), Style::default().fg(palette.fg)),
            Role::Assistant => {
                let mut rendered = markup::render(text.trim(), palette);
                rendered.lines.extend(follow_up_lines(&message.follow_ups, palette));
                rendered
            }
        },
        Body::Quiz(quiz) => Text::from(quiz_lines(quiz, palette, focus)),
        Body::Flashcards(set) => Text::from(flashcard_lines(set, palette, focus)),
    }
}

fn follow_up_lines(follow_ups: &[String], palette: &Palette) -> Vec<Line<'static>> {
    if follow_ups.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled("Follow-up questions:", palette.muted_style())),
    ];
    lines.extend(
        follow_ups
            .iter()
            .take(MAX_FOLLOW_UPS)
            .enumerate()
            .map(|(i, f)| {
                Line::from(vec![
                    Span::styled(format!("[{}] ", i + 1), palette.muted_style()),
                    Span::styled(f.clone(), Style::default().fg(palette.accent)),
                ])
            }),
    );
    lines
}

fn marker(focus: Option<usize>, index: usize, palette: &Palette) -> Span<'static> {
    if focus == Some(index) {
        Span::styled(
            FOCUS_MARKER,
            Style::default()
                .fg(palette.selected)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw(NO_MARKER)
    }
}

fn quiz_lines(quiz: &Quiz, palette: &Palette, focus: Option<usize>) -> Vec<Line<'static>> {
    let bold = Style::default().fg(palette.fg).add_modifier(Modifier::BOLD);
    let muted = palette.muted_style();
    let success = Style::default().fg(palette.success).add_modifier(Modifier::BOLD);
    let error = Style::default().fg(palette.error).add_modifier(Modifier::BOLD);

    let (answered, correct) = quiz.score();
    let mut lines = vec![
        Line::from(Span::styled(
            quiz.title.clone(),
            Style::default().fg(palette.study).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{} questions · {} · {}",
                quiz.total_questions, quiz.estimated_time, quiz.difficulty
            ),
            muted,
        )),
        Line::from(Span::styled(
            format!("Score: {answered} answered / {correct} correct"),
            Style::default().fg(palette.accent),
        )),
    ];

    for (i, question) in quiz.questions.iter().enumerate() {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            marker(focus, i, palette),
            Span::styled(format!("Q{}. ", i + 1), bold),
            Span::styled(question.text.clone(), Style::default().fg(palette.fg)),
            Span::styled(format!("  [{}]", question.difficulty_label()), muted),
        ]));
        for (j, option) in question.options.iter().enumerate() {
            let (style, suffix) = match question.mark(j) {
                OptionMark::Open => (Style::default().fg(palette.fg), ""),
                OptionMark::Correct => (success, " ✓"),
                OptionMark::Incorrect => (error, " ✗"),
                OptionMark::Neutral => (muted, ""),
            };
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(format!("{}) {}{}", option_letter(j), option, suffix), style),
            ]));
        }
        if let Some(is_correct) = question.is_correct() {
            let verdict = if is_correct {
                Span::styled("Correct!", success)
            } else {
                Span::styled("Incorrect", error)
            };
            let mut spans = vec![Span::raw("    "), verdict];
            if let Some(explanation) = question.revealed_explanation()
                && !explanation.is_empty()
            {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    explanation.to_owned(),
                    Style::default().fg(palette.fg).add_modifier(Modifier::ITALIC),
                ));
            }
            lines.push(Line::from(spans));
        }
    }
    lines
}

fn flashcard_lines(set: &FlashcardSet, palette: &Palette, focus: Option<usize>) -> Vec<Line<'static>> {
    let muted = palette.muted_style();
    let mut lines = vec![Line::from(Span::styled(
        format!("Flashcards ({} cards)", set.len()),
        Style::default().fg(palette.study).add_modifier(Modifier::BOLD),
    ))];

    for (i, card) in set.cards().iter().enumerate() {
        let side = if card.flipped { "back" } else { "front" };
        lines.push(Line::default());
        lines.push(Line::from(vec![
            marker(focus, i, palette),
            Span::styled(
                format!("{}. ", i + 1),
                Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("[{}] ", card.difficulty_label()), muted),
            Span::styled(side, Style::default().fg(palette.accent)),
        ]));
        if card.flipped {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(card.definition.clone(), Style::default().fg(palette.fg)),
            ]));
            if !card.example.is_empty() {
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(
                        format!("Example: {}", card.example),
                        muted.add_modifier(Modifier::ITALIC),
                    ),
                ]));
            }
        } else {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    card.term.clone(),
                    Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
                ),
            ]));
            if !card.hint.is_empty() {
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!("Hint: {}", card.hint), muted),
                ]));
            }
        }
    }
    lines
}

impl<'a> Widget for MessageView<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = self.color_style();
        let border_style = if self.is_selected {
            Style::default()
                .fg(self.palette.selected)
                .add_modifier(Modifier::BOLD)
        } else {
            style.add_modifier(Modifier::DIM)
        };

        let time = self
            .message
            .timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string();

        let mut block = Block::bordered()
            .title(self.title())
            .title_top(Line::from(time).right_aligned())
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        if self.is_selected
            && let Some(hint) = self.hint()
        {
            block = block.title_bottom(Line::from(hint).right_aligned());
        }

        let inner_area = block.inner(area);
        block.render(area, buf);

        let focus = if self.is_selected { self.focus } else { None };
        Paragraph::new(content(self.message, self.palette, focus))
            .wrap(Wrap { trim: false })
            .render(inner_area, buf);
    }
}

impl<'a> Component for MessageView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

/// Placeholder shown below the transcript while a chat reply is outstanding.
pub struct TypingIndicator<'a> {
    pub palette: &'a Palette,
    pub frame: usize,
}

impl Widget for TypingIndicator<'_> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let dots = ".".repeat(self.frame % 3 + 1);
        let style = Style::default().fg(self.palette.assistant);
        let block = Block::bordered()
            .title("edubot")
            .border_type(BorderType::Rounded)
            .border_style(style.add_modifier(Modifier::DIM))
            .title_style(style)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner_area = block.inner(area);
        block.render(area, buf);
        Paragraph::new(Span::styled(
            format!("typing{dots}"),
            self.palette.muted_style().add_modifier(Modifier::ITALIC),
        ))
        .render(inner_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::study::{Flashcard, Question};
    use crate::core::theme::Theme;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn palette() -> Palette {
        Palette::for_theme(Theme::Dark)
    }

    fn quiz_message() -> Message {
        Message::quiz(Quiz {
            title: "Cell Biology".into(),
            difficulty: "beginner".into(),
            total_questions: 1,
            estimated_time: "2 minutes".into(),
            questions: vec![
                Question::new(
                    "Powerhouse of the cell?".into(),
                    vec!["Nucleus".into(), "Mitochondria".into()],
                    1,
                    "Mitochondria produce ATP.".into(),
                    None,
                )
                .unwrap(),
            ],
        })
    }

    fn deck() -> Message {
        Message::flashcards(FlashcardSet::new(vec![Flashcard::new(
            "Osmosis".into(),
            "water".into(),
            "Diffusion of water across a membrane".into(),
            "Raisins swelling".into(),
            Some("easy".into()),
        )]))
    }

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn render_to_string(message: &Message, width: u16, selected: bool) -> String {
        let p = palette();
        let height = MessageView::calculate_height(message, &p, width);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| {
                f.render_widget(MessageView::new(message, &p, selected, Some(0)), f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ==========================================================================
    // calculate_height
    // ==========================================================================

    #[test]
    fn calculate_height_zero_width_returns_minimum() {
        let message = Message::user("Hello world");
        assert_eq!(MessageView::calculate_height(&message, &palette(), 0), 1);
        assert_eq!(
            MessageView::calculate_height(&message, &palette(), HORIZONTAL_OVERHEAD),
            1
        );
    }

    #[test]
    fn calculate_height_single_line_fits() {
        let message = Message::user("Hello");
        assert_eq!(
            MessageView::calculate_height(&message, &palette(), 80),
            1 + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn calculate_height_wraps_at_width_boundary() {
        let message = Message::user("abcdefghij");
        // content width 5 → "abcde" | "fghij"
        assert_eq!(
            MessageView::calculate_height(&message, &palette(), 9),
            2 + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn calculate_height_counts_follow_ups() {
        let bare = Message::assistant("Answer", vec![]);
        let with = Message::assistant("Answer", vec!["Why?".into(), "How?".into()]);
        let p = palette();
        let diff = MessageView::calculate_height(&with, &p, 80)
            - MessageView::calculate_height(&bare, &p, 80);
        // blank + heading + 2 follow-ups
        assert_eq!(diff, 4);
    }

    #[test]
    fn calculate_height_grows_when_question_answered() {
        let p = palette();
        let mut message = quiz_message();
        let before = MessageView::calculate_height(&message, &p, 80);
        if let Body::Quiz(quiz) = &mut message.body {
            quiz.answer(0, 0);
        }
        let after = MessageView::calculate_height(&message, &p, 80);
        assert_eq!(after, before + 1);
    }

    // ==========================================================================
    // Content
    // ==========================================================================

    #[test]
    fn follow_ups_are_numbered_and_capped() {
        let follow_ups: Vec<String> = (1..=12).map(|i| format!("f{i}")).collect();
        let lines = follow_up_lines(&follow_ups, &palette());
        // blank + heading + 9 entries
        assert_eq!(lines.len(), 2 + MAX_FOLLOW_UPS);
        let text = plain(&Text::from(lines));
        assert_eq!(text[2], "[1] f1");
        assert_eq!(text[10], "[9] f9");
    }

    #[test]
    fn quiz_shows_header_and_lettered_options() {
        let message = quiz_message();
        let text = plain(&content(&message, &palette(), None));
        assert_eq!(text[0], "Cell Biology");
        assert_eq!(text[1], "1 questions · 2 minutes · beginner");
        assert_eq!(text[2], "Score: 0 answered / 0 correct");
        assert!(text.iter().any(|l| l.contains("Q1. Powerhouse of the cell?  [medium]")));
        assert!(text.iter().any(|l| l.trim() == "A) Nucleus"));
        assert!(text.iter().any(|l| l.trim() == "B) Mitochondria"));
        assert!(!text.iter().any(|l| l.contains("Mitochondria produce ATP.")));
    }

    #[test]
    fn quiz_reveals_verdict_and_explanation_after_answer() {
        let mut message = quiz_message();
        if let Body::Quiz(quiz) = &mut message.body {
            quiz.answer(0, 0);
        }
        let text = plain(&content(&message, &palette(), None));
        assert!(text.iter().any(|l| l.trim() == "A) Nucleus ✗"));
        assert!(text.iter().any(|l| l.trim() == "B) Mitochondria ✓"));
        assert!(text.iter().any(|l| l.trim() == "Incorrect Mitochondria produce ATP."));
        assert_eq!(text[2], "Score: 1 answered / 0 correct");
    }

    #[test]
    fn quiz_focus_marks_question() {
        let text = plain(&content(&quiz_message(), &palette(), Some(0)));
        assert!(text.iter().any(|l| l.starts_with("▶ Q1.")));
    }

    #[test]
    fn flashcard_front_and_back() {
        let mut message = deck();
        let front = plain(&content(&message, &palette(), None));
        assert_eq!(front[0], "Flashcards (1 cards)");
        assert!(front.iter().any(|l| l.contains("1. [easy] front")));
        assert!(front.iter().any(|l| l.trim() == "Osmosis"));
        assert!(front.iter().any(|l| l.trim() == "Hint: water"));

        if let Body::Flashcards(set) = &mut message.body {
            set.flip(0);
        }
        let back = plain(&content(&message, &palette(), None));
        assert!(back.iter().any(|l| l.trim() == "Diffusion of water across a membrane"));
        assert!(back.iter().any(|l| l.trim() == "Example: Raisins swelling"));
        assert!(!back.iter().any(|l| l.trim() == "Osmosis"));
    }

    #[test]
    fn focusable_items_by_body() {
        assert_eq!(focusable_items(&quiz_message()), 1);
        assert_eq!(focusable_items(&deck()), 1);
        assert_eq!(focusable_items(&Message::user("hi")), 0);
    }

    // ==========================================================================
    // Rendering
    // ==========================================================================

    #[test]
    fn render_shows_role_title() {
        let out = render_to_string(&Message::user("Hello"), 40, false);
        assert!(out.contains("you"));
        assert!(out.contains("Hello"));
    }

    #[test]
    fn render_selected_shows_hint() {
        let out = render_to_string(&deck(), 60, true);
        assert!(out.contains("Space flip"));
        let out = render_to_string(&deck(), 60, false);
        assert!(!out.contains("Space flip"));
    }
}
