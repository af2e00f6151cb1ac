//! # Study Form
//!
//! Modal form for quiz (Ctrl+G) and flashcard (Ctrl+F) generation. Collects
//! a topic, a difficulty (quiz only) and an item count, and returns a
//! structured config. Left/Right cycle the difficulty or step the count.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::core::study::{
    Difficulty, FlashcardConfig, MAX_FLASHCARDS, MAX_QUIZ_QUESTIONS, QuizConfig,
};
use crate::tui::event::TuiEvent;
use crate::tui::palette::Palette;

use super::form_field::FormField;
use super::session_manager::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyKind {
    Quiz,
    Flashcards,
}

impl StudyKind {
    fn max_count(self) -> u32 {
        match self {
            StudyKind::Quiz => MAX_QUIZ_QUESTIONS as u32,
            StudyKind::Flashcards => MAX_FLASHCARDS as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Topic,
    Difficulty,
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyEvent {
    Quiz(QuizConfig),
    Flashcards(FlashcardConfig),
    Cancel,
}

pub struct StudyFormState {
    pub kind: StudyKind,
    topic: FormField,
    difficulty: Difficulty,
    count: FormField,
    focus: Field,
}

impl StudyFormState {
    pub fn new(kind: StudyKind, default_count: u32) -> Self {
        let default_count = default_count.clamp(1, kind.max_count());
        Self {
            kind,
            topic: FormField::default().with_max_chars(200),
            difficulty: Difficulty::default(),
            count: FormField::new(default_count.to_string()).with_max_chars(2),
            focus: Field::Topic,
        }
    }

    fn fields(&self) -> &'static [Field] {
        match self.kind {
            StudyKind::Quiz => &[Field::Topic, Field::Difficulty, Field::Count],
            StudyKind::Flashcards => &[Field::Topic, Field::Count],
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let fields = self.fields();
        let current = fields.iter().position(|&f| f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % fields.len()
        } else {
            (current + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
    }

    fn count_value(&self) -> u32 {
        self.count.value.parse().unwrap_or(0)
    }

    fn step_count(&mut self, up: bool) {
        let current = self.count_value().max(1);
        let next = if up {
            (current + 1).min(self.kind.max_count())
        } else {
            current.saturating_sub(1).max(1)
        };
        self.count.value = next.to_string();
    }

    /// The config the form would submit right now.
    pub fn config(&self) -> StudyEvent {
        match self.kind {
            StudyKind::Quiz => StudyEvent::Quiz(QuizConfig::new(
                self.topic.value.as_str(),
                self.difficulty,
                self.count_value(),
            )),
            StudyKind::Flashcards => StudyEvent::Flashcards(FlashcardConfig::new(
                self.topic.value.as_str(),
                self.count_value(),
            )),
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<StudyEvent> {
        match event {
            TuiEvent::Escape => Some(StudyEvent::Cancel),
            TuiEvent::Submit => Some(self.config()),
            TuiEvent::Tab | TuiEvent::CursorDown => {
                self.cycle_focus(true);
                None
            }
            TuiEvent::BackTab | TuiEvent::CursorUp => {
                self.cycle_focus(false);
                None
            }
            TuiEvent::CursorLeft | TuiEvent::CursorRight => {
                let forward = *event == TuiEvent::CursorRight;
                match self.focus {
                    Field::Difficulty => {
                        self.difficulty = if forward {
                            self.difficulty.next()
                        } else {
                            self.difficulty.prev()
                        };
                    }
                    Field::Count => self.step_count(forward),
                    Field::Topic => {}
                }
                None
            }
            _ => {
                match self.focus {
                    Field::Topic => {
                        self.topic.edit(event, |c| !c.is_control());
                    }
                    Field::Count => {
                        self.count.edit(event, |c| c.is_ascii_digit());
                    }
                    Field::Difficulty => {}
                }
                None
            }
        }
    }
}

/// Transient render wrapper.
pub struct StudyForm<'a> {
    state: &'a StudyFormState,
    palette: &'a Palette,
}

impl<'a> StudyForm<'a> {
    pub fn new(state: &'a StudyFormState, palette: &'a Palette) -> Self {
        Self { state, palette }
    }

    fn difficulty_line(&self) -> Line<'static> {
        let focused = self.state.focus == Field::Difficulty;
        let label_style = if focused {
            Style::default()
                .fg(self.palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            self.palette.muted_style()
        };
        let mut spans = vec![Span::styled("Difficulty: ", label_style)];
        for level in Difficulty::ALL {
            let style = if level == self.state.difficulty {
                Style::default()
                    .fg(self.palette.selected)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(self.palette.fg)
            };
            spans.push(Span::styled(format!(" {} ", level.as_str()), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 40, area);
        frame.render_widget(Clear, overlay);

        let state = self.state;
        let (title, count_label) = match state.kind {
            StudyKind::Quiz => (" Generate quiz ", "Questions"),
            StudyKind::Flashcards => (" Generate flashcards ", "Cards"),
        };
        let count_label = format!("{count_label} (max {})", state.kind.max_count());

        let mut lines = vec![state.topic.line(
            "Topic",
            "blank = everything uploaded",
            state.focus == Field::Topic,
            self.palette,
        )];
        if state.kind == StudyKind::Quiz {
            lines.push(self.difficulty_line());
        }
        lines.push(
            state
                .count
                .line(&count_label, "", state.focus == Field::Count, self.palette),
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.study))
            .title(title)
            .title_bottom(Line::from(" Tab Next field  ←/→ Change  Enter Generate  Esc Cancel ").centered())
            .padding(Padding::uniform(1));

        frame.render_widget(Paragraph::new(lines).block(block), overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::theme::Theme;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_quiz_defaults() {
        let form = StudyFormState::new(StudyKind::Quiz, 5);
        assert_eq!(
            form.config(),
            StudyEvent::Quiz(QuizConfig::new("", Difficulty::Intermediate, 5))
        );
    }

    #[test]
    fn test_quiz_fields() {
        let mut form = StudyFormState::new(StudyKind::Quiz, 5);
        form.handle_event(&TuiEvent::Paste("Cell biology".into()));
        form.handle_event(&TuiEvent::Tab);
        form.handle_event(&TuiEvent::CursorRight);
        form.handle_event(&TuiEvent::Tab);
        form.handle_event(&TuiEvent::Backspace);
        form.handle_event(&TuiEvent::InputChar('8'));
        assert_eq!(
            form.handle_event(&TuiEvent::Submit),
            Some(StudyEvent::Quiz(QuizConfig::new(
                "Cell biology",
                Difficulty::Advanced,
                8
            )))
        );
    }

    #[test]
    fn test_flashcard_count_is_clamped() {
        let mut form = StudyFormState::new(StudyKind::Flashcards, 10);
        form.handle_event(&TuiEvent::Tab);
        form.handle_event(&TuiEvent::Backspace);
        form.handle_event(&TuiEvent::Backspace);
        form.handle_event(&TuiEvent::Paste("50".into()));
        let Some(StudyEvent::Flashcards(config)) = form.handle_event(&TuiEvent::Submit) else {
            panic!("expected flashcard config");
        };
        assert_eq!(config.count(), 20);
    }

    #[test]
    fn test_flashcards_skip_difficulty() {
        let mut form = StudyFormState::new(StudyKind::Flashcards, 10);
        form.handle_event(&TuiEvent::Tab);
        assert_eq!(form.focus, Field::Count);
        form.handle_event(&TuiEvent::Tab);
        assert_eq!(form.focus, Field::Topic);
    }

    #[test]
    fn test_count_stepping_stays_in_range() {
        let mut form = StudyFormState::new(StudyKind::Quiz, 1);
        form.focus = Field::Count;
        form.handle_event(&TuiEvent::CursorLeft);
        assert_eq!(form.count.value, "1");
        for _ in 0..30 {
            form.handle_event(&TuiEvent::CursorRight);
        }
        assert_eq!(form.count.value, "20");
    }

    #[test]
    fn test_escape_cancels() {
        let mut form = StudyFormState::new(StudyKind::Quiz, 5);
        assert_eq!(form.handle_event(&TuiEvent::Escape), Some(StudyEvent::Cancel));
    }

    #[test]
    fn test_render_quiz_form() {
        let form = StudyFormState::new(StudyKind::Quiz, 5);
        let palette = Palette::for_theme(Theme::Light);
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|f| StudyForm::new(&form, &palette).render(f, f.area()))
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Generate quiz"));
        assert!(screen.contains("intermediate"));
        assert!(screen.contains("Questions (max 20)"));
    }
}
