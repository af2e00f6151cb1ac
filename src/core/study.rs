//! # Study Tools
//!
//! Quizzes and flashcard sets returned by the backend, plus the structured
//! configuration used to request them.
//!
//! ```text
//! Question:   Unanswered ──answer(i)──▶ Answered { selected: i }   (terminal)
//! Flashcard:  flipped ◀──flip──▶ !flipped      reset ▶ all false
//! ```
//!
//! Shuffling reorders cards; it never touches their flipped state.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Maximum number of flashcards one request may ask for.
pub const MAX_FLASHCARDS: u8 = 20;
pub const DEFAULT_FLASHCARDS: u8 = 10;
/// Maximum number of quiz questions one request may ask for.
pub const MAX_QUIZ_QUESTIONS: u8 = 20;
pub const DEFAULT_QUIZ_QUESTIONS: u8 = 5;

/// Shown when the backend does not supply a per-item difficulty.
pub const FALLBACK_ITEM_DIFFICULTY: &str = "medium";

// ============================================================================
// Request configuration
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    /// Cycles to the next level (wraps around)
    pub fn next(self) -> Difficulty {
        match self {
            Difficulty::Beginner => Difficulty::Intermediate,
            Difficulty::Intermediate => Difficulty::Advanced,
            Difficulty::Advanced => Difficulty::Beginner,
        }
    }

    pub fn prev(self) -> Difficulty {
        match self {
            Difficulty::Beginner => Difficulty::Advanced,
            Difficulty::Intermediate => Difficulty::Beginner,
            Difficulty::Advanced => Difficulty::Intermediate,
        }
    }
}

/// Parameters for `/generate_quiz`. An empty topic means "all uploaded topics".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub topic: String,
    pub difficulty: Difficulty,
    count: u8,
}

impl QuizConfig {
    /// `count` is clamped to `1..=MAX_QUIZ_QUESTIONS`.
    pub fn new(topic: impl Into<String>, difficulty: Difficulty, count: u32) -> Self {
        Self {
            topic: topic.into().trim().to_string(),
            difficulty,
            count: count.clamp(1, MAX_QUIZ_QUESTIONS as u32) as u8,
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self::new("", Difficulty::default(), DEFAULT_QUIZ_QUESTIONS as u32)
    }
}

/// Parameters for `/generate_flashcards`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardConfig {
    pub topic: String,
    count: u8,
}

impl FlashcardConfig {
    /// `count` is capped at `MAX_FLASHCARDS`; zero falls back to the default.
    pub fn new(topic: impl Into<String>, count: u32) -> Self {
        let count = match count {
            0 => DEFAULT_FLASHCARDS,
            n => n.min(MAX_FLASHCARDS as u32) as u8,
        };
        Self {
            topic: topic.into().trim().to_string(),
            count,
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }
}

impl Default for FlashcardConfig {
    fn default() -> Self {
        Self::new("", DEFAULT_FLASHCARDS as u32)
    }
}

// ============================================================================
// Quiz
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerState {
    Unanswered,
    Answered { selected: usize },
}

/// How an option should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// Question not answered yet; the option can still be chosen.
    Open,
    Correct,
    /// The wrong option the user picked.
    Incorrect,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct: usize,
    pub explanation: String,
    pub difficulty: Option<String>,
    state: AnswerState,
}

impl Question {
    pub fn new(
        text: String,
        options: Vec<String>,
        correct: usize,
        explanation: String,
        difficulty: Option<String>,
    ) -> Result<Self, String> {
        if options.is_empty() {
            return Err("question has no options".to_string());
        }
        if correct >= options.len() {
            return Err(format!(
                "correct answer {correct} is out of range for {} options",
                options.len()
            ));
        }
        Ok(Self {
            text,
            options,
            correct,
            explanation,
            difficulty,
            state: AnswerState::Unanswered,
        })
    }

    pub fn state(&self) -> AnswerState {
        self.state
    }

    pub fn is_answered(&self) -> bool {
        matches!(self.state, AnswerState::Answered { .. })
    }

    /// Record the first answer. Returns whether it was correct, or `None` if the
    /// question was already answered or `option` does not exist.
    pub fn answer(&mut self, option: usize) -> Option<bool> {
        if self.is_answered() || option >= self.options.len() {
            return None;
        }
        self.state = AnswerState::Answered { selected: option };
        Some(option == self.correct)
    }

    pub fn is_correct(&self) -> Option<bool> {
        match self.state {
            AnswerState::Unanswered => None,
            AnswerState::Answered { selected } => Some(selected == self.correct),
        }
    }

    pub fn mark(&self, option: usize) -> OptionMark {
        match self.state {
            AnswerState::Unanswered => OptionMark::Open,
            AnswerState::Answered { .. } if option == self.correct => OptionMark::Correct,
            AnswerState::Answered { selected } if option == selected => OptionMark::Incorrect,
            AnswerState::Answered { .. } => OptionMark::Neutral,
        }
    }

    /// The explanation, revealed only once answered.
    pub fn revealed_explanation(&self) -> Option<&str> {
        self.is_answered().then_some(self.explanation.as_str())
    }

    pub fn difficulty_label(&self) -> &str {
        self.difficulty.as_deref().unwrap_or(FALLBACK_ITEM_DIFFICULTY)
    }
}

/// Option letter for display: 0 → 'A'.
pub fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Inverse of [`option_letter`], case-insensitive.
pub fn option_index(letter: char) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    upper
        .is_ascii_uppercase()
        .then(|| (upper as u8 - b'A') as usize)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub title: String,
    pub difficulty: String,
    pub total_questions: usize,
    pub estimated_time: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn answer(&mut self, question: usize, option: usize) -> Option<bool> {
        self.questions.get_mut(question)?.answer(option)
    }

    /// `(answered, correct)` counts.
    pub fn score(&self) -> (usize, usize) {
        self.questions.iter().fold((0, 0), |(answered, correct), q| match q.is_correct() {
            Some(true) => (answered + 1, correct + 1),
            Some(false) => (answered + 1, correct),
            None => (answered, correct),
        })
    }

    pub fn is_complete(&self) -> bool {
        self.questions.iter().all(Question::is_answered)
    }
}

// ============================================================================
// Flashcards
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Flashcard {
    pub term: String,
    pub hint: String,
    pub definition: String,
    pub example: String,
    pub difficulty: Option<String>,
    pub flipped: bool,
}

impl Flashcard {
    pub fn new(
        term: String,
        hint: String,
        definition: String,
        example: String,
        difficulty: Option<String>,
    ) -> Self {
        Self {
            term,
            hint,
            definition,
            example,
            difficulty,
            flipped: false,
        }
    }

    pub fn difficulty_label(&self) -> &str {
        self.difficulty.as_deref().unwrap_or(FALLBACK_ITEM_DIFFICULTY)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlashcardSet {
    cards: Vec<Flashcard>,
}

impl FlashcardSet {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Toggle one card. Returns the new flipped state, or `None` if out of range.
    pub fn flip(&mut self, index: usize) -> Option<bool> {
        let card = self.cards.get_mut(index)?;
        card.flipped = !card.flipped;
        Some(card.flipped)
    }

    /// Reorder the cards uniformly at random. Flipped state moves with its card.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn reset(&mut self) {
        for card in &mut self.cards {
            card.flipped = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(correct: usize) -> Question {
        Question::new(
            "Which organelle makes ATP?".to_string(),
            vec![
                "Nucleus".to_string(),
                "Mitochondria".to_string(),
                "Ribosome".to_string(),
            ],
            correct,
            "Mitochondria run cellular respiration.".to_string(),
            None,
        )
        .unwrap()
    }

    fn cards(n: usize) -> FlashcardSet {
        FlashcardSet::new(
            (0..n)
                .map(|i| {
                    Flashcard::new(
                        format!("term-{i}"),
                        format!("hint-{i}"),
                        format!("definition-{i}"),
                        format!("example-{i}"),
                        None,
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_flashcard_count_clamped() {
        assert_eq!(FlashcardConfig::new("cells", 50).count(), 20);
        assert_eq!(FlashcardConfig::new("cells", 7).count(), 7);
        assert_eq!(FlashcardConfig::new("cells", 0).count(), DEFAULT_FLASHCARDS);
        assert_eq!(FlashcardConfig::default().count(), 10);
    }

    #[test]
    fn test_quiz_config_defaults_and_bounds() {
        let config = QuizConfig::default();
        assert_eq!(config.count(), 5);
        assert_eq!(config.difficulty, Difficulty::Intermediate);
        assert_eq!(config.topic, "");

        assert_eq!(QuizConfig::new("x", Difficulty::Advanced, 0).count(), 1);
        assert_eq!(QuizConfig::new("x", Difficulty::Advanced, 99).count(), 20);
        assert_eq!(QuizConfig::new("  cells  ", Difficulty::Beginner, 3).topic, "cells");
    }

    #[test]
    fn test_difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Advanced).unwrap();
        assert_eq!(json, "\"advanced\"");
        assert_eq!(Difficulty::Advanced.next(), Difficulty::Beginner);
        assert_eq!(Difficulty::Beginner.prev(), Difficulty::Advanced);
    }

    #[test]
    fn test_question_rejects_bad_answer_index() {
        let err = Question::new("q".into(), vec!["a".into()], 1, String::new(), None).unwrap_err();
        assert!(err.contains("out of range"));
        assert!(Question::new("q".into(), vec![], 0, String::new(), None).is_err());
    }

    #[test]
    fn test_answer_correct_marks_options() {
        let mut q = question(1);
        assert_eq!(q.mark(0), OptionMark::Open);
        assert_eq!(q.revealed_explanation(), None);

        assert_eq!(q.answer(1), Some(true));
        assert_eq!(q.mark(0), OptionMark::Neutral);
        assert_eq!(q.mark(1), OptionMark::Correct);
        assert_eq!(q.mark(2), OptionMark::Neutral);
        assert_eq!(
            q.revealed_explanation(),
            Some("Mitochondria run cellular respiration.")
        );
    }

    #[test]
    fn test_answer_incorrect_marks_selection() {
        let mut q = question(1);
        assert_eq!(q.answer(2), Some(false));
        assert_eq!(q.mark(1), OptionMark::Correct);
        assert_eq!(q.mark(2), OptionMark::Incorrect);
        assert_eq!(q.mark(0), OptionMark::Neutral);
    }

    #[test]
    fn test_answer_is_terminal() {
        let mut q = question(1);
        assert_eq!(q.answer(0), Some(false));
        assert_eq!(q.answer(1), None);
        assert_eq!(q.state(), AnswerState::Answered { selected: 0 });
        assert_eq!(q.is_correct(), Some(false));
    }

    #[test]
    fn test_answer_out_of_range_is_ignored() {
        let mut q = question(1);
        assert_eq!(q.answer(7), None);
        assert!(!q.is_answered());
    }

    #[test]
    fn test_quiz_score() {
        let mut quiz = Quiz {
            title: "Cells".into(),
            difficulty: "intermediate".into(),
            total_questions: 3,
            estimated_time: "5 minutes".into(),
            questions: vec![question(1), question(1), question(0)],
        };
        assert_eq!(quiz.score(), (0, 0));
        quiz.answer(0, 1);
        quiz.answer(1, 2);
        assert_eq!(quiz.score(), (2, 1));
        assert!(!quiz.is_complete());
        assert_eq!(quiz.answer(5, 0), None);
        quiz.answer(2, 0);
        assert!(quiz.is_complete());
    }

    #[test]
    fn test_option_letters() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
        assert_eq!(option_index('a'), Some(0));
        assert_eq!(option_index('D'), Some(3));
        assert_eq!(option_index('1'), None);
    }

    #[test]
    fn test_flip_toggles_one_card() {
        let mut set = cards(3);
        assert_eq!(set.flip(1), Some(true));
        assert_eq!(set.flip(1), Some(false));
        assert_eq!(set.flip(1), Some(true));
        assert_eq!(set.flip(9), None);
        let flipped: Vec<bool> = set.cards().iter().map(|c| c.flipped).collect();
        assert_eq!(flipped, vec![false, true, false]);
    }

    #[test]
    fn test_reset_unflips_everything() {
        let mut set = cards(4);
        set.flip(0);
        set.flip(3);
        set.reset();
        assert!(set.cards().iter().all(|c| !c.flipped));
    }

    #[test]
    fn test_shuffle_is_permutation_preserving_flips() {
        let mut set = cards(12);
        set.flip(2);
        set.flip(7);
        let mut rng = StdRng::seed_from_u64(7);
        set.shuffle(&mut rng);

        assert_eq!(set.len(), 12);
        let mut terms: Vec<&str> = set.cards().iter().map(|c| c.term.as_str()).collect();
        terms.sort();
        let mut expected: Vec<String> = (0..12).map(|i| format!("term-{i}")).collect();
        expected.sort();
        assert_eq!(terms, expected);

        for card in set.cards() {
            let should_be_flipped = card.term == "term-2" || card.term == "term-7";
            assert_eq!(card.flipped, should_be_flipped, "{}", card.term);
        }
    }

    #[test]
    fn test_shuffle_reaches_every_position() {
        // Over many seeds, card 0 should land in every slot of a 4-card deck.
        let mut seen = [false; 4];
        for seed in 0..200 {
            let mut set = cards(4);
            set.shuffle(&mut StdRng::seed_from_u64(seed));
            let pos = set.cards().iter().position(|c| c.term == "term-0").unwrap();
            seen[pos] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
