//! # Landing Page Component
//!
//! Welcome screen shown while the transcript is empty. Lists the ways to get
//! started with their key bindings.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;
use crate::tui::palette::Palette;

const SUGGESTIONS: [(&str, &str); 5] = [
    ("Ctrl+U", "Upload notes, slides or readings"),
    ("Type", "Ask a question about your material"),
    ("Ctrl+G", "Generate a quiz"),
    ("Ctrl+F", "Generate flashcards"),
    ("Ctrl+O", "Browse past sessions"),
];

pub struct LandingPage {
    pub palette: Palette,
}

impl LandingPage {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let p = &self.palette;
        let mut lines = vec![
            Line::from(Span::styled(
                "Welcome to EduBot!",
                Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Your study assistant. Here's how to get started:",
                Style::default().fg(p.fg),
            )),
            Line::default(),
        ];
        let key_width = SUGGESTIONS.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, text) in SUGGESTIONS {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{key:>key_width$}"),
                    Style::default().fg(p.study).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(format!("{text:<36}"), Style::default().fg(p.fg)),
            ]));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            p.muted_style(),
        )));
        lines
    }
}

impl Component for LandingPage {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = self.lines();
        let [centered] = Layout::vertical([Constraint::Length(lines.len() as u16)])
            .flex(Flex::Center)
            .areas(area);
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            centered,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::theme::Theme;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_landing_lists_suggestions() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let mut landing = LandingPage::new(Palette::for_theme(Theme::Dark));
        terminal.draw(|f| landing.render(f, f.area())).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Welcome to EduBot!"));
        assert!(screen.contains("Ctrl+U"));
        assert!(screen.contains("Generate a quiz"));
        assert!(screen.contains("Generate flashcards"));
    }
}
