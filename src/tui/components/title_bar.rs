//! # TitleBar Component
//!
//! Top status bar: application name, active session, theme, and one marker
//! per outstanding request kind.
//!
//! ## Stateless Component
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::from_app(&app, palette, tui.has_unseen_content());
//! title_bar.render(frame, area);
//! ```
//!
//! ## Layout
//!
//! `EduBot · session-abc123xyz 📎 | thinking… quiz… | ↓ New` on the left, the
//! theme name right-aligned. Activity markers are omitted when idle.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::state::App;
use crate::core::theme::Theme;
use crate::tui::component::Component;
use crate::tui::palette::Palette;

/// Which requests are outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activity {
    pub chat: bool,
    pub upload: bool,
    pub quiz: bool,
    pub flashcards: bool,
    pub sessions: bool,
}

impl Activity {
    fn labels(&self) -> Vec<&'static str> {
        [
            (self.chat, "thinking…"),
            (self.upload, "uploading…"),
            (self.quiz, "quiz…"),
            (self.flashcards, "flashcards…"),
            (self.sessions, "syncing…"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect()
    }
}

pub struct TitleBar {
    pub session_id: String,
    pub has_attachments: bool,
    pub theme: Theme,
    pub activity: Activity,
    /// Whether there's content below the current scroll position
    pub has_unseen_content: bool,
    pub palette: Palette,
}

impl TitleBar {
    pub fn from_app(app: &App, palette: Palette, has_unseen_content: bool) -> Self {
        Self {
            session_id: app.session.current_id().to_string(),
            has_attachments: app.session.has_attachments(),
            theme: app.theme,
            activity: Activity {
                chat: app.busy,
                upload: app.upload_pending(),
                quiz: app.quiz_in_flight,
                flashcards: app.flashcards_in_flight,
                sessions: app.refresh_in_flight,
            },
            has_unseen_content,
            palette,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let p = &self.palette;
        let mut spans = vec![
            Span::styled(
                "EduBot",
                Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" · ", p.muted_style()),
            Span::styled(self.session_id.clone(), Style::default().fg(p.fg)),
        ];
        if self.has_attachments {
            spans.push(Span::raw(" 📎"));
        }

        let labels = self.activity.labels();
        if !labels.is_empty() {
            spans.push(Span::styled(" | ", p.muted_style()));
            spans.push(Span::styled(labels.join(" "), Style::default().fg(p.info)));
        }
        if self.has_unseen_content {
            spans.push(Span::styled(" | ", p.muted_style()));
            spans.push(Span::styled("↓ New", Style::default().fg(p.accent)));
        }

        let theme_label = format!("{} (Ctrl+T)", self.theme.as_str());
        let [left, right] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(theme_label.len() as u16),
        ])
        .areas(area);

        frame.render_widget(Line::from(spans), left);
        frame.render_widget(
            Line::styled(theme_label, p.muted_style()).right_aligned(),
            right,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn bar(activity: Activity, unseen: bool) -> TitleBar {
        TitleBar {
            session_id: "session-abc123xyz".into(),
            has_attachments: false,
            theme: Theme::Dark,
            activity,
            has_unseen_content: unseen,
            palette: Palette::for_theme(Theme::Dark),
        }
    }

    fn draw(title_bar: &mut TitleBar) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 1)).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_idle_title() {
        let text = draw(&mut bar(Activity::default(), false));
        assert!(text.contains("EduBot"));
        assert!(text.contains("session-abc123xyz"));
        assert!(text.contains("dark (Ctrl+T)"));
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_activity_markers() {
        let activity = Activity {
            chat: true,
            quiz: true,
            ..Activity::default()
        };
        let text = draw(&mut bar(activity, true));
        assert!(text.contains("thinking…"));
        assert!(text.contains("quiz…"));
        assert!(!text.contains("uploading…"));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_attachment_marker() {
        let mut title_bar = bar(Activity::default(), false);
        title_bar.has_attachments = true;
        title_bar.theme = Theme::Light;
        let text = draw(&mut title_bar);
        assert!(text.contains('📎'));
        assert!(text.contains("light"));
    }

    #[test]
    fn test_from_app_reads_flags() {
        let mut app = crate::test_support::test_app();
        app.busy = true;
        app.flashcards_in_flight = true;
        let title_bar = TitleBar::from_app(&app, Palette::for_theme(Theme::Dark), false);
        assert_eq!(title_bar.session_id, app.session.current_id());
        assert!(title_bar.activity.chat);
        assert!(title_bar.activity.flashcards);
        assert!(!title_bar.activity.upload);
    }
}
