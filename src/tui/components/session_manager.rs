//! # Session Manager Component
//!
//! Overlay for browsing the backend's session list and switching to one.
//! Opened with Ctrl+O, dismissed with Esc.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SessionManagerState` lives in `TuiState` (selection only)
//! - `SessionManager` is created each frame and borrows the list from `App`

use chrono::{DateTime, Local, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::session::SessionSummary;
use crate::tui::event::TuiEvent;
use crate::tui::palette::Palette;

/// Persistent state for the session manager overlay.
#[derive(Debug, Default)]
pub struct SessionManagerState {
    pub selected: usize,
    pub list_state: ListState,
}

impl SessionManagerState {
    /// Start with the active session highlighted, if it is listed.
    pub fn new(sessions: &[SessionSummary], active_id: &str) -> Self {
        let selected = sessions
            .iter()
            .position(|s| s.id == active_id)
            .unwrap_or(0);
        let mut list_state = ListState::default();
        if !sessions.is_empty() {
            list_state.select(Some(selected));
        }
        Self {
            selected,
            list_state,
        }
    }

    /// Keep the selection inside the list after a refresh.
    fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(len - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    /// Handle a key event, returning a SessionEvent if the overlay should act.
    pub fn handle_event(
        &mut self,
        event: &TuiEvent,
        sessions: &[SessionSummary],
    ) -> Option<SessionEvent> {
        self.clamp(sessions.len());
        match event {
            TuiEvent::Escape => Some(SessionEvent::Dismiss),
            TuiEvent::CursorUp => {
                if !sessions.is_empty() {
                    self.selected = self.selected.saturating_sub(1);
                    self.list_state.select(Some(self.selected));
                }
                None
            }
            TuiEvent::CursorDown => {
                if !sessions.is_empty() {
                    self.selected = (self.selected + 1).min(sessions.len() - 1);
                    self.list_state.select(Some(self.selected));
                }
                None
            }
            TuiEvent::Submit => sessions
                .get(self.selected)
                .map(|session| SessionEvent::Load(session.id.clone())),
            TuiEvent::InputChar('n') => Some(SessionEvent::CreateNew),
            TuiEvent::InputChar('r') => Some(SessionEvent::Refresh),
            _ => None,
        }
    }
}

/// Events emitted by the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Load(String),
    CreateNew,
    Refresh,
    Dismiss,
}

/// Transient render wrapper for the session manager overlay.
pub struct SessionManager<'a> {
    state: &'a mut SessionManagerState,
    sessions: &'a [SessionSummary],
    active_id: &'a str,
    refreshing: bool,
    palette: &'a Palette,
}

impl<'a> SessionManager<'a> {
    pub fn new(
        state: &'a mut SessionManagerState,
        sessions: &'a [SessionSummary],
        active_id: &'a str,
        refreshing: bool,
        palette: &'a Palette,
    ) -> Self {
        Self {
            state,
            sessions,
            active_id,
            refreshing,
            palette,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(80, 70, area);
        frame.render_widget(Clear, overlay);
        self.state.clamp(self.sessions.len());

        let title = if self.refreshing {
            " Sessions (refreshing...) "
        } else {
            " Sessions "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.accent))
            .title(title)
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" n New  r Refresh  Enter Open  Esc Back ").centered())
            .padding(Padding::horizontal(1));

        if self.sessions.is_empty() {
            let empty = Paragraph::new("No sessions yet.")
                .style(self.palette.muted_style())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, overlay);
            return;
        }

        // Layout: "* Jan 15  <preview>   12 msgs 📎"
        let inner_width = overlay.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = self
            .sessions
            .iter()
            .enumerate()
            .map(|(i, session)| {
                let marker = if session.id == self.active_id { "* " } else { "  " };
                let date = format_activity(session.last_activity);
                let mut count = format!("{} msgs", session.message_count);
                if session.has_files {
                    count.push_str(" 📎");
                }
                let fixed = marker.len() + date.width() + 2 + count.width() + 2;
                let preview_width = inner_width.saturating_sub(fixed);
                let preview = if session.preview.trim().is_empty() {
                    session.id.as_str()
                } else {
                    session.preview.as_str()
                };
                let preview = truncate(preview, preview_width);
                let padding = preview_width.saturating_sub(preview.width());

                let style = if i == self.state.selected {
                    Style::default()
                        .fg(self.palette.selected)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(self.palette.fg)
                };

                ListItem::new(Line::from(vec![
                    Span::styled(marker, style),
                    Span::styled(date, style),
                    Span::styled("  ", style),
                    Span::styled(format!("{preview}{}", " ".repeat(padding)), style),
                    Span::styled("  ", style),
                    Span::styled(count, style),
                ]))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, overlay, &mut self.state.list_state);
    }
}

/// "Jan 15 14:02" in local time, or "unknown" when the backend sent nothing usable.
fn format_activity(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%b %d %H:%M").to_string(),
        None => "unknown".to_string(),
    }
}

/// Truncate to `max_width` display columns, adding "..." if needed.
pub(crate) fn truncate(s: &str, max_width: usize) -> String {
    let first_line = s.lines().next().unwrap_or_default();
    if first_line.width() <= max_width && !s.contains('\n') {
        return first_line.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    let mut used = 0;
    for c in first_line.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > max_width - 3 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

/// Compute a centered rect using percentage of the outer rect.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
