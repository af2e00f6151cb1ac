//! # Upload Form
//!
//! Modal form (Ctrl+U) that collects file paths and a subject label, previews
//! the resolved files with their sizes, and hands a structured selection to
//! the reducer. Tab switches fields, Enter submits, Esc cancels.

use std::path::PathBuf;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::core::upload::{SelectedFile, UploadBatch, UploadStatus, format_file_size};
use crate::tui::event::TuiEvent;
use crate::tui::palette::Palette;

use super::form_field::FormField;
use super::session_manager::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Paths,
    Subject,
}

/// One previewed path: the resolved file or the reason it can't be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEntry {
    Ready(SelectedFile),
    Invalid { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Submit {
        files: Vec<SelectedFile>,
        subject: String,
    },
    Cancel,
}

pub struct UploadFormState {
    paths: FormField,
    subject: FormField,
    focus: Field,
    preview: Vec<PreviewEntry>,
    default_subject: String,
}

impl UploadFormState {
    pub fn new(default_subject: impl Into<String>) -> Self {
        Self {
            paths: FormField::default(),
            subject: FormField::default().with_max_chars(100),
            focus: Field::Paths,
            preview: Vec::new(),
            default_subject: default_subject.into(),
        }
    }

    pub fn preview(&self) -> &[PreviewEntry] {
        &self.preview
    }

    fn refresh_preview(&mut self) {
        self.preview = split_paths(&self.paths.value)
            .into_iter()
            .map(|raw| match SelectedFile::from_path(expand_home(&raw)) {
                Ok(file) => PreviewEntry::Ready(file),
                Err(e) => PreviewEntry::Invalid {
                    path: raw,
                    reason: e.to_string(),
                },
            })
            .collect();
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<UploadEvent> {
        match event {
            TuiEvent::Escape => Some(UploadEvent::Cancel),
            TuiEvent::Tab | TuiEvent::BackTab | TuiEvent::CursorUp | TuiEvent::CursorDown => {
                self.focus = match self.focus {
                    Field::Paths => Field::Subject,
                    Field::Subject => Field::Paths,
                };
                None
            }
            TuiEvent::Submit => {
                let ready: Vec<SelectedFile> = self
                    .preview
                    .iter()
                    .filter_map(|entry| match entry {
                        PreviewEntry::Ready(file) => Some(file.clone()),
                        PreviewEntry::Invalid { .. } => None,
                    })
                    .collect();
                // Nothing is sent while any path is unresolved or the selection is empty
                if ready.is_empty() || ready.len() != self.preview.len() {
                    return None;
                }
                Some(UploadEvent::Submit {
                    files: ready,
                    subject: self.subject.value.clone(),
                })
            }
            _ => {
                match self.focus {
                    Field::Paths => {
                        if self.paths.edit(event, |c| c != '\r') {
                            self.refresh_preview();
                        }
                    }
                    Field::Subject => {
                        self.subject.edit(event, |c| !c.is_control());
                    }
                }
                None
            }
        }
    }
}

/// Paths are separated by commas or newlines.
fn split_paths(input: &str) -> Vec<String> {
    input
        .split([',', '\n'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Transient render wrapper.
pub struct UploadForm<'a> {
    state: &'a UploadFormState,
    batch: Option<&'a UploadBatch>,
    palette: &'a Palette,
}

impl<'a> UploadForm<'a> {
    pub fn new(state: &'a UploadFormState, batch: Option<&'a UploadBatch>, palette: &'a Palette) -> Self {
        Self {
            state,
            batch,
            palette,
        }
    }

    fn batch_line(&self) -> Option<Line<'static>> {
        let batch = self.batch?;
        let (text, color) = match &batch.status {
            UploadStatus::Pending => (
                format!(
                    "Uploading {} file(s), {} to \"{}\"...",
                    batch.files.len(),
                    format_file_size(batch.total_size()),
                    batch.subject
                ),
                self.palette.info,
            ),
            UploadStatus::Success { processed } => (
                format!("Last upload: {processed} file(s) processed"),
                self.palette.success,
            ),
            UploadStatus::Error(message) => {
                (format!("Last upload failed: {message}"), self.palette.error)
            }
        };
        Some(Line::styled(text, Style::default().fg(color)))
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(70, 60, area);
        frame.render_widget(Clear, overlay);

        let state = self.state;
        let palette = self.palette;
        let placeholder = format!("blank = {}", state.default_subject);
        let mut lines = vec![
            state.paths.line(
                "Files",
                "comma-separated paths",
                state.focus == Field::Paths,
                palette,
            ),
            state
                .subject
                .line("Subject", &placeholder, state.focus == Field::Subject, palette),
            Line::default(),
        ];

        if state.preview.is_empty() {
            lines.push(Line::styled("No files selected.", palette.muted_style()));
        }
        for entry in &state.preview {
            lines.push(match entry {
                PreviewEntry::Ready(file) => Line::from(vec![
                    Span::styled("  ✓ ", Style::default().fg(palette.success)),
                    Span::styled(file.name.clone(), Style::default().fg(palette.fg)),
                    Span::styled(format!("  ({})", file.size_label()), palette.muted_style()),
                ]),
                PreviewEntry::Invalid { path, reason } => Line::from(vec![
                    Span::styled("  ✗ ", Style::default().fg(palette.error)),
                    Span::styled(format!("{path}: {reason}"), Style::default().fg(palette.error)),
                ]),
            });
        }

        if let Some(line) = self.batch_line() {
            lines.push(Line::default());
            lines.push(line);
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(" Upload study material ")
            .title_bottom(Line::from(" Tab Switch field  Enter Upload  Esc Cancel ").centered())
            .padding(Padding::horizontal(1));

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            overlay,
        );
    }
}
