//! # Uploader
//!
//! One batch of files at a time. A batch is shown as a pending preview as soon
//! as it is submitted, settles into success or error when the backend answers,
//! and is cleared by a fixed cleanup timer that starts when it settles.
//!
//! ```text
//! Pending ──ok──▶ Success { processed } ──┐
//!    └─────err──▶ Error(message) ─────────┴─▶ (cleanup_at reached) ▶ cleared
//! ```
//!
//! New batches are refused while one is `Pending`. A settled batch waiting
//! for cleanup is replaced immediately by a new one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const DEFAULT_SUBJECT: &str = "General Studies";
pub const UPLOAD_FALLBACK_ERROR: &str = "Upload failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl SelectedFile {
    /// Stat a local file. Directories are rejected.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            size: meta.len(),
            path: path.to_path_buf(),
        })
    }

    pub fn size_label(&self) -> String {
        format_file_size(self.size)
    }
}

/// `N bytes`, `N.N KB` or `N.N MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// A blank subject falls back to the configured default.
pub fn resolve_subject(input: &str, default: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn acknowledgement(processed: usize) -> String {
    format!("Great! I've processed {processed} file(s). What would you like to know about them?")
}

pub fn success_banner(processed: usize) -> String {
    format!("Successfully processed {processed} file(s)")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Success { processed: usize },
    Error(String),
}

#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub id: u64,
    /// Session the batch was submitted for.
    pub session_id: String,
    pub files: Vec<SelectedFile>,
    pub subject: String,
    pub status: UploadStatus,
    cleanup_at: Option<Instant>,
}

impl UploadBatch {
    pub fn new(id: u64, session_id: String, files: Vec<SelectedFile>, subject: String) -> Self {
        Self {
            id,
            session_id,
            files,
            subject,
            status: UploadStatus::Pending,
            cleanup_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == UploadStatus::Pending
    }

    /// Record the outcome and arm the cleanup timer.
    pub fn settle(&mut self, status: UploadStatus, now: Instant, cleanup_delay: Duration) {
        self.status = status;
        self.cleanup_at = Some(now + cleanup_delay);
    }

    pub fn cleanup_due(&self, now: Instant) -> bool {
        self.cleanup_at.is_some_and(|at| now >= at)
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
