//! Transient one-line banner (upload results, generation status, session loads).

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    expires_at: Instant,
}

impl Banner {
    pub fn new(kind: BannerKind, text: impl Into<String>, now: Instant, lifetime: Duration) -> Self {
        Self {
            kind,
            text: text.into(),
            expires_at: now + lifetime,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
