//! Display theme preference. Two values, persisted independently of any session.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::store::KeyValueStore;

pub const THEME_KEY: &str = "theme";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Theme> {
        match value.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    /// Read the persisted preference. Anything unrecognised means the default.
    pub fn restore(store: &dyn KeyValueStore) -> Theme {
        store
            .get(THEME_KEY)
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default()
    }

    pub fn persist(self, store: &mut dyn KeyValueStore) {
        if let Err(e) = store.set(THEME_KEY, self.as_str()) {
            warn!("Failed to persist theme: {}", e);
        }
    }
}
