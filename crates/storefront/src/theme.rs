use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bookstore_core::error::CoreError;
use clap::ValueEnum;
use tokio::sync::RwLock;

use crate::error::StorefrontResult;
use crate::storage::{Storage, THEME_KEY};

/// Color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(CoreError::Validation(format!(
                "Unknown theme '{other}'. Must be one of: light, dark"
            ))),
        }
    }
}

/// The current theme, mirrored to persisted storage.
pub struct ThemeStore {
    storage: Arc<dyn Storage>,
    current: RwLock<Theme>,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            current: RwLock::new(Theme::default()),
        }
    }

    /// Load the persisted preference. Missing or unreadable values fall
    /// back to light.
    pub async fn load(&self) -> Theme {
        let theme = match self.storage.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Ignoring unknown stored theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read theme preference");
                Theme::default()
            }
        };
        *self.current.write().await = theme;
        theme
    }

    pub async fn current(&self) -> Theme {
        *self.current.read().await
    }

    /// Switch to `theme` and persist it.
    pub async fn set(&self, theme: Theme) -> StorefrontResult<()> {
        *self.current.write().await = theme;
        self.storage.set(THEME_KEY, theme.as_str())
    }

    pub async fn toggle(&self) -> StorefrontResult<Theme> {
        let next = self.current().await.toggled();
        self.set(next).await?;
        Ok(next)
    }
}
