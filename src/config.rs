//! Process configuration, read once from the environment at startup.
//!
//! - `GRADEBOOK_WORKSPACE`: workspace directory to open before the first request
//! - `GRADEBOOK_LOCALE`: `id` (default) or `en`
//!
//! Log filtering is left to `RUST_LOG`.

use std::path::PathBuf;

use crate::messages::Locale;

pub const WORKSPACE_ENV: &str = "GRADEBOOK_WORKSPACE";
pub const LOCALE_ENV: &str = "GRADEBOOK_LOCALE";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub workspace: Option<PathBuf>,
    pub locale: Locale,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let workspace = lookup(WORKSPACE_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        let locale = match lookup(LOCALE_ENV) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to default locale");
                Locale::default()
            }),
            None => Locale::default(),
        };
        Self { workspace, locale }
    }
}
