//! Settings infrastructure for polydoc.
//!
//! This module provides support for loading and parsing polydoc.toml files
//! to configure virtual-document generation and refresh behavior.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

/// Root settings structure loaded from polydoc.toml.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Settings {
    /// Virtual-document generation configuration.
    #[serde(default)]
    pub generation: GenerationSettings,

    /// Refresh behavior configuration.
    #[serde(default)]
    pub refresh: RefreshSettings,
}

/// Settings for virtual-document generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    /// Style language assumed when a style block has no `lang` attribute.
    #[serde(default = "default_style_lang")]
    pub default_style_lang: String,

    /// Extension for generated script-side virtual documents.
    #[serde(default = "default_script_lang")]
    pub script_lang: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            default_style_lang: default_style_lang(),
            script_lang: default_script_lang(),
        }
    }
}

/// Settings for the refresh loop.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RefreshSettings {
    /// When true, every refresh processes markup updates immediately
    /// instead of deferring them until a markup-aware feature asks.
    #[serde(default)]
    pub eager_markup: bool,
}

fn default_style_lang() -> String {
    "css".to_string()
}

fn default_script_lang() -> String {
    "ts".to_string()
}

/// Load settings from a polydoc.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("failed to parse polydoc.toml: {}", e);
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

/// Discover polydoc.toml by searching up the directory tree, then direct children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// containing the found polydoc.toml. If not found, returns
/// `(Settings::default(), start_dir)`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join("polydoc.toml");
        if candidate.is_file() {
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join("polydoc.toml");
                if candidate.is_file() {
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}
