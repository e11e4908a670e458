use serde::Deserialize;
use std::time::Duration;

/// Flattened reader configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "crate::config::defaults::default_short_text_chars")]
    pub short_text_chars: usize,
    #[serde(default = "crate::config::defaults::default_short_text_cut")]
    pub short_text_cut: usize,
    #[serde(default = "crate::config::defaults::default_per_entry_height")]
    pub per_entry_height: f32,
    #[serde(default = "crate::config::defaults::default_viewport_top_inset")]
    pub viewport_top_inset: f32,
    #[serde(default = "crate::config::defaults::default_panel_offset")]
    pub panel_offset: f32,
    #[serde(default = "crate::config::defaults::default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "crate::config::defaults::default_filter")]
    pub default_filter: String,
    #[serde(default = "crate::config::defaults::default_base_url")]
    pub base_url: String,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_persist_cache")]
    pub persist_cache: bool,
    #[serde(default = "crate::config::defaults::default_library_path")]
    pub library_path: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            palette: crate::config::defaults::default_palette(),
            short_text_chars: crate::config::defaults::default_short_text_chars(),
            short_text_cut: crate::config::defaults::default_short_text_cut(),
            per_entry_height: crate::config::defaults::default_per_entry_height(),
            viewport_top_inset: crate::config::defaults::default_viewport_top_inset(),
            panel_offset: crate::config::defaults::default_panel_offset(),
            debounce_ms: crate::config::defaults::default_debounce_ms(),
            default_filter: crate::config::defaults::default_filter(),
            base_url: crate::config::defaults::default_base_url(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            persist_cache: crate::config::defaults::default_persist_cache(),
            library_path: crate::config::defaults::default_library_path(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Clamp values that would break layout math back into range.
    pub fn sanitized(mut self) -> Self {
        if self.palette.is_empty() {
            self.palette = crate::config::defaults::default_palette();
        }
        if !self.per_entry_height.is_finite() || self.per_entry_height <= 0.0 {
            self.per_entry_height = crate::config::defaults::default_per_entry_height();
        }
        if !self.viewport_top_inset.is_finite() {
            self.viewport_top_inset = crate::config::defaults::default_viewport_top_inset();
        }
        if !self.panel_offset.is_finite() {
            self.panel_offset = crate::config::defaults::default_panel_offset();
        }
        self.short_text_cut = self.short_text_cut.min(self.short_text_chars);
        self
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
