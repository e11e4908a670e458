use super::defaults;
use super::models::{AppConfig, LogLevel};
use serde::Deserialize;

/// On-disk layout of `config.toml`, grouped by concern.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    appearance: AppearanceConfig,
    #[serde(default)]
    layout: LayoutConfig,
    #[serde(default)]
    sidebar: SidebarConfig,
    #[serde(default)]
    service: ServiceConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            palette: tables.appearance.palette,
            short_text_chars: tables.appearance.short_text_chars,
            short_text_cut: tables.appearance.short_text_cut,
            per_entry_height: tables.layout.per_entry_height,
            viewport_top_inset: tables.layout.viewport_top_inset,
            panel_offset: tables.layout.panel_offset,
            debounce_ms: tables.layout.debounce_ms,
            default_filter: tables.sidebar.default_filter,
            base_url: tables.service.base_url,
            cache_dir: tables.service.cache_dir,
            persist_cache: tables.service.persist_cache,
            library_path: tables.service.library_path,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            appearance: AppearanceConfig {
                palette: config.palette.clone(),
                short_text_chars: config.short_text_chars,
                short_text_cut: config.short_text_cut,
            },
            layout: LayoutConfig {
                per_entry_height: config.per_entry_height,
                viewport_top_inset: config.viewport_top_inset,
                panel_offset: config.panel_offset,
                debounce_ms: config.debounce_ms,
            },
            sidebar: SidebarConfig {
                default_filter: config.default_filter.clone(),
            },
            service: ServiceConfig {
                base_url: config.base_url.clone(),
                cache_dir: config.cache_dir.clone(),
                persist_cache: config.persist_cache,
                library_path: config.library_path.clone(),
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct AppearanceConfig {
    #[serde(default = "defaults::default_palette")]
    palette: Vec<String>,
    #[serde(default = "defaults::default_short_text_chars")]
    short_text_chars: usize,
    #[serde(default = "defaults::default_short_text_cut")]
    short_text_cut: usize,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        AppearanceConfig {
            palette: defaults::default_palette(),
            short_text_chars: defaults::default_short_text_chars(),
            short_text_cut: defaults::default_short_text_cut(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LayoutConfig {
    #[serde(default = "defaults::default_per_entry_height")]
    per_entry_height: f32,
    #[serde(default = "defaults::default_viewport_top_inset")]
    viewport_top_inset: f32,
    #[serde(default = "defaults::default_panel_offset")]
    panel_offset: f32,
    #[serde(default = "defaults::default_debounce_ms")]
    debounce_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            per_entry_height: defaults::default_per_entry_height(),
            viewport_top_inset: defaults::default_viewport_top_inset(),
            panel_offset: defaults::default_panel_offset(),
            debounce_ms: defaults::default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SidebarConfig {
    #[serde(default = "defaults::default_filter")]
    default_filter: String,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        SidebarConfig {
            default_filter: defaults::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ServiceConfig {
    #[serde(default = "defaults::default_base_url")]
    base_url: String,
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
    #[serde(default = "defaults::default_persist_cache")]
    persist_cache: bool,
    #[serde(default = "defaults::default_library_path")]
    library_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: defaults::default_base_url(),
            cache_dir: defaults::default_cache_dir(),
            persist_cache: defaults::default_persist_cache(),
            library_path: defaults::default_library_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
