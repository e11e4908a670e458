use super::models::AppConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            AppConfig::default()
        }
    }
}

/// Parse the sectioned TOML form into a flat, sanitized [`AppConfig`].
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let tables: ConfigTables = toml::from_str(contents).context("config is not valid TOML")?;
    Ok(AppConfig::from(tables).sanitized())
}

pub fn serialize_config(config: &AppConfig) -> Result<String> {
    toml::to_string(&ConfigTables::from(config)).context("failed to serialize config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse_config("").expect("empty config should parse");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.palette.len(), 10);
        assert_eq!(cfg.debounce_ms, 250);
    }

    #[test]
    fn tables_override_individual_fields() {
        let cfg = parse_config(
            r##"
            [appearance]
            palette = ["#111111", "#222222", "#333333"]

            [layout]
            per_entry_height = 14.0
            debounce_ms = 100

            [sidebar]
            default_filter = "Midrash"

            [logging]
            log_level = "warn"
            "##,
        )
        .expect("config should parse");
        assert_eq!(cfg.palette.len(), 3);
        assert_eq!(cfg.per_entry_height, 14.0);
        assert_eq!(cfg.debounce_ms, 100);
        assert_eq!(cfg.default_filter, "Midrash");
        assert_eq!(cfg.log_level, LogLevel::Warn);
        assert_eq!(cfg.viewport_top_inset, 40.0);
    }

    #[test]
    fn degenerate_values_are_sanitized() {
        let cfg = parse_config(
            r#"
            [appearance]
            palette = []
            short_text_chars = 40

            [layout]
            per_entry_height = -3.0
            "#,
        )
        .expect("config should parse");
        assert_eq!(cfg.palette.len(), 10);
        assert_eq!(cfg.per_entry_height, 10.0);
        assert_eq!(cfg.short_text_cut, 40);
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut cfg = AppConfig::default();
        cfg.base_url = "https://texts.example.org".to_string();
        cfg.persist_cache = true;
        let text = serialize_config(&cfg).expect("config should serialize");
        assert!(text.contains("[service]"));
        let parsed = parse_config(&text).expect("serialized config should parse");
        assert_eq!(parsed, cfg);
    }
}
