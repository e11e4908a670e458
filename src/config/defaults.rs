pub(crate) fn default_palette() -> Vec<String> {
    [
        "#5B1094", "#00681C", "#790619", "#CC0060", "#008391", "#001866", "#C88900", "#009486",
        "#935A10", "#9D2E2C",
    ]
    .iter()
    .map(|color| color.to_string())
    .collect()
}

pub(crate) fn default_short_text_chars() -> usize {
    180
}

pub(crate) fn default_short_text_cut() -> usize {
    150
}

pub(crate) fn default_per_entry_height() -> f32 {
    10.0
}

pub(crate) fn default_viewport_top_inset() -> f32 {
    40.0
}

pub(crate) fn default_panel_offset() -> f32 {
    120.0
}

pub(crate) fn default_debounce_ms() -> u64 {
    250
}

pub(crate) fn default_filter() -> String {
    "all".to_string()
}

pub(crate) fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_persist_cache() -> bool {
    false
}

pub(crate) fn default_library_path() -> String {
    "conf/library.toml".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}
