use super::defaults;
use super::models::{EngineConfig, LogLevel};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    scroll: ScrollConfig,
    #[serde(default)]
    nav: NavConfig,
    #[serde(default)]
    images: ImagesConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for EngineConfig {
    fn from(tables: ConfigTables) -> Self {
        EngineConfig {
            activation_margin_px: tables.nav.activation_margin_px,
            active_class: tables.nav.active_class,
            scroll_top_threshold_px: tables.scroll.scroll_top_threshold_px,
            scroll_top_visible_class: tables.scroll.scroll_top_visible_class,
            scroll_debounce_ms: tables.scroll.scroll_debounce_ms,
            smooth_scroll: tables.scroll.smooth_scroll,
            lazy_loading: tables.images.lazy_loading,
            lazy_class: tables.images.lazy_class,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&EngineConfig> for ConfigTables {
    fn from(config: &EngineConfig) -> Self {
        ConfigTables {
            scroll: ScrollConfig {
                scroll_top_threshold_px: config.scroll_top_threshold_px,
                scroll_top_visible_class: config.scroll_top_visible_class.clone(),
                scroll_debounce_ms: config.scroll_debounce_ms,
                smooth_scroll: config.smooth_scroll,
            },
            nav: NavConfig {
                activation_margin_px: config.activation_margin_px,
                active_class: config.active_class.clone(),
            },
            images: ImagesConfig {
                lazy_loading: config.lazy_loading,
                lazy_class: config.lazy_class.clone(),
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ScrollConfig {
    #[serde(default = "defaults::default_scroll_top_threshold_px")]
    scroll_top_threshold_px: f32,
    #[serde(default = "defaults::default_scroll_top_visible_class")]
    scroll_top_visible_class: String,
    #[serde(default = "defaults::default_scroll_debounce_ms")]
    scroll_debounce_ms: u64,
    #[serde(default = "defaults::default_smooth_scroll")]
    smooth_scroll: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        ScrollConfig {
            scroll_top_threshold_px: defaults::default_scroll_top_threshold_px(),
            scroll_top_visible_class: defaults::default_scroll_top_visible_class(),
            scroll_debounce_ms: defaults::default_scroll_debounce_ms(),
            smooth_scroll: defaults::default_smooth_scroll(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct NavConfig {
    #[serde(default = "defaults::default_activation_margin_px")]
    activation_margin_px: f32,
    #[serde(default = "defaults::default_active_class")]
    active_class: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        NavConfig {
            activation_margin_px: defaults::default_activation_margin_px(),
            active_class: defaults::default_active_class(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ImagesConfig {
    #[serde(default = "defaults::default_lazy_loading")]
    lazy_loading: bool,
    #[serde(default = "defaults::default_lazy_class")]
    lazy_class: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        ImagesConfig {
            lazy_loading: defaults::default_lazy_loading(),
            lazy_class: defaults::default_lazy_class(),
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
