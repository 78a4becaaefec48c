use serde::Deserialize;
use std::time::Duration;

/// Flat engine configuration; the on-disk form is grouped into tables.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct EngineConfig {
    /// How far above a section's top the scroll offset may be while the
    /// section already counts as active.
    #[serde(default = "crate::config::defaults::default_activation_margin_px")]
    pub activation_margin_px: f32,
    /// The scroll-to-top control shows strictly above this offset.
    #[serde(default = "crate::config::defaults::default_scroll_top_threshold_px")]
    pub scroll_top_threshold_px: f32,
    /// Quiet period applied to scroll notifications; `0` disables debouncing.
    #[serde(default = "crate::config::defaults::default_scroll_debounce_ms")]
    pub scroll_debounce_ms: u64,
    #[serde(default = "crate::config::defaults::default_smooth_scroll")]
    pub smooth_scroll: bool,
    #[serde(default = "crate::config::defaults::default_active_class")]
    pub active_class: String,
    #[serde(default = "crate::config::defaults::default_scroll_top_visible_class")]
    pub scroll_top_visible_class: String,
    /// Forces the lazy image loader off even when the host can observe.
    #[serde(default = "crate::config::defaults::default_lazy_loading")]
    pub lazy_loading: bool,
    #[serde(default = "crate::config::defaults::default_lazy_class")]
    pub lazy_class: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            activation_margin_px: crate::config::defaults::default_activation_margin_px(),
            scroll_top_threshold_px: crate::config::defaults::default_scroll_top_threshold_px(),
            scroll_debounce_ms: crate::config::defaults::default_scroll_debounce_ms(),
            smooth_scroll: crate::config::defaults::default_smooth_scroll(),
            active_class: crate::config::defaults::default_active_class(),
            scroll_top_visible_class: crate::config::defaults::default_scroll_top_visible_class(),
            lazy_loading: crate::config::defaults::default_lazy_loading(),
            lazy_class: crate::config::defaults::default_lazy_class(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl EngineConfig {
    /// `None` when scroll notifications should be handled immediately.
    pub fn scroll_debounce(&self) -> Option<Duration> {
        (self.scroll_debounce_ms > 0).then(|| Duration::from_millis(self.scroll_debounce_ms))
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
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
