pub(crate) fn default_activation_margin_px() -> f32 {
    200.0
}

pub(crate) fn default_scroll_top_threshold_px() -> f32 {
    300.0
}

pub(crate) fn default_scroll_debounce_ms() -> u64 {
    0
}

pub(crate) fn default_smooth_scroll() -> bool {
    true
}

pub(crate) fn default_active_class() -> String {
    "active".to_string()
}

pub(crate) fn default_scroll_top_visible_class() -> String {
    "visible".to_string()
}

pub(crate) fn default_lazy_loading() -> bool {
    true
}

pub(crate) fn default_lazy_class() -> String {
    "lazy".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}
