//! Boundary between the engine and the page that hosts it.
//!
//! The engine never touches the document directly. It asks the host for
//! geometry during bootstrap, and every change it wants is expressed as an
//! [`Effect`] that [`apply_effect`] turns into host mutations.

use crate::config::EngineConfig;
use crate::engine::{Effect, SectionId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Handle to a document element (link, image, control).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavLinkElement {
    pub element: ElementId,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeferredImageElement {
    pub element: ElementId,
    pub data_src: String,
}

/// What the engine consumes from the page.
///
/// Mutators return `false` when the element does not exist so callers can
/// skip it instead of failing.
pub trait Host {
    /// Current scroll offset in pixels from the document top.
    fn scroll_offset(&self) -> f32;

    /// Section identifiers in document order.
    fn section_ids(&self) -> Vec<SectionId>;

    /// Top offset of a section, or `None` when it is not in the document.
    fn element_offset(&self, section: &SectionId) -> Option<f32>;

    fn nav_links(&self) -> Vec<NavLinkElement>;

    fn deferred_images(&self) -> Vec<DeferredImageElement>;

    /// Whether visibility notifications can be requested at all.
    fn supports_visibility(&self) -> bool;

    fn observe(&mut self, element: &ElementId) -> bool;

    fn unobserve(&mut self, element: &ElementId);

    fn set_class(&mut self, element: &ElementId, class: &str, enabled: bool) -> bool;

    fn set_attribute(&mut self, element: &ElementId, name: &str, value: &str) -> bool;

    /// Create the floating scroll-to-top control; `None` when it cannot be
    /// placed.
    fn mount_scroll_top_control(&mut self) -> Option<ElementId>;

    fn scroll_to(&mut self, offset: f32, smooth: bool);
}

/// Perform `effect` against the host. Returns `false` if the target element
/// was missing and the mutation was skipped.
pub fn apply_effect<H: Host + ?Sized>(host: &mut H, config: &EngineConfig, effect: &Effect) -> bool {
    trace!(?effect, "Applying effect");
    let applied = match effect {
        Effect::SetLinkActive { link, active } => {
            host.set_class(link, &config.active_class, *active)
        }
        Effect::SetScrollTopVisible { control, visible } => {
            host.set_class(control, &config.scroll_top_visible_class, *visible)
        }
        Effect::ActivateImage { image, src } => {
            host.set_attribute(image, "src", src) && host.set_class(image, &config.lazy_class, false)
        }
        Effect::Unobserve { image } => {
            host.unobserve(image);
            true
        }
        Effect::ScrollTo { offset, smooth } => {
            host.scroll_to(*offset, *smooth);
            true
        }
    };
    if !applied {
        debug!(?effect, "Effect target missing from document; skipped");
    }
    applied
}

/// Apply effects in order; returns how many reached the document.
pub fn apply_effects<H: Host + ?Sized>(
    host: &mut H,
    config: &EngineConfig,
    effects: &[Effect],
) -> usize {
    effects
        .iter()
        .filter(|effect| apply_effect(host, config, effect))
        .count()
}
