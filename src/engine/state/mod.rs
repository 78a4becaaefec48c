mod images;
mod nav;
mod scroll_top;
mod sections;

pub use images::{Activation, DeferredImage, LazyImageLoader};
pub use nav::{NavHighlight, NavLink, link_target};
pub use scroll_top::{ScrollTopControl, Visibility};
pub use sections::{Section, SectionId, SectionIndex, resolve_active};

use super::messages::Notification;
use super::update::Effect;
use crate::config::EngineConfig;
use crate::host::{ElementId, Host};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Viewport-driven UI state for one loaded page.
#[derive(Debug)]
pub struct Engine {
    pub(in crate::engine) config: EngineConfig,
    pub(in crate::engine) sections: SectionIndex,
    pub(in crate::engine) nav: NavHighlight,
    pub(in crate::engine) scroll_top: ScrollTopControl,
    pub(in crate::engine) images: LazyImageLoader,
    pub(in crate::engine) scroll_offset: f32,
    pub(in crate::engine) active_section: Option<SectionId>,
}

/// Serializable view of the engine state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub scroll_offset: f32,
    pub active_section: Option<SectionId>,
    pub active_links: Vec<ElementId>,
    pub scroll_top: Visibility,
    pub lazy_loading: bool,
    pub loaded_images: Vec<ElementId>,
    pub pending_images: Vec<ElementId>,
}

impl Engine {
    /// Build the engine from the host document and sync it to the current
    /// scroll offset. Returns the effects that bring the document in line.
    pub fn bootstrap<H: Host + ?Sized>(host: &mut H, config: EngineConfig) -> (Self, Vec<Effect>) {
        let sections = SectionIndex::scan(&*host);

        let links = host
            .nav_links()
            .into_iter()
            .filter_map(|link| {
                let Some(target) = link_target(&link.href) else {
                    debug!(link = %link.element, href = %link.href, "Nav link has no in-page target; skipping");
                    return None;
                };
                if !sections.contains(&target) {
                    debug!(link = %link.element, section = %target, "Nav link targets a missing section");
                }
                Some(NavLink::new(link.element, target))
            })
            .collect::<Vec<_>>();

        let images = Self::bootstrap_images(host, &config);

        let control = host.mount_scroll_top_control();
        if control.is_none() {
            debug!("Scroll-to-top control could not be mounted; visibility will not be rendered");
        }

        info!(
            sections = sections.len(),
            links = links.len(),
            images = images.images().len(),
            lazy_loading = images.is_enabled(),
            "Viewport engine initialized"
        );

        let mut engine = Engine {
            scroll_top: ScrollTopControl::new(config.scroll_top_threshold_px, control),
            config,
            sections,
            nav: NavHighlight::new(links),
            images,
            scroll_offset: 0.0,
            active_section: None,
        };
        let effects = engine.reduce(Notification::Scrolled {
            offset: host.scroll_offset(),
        });
        (engine, effects)
    }

    fn bootstrap_images<H: Host + ?Sized>(host: &mut H, config: &EngineConfig) -> LazyImageLoader {
        let candidates = host
            .deferred_images()
            .into_iter()
            .map(|image| DeferredImage::new(image.element, image.data_src))
            .collect::<Vec<_>>();

        if !config.lazy_loading {
            info!("Lazy image loading disabled by configuration");
            return LazyImageLoader::Disabled { images: candidates };
        }
        if !host.supports_visibility() {
            warn!(
                pending = candidates.len(),
                "Host cannot deliver visibility notifications; lazy images stay pending"
            );
            return LazyImageLoader::Disabled { images: candidates };
        }

        let images = candidates
            .into_iter()
            .filter(|image| {
                let observed = host.observe(&image.element);
                if !observed {
                    debug!(image = %image.element, "Deferred image missing from document; skipping");
                }
                observed
            })
            .collect();
        LazyImageLoader::Observing { images }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sections(&self) -> &SectionIndex {
        &self.sections
    }

    pub fn nav(&self) -> &NavHighlight {
        &self.nav
    }

    pub fn active_section(&self) -> Option<&SectionId> {
        self.active_section.as_ref()
    }

    pub fn scroll_top(&self) -> &ScrollTopControl {
        &self.scroll_top
    }

    pub fn images(&self) -> &LazyImageLoader {
        &self.images
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let (loaded, pending): (Vec<_>, Vec<_>) =
            self.images.images().iter().partition(|image| image.loaded);
        EngineSnapshot {
            scroll_offset: self.scroll_offset,
            active_section: self.active_section.clone(),
            active_links: self
                .nav
                .links()
                .iter()
                .filter(|link| link.active)
                .map(|link| link.element.clone())
                .collect(),
            scroll_top: self.scroll_top.visibility(),
            lazy_loading: self.images.is_enabled(),
            loaded_images: loaded.into_iter().map(|image| image.element.clone()).collect(),
            pending_images: pending.into_iter().map(|image| image.element.clone()).collect(),
        }
    }
}
