//! Deferred images and the one-shot activation path.

use crate::host::ElementId;

#[derive(Debug, Clone, PartialEq)]
pub struct DeferredImage {
    pub element: ElementId,
    pub pending_src: String,
    pub loaded: bool,
}

impl DeferredImage {
    pub fn new(element: ElementId, pending_src: impl Into<String>) -> Self {
        Self {
            element,
            pending_src: pending_src.into(),
            loaded: false,
        }
    }
}

/// Source swap to perform for an image that just became visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub element: ElementId,
    pub src: String,
}

/// Lazy image loading, decided once at bootstrap from the host's
/// visibility-notification capability.
#[derive(Debug, Clone)]
pub enum LazyImageLoader {
    /// Host delivers visibility notifications for the tracked images.
    Observing { images: Vec<DeferredImage> },
    /// No notifications available; images stay pending for good.
    Disabled { images: Vec<DeferredImage> },
}

impl LazyImageLoader {
    pub fn is_enabled(&self) -> bool {
        matches!(self, LazyImageLoader::Observing { .. })
    }

    pub fn images(&self) -> &[DeferredImage] {
        match self {
            LazyImageLoader::Observing { images } | LazyImageLoader::Disabled { images } => images,
        }
    }

    /// Mark `element` as loaded. Returns the source swap the first time only;
    /// unknown, already-loaded, or disabled images yield `None`.
    pub fn activate(&mut self, element: &ElementId) -> Option<Activation> {
        let LazyImageLoader::Observing { images } = self else {
            return None;
        };
        let image = images
            .iter_mut()
            .find(|image| &image.element == element && !image.loaded)?;
        image.loaded = true;
        Some(Activation {
            element: image.element.clone(),
            src: image.pending_src.clone(),
        })
    }
}
