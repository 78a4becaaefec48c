//! Page descriptions and the in-memory host that replays them.
//!
//! A page file is a small TOML document listing sections, nav links, deferred
//! images and a timed script of user actions. [`SimulatedPage`] implements
//! [`Host`] on top of it: it tracks classes and attributes per element,
//! intersects observed images with the viewport, and queues the scroll and
//! visibility notifications a browser would deliver.

use crate::engine::{Notification, Section, SectionId};
use crate::host::{DeferredImageElement, ElementId, Host, NavLinkElement};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace};

pub const SCROLL_TOP_CONTROL_ID: &str = "scroll-to-top";

#[derive(Debug, Clone, Deserialize)]
pub struct PageFixture {
    pub viewport_height: f32,
    #[serde(default = "default_true")]
    pub supports_visibility: bool,
    #[serde(default = "default_true")]
    pub scroll_top_control: bool,
    #[serde(default)]
    pub initial_offset: f32,
    #[serde(default, rename = "section")]
    pub sections: Vec<Section>,
    #[serde(default, rename = "nav_link")]
    pub nav_links: Vec<NavLinkFixture>,
    #[serde(default, rename = "image")]
    pub images: Vec<ImageFixture>,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavLinkFixture {
    pub id: String,
    pub href: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageFixture {
    pub id: String,
    pub offset: f32,
    #[serde(default = "default_image_height")]
    pub height: f32,
    pub data_src: String,
}

/// One timed user action, `at_ms` after the replay starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    Scroll { at_ms: u64, offset: f32 },
    ScrollToTop { at_ms: u64 },
    Relayout { at_ms: u64, sections: Vec<Section> },
}

impl ScriptStep {
    pub fn at_ms(&self) -> u64 {
        match self {
            ScriptStep::Scroll { at_ms, .. }
            | ScriptStep::ScrollToTop { at_ms }
            | ScriptStep::Relayout { at_ms, .. } => *at_ms,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_image_height() -> f32 {
    240.0
}

/// Load a page description from disk.
pub fn load_page(path: &Path) -> Result<PageFixture> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read page description at {}", path.display()))?;
    let page = parse_page(&data)
        .with_context(|| format!("Invalid page description at {}", path.display()))?;
    info!(
        path = %path.display(),
        sections = page.sections.len(),
        links = page.nav_links.len(),
        images = page.images.len(),
        steps = page.script.len(),
        "Loaded page description"
    );
    Ok(page)
}

pub fn parse_page(data: &str) -> Result<PageFixture> {
    let page: PageFixture = toml::from_str(data).context("Failed to parse page TOML")?;
    if !page.viewport_height.is_finite() || page.viewport_height <= 0.0 {
        anyhow::bail!("viewport_height must be positive, got {}", page.viewport_height);
    }
    Ok(page)
}

#[derive(Debug, Clone, Default)]
struct ElementState {
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct ImageGeometry {
    element: ElementId,
    offset: f32,
    height: f32,
    data_src: String,
}

/// In-memory document implementing [`Host`].
#[derive(Debug, Clone)]
pub struct SimulatedPage {
    viewport_height: f32,
    scroll_offset: f32,
    supports_visibility: bool,
    mountable_control: bool,
    sections: Vec<Section>,
    links: Vec<NavLinkElement>,
    images: Vec<ImageGeometry>,
    elements: BTreeMap<ElementId, ElementState>,
    /// Observed images and whether they intersected at the last check.
    observed: BTreeMap<ElementId, bool>,
    pending_visibility: Vec<Notification>,
    pending_scroll: bool,
    scroll_requests: Vec<(f32, bool)>,
    mutations: usize,
}

impl SimulatedPage {
    pub fn from_fixture(fixture: &PageFixture) -> Self {
        let mut elements = BTreeMap::new();
        let links = fixture
            .nav_links
            .iter()
            .map(|link| {
                let element = ElementId::new(&link.id);
                elements.insert(element.clone(), ElementState::default());
                NavLinkElement {
                    element,
                    href: link.href.clone(),
                }
            })
            .collect();
        let images = fixture
            .images
            .iter()
            .map(|image| {
                let element = ElementId::new(&image.id);
                let mut state = ElementState::default();
                state.classes.insert("lazy".to_string());
                state
                    .attributes
                    .insert("data-src".to_string(), image.data_src.clone());
                elements.insert(element.clone(), state);
                ImageGeometry {
                    element,
                    offset: image.offset,
                    height: image.height.max(0.0),
                    data_src: image.data_src.clone(),
                }
            })
            .collect();

        Self {
            viewport_height: fixture.viewport_height,
            scroll_offset: fixture.initial_offset.max(0.0),
            supports_visibility: fixture.supports_visibility,
            mountable_control: fixture.scroll_top_control,
            sections: fixture.sections.clone(),
            links,
            images,
            elements,
            observed: BTreeMap::new(),
            pending_visibility: Vec::new(),
            pending_scroll: false,
            scroll_requests: Vec::new(),
            mutations: 0,
        }
    }

    /// The user moved the viewport.
    pub fn user_scroll(&mut self, offset: f32) {
        self.move_viewport(offset);
    }

    /// Sections moved; the engine only learns about it on the next scan.
    pub fn relayout(&mut self, sections: Vec<Section>) {
        debug!(sections = sections.len(), "Document layout changed");
        self.sections = sections;
    }

    /// Visibility notifications queued since the last call.
    pub fn take_visibility_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending_visibility)
    }

    /// The offset of the scroll event queued since the last call, if any.
    pub fn take_scroll_event(&mut self) -> Option<f32> {
        std::mem::take(&mut self.pending_scroll).then_some(self.scroll_offset)
    }

    pub fn has_class(&self, element: &ElementId, class: &str) -> bool {
        self.elements
            .get(element)
            .is_some_and(|state| state.classes.contains(class))
    }

    pub fn attribute(&self, element: &ElementId, name: &str) -> Option<&str> {
        self.elements
            .get(element)
            .and_then(|state| state.attributes.get(name))
            .map(String::as_str)
    }

    pub fn is_observed(&self, element: &ElementId) -> bool {
        self.observed.contains_key(element)
    }

    pub fn scroll_requests(&self) -> &[(f32, bool)] {
        &self.scroll_requests
    }

    pub fn mutations(&self) -> usize {
        self.mutations
    }

    fn move_viewport(&mut self, offset: f32) {
        let offset = if offset.is_finite() { offset.max(0.0) } else { 0.0 };
        trace!(offset, "Viewport moved");
        self.scroll_offset = offset;
        self.pending_scroll = true;
        self.refresh_intersections();
    }

    fn intersects(&self, image: &ImageGeometry) -> bool {
        let top = self.scroll_offset;
        let bottom = top + self.viewport_height;
        image.offset < bottom && image.offset + image.height.max(1.0) > top
    }

    fn refresh_intersections(&mut self) {
        let mut changes = Vec::new();
        for image in &self.images {
            let Some(was) = self.observed.get(&image.element) else {
                continue;
            };
            let now = self.intersects(image);
            if now != *was {
                changes.push((image.element.clone(), now));
            }
        }
        for (element, entered) in changes {
            self.observed.insert(element.clone(), entered);
            self.pending_visibility.push(Notification::VisibilityChanged {
                image: element,
                entered,
            });
        }
    }
}

impl Host for SimulatedPage {
    fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    fn section_ids(&self) -> Vec<SectionId> {
        self.sections.iter().map(|section| section.id.clone()).collect()
    }

    fn element_offset(&self, section: &SectionId) -> Option<f32> {
        self.sections
            .iter()
            .find(|candidate| &candidate.id == section)
            .map(|candidate| candidate.offset)
    }

    fn nav_links(&self) -> Vec<NavLinkElement> {
        self.links.clone()
    }

    fn deferred_images(&self) -> Vec<DeferredImageElement> {
        self.images
            .iter()
            .map(|image| DeferredImageElement {
                element: image.element.clone(),
                data_src: image.data_src.clone(),
            })
            .collect()
    }

    fn supports_visibility(&self) -> bool {
        self.supports_visibility
    }

    fn observe(&mut self, element: &ElementId) -> bool {
        if !self.supports_visibility {
            return false;
        }
        let Some(image) = self.images.iter().find(|image| &image.element == element) else {
            return false;
        };
        // Observers report the initial state right after subscribing.
        let visible = self.intersects(image);
        self.observed.insert(element.clone(), visible);
        if visible {
            self.pending_visibility.push(Notification::VisibilityChanged {
                image: element.clone(),
                entered: true,
            });
        }
        true
    }

    fn unobserve(&mut self, element: &ElementId) {
        self.observed.remove(element);
        self.pending_visibility.retain(|notification| {
            !matches!(notification, Notification::VisibilityChanged { image, .. } if image == element)
        });
    }

    fn set_class(&mut self, element: &ElementId, class: &str, enabled: bool) -> bool {
        let Some(state) = self.elements.get_mut(element) else {
            return false;
        };
        if enabled {
            state.classes.insert(class.to_string());
        } else {
            state.classes.remove(class);
        }
        self.mutations += 1;
        true
    }

    fn set_attribute(&mut self, element: &ElementId, name: &str, value: &str) -> bool {
        let Some(state) = self.elements.get_mut(element) else {
            return false;
        };
        state.attributes.insert(name.to_string(), value.to_string());
        self.mutations += 1;
        true
    }

    fn mount_scroll_top_control(&mut self) -> Option<ElementId> {
        if !self.mountable_control {
            return None;
        }
        let element = ElementId::new(SCROLL_TOP_CONTROL_ID);
        self.elements.entry(element.clone()).or_default();
        Some(element)
    }

    fn scroll_to(&mut self, offset: f32, smooth: bool) {
        self.scroll_requests.push((offset, smooth));
        // Smooth scrolling is settled immediately; the end position is all
        // the engine observes.
        self.move_viewport(offset);
    }
}
