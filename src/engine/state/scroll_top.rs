use crate::host::ElementId;
use serde::Serialize;

/// Visibility of the scroll-to-top control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

impl Visibility {
    /// Visible strictly above the threshold, hidden at or below it.
    pub fn for_offset(offset: f32, threshold: f32) -> Self {
        if offset > threshold {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

/// Two-state machine behind the floating scroll-to-top control.
///
/// `element` is the control the host mounted at bootstrap; without one the
/// state still tracks the offset but nothing is written to the document.
#[derive(Debug, Clone)]
pub struct ScrollTopControl {
    threshold: f32,
    state: Visibility,
    element: Option<ElementId>,
}

impl ScrollTopControl {
    pub fn new(threshold: f32, element: Option<ElementId>) -> Self {
        Self {
            threshold,
            state: Visibility::Hidden,
            element,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.state
    }

    pub fn element(&self) -> Option<&ElementId> {
        self.element.as_ref()
    }

    /// Feed a scroll offset; returns the new state when it changed.
    pub fn update(&mut self, offset: f32) -> Option<Visibility> {
        let next = Visibility::for_offset(offset, self.threshold);
        if next == self.state {
            return None;
        }
        self.state = next;
        Some(next)
    }
}
