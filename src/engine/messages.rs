use super::state::SectionIndex;
use crate::host::ElementId;

/// Notifications delivered by the host's event loop.
#[derive(Debug, Clone)]
pub enum Notification {
    /// The document scrolled; `offset` is pixels from the top.
    Scrolled { offset: f32 },
    /// An observed image crossed the viewport boundary.
    VisibilityChanged { image: ElementId, entered: bool },
    /// The scroll-to-top control was activated.
    ScrollToTopRequested,
    /// Sections were measured again after a layout change.
    SectionsMeasured(SectionIndex),
}
