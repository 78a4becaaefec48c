use crate::host::ElementId;
use serde::Serialize;

mod images;
mod reducer;
mod scroll;


/// Describes document mutations that must be performed outside the reducer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    SetLinkActive { link: ElementId, active: bool },
    SetScrollTopVisible { control: ElementId, visible: bool },
    ActivateImage { image: ElementId, src: String },
    Unobserve { image: ElementId },
    ScrollTo { offset: f32, smooth: bool },
}
