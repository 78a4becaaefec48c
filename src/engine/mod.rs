//! The viewport-driven UI state engine.
//!
//! State lives in [`Engine`]; [`Engine::reduce`] turns host notifications into
//! [`Effect`]s without touching the document, and the host applies them.

mod messages;
mod state;
mod update;

pub use messages::Notification;
pub use state::{
    Activation, DeferredImage, Engine, EngineSnapshot, LazyImageLoader, NavHighlight, NavLink,
    ScrollTopControl, Section, SectionId, SectionIndex, Visibility, link_target, resolve_active,
};
pub use update::Effect;
