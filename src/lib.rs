//! Viewport-driven UI state engine.
//!
//! Keeps a page's navigation highlight, scroll-to-top control and deferred
//! images consistent with the scroll position:
//! - [`engine`] holds the state and reduces host notifications into effects.
//! - [`host`] is the boundary the engine reads geometry from and writes to.
//! - [`debounce`] rate-limits repeated notifications.
//! - [`page`] and [`runner`] replay scripted page sessions for the CLI.

pub mod cancellation;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod host;
pub mod page;
pub mod runner;
