//! Terminal implementations of the modal capabilities.
//!
//! - [`AnimatedOverlay`] - tick-driven open/close animations per surface
//! - [`SurfaceHost`] - mounts the active dialog and renders it centered
//! - [`render_backdrop`] - dims everything below the surface

mod animation;
mod surface;

pub use animation::{AnimatedOverlay, OverlayTimings};
pub use surface::{SurfaceHost, render_backdrop};
