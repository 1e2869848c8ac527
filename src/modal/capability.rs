use std::fmt;
use std::time::Duration;

use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::ModalEvent;
use super::dialog::DialogFactory;
use super::props::Props;

/// Stable identifier of the single modal surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a click on the surface landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The surface itself, outside of the dialog content.
    SurfaceRoot,
    /// Anything inside the dialog content.
    Descendant,
}

/// Mounts dialogs into the surface.
///
/// The host owns the mounted instance. It reports the instance back to the
/// session by firing the [`InitHook`](super::InitHook) found in the props.
pub trait DialogHost {
    /// Instantiate the dialog, replacing whatever was mounted before.
    ///
    /// Factory errors are returned unchanged.
    fn mount(&mut self, factory: &DialogFactory, props: Props) -> Result<()>;

    /// Drop the mounted dialog, if any.
    fn unmount(&mut self);

    /// Ask the rendering layer to redraw the surface.
    fn request_render(&mut self);

    /// Toggle the host's "modal open" visual state.
    fn set_modal_open(&mut self, open: bool);
}

/// Shows and hides the surface chrome with animations.
///
/// Implementations must invoke `on_close` exactly once per open/close pair,
/// after any close animation completed.
pub trait OverlayController {
    fn open(&mut self, surface: &SurfaceId, options: OverlayOptions);

    fn close(&mut self, surface: &SurfaceId);

    /// Advance running animations.
    fn tick(&mut self, delta: Duration) {
        _ = delta;
    }
}

/// Options passed to [`OverlayController::open`].
#[derive(Debug, Clone)]
pub struct OverlayOptions {
    pub await_open_animation: bool,
    pub await_close_animation: bool,
    /// Keep input focus away from the surface until it is fully shown.
    pub disable_focus: bool,
    pub callbacks: OverlayCallbacks,
}

/// Completion callbacks for one open/close cycle.
#[derive(Debug, Clone)]
pub struct OverlayCallbacks {
    generation: u64,
    events: UnboundedSender<ModalEvent>,
}

impl OverlayCallbacks {
    pub(crate) const fn new(generation: u64, events: UnboundedSender<ModalEvent>) -> Self {
        Self { generation, events }
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn on_show(&self) {
        self.emit(ModalEvent::Shown {
            generation: self.generation,
        });
    }

    pub fn on_open_animation_end(&self) {
        self.emit(ModalEvent::OpenAnimationEnd {
            generation: self.generation,
        });
    }

    pub fn on_close(&self) {
        self.emit(ModalEvent::Closed {
            generation: self.generation,
        });
    }

    fn emit(&self, event: ModalEvent) {
        if self.events.send(event).is_err() {
            debug!(?event, "Modal session is gone, dropping overlay callback");
        }
    }
}
