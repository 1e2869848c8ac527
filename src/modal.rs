//! Exclusive modal dialog session.
//!
//! This module owns the lifecycle of the single modal surface:
//! - [`ModalSession`] - the show/close state machine with close debouncing
//! - [`Dialog`] - the lifecycle capability every hosted dialog implements
//! - [`DialogHost`] / [`OverlayController`] - capabilities injected into the session
//! - [`ModalRequester`] - cloneable handle the rest of the app uses to request dialogs
//!
//! Capability callbacks never call back into the session directly. They are
//! delivered as [`ModalEvent`]s and processed one at a time by
//! [`ModalSession::handle_event`].

mod backdrop;
mod capability;
mod dialog;
mod props;
mod requester;
mod session;
mod timer;

pub use backdrop::Backdrop;
pub use capability::{
    ClickTarget, DialogHost, OverlayCallbacks, OverlayController, OverlayOptions, SurfaceId,
};
pub use dialog::{
    Dialog, DialogDescriptor, DialogFactory, DialogOutcome, InitHook, MountedDialog,
    dialog_factory,
};
pub use props::Props;
pub use requester::{ModalRequest, ModalRequester};
pub use session::{ModalPhase, ModalSession};
pub use timer::TimerId;

/// Notification delivered to the session by its capabilities and timers.
///
/// Every variant produced by a capability carries the generation of the
/// `show` call that armed it, so callbacks belonging to a superseded dialog
/// can be told apart from current ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    /// The host instantiated the dialog and the init hook captured it.
    Mounted { generation: u64 },
    /// The overlay started presenting the surface.
    Shown { generation: u64 },
    /// The open animation of the surface finished.
    OpenAnimationEnd { generation: u64 },
    /// The overlay finished hiding the surface.
    Closed { generation: u64 },
    /// The close debounce timer elapsed.
    CloseTimerElapsed(TimerId),
}
