use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use color_eyre::Result;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::ModalEvent;
use super::props::Props;
use crate::ui::Component;

/// Content hosted inside the modal surface.
///
/// Keys reach the dialog through [`Component::handle_key`]. Producing an
/// outcome means the dialog is done and the surface should close.
///
/// The lifecycle hooks are invoked by the session, never by the host:
/// `on_ready` once the open animation finished, `on_hide` once the close
/// animation finished. Each fires at most once per mounted instance.
pub trait Dialog: Component<Output = DialogOutcome> {
    /// Preferred content size as `(width, height)` within the surface area.
    fn content_size(&self, area: Rect) -> (u16, u16) {
        (area.width / 2, 7)
    }

    fn title(&self) -> Option<&str> {
        None
    }

    fn on_ready(&mut self) {}

    fn on_hide(&mut self) {}
}

/// How a dialog finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Confirmed,
    Cancelled,
    Dismissed,
}

/// Live dialog owned by the host.
pub type MountedDialog = Rc<RefCell<Box<dyn Dialog>>>;

/// Non-owning back-reference the session keeps to a mounted dialog.
pub type DialogRef = Weak<RefCell<Box<dyn Dialog>>>;

/// Builds a dialog from its props.
pub type DialogFactory = Rc<dyn Fn(&Props) -> Result<Box<dyn Dialog>>>;

pub(crate) type InstanceSlot = Rc<RefCell<Option<DialogRef>>>;

/// Wrap a typed constructor into a [`DialogFactory`].
pub fn dialog_factory<D, F>(build: F) -> DialogFactory
where
    D: Dialog + 'static,
    F: Fn(&Props) -> Result<D> + 'static,
{
    Rc::new(move |props| Ok(Box::new(build(props)?) as Box<dyn Dialog>))
}

/// The dialog most recently requested through `show`.
#[derive(Clone)]
pub struct DialogDescriptor {
    factory: DialogFactory,
    props: Props,
}

impl DialogDescriptor {
    pub fn new(factory: DialogFactory, props: Props) -> Self {
        Self { factory, props }
    }

    pub const fn factory(&self) -> &DialogFactory {
        &self.factory
    }

    pub const fn props(&self) -> &Props {
        &self.props
    }
}

impl fmt::Debug for DialogDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogDescriptor")
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

/// Hook injected into the props so the session learns about the instance
/// the host created.
///
/// Firing is idempotent: cloned props share the hook and only the first call
/// captures an instance.
#[derive(Clone)]
pub struct InitHook {
    inner: Rc<HookInner>,
}

struct HookInner {
    generation: u64,
    slot: InstanceSlot,
    events: UnboundedSender<ModalEvent>,
    fired: Cell<bool>,
}

impl InitHook {
    pub(crate) fn new(
        generation: u64,
        slot: InstanceSlot,
        events: UnboundedSender<ModalEvent>,
    ) -> Self {
        Self {
            inner: Rc::new(HookInner {
                generation,
                slot,
                events,
                fired: Cell::new(false),
            }),
        }
    }

    pub fn fire(&self, instance: &MountedDialog) {
        if self.inner.fired.replace(true) {
            return;
        }
        *self.inner.slot.borrow_mut() = Some(Rc::downgrade(instance));
        let event = ModalEvent::Mounted {
            generation: self.inner.generation,
        };
        if self.inner.events.send(event).is_err() {
            debug!("Modal session is gone, dropping mount notification");
        }
    }
}
