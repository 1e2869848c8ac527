use std::rc::{Rc, Weak};
use std::time::Duration;

use color_eyre::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use super::ModalEvent;
use super::backdrop::Backdrop;
use super::capability::{
    ClickTarget, DialogHost, OverlayCallbacks, OverlayController, OverlayOptions, SurfaceId,
};
use super::dialog::{DialogDescriptor, DialogFactory, InitHook, InstanceSlot, MountedDialog};
use super::props::Props;
use super::requester::ModalRequest;
use super::timer::{DeferredTimer, TimerId};
use crate::config::ModalConfig;

/// Where the session is in the show/close cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalPhase {
    #[default]
    Closed,
    /// Dialog requested, overlay animating in.
    Opening,
    /// Overlay fully shown.
    Open,
    /// Close requested, debounce timer running, surface still visible.
    ClosingDebounce,
    /// Overlay animating out.
    ClosingAnimation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadySignal {
    /// The open-animation listener is not armed yet.
    Unarmed,
    Armed,
    /// The animation finished before the instance was captured.
    Buffered,
    Delivered,
}

struct ActiveDialog {
    generation: u64,
    descriptor: DialogDescriptor,
    instance: InstanceSlot,
    ready: ReadySignal,
}

impl ActiveDialog {
    fn instance(&self) -> Option<MountedDialog> {
        self.instance.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn deliver_ready(&mut self) {
        if let Some(instance) = self.instance() {
            debug!(generation = self.generation, "Dialog ready");
            instance.borrow_mut().on_ready();
            self.ready = ReadySignal::Delivered;
        } else {
            debug!(
                generation = self.generation,
                "Open animation finished before the dialog mounted, buffering ready"
            );
            self.ready = ReadySignal::Buffered;
        }
    }
}

/// Dialog whose close animation was still running when a new dialog was shown.
///
/// Holds a strong reference because the host already dropped it in favor of
/// the new dialog, yet its `on_hide` is still owed.
struct Retiring {
    generation: u64,
    instance: Option<MountedDialog>,
}

#[derive(Default)]
struct SessionState {
    showing: bool,
    phase: ModalPhase,
    active: Option<ActiveDialog>,
    retiring: Option<Retiring>,
    /// Generation of the overlay cycle last opened.
    overlay_generation: Option<u64>,
    pending_close: Option<DeferredTimer>,
}

/// Owner of the single modal surface.
///
/// Guarantees that at most one dialog is active, that a close followed by a
/// show within the debounce window never tears the surface down, and that
/// `on_ready` / `on_hide` each reach a dialog at most once, after the
/// corresponding animation completed.
pub struct ModalSession<H, O> {
    host: H,
    overlay: O,
    config: ModalConfig,
    surface: SurfaceId,
    backdrop: Backdrop,
    state: SessionState,
    generation: u64,
    timer_seq: u64,
    event_tx: UnboundedSender<ModalEvent>,
    event_rx: UnboundedReceiver<ModalEvent>,
}

impl<H: DialogHost, O: OverlayController> ModalSession<H, O> {
    pub fn new(host: H, overlay: O, config: ModalConfig) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            surface: SurfaceId::new(config.surface_id.clone()),
            host,
            overlay,
            config,
            backdrop: Backdrop::default(),
            state: SessionState::default(),
            generation: 0,
            timer_seq: 0,
            event_tx,
            event_rx,
        }
    }

    /// Whether a dialog is the current target of the surface.
    ///
    /// Flips to `true` as soon as `show` opens the overlay, before any
    /// animation ran, and back to `false` once the close animation completed.
    pub const fn is_showing(&self) -> bool {
        self.state.showing
    }

    pub const fn phase(&self) -> ModalPhase {
        self.state.phase
    }

    pub const fn surface(&self) -> &SurfaceId {
        &self.surface
    }

    pub const fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub const fn host(&self) -> &H {
        &self.host
    }

    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub const fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn active_descriptor(&self) -> Option<&DialogDescriptor> {
        self.state.active.as_ref().map(|active| &active.descriptor)
    }

    pub fn active_instance(&self) -> Option<MountedDialog> {
        self.state.active.as_ref().and_then(ActiveDialog::instance)
    }

    /// Make `factory` + `props` the active dialog and present the surface.
    ///
    /// Cancels a pending close, so a close immediately followed by a show
    /// keeps the surface on screen. Factory errors are returned after the
    /// surface was opened anyway: the descriptor stays active without an
    /// instance and a later `close` tears it down like any other dialog.
    pub fn show(&mut self, factory: DialogFactory, props: Props) -> Result<()> {
        if self.cancel_pending_close() {
            debug!("Show collapsed a pending close");
            self.state.phase = ModalPhase::Opening;
        }
        if self.state.phase == ModalPhase::ClosingAnimation {
            self.retire_closing_dialog();
        }

        self.generation += 1;
        let generation = self.generation;
        let instance = InstanceSlot::default();
        let hook = InitHook::new(generation, Rc::clone(&instance), self.event_tx.clone());
        let descriptor = DialogDescriptor::new(factory, props);
        let mount_props = descriptor.props().clone().with_init_hook(hook);
        let factory = Rc::clone(descriptor.factory());
        self.state.active = Some(ActiveDialog {
            generation,
            descriptor,
            instance,
            ready: ReadySignal::Unarmed,
        });
        info!(generation, surface = %self.surface, "Showing dialog");

        let mounted = self.host.mount(&factory, mount_props);
        if let Err(error) = &mounted {
            warn!(generation, %error, "Dialog failed to mount");
        }
        self.host.request_render();
        self.backdrop.ensure();

        self.state.showing = true;
        self.state.phase = ModalPhase::Opening;
        self.state.overlay_generation = Some(generation);
        self.overlay
            .open(&self.surface, self.overlay_options(generation));

        if let Some(active) = self.state.active.as_mut() {
            active.ready = ReadySignal::Armed;
        }
        mounted
    }

    /// Request the surface to close after the debounce window.
    ///
    /// Ignored unless a dialog is showing or when the close animation is
    /// already running.
    pub fn close(&mut self) {
        if !self.state.showing {
            debug!("Close requested while no dialog is showing");
            return;
        }
        if self.state.phase == ModalPhase::ClosingAnimation {
            debug!("Close requested while already closing");
            return;
        }

        self.cancel_pending_close();
        self.timer_seq += 1;
        let timer = DeferredTimer::arm(
            TimerId(self.timer_seq),
            self.config.close_debounce(),
            self.event_tx.clone(),
        );
        debug!(timer = ?timer.id(), "Close debounce armed");
        self.state.pending_close = Some(timer);
        self.state.phase = ModalPhase::ClosingDebounce;
    }

    /// Clicks on the surface itself close it, clicks inside the dialog don't.
    pub fn handle_click(&mut self, target: ClickTarget) {
        if target == ClickTarget::SurfaceRoot && self.config.close_on_backdrop_click {
            self.close();
        }
    }

    pub fn apply(&mut self, request: ModalRequest) -> Result<()> {
        match request {
            ModalRequest::Show { factory, props } => self.show(factory, props),
            ModalRequest::Close => {
                self.close();
                Ok(())
            }
        }
    }

    /// Advance overlay and backdrop animations.
    pub fn tick(&mut self, delta: Duration) {
        self.overlay.tick(delta);
        self.backdrop.tick(delta);
    }

    pub async fn next_event(&mut self) -> Option<ModalEvent> {
        self.event_rx.recv().await
    }

    /// Handle every event that is already queued. Returns how many were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: ModalEvent) {
        match event {
            ModalEvent::Mounted { generation } => self.on_mounted(generation),
            ModalEvent::Shown { generation } => self.on_overlay_shown(generation),
            ModalEvent::OpenAnimationEnd { generation } => self.on_open_animation_end(generation),
            ModalEvent::Closed { generation } => self.on_overlay_closed(generation),
            ModalEvent::CloseTimerElapsed(id) => self.on_close_timer(id),
        }
    }

    fn overlay_options(&self, generation: u64) -> OverlayOptions {
        OverlayOptions {
            await_open_animation: self.config.await_open_animation,
            await_close_animation: self.config.await_close_animation,
            disable_focus: self.config.disable_focus,
            callbacks: OverlayCallbacks::new(generation, self.event_tx.clone()),
        }
    }

    fn cancel_pending_close(&mut self) -> bool {
        let Some(timer) = self.state.pending_close.take() else {
            return false;
        };
        debug!(timer = ?timer.id(), "Close debounce cancelled");
        timer.cancel();
        true
    }

    fn retire_closing_dialog(&mut self) {
        let Some(generation) = self.state.overlay_generation else {
            return;
        };
        let instance = self
            .state
            .active
            .take()
            .and_then(|active| active.instance());
        debug!(generation, "Retiring dialog whose close animation is running");

        // Retiring the same cycle twice keeps the instance that is closing.
        if let Some(retiring) = self
            .state
            .retiring
            .as_mut()
            .filter(|retiring| retiring.generation == generation)
        {
            if retiring.instance.is_none() {
                retiring.instance = instance;
            }
            return;
        }

        let retiring = Retiring {
            generation,
            instance,
        };
        if let Some(previous) = self.state.retiring.replace(retiring) {
            warn!(
                generation = previous.generation,
                "Close of a retiring dialog was never reported, hiding it now"
            );
            if let Some(instance) = previous.instance {
                instance.borrow_mut().on_hide();
            }
        }
    }

    fn on_mounted(&mut self, generation: u64) {
        match self.state.active.as_mut() {
            Some(active) if active.generation == generation => {
                if active.ready == ReadySignal::Buffered {
                    active.deliver_ready();
                }
            }
            _ => debug!(generation, "Ignoring mount of a superseded dialog"),
        }
    }

    fn on_overlay_shown(&mut self, generation: u64) {
        if self.state.overlay_generation == Some(generation) {
            self.host.set_modal_open(true);
        } else {
            debug!(generation, "Ignoring show of a superseded overlay cycle");
        }
    }

    fn on_open_animation_end(&mut self, generation: u64) {
        if self.state.overlay_generation != Some(generation) {
            debug!(generation, "Ignoring open animation of a superseded overlay cycle");
            return;
        }
        if self.state.phase == ModalPhase::Opening {
            self.state.phase = ModalPhase::Open;
        }
        if let Some(active) = self.state.active.as_mut()
            && active.generation == generation
            && active.ready == ReadySignal::Armed
        {
            active.deliver_ready();
        }
    }

    fn on_close_timer(&mut self, id: TimerId) {
        if self
            .state
            .pending_close
            .take_if(|timer| timer.id() == id)
            .is_none()
        {
            debug!(timer = ?id, "Ignoring stale close timer");
            return;
        }
        info!(surface = %self.surface, "Closing dialog");
        self.state.phase = ModalPhase::ClosingAnimation;
        self.overlay.close(&self.surface);
    }

    fn on_overlay_closed(&mut self, generation: u64) {
        if let Some(retiring) = self
            .state
            .retiring
            .take_if(|retiring| retiring.generation == generation)
            && let Some(instance) = retiring.instance
        {
            debug!(generation, "Hiding retired dialog");
            instance.borrow_mut().on_hide();
        }

        if self.state.overlay_generation != Some(generation) {
            debug!(generation, "Ignoring close of a superseded overlay cycle");
            return;
        }

        self.cancel_pending_close();
        self.state.overlay_generation = None;
        self.host.set_modal_open(false);
        self.backdrop.fade_out(self.config.backdrop_fade());
        self.cleanup();
        self.state.showing = false;
        self.state.phase = ModalPhase::Closed;
    }

    /// Hide whichever dialog is active now and clear the surface.
    fn cleanup(&mut self) {
        if let Some(active) = self.state.active.take()
            && let Some(instance) = active.instance()
        {
            debug!(generation = active.generation, "Hiding dialog");
            instance.borrow_mut().on_hide();
        }
        self.host.unmount();
        self.host.request_render();
    }
}
