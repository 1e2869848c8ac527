use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::ModalConfig;
use crate::modal::{OverlayCallbacks, OverlayController, OverlayOptions, SurfaceId};

/// Easing curve applied to linear animation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Fast start, slow end. Used on entry.
    EaseOut,
    /// Slow start, fast end. Used on exit.
    EaseIn,
}

impl Easing {
    /// Map progress in `[0, 1]` onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::EaseOut => 1.0 - (1.0 - t).powi(3),
            Self::EaseIn => t.powi(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    #[default]
    Hidden,
    Opening,
    Shown,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayTimings {
    pub open: Duration,
    pub close: Duration,
}

impl OverlayTimings {
    pub const fn from_config(config: &ModalConfig) -> Self {
        Self {
            open: config.open_animation(),
            close: config.close_animation(),
        }
    }
}

impl Default for OverlayTimings {
    fn default() -> Self {
        Self::from_config(&ModalConfig::default())
    }
}

struct SurfaceAnimation {
    phase: OverlayPhase,
    /// Linear progress towards fully shown.
    progress: f64,
    await_close: bool,
    disable_focus: bool,
    callbacks: OverlayCallbacks,
}

/// Overlay controller driven by [`OverlayController::tick`].
///
/// Every `open` is paired with exactly one `on_close` of the same callbacks:
/// reopening a surface that is still closing completes the old cycle first.
pub struct AnimatedOverlay {
    timings: OverlayTimings,
    surfaces: HashMap<SurfaceId, SurfaceAnimation>,
}

impl AnimatedOverlay {
    pub fn new(timings: OverlayTimings) -> Self {
        Self {
            timings,
            surfaces: HashMap::new(),
        }
    }

    pub fn phase(&self, surface: &SurfaceId) -> OverlayPhase {
        self.surfaces
            .get(surface)
            .map_or(OverlayPhase::Hidden, |animation| animation.phase)
    }

    /// Eased visibility in `[0, 1]` used to scale the rendered surface.
    pub fn visibility(&self, surface: &SurfaceId) -> f64 {
        let Some(animation) = self.surfaces.get(surface) else {
            return 0.0;
        };
        match animation.phase {
            OverlayPhase::Hidden => 0.0,
            OverlayPhase::Opening => Easing::EaseOut.apply(animation.progress),
            OverlayPhase::Shown => 1.0,
            OverlayPhase::Closing => 1.0 - Easing::EaseIn.apply(1.0 - animation.progress),
        }
    }

    /// Whether keys should reach the surface content.
    pub fn accepts_input(&self, surface: &SurfaceId) -> bool {
        match self.phase(surface) {
            OverlayPhase::Shown => true,
            OverlayPhase::Opening => self
                .surfaces
                .get(surface)
                .is_some_and(|animation| !animation.disable_focus),
            OverlayPhase::Hidden | OverlayPhase::Closing => false,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.surfaces.values().any(|animation| {
            matches!(
                animation.phase,
                OverlayPhase::Opening | OverlayPhase::Closing
            )
        })
    }
}

impl Default for AnimatedOverlay {
    fn default() -> Self {
        Self::new(OverlayTimings::default())
    }
}

impl OverlayController for AnimatedOverlay {
    fn open(&mut self, surface: &SurfaceId, options: OverlayOptions) {
        let OverlayOptions {
            await_open_animation,
            await_close_animation,
            disable_focus,
            callbacks,
        } = options;

        let (previous_phase, mut progress) = match self.surfaces.remove(surface) {
            Some(previous) => {
                if previous.phase == OverlayPhase::Closing {
                    debug!(
                        %surface,
                        generation = previous.callbacks.generation(),
                        "Reopened while closing, completing previous cycle"
                    );
                    previous.callbacks.on_close();
                }
                (previous.phase, previous.progress)
            }
            None => (OverlayPhase::Hidden, 0.0),
        };

        callbacks.on_show();
        let phase = if !await_open_animation || previous_phase == OverlayPhase::Shown {
            progress = 1.0;
            callbacks.on_open_animation_end();
            OverlayPhase::Shown
        } else {
            OverlayPhase::Opening
        };
        debug!(%surface, generation = callbacks.generation(), ?phase, "Surface opened");

        self.surfaces.insert(
            surface.clone(),
            SurfaceAnimation {
                phase,
                progress,
                await_close: await_close_animation,
                disable_focus,
                callbacks,
            },
        );
    }

    fn close(&mut self, surface: &SurfaceId) {
        let Some(animation) = self.surfaces.get_mut(surface) else {
            warn!(%surface, "Close requested for a surface that is not open");
            return;
        };
        if !matches!(animation.phase, OverlayPhase::Opening | OverlayPhase::Shown) {
            debug!(%surface, "Surface already closing");
            return;
        }
        if animation.await_close {
            animation.phase = OverlayPhase::Closing;
        } else if let Some(animation) = self.surfaces.remove(surface) {
            animation.callbacks.on_close();
        }
    }

    fn tick(&mut self, delta: Duration) {
        let timings = self.timings;
        let mut finished = Vec::new();

        for (surface, animation) in &mut self.surfaces {
            match animation.phase {
                OverlayPhase::Opening => {
                    animation.progress = (animation.progress + step(delta, timings.open)).min(1.0);
                    if animation.progress >= 1.0 {
                        animation.phase = OverlayPhase::Shown;
                        animation.callbacks.on_open_animation_end();
                    }
                }
                OverlayPhase::Closing => {
                    animation.progress = (animation.progress - step(delta, timings.close)).max(0.0);
                    if animation.progress <= 0.0 {
                        finished.push(surface.clone());
                    }
                }
                OverlayPhase::Hidden | OverlayPhase::Shown => {}
            }
        }

        for surface in finished {
            if let Some(animation) = self.surfaces.remove(&surface) {
                debug!(%surface, generation = animation.callbacks.generation(), "Surface hidden");
                animation.callbacks.on_close();
            }
        }
    }
}

/// Fraction of an animation covered by `delta`. Zero durations complete at once.
fn step(delta: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        1.0
    } else {
        delta.as_secs_f64() / duration.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::modal::ModalEvent;

    fn surface() -> SurfaceId {
        SurfaceId::new("modal")
    }

    fn overlay() -> AnimatedOverlay {
        AnimatedOverlay::new(OverlayTimings {
            open: Duration::from_millis(100),
            close: Duration::from_millis(100),
        })
    }

    fn options(
        generation: u64,
        awaits: bool,
    ) -> (OverlayOptions, UnboundedReceiver<ModalEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let options = OverlayOptions {
            await_open_animation: awaits,
            await_close_animation: awaits,
            disable_focus: true,
            callbacks: OverlayCallbacks::new(generation, tx),
        };
        (options, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<ModalEvent>) -> Vec<ModalEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::EaseOut, Easing::EaseIn] {
            assert!(easing.apply(0.0).abs() < f64::EPSILON);
            assert!((easing.apply(1.0) - 1.0).abs() < f64::EPSILON);
        }
        assert!(Easing::EaseOut.apply(0.5) > 0.5);
        assert!(Easing::EaseIn.apply(0.5) < 0.5);
    }

    #[test]
    fn test_open_animates_then_signals_end() {
        let mut overlay = overlay();
        let (options, mut rx) = options(1, true);

        overlay.open(&surface(), options);
        assert_eq!(drain(&mut rx), [ModalEvent::Shown { generation: 1 }]);
        assert_eq!(overlay.phase(&surface()), OverlayPhase::Opening);
        assert!(!overlay.accepts_input(&surface()));

        overlay.tick(Duration::from_millis(50));
        let halfway = overlay.visibility(&surface());
        assert!(halfway > 0.0 && halfway < 1.0);
        assert!(drain(&mut rx).is_empty());

        overlay.tick(Duration::from_millis(50));
        assert_eq!(
            drain(&mut rx),
            [ModalEvent::OpenAnimationEnd { generation: 1 }]
        );
        assert_eq!(overlay.phase(&surface()), OverlayPhase::Shown);
        assert!(overlay.accepts_input(&surface()));
        assert!(!overlay.is_animating());
    }

    #[test]
    fn test_close_animates_then_signals_close() {
        let mut overlay = overlay();
        let (options, mut rx) = options(1, true);
        overlay.open(&surface(), options);
        overlay.tick(Duration::from_millis(100));
        drain(&mut rx);

        overlay.close(&surface());
        assert_eq!(overlay.phase(&surface()), OverlayPhase::Closing);
        overlay.close(&surface());
        overlay.tick(Duration::from_millis(100));

        assert_eq!(drain(&mut rx), [ModalEvent::Closed { generation: 1 }]);
        assert_eq!(overlay.phase(&surface()), OverlayPhase::Hidden);
        assert!(overlay.visibility(&surface()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_without_animation_completes_immediately() {
        let mut overlay = overlay();
        let (options, mut rx) = options(4, false);

        overlay.open(&surface(), options);
        overlay.close(&surface());

        assert_eq!(
            drain(&mut rx),
            [
                ModalEvent::Shown { generation: 4 },
                ModalEvent::OpenAnimationEnd { generation: 4 },
                ModalEvent::Closed { generation: 4 },
            ]
        );
        assert_eq!(overlay.phase(&surface()), OverlayPhase::Hidden);
    }

    #[test]
    fn test_reopen_while_closing_completes_previous_cycle() {
        let mut overlay = overlay();
        let (first, mut first_rx) = options(1, true);
        overlay.open(&surface(), first);
        overlay.tick(Duration::from_millis(100));
        overlay.close(&surface());
        overlay.tick(Duration::from_millis(50));
        drain(&mut first_rx);

        let (second, mut second_rx) = options(2, true);
        overlay.open(&surface(), second);

        assert_eq!(drain(&mut first_rx), [ModalEvent::Closed { generation: 1 }]);
        assert_eq!(drain(&mut second_rx), [ModalEvent::Shown { generation: 2 }]);
        assert_eq!(overlay.phase(&surface()), OverlayPhase::Opening);
        assert!(overlay.visibility(&surface()) > 0.0);

        overlay.tick(Duration::from_millis(50));
        assert_eq!(
            drain(&mut second_rx),
            [ModalEvent::OpenAnimationEnd { generation: 2 }]
        );
    }

    #[test]
    fn test_reopen_while_shown_signals_end_without_animating() {
        let mut overlay = overlay();
        let (first, _first_rx) = options(1, true);
        overlay.open(&surface(), first);
        overlay.tick(Duration::from_millis(100));

        let (second, mut second_rx) = options(2, true);
        overlay.open(&surface(), second);

        assert_eq!(
            drain(&mut second_rx),
            [
                ModalEvent::Shown { generation: 2 },
                ModalEvent::OpenAnimationEnd { generation: 2 },
            ]
        );
        assert_eq!(overlay.phase(&surface()), OverlayPhase::Shown);
    }

    #[test]
    fn test_close_unknown_surface_is_ignored() {
        let mut overlay = overlay();
        overlay.close(&SurfaceId::new("missing"));
        assert_eq!(
            overlay.phase(&SurfaceId::new("missing")),
            OverlayPhase::Hidden
        );
    }

    #[test]
    fn test_focus_allowed_while_opening_when_not_disabled() {
        let mut overlay = overlay();
        let (mut options, _rx) = options(1, true);
        options.disable_focus = false;

        overlay.open(&surface(), options);

        assert_eq!(overlay.phase(&surface()), OverlayPhase::Opening);
        assert!(overlay.accepts_input(&surface()));
    }
}
