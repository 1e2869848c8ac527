use std::time::Duration;

use tracing::debug;

/// Dimming layer painted below the surface.
///
/// Created lazily by the first `show`, faded out and removed after the
/// surface closed. Only the session mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Backdrop {
    #[default]
    Absent,
    Visible,
    FadingOut { elapsed: Duration, duration: Duration },
}

impl Backdrop {
    /// Create the backdrop if absent. A fade in progress is cancelled.
    pub fn ensure(&mut self) {
        match self {
            Self::Absent => debug!("Creating backdrop"),
            Self::FadingOut { .. } => debug!("Reusing fading backdrop"),
            Self::Visible => return,
        }
        *self = Self::Visible;
    }

    pub fn fade_out(&mut self, duration: Duration) {
        if *self == Self::Absent {
            return;
        }
        *self = if duration.is_zero() {
            Self::Absent
        } else {
            Self::FadingOut {
                elapsed: Duration::ZERO,
                duration,
            }
        };
    }

    pub fn tick(&mut self, delta: Duration) {
        if let Self::FadingOut { elapsed, duration } = self {
            *elapsed += delta;
            if *elapsed >= *duration {
                debug!("Removing backdrop");
                *self = Self::Absent;
            }
        }
    }

    pub fn is_present(&self) -> bool {
        *self != Self::Absent
    }

    /// Current opacity in `[0, 1]`.
    pub fn opacity(&self) -> f64 {
        match self {
            Self::Absent => 0.0,
            Self::Visible => 1.0,
            Self::FadingOut { elapsed, duration } => {
                (1.0 - elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
            }
        }
    }
}
