use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::ModalEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// One-shot timer that reports [`ModalEvent::CloseTimerElapsed`] after a delay.
///
/// Dropping or cancelling the handle stops the timer. A timer that already
/// delivered its event cannot be recalled; receivers compare the [`TimerId`].
#[derive(Debug)]
pub struct DeferredTimer {
    id: TimerId,
    cancellation_token: CancellationToken,
}

impl DeferredTimer {
    /// Spawn the timer on the current tokio runtime.
    pub fn arm(id: TimerId, delay: Duration, events: UnboundedSender<ModalEvent>) -> Self {
        let cancellation_token = CancellationToken::new();
        let cancelled = cancellation_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancelled.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let _ = events.send(ModalEvent::CloseTimerElapsed(id));
                }
            }
        });
        Self {
            id,
            cancellation_token,
        }
    }

    pub const fn id(&self) -> TimerId {
        self.id
    }

    pub fn cancel(self) {
        self.cancellation_token.cancel();
    }
}

impl Drop for DeferredTimer {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn test_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = DeferredTimer::arm(TimerId(3), Duration::from_millis(5), tx);

        assert_eq!(
            rx.recv().await,
            Some(ModalEvent::CloseTimerElapsed(TimerId(3)))
        );
    }

    #[tokio::test]
    async fn test_cancelled_timer_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = DeferredTimer::arm(TimerId(1), Duration::ZERO, tx);
        timer.cancel();

        // The task exits and drops the only sender.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        drop(DeferredTimer::arm(TimerId(1), Duration::ZERO, tx));

        assert_eq!(rx.recv().await, None);
    }
}
