//! Terminal setup and the input/animation event stream.
//!
//! [`Tui`] wraps a ratatui [`Terminal`], switches the terminal into raw mode
//! with mouse capture, and runs a background task that merges crossterm input
//! with a fixed-rate animation clock.

use std::io::Stdout;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::cursor;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, EventStream, KeyCode,
    KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use futures::{FutureExt, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// After this long the event task is aborted.
const ABORT_AFTER: Duration = Duration::from_millis(500);
/// After this long `stop` gives up waiting.
const GIVE_UP_AFTER: Duration = Duration::from_secs(2);

pub type Backend = CrosstermBackend<Stdout>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Init,
    Quit,
    Suspend,
    Error(String),
    /// Animation clock, with the time elapsed since the previous tick.
    Tick(Duration),
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

pub struct Tui {
    terminal: Terminal<Backend>,
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
    event_rx: UnboundedReceiver<Event>,
    event_tx: UnboundedSender<Event>,
    tick_rate: f64,
}

impl Tui {
    /// `tick_rate` is in ticks per second. Animations advance once per tick,
    /// so it is effectively the animation frame rate.
    pub fn new(tick_rate: f64) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(std::io::stdout()))?,
            task: tokio::spawn(async {}),
            cancellation_token: CancellationToken::new(),
            event_rx,
            event_tx,
            tick_rate,
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(
            std::io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        self.start();
        Ok(())
    }

    /// Stop the event task and restore the terminal.
    pub fn exit(&mut self) -> Result<()> {
        self.stop()?;
        if crossterm::terminal::is_raw_mode_enabled()? {
            self.flush()?;
            crossterm::execute!(
                std::io::stdout(),
                DisableMouseCapture,
                LeaveAlternateScreen,
                cursor::Show
            )?;
            crossterm::terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Hand the terminal back to the shell (Ctrl+Z).
    pub fn suspend(&mut self) -> Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.enter()?;
        self.clear()?;
        Ok(())
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    fn start(&mut self) {
        self.cancellation_token.cancel();
        self.cancellation_token = CancellationToken::new();
        self.task = tokio::spawn(Self::event_loop(
            self.event_tx.clone(),
            self.cancellation_token.clone(),
            Duration::from_secs_f64(1.0 / self.tick_rate),
        ));
    }

    fn stop(&self) -> Result<()> {
        self.cancellation_token.cancel();
        let started = Instant::now();
        while !self.task.is_finished() {
            std::thread::sleep(Duration::from_millis(1));
            let waited = started.elapsed();
            if waited >= GIVE_UP_AFTER {
                return Err(eyre!("Terminal event task did not stop"));
            }
            if waited >= ABORT_AFTER {
                self.task.abort();
            }
        }
        Ok(())
    }

    async fn event_loop(
        event_tx: UnboundedSender<Event>,
        cancellation_token: CancellationToken,
        period: Duration,
    ) {
        let mut event_stream = EventStream::new();
        let mut clock = interval(period);
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_tick = tokio::time::Instant::now();

        #[cfg(unix)]
        spawn_sigterm_listener(event_tx.clone());

        if event_tx.send(Event::Init).is_err() {
            return;
        }

        loop {
            let event = tokio::select! {
                () = cancellation_token.cancelled() => break,
                now = clock.tick() => {
                    let elapsed = now.duration_since(last_tick);
                    last_tick = now;
                    Event::Tick(elapsed)
                }
                next = event_stream.next().fuse() => match next {
                    Some(Ok(event)) => match map_terminal_event(event) {
                        Some(event) => event,
                        None => continue,
                    },
                    Some(Err(error)) => Event::Error(error.to_string()),
                    None => break,
                },
            };
            if event_tx.send(event).is_err() {
                break;
            }
        }
        debug!("Terminal event loop stopped");
    }
}

#[cfg(unix)]
fn spawn_sigterm_listener(event_tx: UnboundedSender<Event>) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                let _ = event_tx.send(Event::Quit);
            }
            Err(error) => warn!(%error, "Failed to install SIGTERM handler"),
        }
    });
}

/// Translate a crossterm event. Key releases and unused events map to `None`.
fn map_terminal_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            Some(match key.code {
                KeyCode::Char('c') if ctrl => Event::Quit,
                KeyCode::Char('z') if ctrl => Event::Suspend,
                _ => Event::Key(key),
            })
        }
        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(error) = self.exit() {
            error!(?error, "Failed to restore terminal");
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, MouseButton, MouseEventKind};

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_control_shortcuts() {
        assert_eq!(
            map_terminal_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Event::Quit)
        );
        assert_eq!(
            map_terminal_event(key(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            Some(Event::Suspend)
        );
        assert_eq!(
            map_terminal_event(key(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)))
        );
    }

    #[test]
    fn test_key_release_is_dropped() {
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_terminal_event(CrosstermEvent::Key(release)), None);
        assert_eq!(map_terminal_event(CrosstermEvent::FocusGained), None);
    }

    #[test]
    fn test_mouse_and_resize_pass_through() {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            map_terminal_event(CrosstermEvent::Mouse(mouse)),
            Some(Event::Mouse(mouse))
        );
        assert_eq!(
            map_terminal_event(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        );
    }
}
