use std::sync::Arc;
use std::time::Duration;

use color_eyre::{Report, Result};
use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::cli::Args;
use crate::config::{AppConfig, GlobalAction, KeyResolver};
use crate::dialogs::{error_props, info_factory};
use crate::launcher::{Launcher, ModalStatus};
use crate::modal::{
    Backdrop, DialogHost, ModalEvent, ModalRequest, ModalRequester, ModalSession, Props,
};
use crate::overlay::{AnimatedOverlay, OverlayTimings, SurfaceHost, render_backdrop};
use crate::tui::{Event, Tui};
use crate::ui::{Component, EventResult};

type Session = ModalSession<SurfaceHost, AnimatedOverlay>;

enum Next {
    Terminal(Option<Event>),
    Modal(Option<ModalEvent>),
}

pub struct App {
    resolver: Arc<KeyResolver>,
    theme: Theme,
    session: Session,
    request_rx: UnboundedReceiver<ModalRequest>,
    launcher: Launcher,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(config: &AppConfig, resolver: Arc<KeyResolver>, theme: Theme) -> Self {
        let (requester, request_rx) = ModalRequester::channel();
        let overlay = AnimatedOverlay::new(OverlayTimings::from_config(&config.modal));
        let session = ModalSession::new(SurfaceHost::new(), overlay, config.modal.clone());
        let launcher = Launcher::new(requester, Arc::clone(&resolver));

        Self {
            resolver,
            theme,
            session,
            request_rx,
            launcher,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub fn apply_cli_args(&mut self, args: &Args) -> Result<()> {
        if let Some(choice) = args.open {
            info!(?choice, "Opening dialog from command line");
            let overrides = args
                .props
                .clone()
                .map(Props::from_json)
                .transpose()?
                .unwrap_or_default();
            self.launcher.open_with(choice, overrides)?;
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(60.0)?;
        tui.enter()?;
        self.session.host_mut().request_render();

        loop {
            self.apply_requests();

            let next = tokio::select! {
                event = tui.next_event() => Next::Terminal(event),
                event = self.session.next_event() => Next::Modal(event),
            };
            match next {
                Next::Terminal(Some(event)) => self.handle_event(&mut tui, event)?,
                Next::Modal(Some(event)) => {
                    self.session.handle_event(event);
                    self.session.host_mut().request_render();
                }
                Next::Terminal(None) | Next::Modal(None) => break,
            }

            self.session.process_pending();
            self.apply_requests();
            if self.session.host_mut().take_render_request() {
                self.render(&mut tui)?;
            }

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
                self.session.host_mut().request_render();
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Init => {}
            Event::Quit => self.should_quit = true,
            Event::Suspend => self.should_suspend = true,
            Event::Tick(elapsed) => self.tick(elapsed),
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.session.host_mut().request_render();
            }
            Event::Key(key) => {
                self.handle_key(key);
                self.session.host_mut().request_render();
            }
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                self.session.host_mut().request_render();
            }
            Event::Error(message) => warn!(%message, "Terminal event error"),
        }
        Ok(())
    }

    /// Apply queued modal requests in the order they were made.
    fn apply_requests(&mut self) {
        while let Ok(request) = self.request_rx.try_recv() {
            if let Err(error) = self.session.apply(request) {
                self.show_error(&error);
            }
        }
    }

    fn show_error(&mut self, error: &Report) {
        error!(?error, "Showing error dialog");
        let factory = info_factory(Arc::clone(&self.resolver));
        if let Err(error) = self.session.show(factory, error_props(error.to_string())) {
            error!(?error, "Failed to show error dialog");
        }
    }

    fn tick(&mut self, elapsed: Duration) {
        // Sampled before advancing so the final frame of an animation is drawn too.
        let animating = self.is_animating();
        self.session.tick(elapsed);
        if animating {
            self.session.host_mut().request_render();
        }
    }

    fn is_animating(&self) -> bool {
        self.session.overlay().is_animating()
            || matches!(self.session.backdrop(), Backdrop::FadingOut { .. })
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
            return;
        }

        let dialog = self
            .session
            .active_instance()
            .filter(|_| self.session.overlay().accepts_input(self.session.surface()));
        if let Some(dialog) = dialog {
            let result = dialog.borrow_mut().handle_key(key);
            match result {
                Ok(EventResult::Event(outcome)) => {
                    info!(?outcome, "Dialog finished");
                    self.launcher.record_outcome(outcome);
                    self.session.close();
                    return;
                }
                Ok(EventResult::Consumed) => return,
                Ok(EventResult::Ignored) => {}
                Err(error) => {
                    self.show_error(&error);
                    return;
                }
            }
        }

        if let Err(error) = self.launcher.handle_key(key) {
            self.show_error(&error);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(target) = self.session.host().hit_test(mouse.column, mouse.row) {
            debug!(?target, "Surface clicked");
            self.session.handle_click(target);
        }
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let theme = self.theme;
        self.launcher.set_status(ModalStatus {
            phase: self.session.phase(),
            title: self
                .session
                .active_descriptor()
                .and_then(|descriptor| descriptor.props().str("title"))
                .map(str::to_string),
            modal_open: self.session.host().is_modal_open(),
        });
        self.launcher.render(frame, area, &theme);

        let backdrop = self.session.backdrop();
        if backdrop.is_present() {
            render_backdrop(frame, area, backdrop.opacity(), &theme);
        }

        let visibility = self.session.overlay().visibility(self.session.surface());
        self.session
            .host_mut()
            .render(frame, area, visibility, &theme);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use tokio::time::timeout;

    use super::*;
    use crate::dialogs::DialogChoice;
    use crate::modal::{DialogOutcome, ModalPhase};

    fn app() -> App {
        let mut config = AppConfig::default();
        config.modal = config.modal.without_animation();
        App::new(&config, Arc::new(KeyResolver::default()), Theme::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::from(code));
        app.apply_requests();
        app.session.process_pending();
    }

    async fn settle(app: &mut App) {
        let event = timeout(Duration::from_secs(1), app.session.next_event())
            .await
            .expect("timed out waiting for a modal event")
            .expect("modal event channel closed");
        app.session.handle_event(event);
        app.session.process_pending();
    }

    fn title(app: &App) -> Option<String> {
        app.session
            .active_instance()
            .and_then(|dialog| dialog.borrow().title().map(str::to_string))
    }

    fn draw(app: &mut App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
    }

    #[tokio::test]
    async fn test_dialog_key_closes_and_records_outcome() {
        let mut app = app();

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(title(&app).as_deref(), Some("Delete secret"));
        assert_eq!(app.session.phase(), ModalPhase::Open);

        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.session.phase(), ModalPhase::ClosingDebounce);
        settle(&mut app).await;

        assert!(!app.session.is_showing());
        assert!(app.session.host().mounted().is_none());
        assert_eq!(app.launcher.last_outcome(), Some(DialogOutcome::Confirmed));
    }

    #[tokio::test]
    async fn test_reopen_keeps_surface_up() {
        let mut app = app();
        press(&mut app, KeyCode::Char('i'));

        press(&mut app, KeyCode::Char('r'));

        assert!(app.session.is_showing());
        assert_eq!(app.session.phase(), ModalPhase::Open);
        assert_eq!(title(&app).as_deref(), Some("Deployment finished"));
    }

    #[tokio::test]
    async fn test_click_outside_dialog_closes() {
        let mut app = app();
        press(&mut app, KeyCode::Char('i'));
        draw(&mut app);

        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(click(40, 12));
        assert_eq!(app.session.phase(), ModalPhase::Open);

        app.handle_mouse(click(0, 0));
        assert_eq!(app.session.phase(), ModalPhase::ClosingDebounce);
        settle(&mut app).await;
        assert!(!app.session.is_showing());
    }

    #[tokio::test]
    async fn test_quit_key_wins_over_dialog() {
        let mut app = app();
        press(&mut app, KeyCode::Char('c'));

        press(&mut app, KeyCode::Char('q'));

        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_cli_open_and_render() {
        let mut app = app();
        let args = Args {
            open: Some(DialogChoice::Info),
            props: Some(serde_json::json!({"title": "Nightly build"})),
            no_animation: true,
        };

        app.apply_cli_args(&args).unwrap();
        app.apply_requests();
        app.session.process_pending();
        let terminal = draw(&mut app);

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Nightly build"));
        assert!(rendered.contains("lazymodal"));
        assert!(rendered.contains("[modal]"));
    }
}
