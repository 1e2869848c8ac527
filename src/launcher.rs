use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::debug;

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};
use crate::dialogs::DialogChoice;
use crate::modal::{DialogOutcome, ModalPhase, ModalRequester, Props};
use crate::ui::{Component, EventResult};

/// Base screen below the modal surface.
///
/// Requests dialogs through the [`ModalRequester`] and shows the state of
/// the session.
pub struct Launcher {
    requester: ModalRequester,
    resolver: Arc<KeyResolver>,
    current: Option<DialogChoice>,
    last_outcome: Option<DialogOutcome>,
    status: ModalStatus,
}

/// Snapshot of the session shown in the status line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalStatus {
    pub phase: ModalPhase,
    /// Title of the dialog currently requested, if any.
    pub title: Option<String>,
    /// Whether the host is in modal mode.
    pub modal_open: bool,
}

impl Launcher {
    pub const fn new(requester: ModalRequester, resolver: Arc<KeyResolver>) -> Self {
        Self {
            requester,
            resolver,
            current: None,
            last_outcome: None,
            status: ModalStatus {
                phase: ModalPhase::Closed,
                title: None,
                modal_open: false,
            },
        }
    }

    pub fn open(&mut self, choice: DialogChoice) -> Result<()> {
        self.open_with(choice, Props::new())
    }

    /// Open `choice` with `overrides` merged over its sample props.
    pub fn open_with(&mut self, choice: DialogChoice, overrides: Props) -> Result<()> {
        let (factory, props) = choice.request(&self.resolver);
        debug!(?choice, ?overrides, "Requesting dialog");
        self.current = Some(choice);
        self.requester.show(factory, props.merge(overrides))
    }

    /// Show the other dialog without closing the current one.
    fn swap(&mut self) -> Result<()> {
        let next = self
            .current
            .map_or(DialogChoice::Confirm, DialogChoice::other);
        self.open(next)
    }

    /// Close and show again within the same tick.
    fn reopen(&mut self) -> Result<()> {
        let choice = self.current.unwrap_or(DialogChoice::Info);
        self.requester.close()?;
        self.open(choice)
    }

    pub const fn last_outcome(&self) -> Option<DialogOutcome> {
        self.last_outcome
    }

    pub const fn record_outcome(&mut self, outcome: DialogOutcome) {
        self.last_outcome = Some(outcome);
    }

    pub fn set_status(&mut self, status: ModalStatus) {
        self.status = status;
    }

    fn binding_line(&self, action: GlobalAction, label: &'static str, theme: &Theme) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("  [{}] ", self.resolver.display_global(action)),
                Style::default()
                    .fg(theme.peach())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(label, Style::default().fg(theme.text())),
        ])
    }
}

impl Component for Launcher {
    type Output = ();

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let resolver = Arc::clone(&self.resolver);
        if resolver.matches_global(&key, GlobalAction::Confirm) {
            self.open(DialogChoice::Confirm)?;
        } else if resolver.matches_global(&key, GlobalAction::Info) {
            self.open(DialogChoice::Info)?;
        } else if resolver.matches_global(&key, GlobalAction::Swap) {
            self.swap()?;
        } else if resolver.matches_global(&key, GlobalAction::Reopen) {
            self.reopen()?;
        } else if resolver.matches_global(&key, GlobalAction::Close) {
            self.requester.close()?;
        } else {
            return Ok(EventResult::Ignored);
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" lazymodal ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.surface1()))
            .style(Style::default().bg(theme.base()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [bindings_area, status_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(2)]).areas(inner);

        let bindings = vec![
            Line::from(""),
            self.binding_line(GlobalAction::Confirm, "Confirm dialog", theme),
            self.binding_line(GlobalAction::Info, "Info dialog", theme),
            self.binding_line(GlobalAction::Swap, "Swap to the other dialog", theme),
            self.binding_line(GlobalAction::Reopen, "Close and reopen", theme),
            self.binding_line(GlobalAction::Close, "Close dialog", theme),
            self.binding_line(GlobalAction::Quit, "Quit", theme),
        ];
        frame.render_widget(Paragraph::new(bindings), bindings_area);

        let label_style = Style::default().fg(theme.subtext0());
        let value_style = Style::default().fg(theme.yellow());
        let outcome = self
            .last_outcome
            .map_or_else(|| "-".to_string(), |outcome| format!("{outcome:?}"));
        let title = self.status.title.as_deref().unwrap_or("-");
        let mut status = vec![
            Span::styled("  dialog: ", label_style),
            Span::styled(title, value_style),
            Span::styled("  phase: ", label_style),
            Span::styled(format!("{:?}", self.status.phase), value_style),
            Span::styled("  last outcome: ", label_style),
            Span::styled(outcome, value_style),
        ];
        if self.status.modal_open {
            status.push(Span::styled(
                "  [modal]",
                Style::default().fg(theme.blue()).add_modifier(Modifier::BOLD),
            ));
        }
        let status = Line::from(status);
        frame.render_widget(Paragraph::new(status), status_area);
    }
}
