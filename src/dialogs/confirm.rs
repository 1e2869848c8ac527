use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::debug;

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::modal::{Dialog, DialogFactory, DialogOutcome, Props, dialog_factory};
use crate::ui::{Component, EventResult};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmStyle {
    #[default]
    Normal,
    /// Shows red warning styling.
    Danger,
}

pub struct ConfirmDialog {
    title: String,
    message: String,
    confirm_text: String,
    cancel_text: String,
    style: ConfirmStyle,
    resolver: Arc<KeyResolver>,
}

impl ConfirmDialog {
    /// Build from props: `message` (required), `title`, `confirm_text`,
    /// `cancel_text`, `danger`.
    pub fn from_props(props: &Props, resolver: Arc<KeyResolver>) -> Result<Self> {
        Ok(Self {
            title: props.str("title").unwrap_or("Confirm").to_string(),
            message: props.require_str("message")?.to_string(),
            confirm_text: props.str("confirm_text").unwrap_or("Yes").to_string(),
            cancel_text: props.str("cancel_text").unwrap_or("No").to_string(),
            style: if props.bool("danger").unwrap_or(false) {
                ConfirmStyle::Danger
            } else {
                ConfirmStyle::Normal
            },
            resolver,
        })
    }
}

pub fn confirm_factory(resolver: Arc<KeyResolver>) -> DialogFactory {
    dialog_factory(move |props: &Props| ConfirmDialog::from_props(props, Arc::clone(&resolver)))
}

impl Component for ConfirmDialog {
    type Output = DialogOutcome;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<DialogOutcome>> {
        if self.resolver.matches_dialog(&key, DialogAction::Confirm) {
            return Ok(DialogOutcome::Confirmed.into());
        }
        if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            return Ok(DialogOutcome::Cancelled.into());
        }
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (title_color, border_color, confirm_color) = match self.style {
            ConfirmStyle::Normal => (theme.mauve(), theme.lavender(), theme.green()),
            ConfirmStyle::Danger => (theme.red(), theme.red(), theme.red()),
        };

        let message_style = Style::default().fg(theme.text());
        let key_style = Style::default()
            .fg(theme.peach())
            .add_modifier(Modifier::BOLD);
        let confirm_style = Style::default()
            .fg(confirm_color)
            .add_modifier(Modifier::BOLD);
        let cancel_style = Style::default()
            .fg(theme.overlay1())
            .add_modifier(Modifier::BOLD);

        let confirm_key = format!("[{}]", self.resolver.display_dialog(DialogAction::Confirm));
        let cancel_key = format!("[{}]", self.resolver.display_dialog(DialogAction::Cancel));
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.message.as_str(), message_style)),
            Line::from(""),
            Line::from(vec![
                Span::styled(confirm_key, key_style),
                Span::raw(" "),
                Span::styled(self.confirm_text.as_str(), confirm_style),
                Span::raw("    "),
                Span::styled(cancel_key, key_style),
                Span::raw(" "),
                Span::styled(self.cancel_text.as_str(), cancel_style),
            ]),
        ];

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(title_color)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
    }
}

impl Dialog for ConfirmDialog {
    fn content_size(&self, area: Rect) -> (u16, u16) {
        (area.width / 2, 7)
    }

    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn on_ready(&mut self) {
        debug!(title = %self.title, "Confirm dialog ready");
    }

    fn on_hide(&mut self) {
        debug!(title = %self.title, "Confirm dialog hidden");
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn dialog(props: &Props) -> ConfirmDialog {
        ConfirmDialog::from_props(props, Arc::new(KeyResolver::default())).unwrap()
    }

    #[test]
    fn test_keys_map_to_outcomes() {
        let mut dialog = dialog(&Props::new().with("message", "Proceed?"));

        assert_eq!(
            dialog.handle_key(KeyEvent::from(KeyCode::Char('y'))).unwrap(),
            EventResult::Event(DialogOutcome::Confirmed)
        );
        assert_eq!(
            dialog.handle_key(KeyEvent::from(KeyCode::Esc)).unwrap(),
            EventResult::Event(DialogOutcome::Cancelled)
        );
        assert_eq!(
            dialog.handle_key(KeyEvent::from(KeyCode::Char('s'))).unwrap(),
            EventResult::Ignored
        );
    }

    #[test]
    fn test_props_defaults_and_overrides() {
        let plain = dialog(&Props::new().with("message", "Proceed?"));
        assert_eq!(plain.title(), Some("Confirm"));
        assert_eq!(plain.style, ConfirmStyle::Normal);

        let danger = dialog(
            &Props::new()
                .with("message", "Delete?")
                .with("title", "Delete")
                .with("danger", true),
        );
        assert_eq!(danger.title(), Some("Delete"));
        assert_eq!(danger.style, ConfirmStyle::Danger);
    }

    #[test]
    fn test_missing_message_is_an_error() {
        assert!(
            ConfirmDialog::from_props(&Props::new(), Arc::new(KeyResolver::default())).is_err()
        );
    }

    #[test]
    fn test_render_shows_message_and_keys() {
        let mut dialog = dialog(
            &Props::new()
                .with("message", "Proceed?")
                .with("confirm_text", "Go"),
        );
        let mut terminal = Terminal::new(TestBackend::new(40, 7)).unwrap();

        terminal
            .draw(|frame| dialog.render(frame, frame.area(), &Theme::default()))
            .unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Proceed?"));
        assert!(rendered.contains("[y/Enter] Go"));
    }
}
