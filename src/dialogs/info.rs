use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing::debug;

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::modal::{Dialog, DialogFactory, DialogOutcome, Props, dialog_factory};
use crate::ui::{Component, EventResult};

/// Message box dismissed with a single key. Doubles as the error dialog.
pub struct InfoDialog {
    title: String,
    message: String,
    error: bool,
    resolver: Arc<KeyResolver>,
}

impl InfoDialog {
    pub fn from_props(props: &Props, resolver: Arc<KeyResolver>) -> Result<Self> {
        let error = props.bool("error").unwrap_or(false);
        let default_title = if error { "Error" } else { "Info" };
        Ok(Self {
            title: props.str("title").unwrap_or(default_title).to_string(),
            message: props.require_str("message")?.to_string(),
            error,
            resolver,
        })
    }
}

pub fn info_factory(resolver: Arc<KeyResolver>) -> DialogFactory {
    dialog_factory(move |props: &Props| InfoDialog::from_props(props, Arc::clone(&resolver)))
}

impl Component for InfoDialog {
    type Output = DialogOutcome;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<DialogOutcome>> {
        if self.resolver.matches_dialog(&key, DialogAction::Dismiss) {
            return Ok(DialogOutcome::Dismissed.into());
        }
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let accent = if self.error { theme.red() } else { theme.blue() };
        let title_style = Style::default().fg(accent).add_modifier(Modifier::BOLD);
        let message_style = Style::default().fg(theme.text());
        let hint_style = Style::default().fg(theme.overlay1());

        let hint = format!(
            "Press {} to dismiss",
            self.resolver.display_dialog(DialogAction::Dismiss)
        );
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.message.as_str(), message_style)),
            Line::from(""),
            Line::from(Span::styled(hint, hint_style)),
        ];

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(title_style)
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);
    }
}

impl Dialog for InfoDialog {
    fn content_size(&self, area: Rect) -> (u16, u16) {
        (area.width / 5 * 3, 8)
    }

    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn on_ready(&mut self) {
        debug!(title = %self.title, "Info dialog ready");
    }

    fn on_hide(&mut self) {
        debug!(title = %self.title, "Info dialog hidden");
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;

    use super::*;

    #[test]
    fn test_dismiss_keys() {
        let mut dialog = InfoDialog::from_props(
            &Props::new().with("message", "Done"),
            Arc::new(KeyResolver::default()),
        )
        .unwrap();

        assert_eq!(dialog.title(), Some("Info"));
        assert_eq!(
            dialog.handle_key(KeyEvent::from(KeyCode::Enter)).unwrap(),
            EventResult::Event(DialogOutcome::Dismissed)
        );
        assert_eq!(
            dialog.handle_key(KeyEvent::from(KeyCode::Char('y'))).unwrap(),
            EventResult::Ignored
        );
    }

    #[test]
    fn test_error_flag_changes_default_title() {
        let dialog = InfoDialog::from_props(
            &Props::new().with("message", "boom").with("error", true),
            Arc::new(KeyResolver::default()),
        )
        .unwrap();

        assert!(dialog.error);
        assert_eq!(dialog.title(), Some("Error"));
    }
}
