//! Input and drawing contract shared by the launcher and hosted dialogs.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

pub use color_eyre::Result;

use crate::Theme;

/// What a component did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    /// Not handled. The caller may route the key elsewhere.
    Ignored,
    /// Handled, nothing to report.
    Consumed,
    /// Handled and produced an output for the owner.
    Event(E),
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// Something that draws into an area and may react to keys.
pub trait Component {
    type Output;

    /// Errors are shown to the user by the owner, they do not abort the app.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}
