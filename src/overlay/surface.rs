use std::cell::RefCell;
use std::rc::Rc;

use color_eyre::Result;
use ratatui::Frame;
use ratatui::layout::{Constraint, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Clear;
use tracing::debug;

use crate::Theme;
use crate::modal::{ClickTarget, DialogFactory, DialogHost, MountedDialog, Props};

/// Full-screen layer the active dialog is mounted into.
///
/// Owns the mounted dialog. Remembers where it rendered last so mouse
/// positions can be mapped to [`ClickTarget`]s.
#[derive(Default)]
pub struct SurfaceHost {
    mounted: Option<MountedDialog>,
    modal_open: bool,
    render_requested: bool,
    surface_area: Option<Rect>,
    content_area: Option<Rect>,
}

impl SurfaceHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn mounted(&self) -> Option<&MountedDialog> {
        self.mounted.as_ref()
    }

    pub const fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// Consume a pending render request.
    pub const fn take_render_request(&mut self) -> bool {
        std::mem::replace(&mut self.render_requested, false)
    }

    /// Map a terminal position to the part of the surface it hit.
    ///
    /// Returns `None` when nothing was rendered at that position.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<ClickTarget> {
        let position = Position::new(column, row);
        let surface = self.surface_area?;
        if !surface.contains(position) {
            return None;
        }
        if self
            .content_area
            .is_some_and(|content| content.contains(position))
        {
            Some(ClickTarget::Descendant)
        } else {
            Some(ClickTarget::SurfaceRoot)
        }
    }

    /// Render the mounted dialog centered in `area`, scaled by `visibility`.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, visibility: f64, theme: &Theme) {
        self.surface_area = None;
        self.content_area = None;

        let Some(dialog) = self.mounted().cloned() else {
            return;
        };
        if visibility <= 0.0 {
            return;
        }

        let mut dialog = dialog.borrow_mut();
        let (width, height) = dialog.content_size(area);
        let content = area.centered(
            Constraint::Length(scale(width, visibility).min(area.width)),
            Constraint::Length(scale(height, visibility).min(area.height)),
        );

        frame.render_widget(Clear, content);
        dialog.render(frame, content, theme);

        self.surface_area = Some(area);
        self.content_area = Some(content);
    }
}

impl DialogHost for SurfaceHost {
    fn mount(&mut self, factory: &DialogFactory, mut props: Props) -> Result<()> {
        self.unmount();
        let hook = props.take_init_hook();
        let instance: MountedDialog = Rc::new(RefCell::new(factory(&props)?));
        debug!(title = ?instance.borrow().title(), "Dialog mounted");
        if let Some(hook) = hook {
            hook.fire(&instance);
        }
        self.mounted = Some(instance);
        Ok(())
    }

    fn unmount(&mut self) {
        if self.mounted.take().is_some() {
            debug!("Dialog unmounted");
        }
        self.surface_area = None;
        self.content_area = None;
    }

    fn request_render(&mut self) {
        self.render_requested = true;
    }

    fn set_modal_open(&mut self, open: bool) {
        self.modal_open = open;
    }
}

/// Dim `area` in proportion to `opacity`.
pub fn render_backdrop(frame: &mut Frame, area: Rect, opacity: f64, theme: &Theme) {
    if opacity <= 0.0 {
        return;
    }
    let mut style = Style::default()
        .fg(blend(theme.text(), theme.overlay0(), opacity))
        .bg(blend(theme.base(), theme.crust(), opacity));
    if opacity >= 0.5 {
        style = style.add_modifier(Modifier::DIM);
    }
    frame.buffer_mut().set_style(area, style);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(length: u16, factor: f64) -> u16 {
    (f64::from(length) * factor.clamp(0.0, 1.0)).round() as u16
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(from: Color, to: Color, amount: f64) -> Color {
    let amount = amount.clamp(0.0, 1.0);
    match (from, to) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            let mix = |a: u8, b: u8| {
                (f64::from(b) - f64::from(a))
                    .mul_add(amount, f64::from(a))
                    .round() as u8
            };
            Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
        }
        _ if amount >= 0.5 => to,
        _ => from,
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::eyre::eyre;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::widgets::Paragraph;
    use tokio::sync::mpsc;

    use super::*;
    use crate::modal::{Dialog, DialogOutcome, InitHook, ModalEvent, dialog_factory};
    use crate::ui::Component;

    struct Text(&'static str);

    impl Component for Text {
        type Output = DialogOutcome;

        fn render(&mut self, frame: &mut Frame, area: Rect, _theme: &Theme) {
            frame.render_widget(Paragraph::new(self.0), area);
        }
    }

    impl Dialog for Text {
        fn title(&self) -> Option<&str> {
            Some(self.0)
        }
    }

    fn text(value: &'static str) -> DialogFactory {
        dialog_factory(move |_props: &Props| Ok(Text(value)))
    }

    fn draw(host: &mut SurfaceHost, visibility: f64) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| host.render(frame, frame.area(), visibility, &theme))
            .unwrap();
        terminal
    }

    #[test]
    fn test_mount_fires_init_hook() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let slot = Rc::new(RefCell::new(None));
        let hook = InitHook::new(3, Rc::clone(&slot), tx);
        let mut host = SurfaceHost::new();

        host.mount(&text("hello"), Props::new().with_init_hook(hook))
            .unwrap();

        assert_eq!(rx.try_recv().unwrap(), ModalEvent::Mounted { generation: 3 });
        let captured = slot.borrow().as_ref().and_then(std::rc::Weak::upgrade);
        assert!(captured.is_some_and(|dialog| Rc::ptr_eq(&dialog, host.mounted().unwrap())));
    }

    #[test]
    fn test_factory_error_leaves_surface_empty() {
        let mut host = SurfaceHost::new();
        host.mount(&text("first"), Props::new()).unwrap();

        let failing = dialog_factory(|_props: &Props| -> Result<Text> { Err(eyre!("bad props")) });
        assert!(host.mount(&failing, Props::new()).is_err());

        assert!(host.mounted().is_none());
        draw(&mut host, 1.0);
        assert_eq!(host.hit_test(0, 0), None);
    }

    #[test]
    fn test_render_request_is_consumed_once() {
        let mut host = SurfaceHost::new();
        host.request_render();
        assert!(host.take_render_request());
        assert!(!host.take_render_request());
    }

    #[test]
    fn test_hit_test_distinguishes_root_and_content() {
        let mut host = SurfaceHost::new();
        host.mount(&text("hello"), Props::new()).unwrap();
        assert_eq!(host.hit_test(20, 10), None);

        let terminal = draw(&mut host, 1.0);

        assert_eq!(host.hit_test(20, 10), Some(ClickTarget::Descendant));
        assert_eq!(host.hit_test(0, 0), Some(ClickTarget::SurfaceRoot));
        assert_eq!(host.hit_test(39, 19), Some(ClickTarget::SurfaceRoot));
        assert_eq!(host.hit_test(40, 20), None);

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("hello"));
    }

    #[test]
    fn test_hidden_surface_renders_nothing() {
        let mut host = SurfaceHost::new();
        host.mount(&text("hello"), Props::new()).unwrap();

        draw(&mut host, 0.0);

        assert_eq!(host.hit_test(20, 10), None);
    }

    #[test]
    fn test_backdrop_dims_area() {
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();

        terminal
            .draw(|frame| render_backdrop(frame, frame.area(), 1.0, &theme))
            .unwrap();

        let cell = &terminal.backend().buffer()[(0, 0)];
        assert_eq!(cell.bg, theme.crust());
        assert!(cell.modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_blend_midpoint() {
        assert_eq!(
            blend(Color::Rgb(0, 0, 0), Color::Rgb(200, 100, 50), 0.5),
            Color::Rgb(100, 50, 25)
        );
        assert_eq!(blend(Color::Black, Color::White, 0.2), Color::Black);
    }
}
