use catppuccin::PALETTE;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Application theme.
///
/// Holds color values directly so it stays independent of the palette it was
/// built from.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    base: Color,
    crust: Color,
    surface1: Color,
    overlay0: Color,
    overlay1: Color,
    text: Color,
    subtext0: Color,
    mauve: Color,
    red: Color,
    peach: Color,
    yellow: Color,
    green: Color,
    blue: Color,
    lavender: Color,

    pub border_type: BorderType,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            crust: catppuccin_to_color(&c.crust),
            surface1: catppuccin_to_color(&c.surface1),
            overlay0: catppuccin_to_color(&c.overlay0),
            overlay1: catppuccin_to_color(&c.overlay1),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            mauve: catppuccin_to_color(&c.mauve),
            red: catppuccin_to_color(&c.red),
            peach: catppuccin_to_color(&c.peach),
            yellow: catppuccin_to_color(&c.yellow),
            green: catppuccin_to_color(&c.green),
            blue: catppuccin_to_color(&c.blue),
            lavender: catppuccin_to_color(&c.lavender),
            border_type: BorderType::Rounded,
        }
    }

    /// Catppuccin Mocha theme (dark).
    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    /// Catppuccin Latte theme (light).
    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    /// Catppuccin Frappé theme (dark).
    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    /// Catppuccin Macchiato theme (dark).
    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    #[must_use]
    pub const fn base(&self) -> Color {
        self.base
    }

    /// Darkest shade, used by the backdrop.
    #[must_use]
    pub const fn crust(&self) -> Color {
        self.crust
    }

    #[must_use]
    pub const fn surface1(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn overlay0(&self) -> Color {
        self.overlay0
    }

    #[must_use]
    pub const fn overlay1(&self) -> Color {
        self.overlay1
    }

    #[must_use]
    pub const fn text(&self) -> Color {
        self.text
    }

    #[must_use]
    pub const fn subtext0(&self) -> Color {
        self.subtext0
    }

    #[must_use]
    pub const fn mauve(&self) -> Color {
        self.mauve
    }

    #[must_use]
    pub const fn red(&self) -> Color {
        self.red
    }

    #[must_use]
    pub const fn peach(&self) -> Color {
        self.peach
    }

    #[must_use]
    pub const fn yellow(&self) -> Color {
        self.yellow
    }

    #[must_use]
    pub const fn green(&self) -> Color {
        self.green
    }

    #[must_use]
    pub const fn blue(&self) -> Color {
        self.blue
    }

    #[must_use]
    pub const fn lavender(&self) -> Color {
        self.lavender
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

/// Built-in themes by display name.
fn available_themes() -> [(&'static str, Theme); 4] {
    [
        ("Catppuccin Mocha", Theme::catppuccin_mocha()),
        ("Catppuccin Macchiato", Theme::catppuccin_macchiato()),
        ("Catppuccin Frappé", Theme::catppuccin_frappe()),
        ("Catppuccin Latte", Theme::catppuccin_latte()),
    ]
}

/// Look up a theme by name. Returns the default theme if not found.
pub fn theme_from_name(name: &str) -> Theme {
    available_themes()
        .into_iter()
        .find(|(theme_name, _)| *theme_name == name)
        .map(|(_, theme)| theme)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_name() {
        let latte = theme_from_name("Catppuccin Latte");
        assert_eq!(latte.base(), Theme::catppuccin_latte().base());

        let fallback = theme_from_name("Solarized");
        assert_eq!(fallback.base(), Theme::catppuccin_mocha().base());
        assert_ne!(latte.base(), fallback.base());
    }
}
