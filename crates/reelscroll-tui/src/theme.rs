use ratatui::style::{Color, Modifier, Style};

use crate::scene::Paint;

/// Night palette for the festival poster
#[derive(Debug, Clone)]
pub struct Theme {
    pub sky: Color,
    pub stars: Color,
    pub moon: Color,
    pub hills: Color,
    pub stage: Color,
    pub crowd: Color,
    pub lights: Color,
    pub headline: Color,
    pub body: Color,

    // Status bar
    pub bar_bg: Color,
    pub bar_fg: Color,
    pub bar_dim: Color,
    pub accent: Color,
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            sky: Color::Rgb(0x14, 0x16, 0x2b),
            stars: Color::Rgb(0xe6, 0xe1, 0xc5),
            moon: Color::Rgb(0xf4, 0xe4, 0xa1),
            hills: Color::Rgb(0x3b, 0x4a, 0x6b),
            stage: Color::Rgb(0xd8, 0xa6, 0x57),
            crowd: Color::Rgb(0xa9, 0xb6, 0x65),
            lights: Color::Rgb(0xd3, 0x86, 0x9b),
            headline: Color::Rgb(0xea, 0x69, 0x62),
            body: Color::Rgb(0xd4, 0xbe, 0x98),
            bar_bg: Color::Rgb(0x32, 0x30, 0x2f),
            bar_fg: Color::Rgb(0xdd, 0xc7, 0xa1),
            bar_dim: Color::Rgb(0x92, 0x83, 0x74),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
        }
    }
}

impl Theme {
    pub fn paint(&self, paint: Paint) -> Color {
        match paint {
            Paint::Stars => self.stars,
            Paint::Moon => self.moon,
            Paint::Hills => self.hills,
            Paint::Stage => self.stage,
            Paint::Crowd => self.crowd,
            Paint::Lights => self.lights,
            Paint::Headline => self.headline,
            Paint::Body => self.body,
        }
    }

    /// Style for an element at the given opacity and scale.
    ///
    /// Terminals have no alpha, so fading is approximated with DIM and
    /// growth with BOLD.
    pub fn element_style(&self, paint: Paint, opacity: f64, scale: f64) -> Style {
        let mut style = Style::default().fg(self.paint(paint)).bg(self.sky);
        if opacity < 0.9 {
            style = style.add_modifier(Modifier::DIM);
        }
        if scale >= 0.99 {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faded_text_is_dim() {
        let theme = Theme::default();
        let style = theme.element_style(Paint::Headline, 0.85, 0.95);
        assert!(style.add_modifier.contains(Modifier::DIM));
        assert!(!style.add_modifier.contains(Modifier::BOLD));

        let style = theme.element_style(Paint::Headline, 1.0, 1.0);
        assert!(!style.add_modifier.contains(Modifier::DIM));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }
}
