use ratatui::{buffer::Buffer, layout::Rect, style::Style, Frame};

use crate::app::App;
use crate::scene::SceneElement;
use crate::theme::Theme;

/// Draws the poster at the controller's current position
pub struct ParallaxView;

impl ParallaxView {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        Self::render_to(frame.buffer_mut(), area, app);
    }

    pub fn render_to(buf: &mut Buffer, area: Rect, app: &App) {
        let theme = &app.theme;
        buf.set_style(area, Style::default().bg(theme.sky));

        let surface = app.timeline.host();
        let scene = surface.scene();
        let upr = surface.units_per_row();
        let current = app.timeline.current_position();

        for layer in &scene.layers {
            draw(buf, area, theme, &layer.element, current, upr);
        }
        for reveal in &scene.reveals {
            if reveal.element.presentation().revealed {
                draw(buf, area, theme, &reveal.element, current, upr);
            }
        }
    }
}

/// Screen cell of an element's top-left corner relative to the view
pub fn placement(element: &SceneElement, current: f64, units_per_row: f64) -> (i32, i32) {
    let p = element.presentation();
    let row = f64::from(element.row) + (p.dy - current) / units_per_row;
    let col = f64::from(element.col) + p.dx / units_per_row;
    (row.round() as i32, col.round() as i32)
}

fn draw(
    buf: &mut Buffer,
    area: Rect,
    theme: &Theme,
    element: &SceneElement,
    current: f64,
    units_per_row: f64,
) {
    let (top, left) = placement(element, current, units_per_row);
    let p = element.presentation();
    let style = theme.element_style(element.paint, p.opacity, p.scale);

    for (i, line) in element.art.iter().enumerate() {
        let y = top + i as i32;
        if y < 0 || y >= i32::from(area.height) {
            continue;
        }
        for (j, ch) in line.chars().enumerate() {
            let x = left + j as i32;
            // Blanks are see-through so layers behind stay visible
            if ch == ' ' || x < 0 || x >= i32::from(area.width) {
                continue;
            }
            let position = (area.x + x as u16, area.y + y as u16);
            buf[position].set_char(ch).set_style(style);
        }
    }
}
