use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let bar = Style::default().bg(theme.bar_bg);

        let status_text = match &app.status_message {
            Some(msg) => format!(" {}", msg),
            None => Self::summary(app),
        };
        let flags = Self::flags(app);

        let help_hint = " q:quit j/k:scroll gg/G:jump p:pause ";
        let used = status_text.len() + flags.len() + help_hint.len();
        let padding_len = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(status_text, bar.fg(theme.bar_fg)),
            Span::styled(flags, bar.fg(theme.accent)),
            Span::styled(" ".repeat(padding_len), bar),
            Span::styled(help_hint, bar.fg(theme.bar_dim)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }

    /// Positions of the three timeline stages plus the frame rate
    pub fn summary(app: &App) -> String {
        let state = app.timeline.state();
        let fps = match app.timeline.frame_stats().fps() {
            Some(fps) => format!("{} fps", fps),
            None => "idle".to_string(),
        };
        format!(
            " raw {:.0} | target {:.1} | current {:.1} | {:.0}% | {}",
            app.raw_offset(),
            state.target_position(),
            state.current_position(),
            state.progress() * 100.0,
            fps,
        )
    }

    fn flags(app: &App) -> String {
        let sink = app.timeline.sink();
        let mut flags = String::new();
        if sink.at_start {
            flags.push_str(" [top]");
        }
        if sink.at_end {
            flags.push_str(" [end]");
        }
        if app.timeline.state().is_settling() {
            flags.push_str(" settling");
        }
        if app.timeline.is_paused() {
            flags.push_str(" PAUSED");
        }
        if let Some(reveal) = &sink.last_reveal {
            flags.push_str(&format!(" | revealed {}", reveal));
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelscroll_core::AppConfig;

    #[test]
    fn test_summary_at_rest() {
        let app = App::new(AppConfig::default(), 80, 41);
        assert_eq!(
            StatusBarWidget::summary(&app),
            " raw 0 | target 0.0 | current 0.0 | 0% | idle"
        );
    }
}
