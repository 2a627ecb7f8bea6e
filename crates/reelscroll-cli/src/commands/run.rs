use std::io;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen,
        SetTitle,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::{debug, info};

use reelscroll_core::AppConfig;
use reelscroll_tui::{
    app::App,
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    keymap::Keymap,
    widgets::{ParallaxView, StatusBarWidget},
};

pub fn run(config: AppConfig) -> Result<()> {
    let keymap = Keymap::from_config(&config.keymap);
    let event_handler =
        EventHandler::with_animation_fps(config.ui.tick_rate_ms, config.ui.animation_fps);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Reelscroll Fest"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (cols, rows) = size()?;
    let mut app = App::new(config, cols, rows);
    info!("Terminal demo started at {}x{}", cols, rows);

    let result = event_loop(&mut terminal, &mut app, &keymap, &event_handler);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Some(fps) = app.timeline.frame_stats().fps() {
        debug!("Last measured frame rate: {} fps", fps);
    }
    info!(
        "Terminal demo finished after {} frames",
        app.timeline.frame_stats().total_frames()
    );
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    keymap: &Keymap,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        app.run_frame(Instant::now());

        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());

            ParallaxView::render(frame, layout[0], app);
            StatusBarWidget::render(frame, layout[1], app);
        })?;

        // Poll at the frame rate while the controller waits for a frame
        let event = if app.needs_animation() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };

        if let Some(event) = event {
            let now = Instant::now();
            match event {
                AppEvent::Key(key) => {
                    app.clear_status();
                    let action = handle_key_event(key, app, keymap);
                    app.handle_action(action, now);
                }
                AppEvent::Wheel(notches) => {
                    let step = app.config.ui.scroll_step;
                    app.scroll_by(f64::from(notches) * step, now);
                }
                AppEvent::Resize(cols, rows) => app.resize(cols, rows),
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
