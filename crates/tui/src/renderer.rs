use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use pose_overlay_core::{
    CommandLog, ManualClock, MediaSnapshot, OverlayConfig, Palette, PoseOverlay, Trigger,
    geometry_for,
};
use pose_overlay_protocol::{PoseFrame, RenderCommand, Size, ThemeToken};
use ratatui::{
    Terminal,
    backend::Backend,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        Block, Borders,
        canvas::{Canvas, Circle, Line, Rectangle},
    },
};

/// Poll interval for input; also the playback tick.
const TICK: Duration = Duration::from_millis(33);
const SEEK_STEP_SECS: f64 = 1.0;

fn theme_to_color(token: ThemeToken, palette: &Palette) -> Color {
    let c = palette.resolve(token);
    Color::Rgb(c.r, c.g, c.b)
}

/// Braille cells hold 2x4 dots, so the overlay surface is measured in dots.
fn container_for(area: Rect) -> Size {
    Size::new(f64::from(area.width) * 2.0, f64::from(area.height) * 4.0)
}

/// Simulated `<video>` clock.
struct Playback {
    position: f64,
    duration: f64,
    playing: bool,
}

impl Playback {
    fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        self.position += dt;
        if self.duration > 0.0 && self.position > self.duration {
            self.position = 0.0;
        }
    }

    fn seek(&mut self, delta: f64) {
        let end = self.duration.max(0.0);
        self.position = (self.position + delta).clamp(0.0, end);
    }
}

pub fn play(
    frames: Vec<PoseFrame>,
    config: &OverlayConfig,
    video: Size,
    duration: f64,
) -> Result<()> {
    let mut overlay = PoseOverlay::with_config(frames, config, ManualClock::new())?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut overlay, video, duration);

    overlay.teardown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    overlay: &mut PoseOverlay<ManualClock>,
    video: Size,
    duration: f64,
) -> Result<()> {
    let palette = overlay.style().palette;
    let mut playback = Playback {
        position: 0.0,
        duration,
        playing: true,
    };
    let mut pass: Vec<RenderCommand> = Vec::new();
    let mut last_tick = Instant::now();

    overlay.notify(Trigger::MetadataReady);

    loop {
        let now = Instant::now();
        if playback.playing {
            playback.advance(now.duration_since(last_tick).as_secs_f64());
            overlay.notify(Trigger::TimeAdvanced);
        }
        last_tick = now;

        let term_size = terminal.size()?;
        let content_area = Rect::new(0, 1, term_size.width, term_size.height.saturating_sub(1));
        let container = container_for(content_area);
        let media = MediaSnapshot {
            current_time: playback.position,
            duration: Some(playback.duration).filter(|d| *d > 0.0),
            intrinsic_size: Some(video),
        };

        // Display refresh: redeem whatever the scheduler asked for.
        let mut log = CommandLog::default();
        for ticket in overlay.scheduler_mut().clock_mut().take_due() {
            overlay.on_frame(ticket, &media, container, &mut log);
        }
        if let Some(latest) = log.last() {
            pass = latest.to_vec();
        }

        let status = format!(
            " pose-overlay {:>6.2}s / {:.2}s | {} | overlay {} | space pause | o toggle | ←→ seek | q quit ",
            playback.position,
            playback.duration,
            if playback.playing { "playing" } else { "paused" },
            if overlay.is_enabled() { "on" } else { "off" },
        );

        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, 1);
            let header = Block::default()
                .title(status)
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            let content = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
            let canvas = Canvas::default()
                .block(Block::default().borders(Borders::NONE))
                .background_color(Color::Black)
                .marker(Marker::Braille)
                .x_bounds([0.0, container.width])
                .y_bounds([0.0, container.height])
                .paint(|ctx| {
                    // Canvas y grows upwards; overlay y grows downwards.
                    let flip = |y: f64| container.height - y;

                    // Outline of the video content inside its bars.
                    if let Some(g) = geometry_for(Some(video), container) {
                        ctx.draw(&Rectangle {
                            x: g.offset_x,
                            y: flip(g.offset_y + g.display_height),
                            width: g.display_width,
                            height: g.display_height,
                            color: Color::DarkGray,
                        });
                        ctx.layer();
                    }

                    for cmd in &pass {
                        match cmd {
                            RenderCommand::DrawLine { from, to, color, .. } => {
                                ctx.draw(&Line {
                                    x1: from.x,
                                    y1: flip(from.y),
                                    x2: to.x,
                                    y2: flip(to.y),
                                    color: theme_to_color(*color, &palette),
                                });
                            }
                            RenderCommand::FillCircle {
                                center,
                                radius,
                                color,
                            } => {
                                ctx.draw(&Circle {
                                    x: center.x,
                                    y: flip(center.y),
                                    radius: *radius,
                                    color: theme_to_color(*color, &palette),
                                });
                            }
                            RenderCommand::DrawText {
                                position,
                                text,
                                color,
                                ..
                            } => {
                                ctx.print(
                                    position.x,
                                    flip(position.y),
                                    Span::styled(
                                        text.to_string(),
                                        Style::default().fg(theme_to_color(*color, &palette)),
                                    ),
                                );
                            }
                            RenderCommand::Clear { .. }
                            | RenderCommand::BeginGroup { .. }
                            | RenderCommand::EndGroup => {}
                        }
                    }
                });
            frame.render_widget(canvas, content);
        })?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char(' ') => playback.playing = !playback.playing,
                    KeyCode::Char('o') => {
                        overlay.set_enabled(!overlay.is_enabled());
                    }
                    KeyCode::Left => {
                        playback.seek(-SEEK_STEP_SECS);
                        overlay.notify(Trigger::TimeAdvanced);
                    }
                    KeyCode::Right => {
                        playback.seek(SEEK_STEP_SECS);
                        overlay.notify(Trigger::TimeAdvanced);
                    }
                    _ => {}
                },
                Event::Resize(..) => {
                    overlay.notify(Trigger::ContainerResized);
                }
                _ => {}
            }
        }
    }

    Ok(())
}
