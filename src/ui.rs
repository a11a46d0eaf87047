//! `ratatui` front-end: transcript pane, status bar, key hints, and modal prompts.

use crate::app::{log_debug, App};
use crate::keymap::Action;
use crate::terminal_restore::TerminalRestoreGuard;
use crate::transcript::LineKind;
use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        block::{Position, Title},
        Block, BorderType, Borders, Clear, Paragraph, Wrap,
    },
    Terminal,
};
use std::io;
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configure the terminal, run the event loop, and tear everything down.
pub fn run_app(app: &mut App) -> Result<()> {
    let terminal_guard = TerminalRestoreGuard::new();
    let mut stdout = io::stdout();
    terminal_guard.enter(&mut stdout)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app_loop(&mut terminal, app);

    drop(terminal);
    terminal_guard.restore();
    result
}

/// Single-threaded loop: each terminal event is handled to completion
/// (including its durable write) before the next one is read.
fn app_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw(frame, app))?;

    while !app.should_quit() {
        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::FocusGained => app.set_focus(true),
                Event::FocusLost => app.set_focus(false),
                Event::Resize(_, _) => app.request_redraw(),
                _ => {}
            }
        }
        if app.take_redraw_request() {
            terminal.draw(|frame| draw(frame, app))?;
        }
    }
    log_debug("event loop finished");
    Ok(())
}

/// Replace zero-width and control characters so a transcript line can never
/// move the cursor or break the layout.
fn display_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if c.is_control() || c.width().unwrap_or(0) == 0 => ' ',
            c => c,
        })
        .collect()
}

pub fn draw(frame: &mut ratatui::Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let accent = Color::Rgb(120, 200, 255);
    let armed_color = Color::Rgb(255, 90, 90);
    let marker_color = Color::Rgb(255, 200, 100);
    let dim = Color::Rgb(140, 140, 150);
    let text_color = Color::Rgb(215, 215, 210);

    let armed = app.recorder().is_active();
    let state_span = if armed {
        Span::styled(
            " ● LOGGING ",
            Style::default()
                .fg(armed_color)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(" ○ not logging ", Style::default().fg(dim))
    };
    let destination = app
        .recorder()
        .destination()
        .map(|d| d.path().display().to_string())
        .unwrap_or_else(|| "no file chosen".to_string());
    let focus_note = if app.is_focused() { "" } else { " (unfocused) " };

    let transcript = app.transcript().lines();
    let visible = chunks[0].height.saturating_sub(2) as usize;
    let start = transcript.len().saturating_sub(visible);
    let lines: Vec<Line> = transcript[start..]
        .iter()
        .map(|line| {
            let style = match line.kind {
                LineKind::Sentinel => Style::default().fg(dim),
                LineKind::Marker => Style::default().fg(marker_color),
                LineKind::Event => Style::default().fg(text_color),
            };
            Line::from(Span::styled(display_safe(&line.text), style))
        })
        .collect();

    let border_color = if armed { armed_color } else { accent };
    let transcript_block = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .title(Line::from(vec![
                Span::styled(
                    " Preview ",
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ),
                state_span,
                Span::styled(focus_note, Style::default().fg(dim)),
            ]))
            .title(
                Title::from(Span::styled(
                    format!(" {} ", display_safe(&destination)),
                    Style::default().fg(dim),
                ))
                .position(Position::Bottom),
            ),
    );
    frame.render_widget(transcript_block, chunks[0]);

    let status_block = Paragraph::new(display_safe(app.status_text()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(dim))
                .title(Span::styled(" Status ", Style::default().fg(dim))),
        )
        .style(Style::default().fg(text_color));
    frame.render_widget(status_block, chunks[1]);

    let mut hints = Vec::new();
    for action in Action::ALL {
        let (key, label) = action.hint();
        hints.push(Span::styled(
            format!(" {key} "),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));
        hints.push(Span::styled(format!("{label} "), Style::default().fg(dim)));
    }
    hints.push(Span::styled(
        " Logs only while this window is focused. Get consent first.",
        Style::default().fg(dim),
    ));
    frame.render_widget(Paragraph::new(Line::from(hints)), chunks[2]);

    if let Some(prompt) = app.prompt() {
        let area = centered(frame.size(), 70, 7);
        let body = prompt.body(&app.default_dir().display().to_string());
        let popup = Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(marker_color))
                    .title(Span::styled(
                        prompt.title(),
                        Style::default()
                            .fg(marker_color)
                            .add_modifier(Modifier::BOLD),
                    )),
            )
            .style(Style::default().fg(text_color));
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }
}

/// Rectangle `percent_x` wide and `height` tall, centered in `area`.
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width.saturating_mul(percent_x) / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use clap::Parser;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn test_app(dir: &std::path::Path) -> App {
        let config = AppConfig::parse_from([
            "keyscribe-tests",
            "--documents-dir",
            dir.to_str().expect("utf8 path"),
        ]);
        App::new(&config)
    }

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).expect("terminal");
        terminal.draw(|frame| draw(frame, app)).expect("draw");
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn display_safe_strips_controls() {
        assert_eq!(display_safe("a\tb\u{1b}c"), "a b c");
    }

    #[test]
    fn centered_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 20);
        let popup = centered(area, 70, 7);
        assert_eq!(popup, Rect::new(15, 6, 70, 7));
        let tiny = centered(Rect::new(0, 0, 10, 3), 70, 7);
        assert!(tiny.height <= 3);
    }

    #[test]
    fn draw_shows_state_and_typed_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(dir.path());
        app.handle_key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::empty()));
        let screen = rendered(&app);
        assert!(screen.contains("not logging"));
        assert!(screen.contains("CHAR('z') keysym=z"));
        assert!(screen.contains("no file chosen"));
    }

    #[test]
    fn draw_renders_prompt_overlay() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(dir.path());
        app.handle_key(KeyEvent::new(KeyCode::F(2), KeyModifiers::empty()));
        let screen = rendered(&app);
        assert!(screen.contains("No log file chosen."));
    }
}
