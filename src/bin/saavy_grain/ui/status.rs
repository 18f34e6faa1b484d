//! Status widget - transport settings and meters read from the player handle

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use saavy_grain::{PlayerHandle, MAX_VOICES};

use super::SessionInfo;

fn flag(label: &str, on: bool) -> Span<'static> {
    Span::styled(
        format!("{}: {}  ", label, if on { "on" } else { "off" }),
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

/// Render the status block: settings line plus level and position gauges
pub fn render_status(frame: &mut Frame, area: Rect, session: &SessionInfo, handle: &PlayerHandle) {
    let block = Block::default()
        .title(format!(" saavy-grain: {} ", session.file_name))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let settings = Line::from(vec![
        Span::styled(
            format!(" {}  ", handle.playback_mode().name()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Speed: {:.2}x  ", handle.playback_speed()),
            Style::default().fg(Color::White),
        ),
        flag("Loop", handle.is_looping()),
        flag("Hold", handle.is_hold_mode()),
        Span::styled(
            format!("Hold at: {:.0}%  ", handle.hold_position() * 100.0),
            Style::default().fg(Color::White),
        ),
    ]);
    frame.render_widget(Paragraph::new(settings), rows[0]);

    let info = Line::from(vec![
        Span::styled(
            format!(
                " {:.2}s @ {:.1}kHz -> {:.1}kHz  ",
                handle.length_in_seconds(),
                session.source_rate / 1000.0,
                session.sample_rate / 1000.0
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Voices: {}/{}", handle.active_voice_count(), MAX_VOICES),
            Style::default().fg(Color::Magenta),
        ),
    ]);
    frame.render_widget(Paragraph::new(info), rows[1]);

    let level = handle.current_level().clamp(0.0, 1.0) as f64;
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .label(format!("Level {:.2}", level))
            .ratio(level),
        rows[2],
    );

    let position = handle.current_position().clamp(0.0, 1.0);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Blue))
            .label(format!("Position {:.0}%", position * 100.0))
            .ratio(position),
        rows[3],
    );
}
