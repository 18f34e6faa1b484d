//! Output oscilloscope

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Peak above which the trace turns red.
const HOT_PEAK: f32 = 0.9;

pub fn render_scope(frame: &mut Frame, area: Rect, samples: &[f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    let color = if peak >= HOT_PEAK { Color::Red } else { Color::Cyan };

    let width = samples.len().max(1) as f64;
    let points: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 / width, s as f64))
        .collect();

    let trace = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let axis = |bounds: [f64; 2]| {
        Axis::default()
            .bounds(bounds)
            .style(Style::default().fg(Color::DarkGray))
    };

    let chart = Chart::new(vec![trace])
        .block(
            Block::default()
                .title(format!(" Output  peak {:.2} ", peak))
                .borders(Borders::ALL),
        )
        .x_axis(axis([0.0, 1.0]))
        .y_axis(axis([-1.0, 1.0]));

    frame.render_widget(chart, area);
}
