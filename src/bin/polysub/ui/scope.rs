//! Oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Peak and RMS of the visible window.
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_scope(frame: &mut Frame, area: Rect, buffer: &[f32]) {
    let stats = AudioStats::from_buffer(buffer);
    let block = Block::default()
        .title(format!(
            " Scope  peak {:.3}  rms {:.3} ",
            stats.peak, stats.rms
        ))
        .borders(Borders::ALL);

    // Downsample to chart width
    let target_w = area.width.max(1) as usize;
    let step = buffer.len().div_ceil(target_w).max(1);
    let data: Vec<(f64, f64)> = buffer
        .iter()
        .enumerate()
        .step_by(step)
        .map(|(i, &sample)| (i as f64, sample as f64))
        .collect();

    // Voices sit around ±0.1 after headroom; zoom so one voice is visible.
    let zoom = stats.peak.max(0.05) as f64 * 1.2;

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, buffer.len() as f64])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-zoom, zoom])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
