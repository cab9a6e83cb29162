//! TUI for polysub
//!
//! Left: parameter page. Right: scope, spectrum, voices.

mod params;
mod scope;
mod spectrum;
mod voices;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use polysub::synth::{ParamStore, VoiceSnapshot};

pub use spectrum::SpectrumAnalyzer;

use params::render_params;
use scope::render_scope;
use spectrum::render_spectrum;
use voices::render_voices;

/// Everything one frame draws from.
pub struct View<'a> {
    pub params: &'a ParamStore,
    pub selected: usize,
    pub scope: &'a [f32],
    pub spectrum: &'a [(f64, f64)],
    pub voices: &'a [VoiceSnapshot],
    pub octave: i8,
    pub sample_rate: f32,
}

pub fn render(frame: &mut Frame, view: &View) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(30)])
        .split(rows[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(35),
            Constraint::Length(view.voices.len() as u16 + 2),
        ])
        .split(columns[1]);

    render_params(frame, columns[0], view.params, view.selected);
    render_scope(frame, right[0], view.scope);
    render_spectrum(frame, right[1], view.spectrum);
    render_voices(frame, right[2], view.voices);

    let help = Paragraph::new(format!(
        " [a-l, w-p] Play  [z/x] Octave {}  [↑↓] Select  [←→] Adjust  [Space] Panic  [Esc] Quit  {:.1}kHz",
        view.octave,
        view.sample_rate / 1000.0
    ))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[1]);
}
