//! Voice list: note, state and envelope level per pooled voice.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use polysub::synth::{VoiceSnapshot, VoiceState};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

fn state_color(state: VoiceState) -> Color {
    match state {
        VoiceState::Idle => Color::DarkGray,
        VoiceState::Active => Color::LightGreen,
        VoiceState::Releasing => Color::LightYellow,
    }
}

pub fn render_voices(frame: &mut Frame, area: Rect, voices: &[VoiceSnapshot]) {
    let block = Block::default().title(" Voices ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if voices.is_empty() {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); voices.len()])
        .split(inner);

    for (i, (voice, row)) in voices.iter().zip(rows.iter()).enumerate() {
        let label = match voice.state {
            VoiceState::Idle => format!("V{} ---", i + 1),
            state => format!("V{} {} {:?}", i + 1, note_name(voice.note), state),
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(state_color(voice.state)))
            .ratio(voice.envelope_level.clamp(0.0, 1.0) as f64)
            .label(label);
        frame.render_widget(gauge, *row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(0), "C-1");
    }
}
