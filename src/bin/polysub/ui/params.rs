//! Parameter page: every engine parameter with its current value.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use polysub::{
    dsp::{FilterType, ModulationDestination, Waveshape},
    synth::{ParamId, ParamStore},
};

/// Display text for a parameter value, naming selector ids.
pub fn format_value(id: ParamId, value: f32) -> String {
    let index = value.round() as i32;
    match id {
        ParamId::Osc1Waveshape
        | ParamId::Osc2Waveshape
        | ParamId::Lfo1Waveshape
        | ParamId::Lfo2Waveshape => Waveshape::from_id(index).name().to_string(),
        ParamId::FilterType => FilterType::from_id(index)
            .map(|t| t.name())
            .unwrap_or("Off")
            .to_string(),
        ParamId::Lfo1Destination | ParamId::Lfo2Destination => {
            ModulationDestination::from_id(index)
                .map(|d| d.name())
                .unwrap_or("None")
                .to_string()
        }
        ParamId::Reverb | ParamId::FilterOn => {
            let on = value >= 0.5;
            (if on { "On" } else { "Off" }).to_string()
        }
        _ if id.range().stepped => format!("{index}"),
        _ => format!("{value:.2}"),
    }
}

pub fn render_params(frame: &mut Frame, area: Rect, store: &ParamStore, selected: usize) {
    let items: Vec<ListItem> = ParamId::ALL
        .iter()
        .map(|&id| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<20}", id.label()), Style::default().fg(Color::Gray)),
                Span::styled(
                    format_value(id, store.get(id)),
                    Style::default().fg(Color::White),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title(" Parameters ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}
