//! polysub - terminal polyphonic synthesizer
//!
//! Run with: cargo run --release

mod app;
mod audio;
mod keyboard;
mod ui;

use std::sync::Arc;

use app::App;
use polysub::synth::ParamStore;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let params = Arc::new(ParamStore::new());
    let audio = audio::start(Arc::clone(&params))?;

    println!("=== polysub ===");
    println!("Sample rate: {} Hz", audio.sample_rate);
    println!("Channels: {}", audio.channels);
    println!("Voices: {}", audio.voices);
    println!();

    let mut terminal = ratatui::init();
    let res = App::new(params, audio).run(&mut terminal);
    ratatui::restore();
    res
}
