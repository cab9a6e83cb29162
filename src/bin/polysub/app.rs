//! Event loop: keyboard → notes and parameter edits, audio rings → views.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;

use polysub::synth::{ParamId, ParamStore, SynthMessage};

use super::{
    audio::{AudioHandle, VoiceUpdate, VIS_BLOCK_LEN},
    keyboard::Keyboard,
    ui::{self, SpectrumAnalyzer, View},
};

const NOTE_VELOCITY: u8 = 100;

pub struct App {
    params: Arc<ParamStore>,
    audio: AudioHandle,
    keyboard: Keyboard,
    selected: usize,
    scope: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    voices: VoiceUpdate,
    should_quit: bool,
}

impl App {
    pub fn new(params: Arc<ParamStore>, audio: AudioHandle) -> Self {
        let spectrum = SpectrumAnalyzer::new(VIS_BLOCK_LEN, audio.sample_rate);
        Self {
            params,
            audio,
            keyboard: Keyboard::new(),
            selected: 0,
            scope: vec![0.0; VIS_BLOCK_LEN],
            spectrum,
            voices: VoiceUpdate::default(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_voices();
            self.release_expired_gates();

            terminal.draw(|frame| {
                let view = View {
                    params: &self.params,
                    selected: self.selected,
                    scope: &self.scope,
                    spectrum: self.spectrum.data(),
                    voices: &self.voices.voices[..self.voices.count],
                    octave: self.keyboard.octave(),
                    sample_rate: self.audio.sample_rate,
                };
                ui::render(frame, &view);
            })?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.send(SynthMessage::AllNotesOff);
        Ok(())
    }

    /// Keep the most recent analysis window.
    fn poll_audio(&mut self) {
        let mut fresh = 0;
        while let Ok(sample) = self.audio.samples.pop() {
            self.scope.push(sample);
            fresh += 1;
        }

        if self.scope.len() > VIS_BLOCK_LEN {
            let excess = self.scope.len() - VIS_BLOCK_LEN;
            self.scope.drain(0..excess);
        }
        if fresh > 0 {
            self.spectrum.update(&self.scope);
        }
    }

    fn poll_voices(&mut self) {
        while let Ok(update) = self.audio.states.pop() {
            self.voices = update;
        }
    }

    fn release_expired_gates(&mut self) {
        for note in self.keyboard.expired(Instant::now()) {
            self.send(SynthMessage::NoteOff { note, velocity: 0 });
        }
    }

    fn send(&mut self, msg: SynthMessage) {
        // A full queue drops the event; the audio thread drains it every block.
        let _ = self.audio.messages.push(msg);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('z') => self.keyboard.shift_octave(-1),
            KeyCode::Char('x') => self.keyboard.shift_octave(1),
            KeyCode::Char(' ') => {
                self.keyboard.release_all();
                self.send(SynthMessage::AllNotesOff);
            }
            KeyCode::Up => {
                self.selected = self.selected.checked_sub(1).unwrap_or(ParamId::COUNT - 1);
            }
            KeyCode::Down => self.selected = (self.selected + 1) % ParamId::COUNT,
            KeyCode::Left => self.adjust(-1.0),
            KeyCode::Right => self.adjust(1.0),
            KeyCode::Char(c) => {
                if let Some(note) = self.keyboard.press(c, Instant::now()) {
                    self.send(SynthMessage::NoteOn {
                        note,
                        velocity: NOTE_VELOCITY,
                    });
                }
            }
            _ => {}
        }
    }

    fn adjust(&mut self, steps: f32) {
        let id = ParamId::ALL[self.selected];
        self.params.nudge(id, steps);
    }
}
