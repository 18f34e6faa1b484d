//! TUI module for saavy-grain
//!
//! Maps the keyboard onto notes and transport settings and shows the player's
//! meters.

mod status;
mod scope;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;
use tracing::warn;

use saavy_grain::{MidiMessage, PlayerHandle};

use status::render_status;
use scope::render_scope;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;
/// Ring buffer size for scope samples coming from the audio thread
pub const SCOPE_CAPACITY: usize = VIS_BUFFER_SIZE * 8;

/// C major scale from C4 on the home row
const KEY_NOTES: [(char, u8); 8] = [
    ('a', 60),
    ('s', 62),
    ('d', 64),
    ('f', 65),
    ('g', 67),
    ('h', 69),
    ('j', 71),
    ('k', 72),
];

const HOLD_STEP: f64 = 0.01;
const SPEED_STEP: f32 = 0.05;

/// Static information about the running session
#[derive(Clone, Debug)]
pub struct SessionInfo {
    pub file_name: String,
    /// Output device rate in Hz
    pub sample_rate: f32,
    /// Rate of the loaded file in Hz
    pub source_rate: f64,
}

/// UI application state
pub struct UiApp {
    handle: PlayerHandle,
    note_tx: Producer<MidiMessage>,
    /// Ring buffer receiver for audio samples
    scope_rx: Consumer<f32>,
    session: SessionInfo,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    /// Notes sent as note-on and not yet released
    held: Vec<u8>,
    /// Whether the app should quit
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        handle: PlayerHandle,
        note_tx: Producer<MidiMessage>,
        scope_rx: Consumer<f32>,
        session: SessionInfo,
    ) -> Self {
        Self {
            handle,
            note_tx,
            scope_rx,
            session,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            held: Vec::with_capacity(KEY_NOTES.len()),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        // Let the last notes fade instead of cutting the stream mid-grain
        self.handle.stop_all_voices();
        Ok(())
    }

    /// Poll for new audio samples from ring buffer, keeping the last
    /// VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.scope_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn send(&mut self, message: MidiMessage) {
        if self.note_tx.push(message).is_err() {
            warn!(?message, "Note queue full, dropping event");
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c) if KEY_NOTES.iter().any(|&(k, _)| k == c) => {
                let note = KEY_NOTES
                    .iter()
                    .find(|&&(k, _)| k == c)
                    .map_or(60, |&(_, note)| note);
                self.send(MidiMessage::NoteOn {
                    note,
                    velocity: 0.8,
                });
                if !self.held.contains(&note) {
                    self.held.push(note);
                }
            }
            KeyCode::Char(' ') => {
                for note in std::mem::take(&mut self.held) {
                    self.send(MidiMessage::NoteOff { note });
                }
            }
            KeyCode::Char('x') => {
                self.handle.stop_all_voices();
                self.held.clear();
            }
            other => self.adjust(other),
        }
    }

    /// Transport keys
    fn adjust(&self, key: KeyCode) {
        let handle = &self.handle;
        match key {
            KeyCode::Char('l') => handle.set_looping(!handle.is_looping()),
            KeyCode::Char('o') => handle.set_hold_mode(!handle.is_hold_mode()),
            KeyCode::Char('[') => handle.set_hold_position(handle.hold_position() - HOLD_STEP),
            KeyCode::Char(']') => handle.set_hold_position(handle.hold_position() + HOLD_STEP),
            KeyCode::Char('-') => handle.set_playback_speed(handle.playback_speed() - SPEED_STEP),
            KeyCode::Char('=') => handle.set_playback_speed(handle.playback_speed() + SPEED_STEP),
            KeyCode::Char('m') => handle.set_playback_mode(handle.playback_mode().next()),
            _ => {}
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: status, waveform, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Status
                Constraint::Min(8),    // Waveform
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_status(frame, chunks[0], &self.session, &self.handle);
        render_scope(frame, chunks[1], &self.audio_buffer);

        let help = Paragraph::new(
            " [A-K] Notes  [Space] Release  [L] Loop  [O] Hold  [ [ ] ] Hold pos  \
             [-/=] Speed  [M] Mode  [X] Stop  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
