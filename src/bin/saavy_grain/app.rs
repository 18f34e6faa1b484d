//! GrainApp - loads the sample, opens the audio stream and runs the TUI

use std::path::Path;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use tracing::info;

use saavy_grain::{MidiMessage, PlayerConfig, SamplePlayer, MAX_BLOCK_SIZE};

use super::decode::decode_wav;
use super::ui::{SessionInfo, UiApp, SCOPE_CAPACITY};

/// Pending note events between the UI and the audio callback.
const NOTE_QUEUE_CAPACITY: usize = 256;

pub struct GrainApp {
    config: PlayerConfig,
    looping: bool,
}

impl GrainApp {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            looping: false,
        }
    }

    /// Start with looping on or off.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Load `path`, start audio and block until the user quits.
    pub fn run(self, path: &Path) -> EyreResult<()> {
        let decoded = decode_wav(path)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!(sample_rate, channels, "Audio device ready");

        let (mut player, handle) = SamplePlayer::new(self.config);
        player.prepare(sample_rate, MAX_BLOCK_SIZE);
        handle
            .load_sample(decoded.channels, decoded.sample_rate)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?;
        handle.set_looping(self.looping);

        let (note_tx, mut note_rx) = RingBuffer::<MidiMessage>::new(NOTE_QUEUE_CAPACITY);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);

        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                player.drain_messages(&mut note_rx);

                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    player.process_block(&mut [&mut *block], 0, frames_to_render);

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                        // Scope drops samples when the UI falls behind
                        let _ = scope_tx.push(s);
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| tracing::error!(%err, "Audio stream error"),
            None,
        )?;

        stream.play()?;

        let session = SessionInfo {
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            sample_rate,
            source_rate: decoded.sample_rate,
        };

        let mut terminal = ratatui::init();
        let result = UiApp::new(handle, note_tx, scope_rx, session).run(&mut terminal);
        ratatui::restore();
        result
    }
}
