use anyhow::{bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use flipbook_core::{FlipbookError, SoundSink};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Page-turn sound output on the default cpal device.
///
/// One stream stays open for the lifetime of the viewer and plays whatever
/// is queued, silence otherwise.
pub struct CpalSink {
    queue: Arc<Mutex<VecDeque<f32>>>,
    sample_rate: u32,
    _stream: Stream,
}

impl CpalSink {
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No default audio output device")?;
        let supported = device
            .supported_output_configs()
            .context("Failed to query output configurations")?
            .find(|c| c.sample_format() == SampleFormat::F32)
            .context("Audio device has no f32 output")?;
        let supported = supported.with_max_sample_rate();
        let config: StreamConfig = supported.config();
        if config.channels == 0 {
            bail!("Audio device reports zero channels");
        }

        let queue = Arc::new(Mutex::new(VecDeque::new()));
        let stream = build_stream(&device, &config, Arc::clone(&queue))?;
        stream.play().context("Failed to start audio stream")?;

        tracing::debug!(
            "Audio output ready: {} Hz, {} channels",
            config.sample_rate.0,
            config.channels
        );
        Ok(Self {
            queue,
            sample_rate: config.sample_rate.0,
            _stream: stream,
        })
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    queue: Arc<Mutex<VecDeque<f32>>>,
) -> Result<Stream> {
    let channels = config.channels as usize;
    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                let Ok(mut queue) = queue.lock() else {
                    data.fill(0.0);
                    return;
                };
                for frame in data.chunks_mut(channels) {
                    let sample = queue.pop_front().unwrap_or(0.0);
                    frame.fill(sample);
                }
            },
            move |err| {
                tracing::warn!("Audio stream error: {}", err);
            },
            None,
        )
        .context("Failed to build audio output stream")?;
    Ok(stream)
}

impl SoundSink for CpalSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play(&mut self, samples: Vec<f32>) -> flipbook_core::Result<()> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| FlipbookError::Audio("audio queue poisoned".into()))?;
        // A new rustle replaces whatever is still playing.
        queue.clear();
        queue.extend(samples);
        Ok(())
    }
}
