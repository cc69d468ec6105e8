//! Synthesized paper rustle played when a turn is committed.

use std::f32::consts::PI;

use rand::Rng;

use crate::error::Result;

/// Length of the rustle, in seconds.
pub const TURN_SOUND_SECONDS: f32 = 0.4;
const NOISE_LEVEL: f32 = 0.3;
const CUTOFF_START_HZ: f32 = 2000.0;
const CUTOFF_END_HZ: f32 = 800.0;
const GAIN_START: f32 = 0.15;
/// Resonance of the low-pass, matching a Q of 1.
const FILTER_Q: f32 = 1.0;

/// Something that can play a mono buffer. Implemented by the host.
pub trait SoundSink {
    fn sample_rate(&self) -> u32;
    fn play(&mut self, samples: Vec<f32>) -> Result<()>;
}

/// Second-order low-pass (RBJ cookbook), direct form I.
#[derive(Debug, Default, Clone, Copy)]
struct LowPass {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl LowPass {
    fn process(&mut self, input: f32, cutoff: f32, sample_rate: f32) -> f32 {
        let omega = 2.0 * PI * (cutoff / sample_rate).min(0.49);
        let alpha = omega.sin() / (2.0 * FILTER_Q);
        let cos = omega.cos();
        let a0 = 1.0 + alpha;
        let b0 = (1.0 - cos) / 2.0 / a0;
        let b1 = (1.0 - cos) / a0;
        let b2 = b0;
        let a1 = -2.0 * cos / a0;
        let a2 = (1.0 - alpha) / a0;

        let output = b0 * input + b1 * self.x1 + b2 * self.x2 - a1 * self.y1 - a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }
}

/// Render the page-turn rustle at `sample_rate`: enveloped white noise
/// through a low-pass sweeping 2 kHz down to 800 Hz, fading 0.15 to silence.
pub fn synthesize_page_turn<R: Rng + ?Sized>(sample_rate: u32, rng: &mut R) -> Vec<f32> {
    let rate = sample_rate.max(1) as f32;
    let len = (rate * TURN_SOUND_SECONDS) as usize;
    let mut filter = LowPass::default();

    (0..len)
        .map(|i| {
            let t = i as f32 / len as f32;
            let envelope = (t * PI).sin() * NOISE_LEVEL;
            let noise = rng.random_range(-1.0f32..1.0) * envelope;
            let cutoff = CUTOFF_START_HZ + (CUTOFF_END_HZ - CUTOFF_START_HZ) * t;
            let gain = GAIN_START * (1.0 - t);
            filter.process(noise, cutoff, rate) * gain
        })
        .collect()
}

/// Plays the rustle on committed turns, unless muted or no output exists.
pub struct AudioFeedback {
    sink: Option<Box<dyn SoundSink>>,
    muted: bool,
}

impl std::fmt::Debug for AudioFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioFeedback")
            .field("available", &self.sink.is_some())
            .field("muted", &self.muted)
            .finish()
    }
}

impl AudioFeedback {
    pub fn new(sink: Option<Box<dyn SoundSink>>, muted: bool) -> Self {
        if sink.is_none() {
            tracing::debug!("No audio output, page-turn sound disabled");
        }
        Self { sink, muted }
    }

    /// Feedback with no output at all.
    pub fn silent() -> Self {
        Self::new(None, true)
    }

    pub fn is_available(&self) -> bool {
        self.sink.is_some()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn play_page_turn(&mut self) {
        if self.muted {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let samples = synthesize_page_turn(sink.sample_rate(), &mut rand::rng());
        if let Err(err) = sink.play(samples) {
            tracing::debug!("Page-turn sound dropped: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlipbookError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSink {
        played: Arc<Mutex<Vec<usize>>>,
        fail: bool,
    }

    impl SoundSink for RecordingSink {
        fn sample_rate(&self) -> u32 {
            8000
        }

        fn play(&mut self, samples: Vec<f32>) -> Result<()> {
            if self.fail {
                return Err(FlipbookError::Audio("device gone".into()));
            }
            self.played.lock().unwrap().push(samples.len());
            Ok(())
        }
    }

    #[test]
    fn rustle_length_and_envelope() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = synthesize_page_turn(10_000, &mut rng);
        assert_eq!(samples.len(), 4_000);
        assert_eq!(samples[0], 0.0);
        assert!(samples.iter().all(|s| s.is_finite() && s.abs() < 0.2));
        // Gain ramps to zero, so the tail is much quieter than the middle.
        let energy = |range: std::ops::Range<usize>| samples[range].iter().map(|s| s * s).sum::<f32>();
        assert!(energy(3_800..4_000) < energy(1_900..2_100));
    }

    #[test]
    fn muted_feedback_plays_nothing() {
        let sink = RecordingSink::default();
        let played = Arc::clone(&sink.played);
        let mut feedback = AudioFeedback::new(Some(Box::new(sink)), true);

        feedback.play_page_turn();
        assert!(played.lock().unwrap().is_empty());

        feedback.set_muted(false);
        feedback.play_page_turn();
        assert_eq!(*played.lock().unwrap(), vec![3_200]);
    }

    #[test]
    fn failing_or_missing_output_is_silent() {
        let mut failing = AudioFeedback::new(
            Some(Box::new(RecordingSink {
                fail: true,
                ..Default::default()
            })),
            false,
        );
        failing.play_page_turn();

        let mut none = AudioFeedback::new(None, false);
        assert!(!none.is_available());
        none.play_page_turn();
    }
}
