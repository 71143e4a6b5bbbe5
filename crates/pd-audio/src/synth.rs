//! Triangle-wave tone synthesizer.
//!
//! Each tone is a triangle oscillator with a 10 ms linear attack and
//! an exponential decay that reaches -60 dB at the end of the tone.
//! Voices live in a fixed-capacity list so rendering never allocates.

use pd_engine::{ToneSink, ToneTrigger};

use crate::frame::Frame;

/// Linear attack time of every tone.
pub const ATTACK_SECONDS: f64 = 0.01;

/// Simultaneous voices; the oldest voice is stolen beyond this.
pub const MAX_VOICES: usize = 32;

/// Level the decay reaches when the tone ends.
const DECAY_FLOOR: f32 = 0.001;

/// One sounding tone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voice {
    phase: f32,
    phase_step: f32,
    amplitude: f32,
    gain: f32,
    attack_step: f32,
    decay_factor: f32,
    attack_samples: u32,
    total_samples: u32,
    age: u32,
}

impl Voice {
    pub fn new(tone: ToneTrigger, sample_rate: u32) -> Self {
        let rate = sample_rate.max(1) as f64;
        let total_samples = (tone.duration.max(0.0) * rate).round().max(1.0) as u32;
        let attack_samples = ((ATTACK_SECONDS * rate).round() as u32).clamp(1, total_samples);
        let amplitude = tone.amplitude.max(0.0);

        let decay_samples = total_samples - attack_samples;
        let decay_factor = if decay_samples == 0 || amplitude <= DECAY_FLOOR {
            1.0
        } else {
            (DECAY_FLOOR / amplitude).powf(1.0 / decay_samples as f32)
        };

        Self {
            phase: 0.0,
            phase_step: (tone.frequency / rate) as f32,
            amplitude,
            gain: 0.0,
            attack_step: amplitude / attack_samples as f32,
            decay_factor,
            attack_samples,
            total_samples,
            age: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.age >= self.total_samples
    }

    /// Current envelope level.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Next output sample.
    pub fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }
        if self.age < self.attack_samples {
            self.gain = (self.gain + self.attack_step).min(self.amplitude);
        } else {
            self.gain *= self.decay_factor;
        }
        let value = triangle(self.phase) * self.gain;
        self.phase = (self.phase + self.phase_step).fract();
        self.age += 1;
        value
    }
}

/// Triangle wave over one period, phase in `[0, 1)`, output in `[-1, 1]`.
fn triangle(phase: f32) -> f32 {
    1.0 - 4.0 * (phase - 0.5).abs()
}

/// Mixes every active voice into mono frames.
pub struct ToneSynth {
    sample_rate: u32,
    voices: heapless::Vec<Voice, MAX_VOICES>,
}

impl ToneSynth {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate, voices: heapless::Vec::new() }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Start a tone, stealing the oldest voice when all are busy.
    pub fn trigger(&mut self, tone: ToneTrigger) {
        let voice = Voice::new(tone, self.sample_rate);
        if let Err(voice) = self.voices.push(voice) {
            if let Some((i, _)) = self.voices.iter().enumerate().max_by_key(|(_, v)| v.age) {
                log::debug!(target: "audio", "voice {} stolen", i);
                self.voices[i] = voice;
            }
        }
    }

    /// Render one frame and drop finished voices.
    pub fn render_frame(&mut self) -> Frame {
        let sample: f32 = self.voices.iter_mut().map(Voice::next_sample).sum();
        self.voices.retain(|v| !v.is_finished());
        Frame::from_sample(sample)
    }

    pub fn render(&mut self, frames: &mut [Frame]) {
        for frame in frames {
            *frame = self.render_frame();
        }
    }
}

impl ToneSink for ToneSynth {
    fn play_tone(&mut self, tone: ToneTrigger) {
        self.trigger(tone);
    }
}
