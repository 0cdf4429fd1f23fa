// Click sound - the metronome tick
// 800 Hz sine with an exponential gain ramp from 0.3 down to 0.01 over 100 ms

use std::f32::consts::PI;

pub const CLICK_FREQUENCY_HZ: f32 = 800.0;
pub const CLICK_DURATION_SECS: f32 = 0.1;
const START_GAIN: f32 = 0.3;
const END_GAIN: f32 = 0.01;

/// Pre-rendered click samples (mono)
#[derive(Debug, Clone)]
pub struct ClickSound {
    samples: Vec<f32>,
}

impl ClickSound {
    pub fn new(sample_rate: f32) -> Self {
        let num_samples = (CLICK_DURATION_SECS * sample_rate).round() as usize;
        Self {
            samples: Self::render(sample_rate, num_samples),
        }
    }

    fn render(sample_rate: f32, num_samples: usize) -> Vec<f32> {
        let phase_increment = 2.0 * PI * CLICK_FREQUENCY_HZ / sample_rate;
        let decay_ratio = END_GAIN / START_GAIN;

        (0..num_samples)
            .map(|i| {
                let t = i as f32 / num_samples as f32;
                // gain(t) = start * (end / start)^t
                let gain = START_GAIN * decay_ratio.powf(t);
                (i as f32 * phase_increment).sin() * gain
            })
            .collect()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Plays a `ClickSound`; lives inside the audio callback
#[derive(Debug, Clone)]
pub struct ClickVoice {
    sound: ClickSound,
    position: Option<usize>,
}

impl ClickVoice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sound: ClickSound::new(sample_rate),
            position: None,
        }
    }

    /// Start the click from its first sample, cutting any click still ringing
    pub fn trigger(&mut self) {
        self.position = Some(0);
    }

    pub fn silence(&mut self) {
        self.position = None;
    }

    pub fn is_active(&self) -> bool {
        self.position.is_some()
    }

    pub fn next_sample(&mut self) -> f32 {
        let Some(position) = self.position else {
            return 0.0;
        };

        match self.sound.samples().get(position) {
            Some(&sample) => {
                self.position = Some(position + 1);
                sample
            }
            None => {
                self.position = None;
                0.0
            }
        }
    }

    pub fn process_buffer(&mut self, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample = self.next_sample();
        }
    }
}
