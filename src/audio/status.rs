// Output stream status, shared between the audio error callback and the UI

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    /// No stream (device missing or engine not created)
    Closed = 0,
    Opening = 1,
    Running = 2,
    /// The stream reported an error after starting
    Failed = 3,
}

impl From<u8> for OutputStatus {
    fn from(value: u8) -> Self {
        match value {
            1 => OutputStatus::Opening,
            2 => OutputStatus::Running,
            3 => OutputStatus::Failed,
            _ => OutputStatus::Closed,
        }
    }
}

/// Lock-free status cell, cloned into the stream error callback
#[derive(Clone)]
pub struct AtomicOutputStatus {
    inner: Arc<AtomicU8>,
}

impl AtomicOutputStatus {
    pub fn new(status: OutputStatus) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(status as u8)),
        }
    }

    pub fn get(&self) -> OutputStatus {
        OutputStatus::from(self.inner.load(Ordering::Relaxed))
    }

    pub fn set(&self, status: OutputStatus) {
        self.inner.store(status as u8, Ordering::Relaxed);
    }
}

impl Default for AtomicOutputStatus {
    fn default() -> Self {
        Self::new(OutputStatus::Closed)
    }
}

/// Negotiated stream format, shown in the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl OutputFormat {
    pub fn sample_rate_hz(&self) -> f32 {
        self.sample_rate as f32
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = match self.channels {
            1 => "mono".to_string(),
            2 => "stereo".to_string(),
            n => format!("{} channels", n),
        };
        write!(f, "{} Hz, {}", self.sample_rate, layout)
    }
}
