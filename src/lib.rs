// Chord Metronome - library exports for the binary, tests and benchmarks

pub mod audio;
pub mod messaging;
pub mod persist;
pub mod practice;
pub mod sequencer;
pub mod settings;
pub mod ui;

// Re-export commonly used types for convenience
pub use audio::click::{ClickSound, ClickVoice};
pub use audio::engine::AudioEngine;
pub use audio::sink::{ClickSink, ClickTrigger};
pub use messaging::channels::{create_command_channel, create_notification_channel};
pub use persist::{FileStore, KeyValueStore, MemoryStore, PersistedValue, StorageError};
pub use practice::{Practice, PracticeError};
pub use sequencer::{
    ChordPicker, PlaybackState, PracticeSession, SelectionMode, SessionError, TickClock, TickEvent,
};
pub use settings::PracticeSettings;
