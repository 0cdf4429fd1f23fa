// Practice session - transient playback state of one exercise
// idle → playing → (paused ⇄ playing) → idle

use super::picker::{ChordPicker, SelectionMode};
use rand::Rng;
use rand::rngs::StdRng;

/// Playback state of the exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    /// Playing or paused: an exercise is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }

    /// Only a playing session consumes ticks
    pub fn is_ticking(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Add at least one chord before starting")]
    EmptyChordList,

    #[error("Cannot remove chord \"{0}\" while it is being practised")]
    ChordInUse(String),

    #[error("The chord list needs at least one chord")]
    LastChord,

    #[error("No chord at position {0}")]
    IndexOutOfRange(usize),

    #[error("Cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: PlaybackState,
    },
}

/// Outcome of one consumed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    /// Beat counter after the tick (first tick is beat 1)
    pub beat: u64,
    /// The upcoming chord became the current one on this tick
    pub chord_changed: bool,
}

/// Current/next chord, beat counter and playback state
#[derive(Debug, Clone)]
pub struct PracticeSession<R = StdRng> {
    state: PlaybackState,
    current_chord: Option<String>,
    next_chord: Option<String>,
    beat: u64,
    picker: ChordPicker<R>,
}

impl PracticeSession<StdRng> {
    pub fn new() -> Self {
        Self::with_picker(ChordPicker::new())
    }
}

impl Default for PracticeSession<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PracticeSession<R> {
    pub fn with_picker(picker: ChordPicker<R>) -> Self {
        Self {
            state: PlaybackState::Idle,
            current_chord: None,
            next_chord: None,
            beat: 0,
            picker,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_chord(&self) -> Option<&str> {
        self.current_chord.as_deref()
    }

    pub fn next_chord(&self) -> Option<&str> {
        self.next_chord.as_deref()
    }

    pub fn beat(&self) -> u64 {
        self.beat
    }

    /// Begin an exercise: pick the opening chord and precompute the one after it
    ///
    /// An empty list leaves the session untouched.
    pub fn start(&mut self, chords: &[String], mode: SelectionMode) -> Result<(), SessionError> {
        if self.state.is_active() {
            return Err(SessionError::InvalidTransition {
                action: "start",
                state: self.state,
            });
        }

        let first = self
            .picker
            .first(chords, mode)
            .ok_or(SessionError::EmptyChordList)?;
        let next = self.picker.next_after(&first, chords, mode);

        self.state = PlaybackState::Playing;
        self.beat = 0;
        self.current_chord = Some(first);
        self.next_chord = next;
        Ok(())
    }

    /// Stop consuming ticks, keeping chords and beat counter
    pub fn pause(&mut self) -> Result<(), SessionError> {
        match self.state {
            PlaybackState::Playing => {
                self.state = PlaybackState::Paused;
                Ok(())
            }
            state => Err(SessionError::InvalidTransition {
                action: "pause",
                state,
            }),
        }
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        match self.state {
            PlaybackState::Paused => {
                self.state = PlaybackState::Playing;
                Ok(())
            }
            state => Err(SessionError::InvalidTransition {
                action: "resume",
                state,
            }),
        }
    }

    /// Back to idle, clearing every piece of transient state
    pub fn stop(&mut self) {
        self.state = PlaybackState::Idle;
        self.current_chord = None;
        self.next_chord = None;
        self.beat = 0;
        self.picker.reset();
    }

    /// Consume one beat. Every `interval` beats the precomputed next chord
    /// becomes current and a new next chord is drawn from it.
    ///
    /// Returns `None` unless playing.
    pub fn tick(
        &mut self,
        chords: &[String],
        mode: SelectionMode,
        interval: u32,
    ) -> Option<TickEvent> {
        if !self.state.is_ticking() {
            return None;
        }

        self.beat += 1;

        let mut chord_changed = false;
        if self.beat % u64::from(interval.max(1)) == 0 {
            if let Some(upcoming) = self.next_chord.take() {
                self.next_chord = self.picker.next_after(&upcoming, chords, mode);
                self.current_chord = Some(upcoming);
                chord_changed = true;
            }
        }

        Some(TickEvent {
            beat: self.beat,
            chord_changed,
        })
    }

    /// Beats left before the next chord change
    pub fn beats_until_change(&self, interval: u32) -> u64 {
        let interval = u64::from(interval.max(1));
        interval - (self.beat % interval)
    }

    /// True if `chord` is shown as current or next in a running exercise
    pub fn is_in_use(&self, chord: &str) -> bool {
        self.state.is_active()
            && (self.current_chord.as_deref() == Some(chord)
                || self.next_chord.as_deref() == Some(chord))
    }

    /// Check whether the chord at `index` may be removed from `chords`
    pub fn check_removal(&self, chords: &[String], index: usize) -> Result<(), SessionError> {
        let chord = chords
            .get(index)
            .ok_or(SessionError::IndexOutOfRange(index))?;

        if self.is_in_use(chord) {
            return Err(SessionError::ChordInUse(chord.clone()));
        }

        if chords.len() <= 1 {
            return Err(SessionError::LastChord);
        }

        Ok(())
    }
}
