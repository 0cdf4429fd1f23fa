// Practice settings - tempo, interval, chord list and order, all persisted

use crate::persist::{KeyValueStore, PersistedValue};
use crate::sequencer::SelectionMode;
use std::ops::RangeInclusive;
use std::sync::Arc;

pub const BPM_KEY: &str = "chord-metronome-bpm";
pub const INTERVAL_KEY: &str = "chord-metronome-interval";
pub const CHORDS_KEY: &str = "chord-metronome-chords";
pub const RANDOM_MODE_KEY: &str = "chord-metronome-random-mode";

pub const BPM_RANGE: RangeInclusive<u32> = 40..=200;
pub const DEFAULT_BPM: u32 = 60;

/// Beats between chord changes
pub const INTERVAL_RANGE: RangeInclusive<u32> = 1..=16;
pub const DEFAULT_INTERVAL: u32 = 4;

pub const DEFAULT_CHORDS: [&str; 5] = ["C", "D", "E", "G", "A"];
pub const DEFAULT_RANDOM_MODE: bool = true;

fn default_chords() -> Vec<String> {
    DEFAULT_CHORDS.iter().map(|chord| chord.to_string()).collect()
}

fn clamp_to(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

/// User configuration, mirrored to storage on every change
#[derive(Debug)]
pub struct PracticeSettings {
    bpm: PersistedValue<u32>,
    interval: PersistedValue<u32>,
    chords: PersistedValue<Vec<String>>,
    random_mode: PersistedValue<bool>,
}

impl PracticeSettings {
    /// Load every setting from `store`, repairing values that break the
    /// range or non-empty-list rules
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut settings = Self {
            bpm: PersistedValue::load(store.clone(), BPM_KEY, DEFAULT_BPM),
            interval: PersistedValue::load(store.clone(), INTERVAL_KEY, DEFAULT_INTERVAL),
            chords: PersistedValue::load(store.clone(), CHORDS_KEY, default_chords()),
            random_mode: PersistedValue::load(store, RANDOM_MODE_KEY, DEFAULT_RANDOM_MODE),
        };

        let bpm = *settings.bpm.get();
        if !BPM_RANGE.contains(&bpm) {
            log::warn!("Stored tempo {} out of range, clamping", bpm);
            settings.set_bpm(bpm);
        }

        let interval = *settings.interval.get();
        if !INTERVAL_RANGE.contains(&interval) {
            log::warn!("Stored interval {} out of range, clamping", interval);
            settings.set_interval(interval);
        }

        if settings.chords.get().is_empty() {
            log::warn!("Stored chord list is empty, restoring defaults");
            settings.chords.set(default_chords());
        }

        settings
    }

    pub fn bpm(&self) -> u32 {
        *self.bpm.get()
    }

    pub fn interval(&self) -> u32 {
        *self.interval.get()
    }

    pub fn chords(&self) -> &[String] {
        self.chords.get()
    }

    pub fn random_mode(&self) -> bool {
        *self.random_mode.get()
    }

    pub fn selection_mode(&self) -> SelectionMode {
        SelectionMode::from_random_flag(self.random_mode())
    }

    /// False if any of the last writes failed
    pub fn is_persisted(&self) -> bool {
        self.bpm.is_persisted()
            && self.interval.is_persisted()
            && self.chords.is_persisted()
            && self.random_mode.is_persisted()
    }

    /// Set the tempo, clamped to `BPM_RANGE`; returns the stored value
    pub fn set_bpm(&mut self, bpm: u32) -> u32 {
        let bpm = clamp_to(bpm, &BPM_RANGE);
        self.bpm.set(bpm);
        bpm
    }

    /// Set the interval, clamped to `INTERVAL_RANGE`; returns the stored value
    pub fn set_interval(&mut self, interval: u32) -> u32 {
        let interval = clamp_to(interval, &INTERVAL_RANGE);
        self.interval.set(interval);
        interval
    }

    pub fn set_random_mode(&mut self, random: bool) {
        self.random_mode.set(random);
    }

    pub fn push_chord(&mut self, chord: String) {
        self.chords.modify(|chords| chords.push(chord));
    }

    /// Remove the chord at `index`; `None` if out of range
    ///
    /// Callers enforce the "chord in use" and "last chord" rules first.
    pub fn remove_chord(&mut self, index: usize) -> Option<String> {
        if index >= self.chords.get().len() {
            return None;
        }
        Some(self.chords.modify(|chords| chords.remove(index)))
    }
}
