// Practice - view-model tying settings, session, beat clock and click output together
//
// Everything here runs on the UI thread. `poll()` is called once per frame and
// plays every beat that fell due since the previous frame.

use crate::audio::sink::ClickSink;
use crate::sequencer::{
    PlaybackState, PracticeSession, SessionError, TickClock, TickEvent, beat_period,
};
use crate::settings::PracticeSettings;
use rand::Rng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PracticeError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Chord name cannot be empty")]
    EmptyChordName,

    #[error("Stop the exercise before changing {0}")]
    LockedWhilePlaying(&'static str),
}

pub struct Practice<R = StdRng> {
    settings: PracticeSettings,
    session: PracticeSession<R>,
    clock: TickClock,
    clicks: Box<dyn ClickSink>,
}

impl Practice<StdRng> {
    pub fn new(settings: PracticeSettings, clicks: Box<dyn ClickSink>) -> Self {
        Self::with_session(settings, PracticeSession::new(), clicks)
    }
}

impl<R: Rng> Practice<R> {
    pub fn with_session(
        settings: PracticeSettings,
        session: PracticeSession<R>,
        clicks: Box<dyn ClickSink>,
    ) -> Self {
        let clock = TickClock::from_bpm(settings.bpm());
        Self {
            settings,
            session,
            clock,
            clicks,
        }
    }

    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    pub fn session(&self) -> &PracticeSession<R> {
        &self.session
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state()
    }

    pub fn is_active(&self) -> bool {
        self.session.state().is_active()
    }

    /// Beats left before the upcoming chord takes over
    pub fn beats_until_change(&self) -> u64 {
        self.session.beats_until_change(self.settings.interval())
    }

    pub fn start(&mut self, now: Instant) -> Result<(), PracticeError> {
        self.session
            .start(self.settings.chords(), self.settings.selection_mode())?;

        self.clock.set_period(beat_period(self.settings.bpm()), now);
        self.clock.arm(now);

        log::info!(
            "Practice started at {} BPM, chord change every {} beats ({:?} order)",
            self.settings.bpm(),
            self.settings.interval(),
            self.settings.selection_mode()
        );
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PracticeError> {
        self.session.pause()?;
        self.clock.disarm();
        log::debug!("Practice paused at beat {}", self.session.beat());
        Ok(())
    }

    pub fn resume(&mut self, now: Instant) -> Result<(), PracticeError> {
        self.session.resume()?;
        self.clock.arm(now);
        log::debug!("Practice resumed at beat {}", self.session.beat());
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.session.state().is_active() {
            log::info!("Practice stopped after {} beats", self.session.beat());
        }
        self.session.stop();
        self.clock.disarm();
        self.clicks.silence();
    }

    /// Start, pause or resume depending on the current state
    pub fn toggle(&mut self, now: Instant) -> Result<(), PracticeError> {
        match self.session.state() {
            PlaybackState::Idle => self.start(now),
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(now),
        }
    }

    /// Play every beat due by `now`; returns the tick events in order
    ///
    /// Beats caught up in the same frame share a single click.
    pub fn poll(&mut self, now: Instant) -> Vec<TickEvent> {
        let due = self.clock.due_ticks(now);
        let mut events = Vec::with_capacity(due as usize);

        if due > 1 {
            log::debug!("Caught up {} beats with one click", due);
        }
        if due > 0 {
            self.clicks.click();
        }

        for _ in 0..due {
            let event = self.session.tick(
                self.settings.chords(),
                self.settings.selection_mode(),
                self.settings.interval(),
            );

            if let Some(event) = event {
                if event.chord_changed {
                    log::debug!(
                        "Beat {}: chord {:?}, next {:?}",
                        event.beat,
                        self.session.current_chord(),
                        self.session.next_chord()
                    );
                }
                events.push(event);
            }
        }

        events
    }

    /// How long the UI may sleep before the next beat, `None` when not playing
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.clock.time_until_next(now)
    }

    fn ensure_idle(&self, what: &'static str) -> Result<(), PracticeError> {
        if self.is_active() {
            return Err(PracticeError::LockedWhilePlaying(what));
        }
        Ok(())
    }

    pub fn set_bpm(&mut self, bpm: u32) -> Result<u32, PracticeError> {
        self.ensure_idle("the tempo")?;
        Ok(self.apply_bpm(bpm, Instant::now()))
    }

    /// Nudge the tempo, also while playing; a running beat restarts its
    /// countdown from `now` at the new period
    pub fn step_bpm(&mut self, delta: i32, now: Instant) -> u32 {
        let bpm = self.settings.bpm().saturating_add_signed(delta);
        self.apply_bpm(bpm, now)
    }

    fn apply_bpm(&mut self, bpm: u32, now: Instant) -> u32 {
        let bpm = self.settings.set_bpm(bpm);
        self.clock.set_period(beat_period(bpm), now);
        log::debug!("Tempo set to {} BPM", bpm);
        bpm
    }

    pub fn set_interval(&mut self, interval: u32) -> Result<u32, PracticeError> {
        self.ensure_idle("the chord interval")?;
        Ok(self.settings.set_interval(interval))
    }

    /// Nudge the chord interval, also while playing; the beat counter is kept
    pub fn step_interval(&mut self, delta: i32) -> u32 {
        let interval = self.settings.interval().saturating_add_signed(delta);
        self.settings.set_interval(interval)
    }

    pub fn set_random_mode(&mut self, random: bool) -> Result<(), PracticeError> {
        self.ensure_idle("the chord order")?;
        self.settings.set_random_mode(random);
        Ok(())
    }

    /// Append a chord; surrounding whitespace is trimmed
    pub fn add_chord(&mut self, name: &str) -> Result<(), PracticeError> {
        self.ensure_idle("the chord list")?;

        let name = name.trim();
        if name.is_empty() {
            return Err(PracticeError::EmptyChordName);
        }

        self.settings.push_chord(name.to_string());
        Ok(())
    }

    /// Remove the chord at `index` unless it is in use or the last one
    pub fn remove_chord(&mut self, index: usize) -> Result<String, PracticeError> {
        self.session.check_removal(self.settings.chords(), index)?;

        let removed = self
            .settings
            .remove_chord(index)
            .ok_or(SessionError::IndexOutOfRange(index))?;
        log::debug!("Removed chord {:?}", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{KeyValueStore, MemoryStore};
    use crate::sequencer::ChordPicker;
    use crate::settings::{BPM_KEY, CHORDS_KEY};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    /// Counts clicks and silences
    #[derive(Clone, Default)]
    struct CountingSink {
        clicks: Rc<Cell<u32>>,
        silences: Rc<Cell<u32>>,
    }

    impl ClickSink for CountingSink {
        fn click(&mut self) {
            self.clicks.set(self.clicks.get() + 1);
        }

        fn silence(&mut self) {
            self.silences.set(self.silences.get() + 1);
        }
    }

    fn practice_with(chords: &str, random: bool) -> (Practice, CountingSink, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.write(CHORDS_KEY, chords).unwrap();

        let mut settings = PracticeSettings::load(store.clone());
        settings.set_random_mode(random);
        settings.set_bpm(120);
        settings.set_interval(1);

        let sink = CountingSink::default();
        let practice = Practice::with_session(
            settings,
            PracticeSession::with_picker(ChordPicker::seeded(11)),
            Box::new(sink.clone()),
        );
        (practice, sink, store)
    }

    fn beat(n: u32) -> Duration {
        Duration::from_millis(500) * n
    }

    #[test]
    fn test_ticks_click_and_rotate() {
        let (mut practice, sink, _) = practice_with(r#"["C","D"]"#, false);
        let t0 = Instant::now();
        practice.start(t0).unwrap();

        let mut shown = vec![practice.session().current_chord().unwrap().to_string()];
        for n in 1..=4 {
            let events = practice.poll(t0 + beat(n));
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].beat, u64::from(n));
            shown.push(practice.session().current_chord().unwrap().to_string());
        }

        assert_eq!(shown, vec!["C", "D", "C", "D", "C"]);
        assert_eq!(sink.clicks.get(), 4);
    }

    #[test]
    fn test_poll_before_start_does_nothing() {
        let (mut practice, sink, _) = practice_with(r#"["C","D"]"#, false);

        assert!(practice.poll(Instant::now() + beat(10)).is_empty());
        assert_eq!(sink.clicks.get(), 0);
        assert_eq!(practice.time_until_next_tick(Instant::now()), None);
    }

    #[test]
    fn test_pause_and_resume_preserve_counters() {
        let (mut practice, sink, _) = practice_with(r#"["C","D","E"]"#, false);
        let t0 = Instant::now();
        practice.start(t0).unwrap();
        practice.poll(t0 + beat(1));

        practice.pause().unwrap();
        assert!(practice.poll(t0 + beat(20)).is_empty());
        assert_eq!(practice.session().beat(), 1);

        let resumed_at = t0 + beat(20);
        practice.resume(resumed_at).unwrap();
        let events = practice.poll(resumed_at + beat(1));
        assert_eq!(events[0].beat, 2);
        assert_eq!(sink.clicks.get(), 2);
    }

    #[test]
    fn test_stop_resets_and_silences() {
        let (mut practice, sink, _) = practice_with(r#"["C","D"]"#, false);
        let t0 = Instant::now();
        practice.start(t0).unwrap();
        practice.poll(t0 + beat(3));

        practice.stop();

        assert_eq!(practice.state(), PlaybackState::Idle);
        assert_eq!(practice.session().current_chord(), None);
        assert_eq!(practice.session().beat(), 0);
        assert_eq!(sink.silences.get(), 1);
        assert!(practice.poll(t0 + beat(10)).is_empty());
    }

    #[test]
    fn test_toggle_cycles_states() {
        let (mut practice, _, _) = practice_with(r#"["C","D"]"#, true);
        let now = Instant::now();

        practice.toggle(now).unwrap();
        assert_eq!(practice.state(), PlaybackState::Playing);
        practice.toggle(now).unwrap();
        assert_eq!(practice.state(), PlaybackState::Paused);
        practice.toggle(now).unwrap();
        assert_eq!(practice.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_removing_chord_in_use_leaves_everything_unchanged() {
        let (mut practice, _, store) = practice_with(r#"["C","D","E"]"#, false);
        practice.start(Instant::now()).unwrap();
        let before = store.read(CHORDS_KEY).unwrap();

        assert_eq!(
            practice.remove_chord(0),
            Err(PracticeError::Session(SessionError::ChordInUse(
                "C".to_string()
            )))
        );
        assert!(practice.remove_chord(1).is_err());

        assert_eq!(practice.settings().chords().len(), 3);
        assert_eq!(practice.session().current_chord(), Some("C"));
        assert_eq!(practice.session().next_chord(), Some("D"));
        assert_eq!(store.read(CHORDS_KEY).unwrap(), before);

        assert_eq!(practice.remove_chord(2).as_deref(), Ok("E"));
    }

    #[test]
    fn test_last_chord_cannot_be_removed() {
        let (mut practice, _, _) = practice_with(r#"["C"]"#, false);

        assert_eq!(
            practice.remove_chord(0),
            Err(PracticeError::Session(SessionError::LastChord))
        );
        assert_eq!(practice.settings().chords().len(), 1);
    }

    #[test]
    fn test_add_chord() {
        let (mut practice, _, store) = practice_with(r#"["C"]"#, false);

        practice.add_chord("  Am7 ").unwrap();
        assert_eq!(practice.add_chord("   "), Err(PracticeError::EmptyChordName));
        assert_eq!(
            store.read(CHORDS_KEY).unwrap().as_deref(),
            Some(r#"["C","Am7"]"#)
        );

        practice.start(Instant::now()).unwrap();
        assert_eq!(
            practice.add_chord("G"),
            Err(PracticeError::LockedWhilePlaying("the chord list"))
        );
    }

    #[test]
    fn test_settings_locked_while_playing() {
        let (mut practice, _, _) = practice_with(r#"["C","D"]"#, false);
        practice.start(Instant::now()).unwrap();

        assert!(practice.set_bpm(80).is_err());
        assert!(practice.set_interval(3).is_err());
        assert!(practice.set_random_mode(true).is_err());
        assert_eq!(practice.settings().bpm(), 120);

        practice.stop();
        assert_eq!(practice.set_bpm(80), Ok(80));
    }

    #[test]
    fn test_steppers_clamp() {
        let (mut practice, _, _) = practice_with(r#"["C"]"#, false);

        let now = Instant::now();

        practice.set_bpm(40).unwrap();
        assert_eq!(practice.step_bpm(-1, now), 40);
        practice.set_bpm(200).unwrap();
        assert_eq!(practice.step_bpm(1, now), 200);

        assert_eq!(practice.step_interval(-5), 1);
        assert_eq!(practice.step_interval(1), 2);
        practice.set_interval(16).unwrap();
        assert_eq!(practice.step_interval(1), 16);
    }

    #[test]
    fn test_step_bpm_while_playing_keeps_position() {
        let (mut practice, sink, store) = practice_with(r#"["C","D","E"]"#, false);
        let t0 = Instant::now();
        practice.start(t0).unwrap();
        practice.poll(t0 + beat(1));
        let current = practice.session().current_chord().map(str::to_string);
        let next = practice.session().next_chord().map(str::to_string);

        // Nudged a quarter beat after the first tick
        let nudged_at = t0 + beat(1) + Duration::from_millis(125);
        assert_eq!(practice.step_bpm(1, nudged_at), 121);

        assert_eq!(practice.state(), PlaybackState::Playing);
        assert_eq!(practice.session().beat(), 1);
        assert_eq!(practice.session().current_chord().map(str::to_string), current);
        assert_eq!(practice.session().next_chord().map(str::to_string), next);
        assert_eq!(store.read(BPM_KEY).unwrap().as_deref(), Some("121"));
        assert_eq!(
            practice.time_until_next_tick(nudged_at),
            Some(beat_period(121))
        );

        // Nothing fires on the old grid, the next beat lands one new period later
        assert!(practice.poll(t0 + beat(2)).is_empty());
        let events = practice.poll(nudged_at + beat_period(121));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].beat, 2);
        assert_eq!(sink.clicks.get(), 2);
    }

    #[test]
    fn test_step_interval_while_playing_keeps_beat_count() {
        let (mut practice, _, _) = practice_with(r#"["C","D","E"]"#, false);
        let t0 = Instant::now();
        practice.start(t0).unwrap();
        practice.poll(t0 + beat(1));
        assert_eq!(practice.session().current_chord(), Some("D"));

        assert_eq!(practice.step_interval(1), 2);
        assert_eq!(practice.session().beat(), 1);

        let events = practice.poll(t0 + beat(2));
        assert_eq!(events[0].beat, 2);
        assert!(events[0].chord_changed);
        assert_eq!(practice.session().current_chord(), Some("E"));

        let events = practice.poll(t0 + beat(3));
        assert!(!events[0].chord_changed);
    }

    #[test]
    fn test_catch_up_beats_share_one_click() {
        let (mut practice, sink, _) = practice_with(r#"["C","D"]"#, false);
        let t0 = Instant::now();
        practice.start(t0).unwrap();

        let events = practice.poll(t0 + beat(3));

        assert_eq!(events.len(), 3);
        assert_eq!(events[2].beat, 3);
        assert_eq!(sink.clicks.get(), 1);
        assert_eq!(practice.session().current_chord(), Some("D"));
    }

    #[test]
    fn test_new_tempo_used_on_next_start() {
        let (mut practice, _, _) = practice_with(r#"["C","D"]"#, false);
        practice.set_bpm(60).unwrap();

        let t0 = Instant::now();
        practice.start(t0).unwrap();

        assert!(practice.poll(t0 + Duration::from_millis(900)).is_empty());
        assert_eq!(practice.poll(t0 + Duration::from_secs(1)).len(), 1);
    }
}
