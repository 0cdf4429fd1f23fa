// Chord picker - chooses the first chord of an exercise and every chord after it

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Order in which chords are practised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Uniform pick among the chords other than the current one
    #[default]
    Random,
    /// List order, wrapping around at the end
    Sequential,
}

impl SelectionMode {
    /// Mode from the persisted "random order" checkbox
    pub fn from_random_flag(random: bool) -> Self {
        if random {
            SelectionMode::Random
        } else {
            SelectionMode::Sequential
        }
    }

    pub fn is_random(&self) -> bool {
        matches!(self, SelectionMode::Random)
    }
}

/// Chord selection state: the sequential cursor plus a random source
#[derive(Debug, Clone)]
pub struct ChordPicker<R = StdRng> {
    index: usize,
    rng: R,
}

impl ChordPicker<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic picker, used by tests and benchmarks
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for ChordPicker<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ChordPicker<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { index: 0, rng }
    }

    /// Position of the chord last returned in sequential mode
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Opening chord of an exercise, `None` for an empty list
    pub fn first(&mut self, chords: &[String], mode: SelectionMode) -> Option<String> {
        match mode {
            SelectionMode::Random => chords.choose(&mut self.rng).cloned(),
            SelectionMode::Sequential => {
                self.index = 0;
                chords.first().cloned()
            }
        }
    }

    /// Chord to play after `current`, `None` for an empty list
    pub fn next_after(
        &mut self,
        current: &str,
        chords: &[String],
        mode: SelectionMode,
    ) -> Option<String> {
        if chords.is_empty() {
            return None;
        }

        match mode {
            SelectionMode::Random => {
                let candidates: Vec<&String> =
                    chords.iter().filter(|chord| *chord != current).collect();

                match candidates.choose(&mut self.rng) {
                    Some(chord) => Some((*chord).clone()),
                    // Every entry equals `current` (including a one-chord list)
                    None => Some(current.to_string()),
                }
            }
            SelectionMode::Sequential => {
                // Prefer the cursor so duplicated chords keep their own slot,
                // then fall back to the first occurrence of `current`
                let anchor = if chords.get(self.index).is_some_and(|c| c == current) {
                    self.index
                } else {
                    chords
                        .iter()
                        .position(|c| c == current)
                        .unwrap_or(self.index)
                };

                self.index = (anchor + 1) % chords.len();
                Some(chords[self.index].clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    fn chords(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_selection_mode_from_flag() {
        assert_eq!(SelectionMode::from_random_flag(true), SelectionMode::Random);
        assert_eq!(
            SelectionMode::from_random_flag(false),
            SelectionMode::Sequential
        );
        assert!(SelectionMode::default().is_random());
    }

    #[test]
    fn test_empty_list_yields_nothing() {
        let mut picker = ChordPicker::seeded(1);

        assert_eq!(picker.first(&[], SelectionMode::Random), None);
        assert_eq!(picker.first(&[], SelectionMode::Sequential), None);
        assert_eq!(picker.next_after("C", &[], SelectionMode::Random), None);
        assert_eq!(picker.next_after("C", &[], SelectionMode::Sequential), None);
    }

    #[test]
    fn test_sequential_first_is_head_of_list() {
        let list = chords(&["Em", "C", "G"]);
        let mut picker = ChordPicker::seeded(1);

        assert_eq!(picker.first(&list, SelectionMode::Sequential).as_deref(), Some("Em"));
        assert_eq!(picker.index(), 0);
    }

    #[test]
    fn test_sequential_cycles_in_list_order() {
        let list = chords(&["C", "D", "E", "G", "A"]);
        let mut picker = ChordPicker::seeded(1);

        let mut current = picker.first(&list, SelectionMode::Sequential).unwrap();
        let mut seen = vec![current.clone()];
        for _ in 0..9 {
            current = picker
                .next_after(&current, &list, SelectionMode::Sequential)
                .unwrap();
            seen.push(current.clone());
        }

        assert_eq!(
            seen,
            chords(&["C", "D", "E", "G", "A", "C", "D", "E", "G", "A"])
        );
    }

    #[test]
    fn test_sequential_duplicates_keep_their_slot() {
        let list = chords(&["C", "D", "C", "G"]);
        let mut picker = ChordPicker::seeded(1);

        let mut current = picker.first(&list, SelectionMode::Sequential).unwrap();
        let mut seen = vec![current.clone()];
        for _ in 0..4 {
            current = picker
                .next_after(&current, &list, SelectionMode::Sequential)
                .unwrap();
            seen.push(current.clone());
        }

        assert_eq!(seen, chords(&["C", "D", "C", "G", "C"]));
    }

    #[test]
    fn test_sequential_resyncs_on_foreign_chord() {
        let list = chords(&["C", "D", "E"]);
        let mut picker = ChordPicker::seeded(1);
        picker.first(&list, SelectionMode::Sequential);

        // "E" is not under the cursor, so the cursor jumps to it first
        assert_eq!(
            picker.next_after("E", &list, SelectionMode::Sequential).as_deref(),
            Some("C")
        );

        // A chord that is not in the list just advances the cursor
        assert_eq!(
            picker.next_after("B7", &list, SelectionMode::Sequential).as_deref(),
            Some("D")
        );
    }

    #[test]
    fn test_sequential_cursor_past_end_after_list_shrinks() {
        let mut picker = ChordPicker::seeded(1);
        let long = chords(&["C", "D", "E", "G"]);
        picker.first(&long, SelectionMode::Sequential);
        for chord in ["C", "D", "E"] {
            picker.next_after(chord, &long, SelectionMode::Sequential);
        }
        assert_eq!(picker.index(), 3);

        let short = chords(&["A", "B"]);
        assert_eq!(
            picker.next_after("X", &short, SelectionMode::Sequential).as_deref(),
            Some("A")
        );
    }

    #[test]
    fn test_random_single_chord_repeats() {
        let list = chords(&["Am"]);
        let mut picker = ChordPicker::seeded(7);

        assert_eq!(picker.first(&list, SelectionMode::Random).as_deref(), Some("Am"));
        assert_eq!(
            picker.next_after("Am", &list, SelectionMode::Random).as_deref(),
            Some("Am")
        );
    }

    #[test]
    fn test_random_all_duplicates_returns_current() {
        let list = chords(&["C", "C"]);
        let mut picker = ChordPicker::seeded(7);

        assert_eq!(
            picker.next_after("C", &list, SelectionMode::Random).as_deref(),
            Some("C")
        );
    }

    #[test]
    fn test_random_reaches_every_other_chord() {
        let list = chords(&["C", "D", "E", "G"]);
        let mut picker = ChordPicker::seeded(42);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let next = picker.next_after("C", &list, SelectionMode::Random).unwrap();
            seen.insert(next);
        }

        assert_eq!(seen.len(), 3);
        assert!(!seen.contains("C"));
    }

    #[test]
    fn prop_random_next_differs_from_current() {
        fn property(names: Vec<String>, pick: usize, seed: u64) -> TestResult {
            if names.len() < 2 {
                return TestResult::discard();
            }
            let current = names[pick % names.len()].clone();
            if names.iter().all(|name| *name == current) {
                return TestResult::discard();
            }

            let mut picker = ChordPicker::seeded(seed);
            let next = picker.next_after(&current, &names, SelectionMode::Random);

            TestResult::from_bool(
                next.as_ref().is_some_and(|n| *n != current && names.contains(n)),
            )
        }

        quickcheck::QuickCheck::new()
            .tests(200)
            .quickcheck(property as fn(Vec<String>, usize, u64) -> TestResult);
    }

    #[test]
    fn prop_sequential_visits_every_position_once_per_cycle() {
        fn property(len: u8) -> TestResult {
            let len = (len % 12) as usize;
            if len < 2 {
                return TestResult::discard();
            }
            let list: Vec<String> = (0..len).map(|i| format!("chord{}", i)).collect();

            let mut picker = ChordPicker::seeded(0);
            let mut current = picker.first(&list, SelectionMode::Sequential).unwrap();
            let mut cycle = vec![current.clone()];
            for _ in 1..len {
                current = picker
                    .next_after(&current, &list, SelectionMode::Sequential)
                    .unwrap();
                cycle.push(current.clone());
            }
            let wrapped = picker.next_after(&current, &list, SelectionMode::Sequential);

            TestResult::from_bool(cycle == list && wrapped.as_ref() == list.first())
        }

        quickcheck::QuickCheck::new()
            .tests(50)
            .quickcheck(property as fn(u8) -> TestResult);
    }
}
