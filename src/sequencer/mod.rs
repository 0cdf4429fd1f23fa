// Sequencer module - chord selection, session state machine and beat clock

pub mod clock;
pub mod picker;
pub mod session;

pub use clock::{TickClock, beat_period};
pub use picker::{ChordPicker, SelectionMode};
pub use session::{PlaybackState, PracticeSession, SessionError, TickEvent};
