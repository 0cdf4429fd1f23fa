// Command types - UI → audio thread communication

/// Messages consumed by the audio callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Restart the click sound from its first sample
    Click,
    /// Cut a click that is still ringing (sent when the exercise stops)
    Silence,
}
