// Click sink - where the practice loop sends its beats

use crate::messaging::channels::CommandProducer;
use crate::messaging::command::Command;

/// Receiver of metronome clicks
pub trait ClickSink {
    /// Sound one click
    fn click(&mut self);

    /// Cut any click still ringing
    fn silence(&mut self) {}
}

/// Forwards clicks to the audio engine through the command ringbuffer
pub struct ClickTrigger {
    command_tx: CommandProducer,
}

impl ClickTrigger {
    pub fn new(command_tx: CommandProducer) -> Self {
        Self { command_tx }
    }

    fn send(&mut self, cmd: Command) {
        // A full buffer means the audio thread is gone or stalled; the beat is dropped
        if ringbuf::traits::Producer::try_push(&mut self.command_tx, cmd).is_err() {
            log::debug!("Command buffer full, dropping {:?}", cmd);
        }
    }
}

impl ClickSink for ClickTrigger {
    fn click(&mut self) {
        self.send(Command::Click);
    }

    fn silence(&mut self) {
        self.send(Command::Silence);
    }
}
