// Lock-free communication channels between the UI thread and the audio callback

use crate::messaging::command::Command;
use crate::messaging::notification::Notification;
use ringbuf::{HeapRb, traits::Split};

// One click per beat at 200 BPM is ~3.3 commands/second; a few dozen slots
// cover any UI stall without dropping clicks.
pub const COMMAND_RINGBUFFER_CAPACITY: usize = 64;
pub const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 64;

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}

pub type NotificationProducer = ringbuf::HeapProd<Notification>;
pub type NotificationConsumer = ringbuf::HeapCons<Notification>;

pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    let rb = HeapRb::<Notification>::new(capacity);
    rb.split()
}
