// Messaging - UI ↔ audio thread commands and user-facing notifications

pub mod channels;
pub mod command;
pub mod notification;
