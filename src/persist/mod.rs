// Persistence - durable key-value storage for user settings
// Values are JSON-encoded and stored one entry per key

pub mod store;
pub mod value;

pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use value::PersistedValue;
