use crate::error::Result;

/// Abstract interface for durable key-value storage.
///
/// This trait handles the "how" of persistence (filesystem vs memory),
/// while [`NoteStore`](super::NoteStore) handles the "what": which records
/// exist, when they are written and how they are validated on load.
pub trait KeyValueStore {
    /// Read the raw value for `key`.
    /// Returns Ok(None) when the key has never been written.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
