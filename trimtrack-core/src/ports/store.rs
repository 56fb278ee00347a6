//! Key-value store port - storage medium abstraction

use crate::domain::result::Result;

/// Flat string key to string value storage, the same shape as browser
/// local storage.
///
/// Implementations persist each `set` before returning. A failed `set` must
/// leave the previous value in place. There is no locking: two writers of
/// the same key race, and the last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written or was removed
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently present, sorted
    fn keys(&self) -> Result<Vec<String>>;
}
