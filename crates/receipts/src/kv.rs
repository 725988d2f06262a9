use ember_primitives::HashMap;
use thiserror::Error;

/// Failure of the underlying key-value backend.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("key-value backend failure: {0}")]
    Backend(String),
}

/// Narrow handle to the key-value store the receipt index persists into.
///
/// Concurrency contract: a single writer per key at a time; reads may
/// proceed concurrently.
pub trait KeyValueStore {
    /// Reads the value under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), KvError>;

    /// Removes `key`. Deleting an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), KvError>;
}

/// A map-backed store for tests and light embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryKv {
    inner: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.inner.get(key).cloned())
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), KvError> {
        self.inner.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KvError> {
        self.inner.remove(key);
        Ok(())
    }
}
