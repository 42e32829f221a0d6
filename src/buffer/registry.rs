use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::shared::SharedBuffer;

/// Named buffer lookup, mirroring the host's buffer-object registry.
///
/// Writers reference buffers by name; the actor that creates, resizes or
/// replaces a buffer does so through the same handle the writer holds, so
/// lookups resolve once and stay valid across geometry changes.
pub struct BufferRegistry {
    buffers: Mutex<FxHashMap<String, SharedBuffer>>,
}

impl BufferRegistry {
    pub fn new() -> Self {
        Self {
            buffers: Mutex::new(FxHashMap::default()),
        }
    }

    /// Create and register a buffer, replacing any previous entry with the
    /// same name.
    pub fn create(&self, name: &str, frames: usize, channels: usize) -> SharedBuffer {
        let buffer = SharedBuffer::new(frames, channels);
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), buffer.clone());
        buffer
    }

    pub fn get(&self, name: &str) -> Option<SharedBuffer> {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn remove(&self, name: &str) -> Option<SharedBuffer> {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl Default for BufferRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_REGISTRY: Lazy<BufferRegistry> = Lazy::new(BufferRegistry::new);

/// Process-wide registry shared by all writers, analogous to the host's
/// global buffer namespace.
pub fn global() -> &'static BufferRegistry {
    &GLOBAL_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_lookup_remove() {
        let registry = BufferRegistry::new();
        registry.create("loop", 64, 2);

        let found = registry.get("loop").expect("registered buffer");
        found.edit(|storage| {
            assert_eq!(storage.frames(), 64);
            assert_eq!(storage.channels(), 2);
        });

        assert!(registry.get("missing").is_none());
        assert!(registry.remove("loop").is_some());
        assert!(registry.get("loop").is_none());
    }

    #[test]
    fn create_replaces_existing_entry() {
        let registry = BufferRegistry::new();
        registry.create("a", 16, 1);
        registry.create("a", 32, 1);
        let found = registry.get("a").expect("registered buffer");
        found.edit(|storage| assert_eq!(storage.frames(), 32));
        assert_eq!(registry.names(), vec!["a".to_string()]);
    }
}
