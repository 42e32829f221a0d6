use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::view::BufferView;

/// Owned sample storage shared between the audio thread and non-real-time
/// actors (UI, file loaders).
///
/// The generation counter increments whenever the storage is replaced or
/// resized so writers can detect that their remembered frame positions no
/// longer refer to the same buffer.
pub struct BufferStorage {
    data: Vec<f32>,
    channels: usize,
    generation: u64,
    dirty: bool,
}

impl BufferStorage {
    pub fn new(frames: usize, channels: usize) -> Self {
        let channels = channels.max(1);
        Self {
            data: vec![0.0; frames * channels],
            channels,
            generation: 0,
            dirty: false,
        }
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.data.len() / self.channels
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resize the storage, clearing contents and bumping the generation.
    pub fn resize(&mut self, frames: usize, channels: usize) {
        let channels = channels.max(1);
        self.data.clear();
        self.data.resize(frames * channels, 0.0);
        self.channels = channels;
        self.generation += 1;
        self.dirty = false;
    }

    /// Replace the contents with already interleaved data.
    pub fn replace(&mut self, data: Vec<f32>, channels: usize) {
        self.channels = channels.max(1);
        self.data = data;
        self.generation += 1;
        self.dirty = false;
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    #[inline]
    pub fn view_mut(&mut self) -> BufferView<'_> {
        BufferView::new(&mut self.data, self.channels)
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Flag that at least one sample changed this block.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Consume the dirty flag. Display-side code polls this to decide
    /// whether a redraw is needed.
    #[inline]
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Cloneable handle to storage shared between threads.
///
/// The audio thread acquires with [`SharedBuffer::acquire`], which never
/// blocks: if a non-real-time actor currently holds the storage the block
/// is simply skipped and retried on the next callback.
#[derive(Clone)]
pub struct SharedBuffer {
    inner: Arc<Mutex<BufferStorage>>,
}

impl SharedBuffer {
    pub fn new(frames: usize, channels: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BufferStorage::new(frames, channels))),
        }
    }

    /// Non-blocking acquire for the audio thread. Returns `None` when the
    /// storage is contended; the guard releases on drop on every exit path.
    #[inline]
    pub fn acquire(&self) -> Option<BufferGuard<'_>> {
        self.inner.try_lock().ok().map(BufferGuard)
    }

    /// Blocking access for non-real-time actors. A poisoned lock still
    /// yields the storage; sample data has no invariants a panic can break.
    pub fn edit<R>(&self, f: impl FnOnce(&mut BufferStorage) -> R) -> R {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Whether the display side should redraw. See
    /// [`BufferStorage::take_dirty`].
    pub fn take_dirty(&self) -> bool {
        self.edit(|storage| storage.take_dirty())
    }
}

pub struct BufferGuard<'a>(MutexGuard<'a, BufferStorage>);

impl<'a> std::ops::Deref for BufferGuard<'a> {
    type Target = BufferStorage;

    fn deref(&self) -> &BufferStorage {
        &self.0
    }
}

impl<'a> std::ops::DerefMut for BufferGuard<'a> {
    fn deref_mut(&mut self) -> &mut BufferStorage {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_fails_while_storage_is_held() {
        let buffer = SharedBuffer::new(16, 1);
        let guard = buffer.acquire().expect("uncontended acquire");
        assert!(buffer.acquire().is_none(), "second acquire should fail");
        drop(guard);
        assert!(buffer.acquire().is_some());
    }

    #[test]
    fn resize_bumps_generation_and_clears() {
        let buffer = SharedBuffer::new(8, 2);
        buffer.edit(|storage| {
            storage.view_mut().set(0, 0, 1.0);
            let generation = storage.generation();
            storage.resize(16, 1);
            assert_eq!(storage.generation(), generation + 1);
            assert_eq!(storage.frames(), 16);
            assert_eq!(storage.channels(), 1);
            assert!(storage.samples().iter().all(|&s| s == 0.0));
        });
    }

    #[test]
    fn dirty_flag_is_consumed_once() {
        let buffer = SharedBuffer::new(8, 1);
        buffer.edit(|storage| storage.mark_dirty());
        assert!(buffer.take_dirty());
        assert!(!buffer.take_dirty());
    }
}
