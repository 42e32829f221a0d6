//! Host-facing layer: one writer attached to one shared buffer, driven
//! once per audio block.

mod patch;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use patch::{BufferSpec, RecorderPatch};

use dasp_sample::{Sample, ToSample};

use crate::buffer::{self, SharedBuffer};
use crate::writer::WriteHead;

/// A write head bound to a shared buffer.
///
/// `process_block` is the real-time entry point: it acquires the buffer
/// without blocking (skipping the block entirely when a non-real-time
/// actor holds it), re-reads the geometry, idles the head when the storage
/// generation changed since the last block, and raises the dirty flag at
/// most once per block, only when something was actually written.
pub struct Recorder {
    head: WriteHead,
    buffer: Option<SharedBuffer>,
    last_generation: Option<u64>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            head: WriteHead::new(),
            buffer: None,
            last_generation: None,
        }
    }

    pub fn with_buffer(buffer: SharedBuffer) -> Self {
        let mut recorder = Self::new();
        recorder.set_buffer(buffer);
        recorder
    }

    /// Attach a buffer. Any pending accumulation targets the old buffer
    /// and is dropped.
    pub fn set_buffer(&mut self, buffer: SharedBuffer) {
        self.buffer = Some(buffer);
        self.last_generation = None;
        self.head.reset();
    }

    /// Attach a buffer by name from the global registry.
    pub fn set_buffer_named(&mut self, name: &str) -> Result<(), String> {
        match buffer::global().get(name) {
            Some(buffer) => {
                self.set_buffer(buffer);
                Ok(())
            }
            None => Err(format!("no buffer named '{}'", name)),
        }
    }

    pub fn detach_buffer(&mut self) {
        self.buffer = None;
        self.last_generation = None;
        self.head.reset();
    }

    pub fn buffer(&self) -> Option<&SharedBuffer> {
        self.buffer.as_ref()
    }

    pub fn set_channel(&mut self, channel: usize) {
        self.head.set_channel(channel);
    }

    pub fn set_interpolate(&mut self, interpolate: bool) {
        self.head.set_interpolate(interpolate);
    }

    pub fn set_overdub(&mut self, overdub: f64) {
        self.head.set_overdub(overdub);
    }

    pub fn head(&self) -> &WriteHead {
        &self.head
    }

    /// Process one block of value and position streams.
    pub fn process_block<S>(&mut self, values: &[S], positions: &[S])
    where
        S: Sample + ToSample<f64>,
    {
        let Some(buffer) = &self.buffer else {
            return;
        };
        let Some(mut guard) = buffer.acquire() else {
            // Buffer busy this block. Writer state stays untouched; the
            // next block retries acquisition naturally.
            return;
        };

        if self.last_generation != Some(guard.generation()) {
            // The storage was replaced or resized since we last saw it:
            // a remembered index may point anywhere in the new geometry.
            self.head.reset();
            self.last_generation = Some(guard.generation());
        }

        let wrote = self
            .head
            .process_block(values, positions, &mut guard.view_mut());
        if wrote {
            guard.mark_dirty();
        }
    }

    /// Snapshot the current configuration, including attached buffer
    /// geometry.
    pub fn to_patch(&self) -> RecorderPatch {
        RecorderPatch {
            channel: self.head.channel(),
            interpolate: self.head.interpolate(),
            overdub: self.head.overdub(),
            buffer: self.buffer.as_ref().map(|buffer| {
                buffer.edit(|storage| BufferSpec {
                    frames: storage.frames(),
                    channels: storage.channels(),
                })
            }),
        }
    }

    /// Apply a configuration snapshot. Buffer geometry in the patch
    /// resizes the attached buffer, or creates a fresh one when none is
    /// attached.
    pub fn apply_patch(&mut self, patch: &RecorderPatch) {
        self.head.set_channel(patch.channel);
        self.head.set_interpolate(patch.interpolate);
        self.head.set_overdub(patch.overdub);
        if let Some(spec) = &patch.buffer {
            match &self.buffer {
                Some(buffer) => {
                    buffer.edit(|storage| {
                        if storage.frames() != spec.frames || storage.channels() != spec.channels
                        {
                            storage.resize(spec.frames, spec.channels);
                        }
                    });
                }
                None => self.set_buffer(SharedBuffer::new(spec.frames, spec.channels)),
            }
        }
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contended_buffer_skips_the_block() {
        let buffer = SharedBuffer::new(16, 1);
        let mut recorder = Recorder::with_buffer(buffer.clone());

        // Start a run so there is writer state to disturb.
        recorder.process_block(&[1.0_f32, 1.0], &[4.0_f32, 4.0]);
        assert!(recorder.head().is_writing());

        let guard = buffer.acquire().expect("uncontended acquire");
        recorder.process_block(&[9.0_f32, 9.0], &[4.0_f32, 9.0]);
        drop(guard);

        // The skipped block neither wrote nor disturbed the pending run.
        assert!(recorder.head().is_writing());
        buffer.edit(|storage| assert!(storage.samples().iter().all(|&s| s == 0.0)));
    }

    #[test]
    fn generation_change_idles_the_head() {
        let buffer = SharedBuffer::new(16, 1);
        let mut recorder = Recorder::with_buffer(buffer.clone());

        recorder.process_block(&[1.0_f32], &[5.0_f32]);
        assert!(recorder.head().is_writing());

        buffer.edit(|storage| storage.resize(32, 1));

        // Without the reset this would commit the stale slot 5 and fill
        // toward 7 in the new storage.
        recorder.process_block(&[2.0_f32], &[7.0_f32]);
        buffer.edit(|storage| assert!(storage.samples().iter().all(|&s| s == 0.0)));
        assert!(recorder.head().is_writing());
    }

    #[test]
    fn dirty_raised_only_when_something_was_written() {
        let buffer = SharedBuffer::new(16, 1);
        let mut recorder = Recorder::with_buffer(buffer.clone());

        // Accumulation only: no write, no dirty.
        recorder.process_block(&[1.0_f32, 2.0], &[4.0_f32, 4.0]);
        assert!(!buffer.take_dirty());

        // The move commits and fills: dirty.
        recorder.process_block(&[0.0_f32], &[8.0_f32]);
        assert!(buffer.take_dirty());
        assert!(!buffer.take_dirty());
    }

    #[test]
    fn registry_attach_by_name() {
        let name = "engine-test-buffer";
        crate::buffer::global().create(name, 8, 1);

        let mut recorder = Recorder::new();
        assert!(recorder.set_buffer_named("missing").is_err());
        recorder
            .set_buffer_named(name)
            .expect("registered buffer resolves");
        assert!(recorder.buffer().is_some());

        crate::buffer::global().remove(name);
    }

    #[test]
    fn patch_round_trip_restores_parameters() {
        let mut recorder = Recorder::with_buffer(SharedBuffer::new(64, 2));
        recorder.set_channel(1);
        recorder.set_interpolate(false);
        recorder.set_overdub(0.25);

        let json = recorder.to_patch().to_json().expect("serialize");
        let patch = RecorderPatch::from_json(&json).expect("parse");

        let mut restored = Recorder::new();
        restored.apply_patch(&patch);
        assert_eq!(restored.head().channel(), 1);
        assert!(!restored.head().interpolate());
        assert_eq!(restored.head().overdub(), 0.25);
        restored
            .buffer()
            .expect("patch creates the buffer")
            .edit(|storage| {
                assert_eq!(storage.frames(), 64);
                assert_eq!(storage.channels(), 2);
            });
    }
}
