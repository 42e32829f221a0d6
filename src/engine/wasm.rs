//! JavaScript bindings for one recorder + buffer pair.

use wasm_bindgen::prelude::*;

use crate::buffer::SharedBuffer;
use crate::engine::{Recorder, RecorderPatch};

#[cfg(target_arch = "wasm32")]
fn log_console(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
fn log_console(_message: &str) {}

#[wasm_bindgen]
pub struct TapeheadHandle {
    recorder: Recorder,
    buffer: SharedBuffer,
}

#[wasm_bindgen]
impl TapeheadHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(frames: usize, channels: usize) -> TapeheadHandle {
        log_console(&format!(
            "tapehead: created {} frame / {} channel buffer",
            frames, channels
        ));
        let buffer = SharedBuffer::new(frames, channels);
        TapeheadHandle {
            recorder: Recorder::with_buffer(buffer.clone()),
            buffer,
        }
    }

    /// Process one block. `values` and `positions` must have equal length;
    /// negative positions pause the writer.
    pub fn process(&mut self, values: &[f32], positions: &[f32]) {
        self.recorder.process_block(values, positions);
    }

    pub fn set_channel(&mut self, channel: usize) {
        self.recorder.set_channel(channel);
    }

    pub fn set_interpolate(&mut self, interpolate: bool) {
        self.recorder.set_interpolate(interpolate);
    }

    pub fn set_overdub(&mut self, overdub: f64) {
        self.recorder.set_overdub(overdub);
    }

    pub fn resize(&mut self, frames: usize, channels: usize) {
        self.buffer
            .edit(|storage| storage.resize(frames, channels));
    }

    pub fn clear(&mut self) {
        self.buffer.edit(|storage| storage.clear());
    }

    pub fn frames(&self) -> usize {
        self.buffer.edit(|storage| storage.frames())
    }

    pub fn channels(&self) -> usize {
        self.buffer.edit(|storage| storage.channels())
    }

    /// Whether buffer content changed since the last call; drives waveform
    /// redraws on the JS side.
    pub fn take_dirty(&mut self) -> bool {
        self.buffer.take_dirty()
    }

    /// Copy of one channel for display. Not a live view; call again after
    /// `take_dirty` reports a change.
    pub fn channel_snapshot(&self, channel: usize) -> js_sys::Float32Array {
        let samples = self
            .buffer
            .edit(|storage| storage.view_mut().copy_channel(channel));
        js_sys::Float32Array::from(&samples[..])
    }

    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.recorder.to_patch())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_state(&mut self, state: JsValue) -> Result<(), JsValue> {
        let patch: RecorderPatch = serde_wasm_bindgen::from_value(state)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.recorder.apply_patch(&patch);
        Ok(())
    }
}
