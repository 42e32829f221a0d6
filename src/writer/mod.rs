//! The write head: consumes a (value, position) stream one sample at a
//! time and scatters it into a buffer, averaging values that land on one
//! slot and gap-filling between non-adjacent slots.

mod gap_fill;

use dasp_sample::{Sample, ToSample};

use crate::buffer::BufferView;

/// Channel selection is clamped to this many channels at assignment time,
/// then re-clamped against the live channel count every block.
pub const MAX_CHANNELS: usize = 4;

/// Sample-synchronous buffer writer.
///
/// The head is either idle (no position seen yet, or a negative position
/// stopped it) or writing. While writing it accumulates every input value
/// that targets the current slot and commits their mean when the position
/// moves on, stops, or jumps; jumps additionally gap-fill the slots crossed.
/// The accumulator deliberately survives the end of a block so a run that
/// spans blocks still averages correctly.
///
/// Accumulation is f64 regardless of the input stream width; buffer storage
/// stays f32.
pub struct WriteHead {
    last_index: Option<usize>,
    pending_sum: f64,
    pending_count: u32,
    channel: usize,
    interpolate: bool,
    overdub: f64,
}

impl WriteHead {
    pub fn new() -> Self {
        Self {
            last_index: None,
            pending_sum: 0.0,
            pending_count: 0,
            channel: 0,
            interpolate: true,
            overdub: 0.0,
        }
    }

    /// Select the output channel, clamped to `0..MAX_CHANNELS`.
    pub fn set_channel(&mut self, channel: usize) {
        self.channel = channel.min(MAX_CHANNELS - 1);
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Linear interpolation toward the incoming value during gap fill;
    /// off means the committed average is repeated across the gap.
    pub fn set_interpolate(&mut self, interpolate: bool) {
        self.interpolate = interpolate;
    }

    pub fn interpolate(&self) -> bool {
        self.interpolate
    }

    /// Blend coefficient for existing buffer content: `0` overwrites,
    /// anything else writes `existing * overdub + new`. Deliberately
    /// unclamped; values outside the unit range grow or decay feedback.
    pub fn set_overdub(&mut self, overdub: f64) {
        self.overdub = overdub;
    }

    pub fn overdub(&self) -> f64 {
        self.overdub
    }

    pub fn is_writing(&self) -> bool {
        self.last_index.is_some()
    }

    /// Drop any pending accumulation and go idle. Called when the target
    /// buffer identity changes between blocks, so a remembered index is
    /// never written into a different buffer.
    pub fn reset(&mut self) {
        self.last_index = None;
        self.pending_sum = 0.0;
        self.pending_count = 0;
    }

    /// Process one block of equal-length value and position streams.
    ///
    /// Positions may be fractional (truncated) and out of range (wrapped
    /// into the buffer); a negative position is the stop signal. Returns
    /// whether any buffer slot was written, which feeds the per-block
    /// dirty notification. No allocation happens here; work is bounded by
    /// the block length plus the total index distance moved.
    pub fn process_block<S>(
        &mut self,
        values: &[S],
        positions: &[S],
        view: &mut BufferView,
    ) -> bool
    where
        S: Sample + ToSample<f64>,
    {
        let frames = view.frames();
        if frames == 0 {
            return false;
        }
        // Geometry is re-read every block; the buffer may have been
        // replaced or resized since the last one.
        let channel = self.channel.min(view.channels() - 1);

        let mut wrote = false;
        for (value, position) in values.iter().zip(positions) {
            let value: f64 = value.to_sample();
            let position: f64 = position.to_sample();

            if position < 0.0 {
                // Stop signal: flush the pending average, then idle until
                // the next non-negative position.
                if let Some(last) = self.last_index.take() {
                    gap_fill::commit(view, last, channel, self.pending_mean(), self.overdub);
                    wrote = true;
                }
                self.pending_sum = 0.0;
                self.pending_count = 0;
                continue;
            }

            let index = wrap_index(position as i64, frames as i64);
            match self.last_index {
                None => {
                    // Resuming from idle starts a fresh run; it never fills
                    // the gap back to wherever the head stopped.
                    self.last_index = Some(index);
                    self.pending_sum = value;
                    self.pending_count = 1;
                }
                Some(last) if last == index => {
                    self.pending_sum += value;
                    self.pending_count += 1;
                }
                Some(last) => {
                    let committed = self.pending_mean();
                    gap_fill::commit(view, last, channel, committed, self.overdub);
                    gap_fill::fill_gap(
                        view,
                        channel,
                        last,
                        index,
                        committed,
                        value,
                        self.interpolate,
                        self.overdub,
                    );
                    wrote = true;
                    self.last_index = Some(index);
                    self.pending_sum = value;
                    self.pending_count = 1;
                }
            }
        }
        wrote
    }

    fn pending_mean(&self) -> f64 {
        if self.pending_count == 0 {
            0.0
        } else {
            self.pending_sum / f64::from(self.pending_count)
        }
    }
}

impl Default for WriteHead {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a truncated position into `[0, frames)`. The position stream is
/// assumed to stay within a small multiple of the buffer bounds, so
/// stepwise reduction is cheaper than a division here.
#[inline]
fn wrap_index(mut index: i64, frames: i64) -> usize {
    while index >= frames {
        index -= frames;
    }
    while index < 0 {
        index += frames;
    }
    index as usize
}
