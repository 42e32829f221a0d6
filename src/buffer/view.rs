/// Bounds-checked view over externally owned interleaved sample storage.
///
/// Frames are stored as `[ch0, ch1, ..., chN]` per frame; a sample lives at
/// `frame * channels + channel`. The view is borrowed for the scope of one
/// audio block and never held across blocks.
pub struct BufferView<'a> {
    data: &'a mut [f32],
    frames: usize,
    channels: usize,
}

impl<'a> BufferView<'a> {
    /// Wrap existing interleaved data. Trailing samples that do not form a
    /// complete frame are ignored.
    #[inline]
    pub fn new(data: &'a mut [f32], channels: usize) -> Self {
        let channels = channels.max(1);
        let frames = data.len() / channels;
        Self {
            data,
            frames,
            channels,
        }
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn get(&self, frame: usize, channel: usize) -> f32 {
        debug_assert!(frame < self.frames && channel < self.channels);
        self.data[frame * self.channels + channel]
    }

    #[inline]
    pub fn set(&mut self, frame: usize, channel: usize, value: f32) {
        debug_assert!(frame < self.frames && channel < self.channels);
        self.data[frame * self.channels + channel] = value;
    }

    /// Copy one channel out into a freshly allocated vector. Display-side
    /// helper; not for use on the audio thread.
    pub fn copy_channel(&self, channel: usize) -> Vec<f32> {
        let channel = channel.min(self.channels - 1);
        (0..self.frames)
            .map(|frame| self.data[frame * self.channels + channel])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_addresses_interleaved_frames() {
        let mut data = vec![0.0; 8];
        let mut view = BufferView::new(&mut data, 2);
        assert_eq!(view.frames(), 4);
        assert_eq!(view.channels(), 2);

        view.set(1, 0, 0.5);
        view.set(1, 1, -0.5);
        assert_eq!(view.get(1, 0), 0.5);
        assert_eq!(view.get(1, 1), -0.5);
        assert_eq!(data[2], 0.5);
        assert_eq!(data[3], -0.5);
    }

    #[test]
    fn partial_trailing_frame_is_ignored() {
        let mut data = vec![0.0; 7];
        let view = BufferView::new(&mut data, 2);
        assert_eq!(view.frames(), 3);
    }
}
