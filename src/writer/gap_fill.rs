//! Gap filling between two non-adjacent write positions.
//!
//! When the target index jumps, every slot strictly between the previous
//! and the new index is filled along the shorter wraparound direction,
//! either with a linear ramp toward the incoming value or with the held
//! committed value. Both endpoints are written by the caller: the previous
//! index when its average is committed, the new index when its own
//! accumulation run ends.

use crate::buffer::BufferView;

/// Write one sample through the overdub rule: `overdub == 0` overwrites,
/// anything else blends with the existing content as `old * overdub + new`.
#[inline]
pub(crate) fn commit(
    view: &mut BufferView,
    frame: usize,
    channel: usize,
    value: f64,
    overdub: f64,
) {
    let out = if overdub == 0.0 {
        value
    } else {
        f64::from(view.get(frame, channel)) * overdub + value
    };
    view.set(frame, channel, out as f32);
}

/// Value sequence laid down across the visited slots: a linear ramp from
/// just-after `from` to just-before `to`, or a flat hold of `from`.
struct FillRamp {
    value: f64,
    coeff: f64,
    hold: f64,
    interpolate: bool,
}

impl FillRamp {
    fn new(from: f64, to: f64, hops: i64, interpolate: bool) -> Self {
        Self {
            value: from,
            coeff: if interpolate {
                (to - from) / hops as f64
            } else {
                0.0
            },
            hold: from,
            interpolate,
        }
    }

    #[inline]
    fn next(&mut self) -> f64 {
        self.value += self.coeff;
        if self.interpolate {
            self.value
        } else {
            self.hold
        }
    }
}

/// Fill every slot strictly between `last` and `new` along the shorter of
/// the two circular directions.
///
/// A forward step longer than half the buffer goes backward through the
/// wraparound point instead, and symmetrically for backward steps; a step
/// of exactly half keeps the direct path. Slot visit order always walks
/// away from `last`, so the value ramp runs from `from` toward `to`
/// regardless of index direction.
pub(crate) fn fill_gap(
    view: &mut BufferView,
    channel: usize,
    last: usize,
    new: usize,
    from: f64,
    to: f64,
    interpolate: bool,
    overdub: f64,
) {
    let frames = view.frames() as i64;
    let step = new as i64 - last as i64;
    if step == 0 {
        return;
    }
    let half = frames / 2;

    if step > half {
        // Forward jump past the halfway point: walk backward through the
        // seam, last-1 down to 0 then frames-1 down to new+1.
        let hops = frames - step;
        let mut ramp = FillRamp::new(from, to, hops, interpolate);
        for frame in (0..last).rev() {
            let value = ramp.next();
            commit(view, frame, channel, value, overdub);
        }
        for frame in ((new + 1)..frames as usize).rev() {
            let value = ramp.next();
            commit(view, frame, channel, value, overdub);
        }
    } else if -step > half {
        // Backward jump past the halfway point: walk forward through the
        // seam, last+1 up to frames-1 then 0 up to new-1.
        let hops = frames + step;
        let mut ramp = FillRamp::new(from, to, hops, interpolate);
        for frame in (last + 1)..frames as usize {
            let value = ramp.next();
            commit(view, frame, channel, value, overdub);
        }
        for frame in 0..new {
            let value = ramp.next();
            commit(view, frame, channel, value, overdub);
        }
    } else if step > 0 {
        let mut ramp = FillRamp::new(from, to, step, interpolate);
        for frame in (last + 1)..new {
            let value = ramp.next();
            commit(view, frame, channel, value, overdub);
        }
    } else {
        let mut ramp = FillRamp::new(from, to, -step, interpolate);
        for frame in ((new + 1)..last).rev() {
            let value = ramp.next();
            commit(view, frame, channel, value, overdub);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_frames(data: &[f32], sentinel: f32) -> Vec<usize> {
        data.iter()
            .enumerate()
            .filter(|(_, &v)| v != sentinel)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn direct_forward_fill_covers_interior_only() {
        let mut data = vec![9.0; 16];
        let mut view = BufferView::new(&mut data, 1);
        fill_gap(&mut view, 0, 3, 7, 1.0, 1.0, false, 0.0);
        assert_eq!(filled_frames(&data, 9.0), vec![4, 5, 6]);
    }

    #[test]
    fn direct_backward_fill_covers_interior_only() {
        let mut data = vec![9.0; 16];
        let mut view = BufferView::new(&mut data, 1);
        fill_gap(&mut view, 0, 7, 3, 1.0, 1.0, false, 0.0);
        assert_eq!(filled_frames(&data, 9.0), vec![4, 5, 6]);
    }

    #[test]
    fn long_forward_jump_wraps_backward() {
        let mut data = vec![9.0; 100];
        let mut view = BufferView::new(&mut data, 1);
        fill_gap(&mut view, 0, 10, 80, 1.0, 1.0, false, 0.0);
        // 9 down to 0, then 99 down to 81 (29 slots), never the direct path
        let expected: Vec<usize> = (0..=9).chain(81..=99).collect();
        assert_eq!(filled_frames(&data, 9.0), expected);
    }

    #[test]
    fn half_buffer_distance_keeps_direct_path() {
        let mut data = vec![9.0; 100];
        let mut view = BufferView::new(&mut data, 1);
        fill_gap(&mut view, 0, 10, 60, 1.0, 1.0, false, 0.0);
        let expected: Vec<usize> = (11..=59).collect();
        assert_eq!(filled_frames(&data, 9.0), expected);
    }

    #[test]
    fn adjacent_indices_fill_nothing() {
        let mut data = vec![9.0; 8];
        let mut view = BufferView::new(&mut data, 1);
        fill_gap(&mut view, 0, 3, 4, 1.0, 1.0, true, 0.0);
        assert!(filled_frames(&data, 9.0).is_empty());
    }

    #[test]
    fn interpolated_wraparound_ramp_is_monotonic() {
        let mut data = vec![0.0; 10];
        let mut view = BufferView::new(&mut data, 1);
        // 8 -> 2 forward through the seam: visits 9, 0, 1
        fill_gap(&mut view, 0, 8, 2, 0.0, 4.0, true, 0.0);
        assert!((data[9] - 1.0).abs() < 1e-6);
        assert!((data[0] - 2.0).abs() < 1e-6);
        assert!((data[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn overdub_blends_with_existing_content() {
        let mut data = vec![2.0; 8];
        let mut view = BufferView::new(&mut data, 1);
        fill_gap(&mut view, 0, 1, 4, 1.0, 1.0, false, 0.5);
        // existing 2.0 * 0.5 + held 1.0
        assert!((data[2] - 2.0).abs() < 1e-6);
        assert!((data[3] - 2.0).abs() < 1e-6);
    }
}
