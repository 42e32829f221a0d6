//! Synthetic varispeed recording demo.
//!
//! Sweeps the write position through a one-second circular buffer at a
//! rate that slows down, speeds up and briefly pauses while recording a
//! sine, then renders the buffer to a WAV file.

use std::f64::consts::TAU;

use anyhow::Context;
use tapehead::{Recorder, SharedBuffer};

const SAMPLE_RATE: u32 = 48_000;
const BLOCK_SIZE: usize = 512;
const BUFFER_FRAMES: usize = 48_000;
const SECONDS: usize = 4;
const OUTPUT_PATH: &str = "tapehead_demo.wav";

fn main() -> anyhow::Result<()> {
    let buffer = SharedBuffer::new(BUFFER_FRAMES, 1);
    let mut recorder = Recorder::with_buffer(buffer.clone());
    recorder.set_interpolate(true);
    recorder.set_overdub(0.5); // later passes blend over earlier ones

    let mut values = vec![0.0_f32; BLOCK_SIZE];
    let mut positions = vec![0.0_f32; BLOCK_SIZE];
    let mut position = 0.0_f64;
    let mut dirty_blocks = 0_usize;

    let total_blocks = SECONDS * SAMPLE_RATE as usize / BLOCK_SIZE;
    for block in 0..total_blocks {
        for i in 0..BLOCK_SIZE {
            let t = (block * BLOCK_SIZE + i) as f64 / f64::from(SAMPLE_RATE);
            values[i] = (TAU * 220.0 * t).sin() as f32;

            // Head rate sweeps between 0.25x and 2.25x, with a short pause
            // once a second to exercise stop/resume.
            let rate = 1.25 + (TAU * 0.2 * t).sin();
            let paused = t.fract() < 0.05;
            if paused {
                positions[i] = -1.0;
            } else {
                position += rate;
                if position >= 2.0 * BUFFER_FRAMES as f64 {
                    position -= BUFFER_FRAMES as f64;
                }
                positions[i] = position as f32;
            }
        }
        recorder.process_block(&values, &positions);
        if buffer.take_dirty() {
            dirty_blocks += 1;
        }
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut wav =
        hound::WavWriter::create(OUTPUT_PATH, spec).context("create output WAV file")?;
    buffer.edit(|storage| {
        for &sample in storage.samples() {
            wav.write_sample(sample)?;
        }
        Ok::<_, hound::Error>(())
    })?;
    wav.finalize().context("finalize output WAV file")?;

    println!(
        "Wrote {} frames to {} ({} of {} blocks touched the buffer)",
        BUFFER_FRAMES, OUTPUT_PATH, dirty_blocks, total_blocks
    );
    Ok(())
}
