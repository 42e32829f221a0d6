//! CPAL capture host: records live input through the write head.
//!
//! The write position advances at an LFO-swept rate, so the captured audio
//! lands in the circular buffer like tape running under a head whose speed
//! keeps changing. After a fixed capture time the buffer is written to a
//! WAV file.

#![cfg(feature = "native-host")]

use std::f64::consts::TAU;
use std::time::Duration;

use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SizedSample};
use dasp_sample::{Sample, ToSample};
use tapehead::{Recorder, SharedBuffer};

const BUFFER_SECONDS: usize = 2;
const CAPTURE_SECONDS: u64 = 6;
const RATE_LFO_HZ: f64 = 0.3;
const OUTPUT_PATH: &str = "tapehead_capture.wav";

fn main() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("no default input device"))?;
    let config = device
        .default_input_config()
        .context("query default input config")?;

    println!("=== CAPTURE CONFIGURATION ===");
    println!("Device: {}", device.name().unwrap_or_default());
    println!("Sample rate: {} Hz", config.sample_rate().0);
    println!("Sample format: {:?}", config.sample_format());
    println!("Input channels: {}", config.channels());

    let sample_rate = config.sample_rate().0 as usize;
    let buffer = SharedBuffer::new(BUFFER_SECONDS * sample_rate, 1);

    let stream = match config.sample_format() {
        SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), buffer.clone())?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), buffer.clone())?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), buffer.clone())?,
        format => return Err(anyhow!("unsupported sample format: {:?}", format)),
    };
    stream.play().context("start input stream")?;

    println!("Capturing for {} seconds...", CAPTURE_SECONDS);
    std::thread::sleep(Duration::from_secs(CAPTURE_SECONDS));
    drop(stream);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample_rate as u32,
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
    println!("Wrote capture buffer to {}", OUTPUT_PATH);

    Ok(())
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    buffer: SharedBuffer,
) -> anyhow::Result<cpal::Stream>
where
    T: SizedSample + ToSample<f32>,
{
    let channels = config.channels as usize;
    let sample_rate = f64::from(config.sample_rate.0);
    let buffer_frames = buffer.edit(|storage| storage.frames());

    let mut recorder = Recorder::with_buffer(buffer);
    recorder.set_interpolate(true);

    // Scratch streams reused across callbacks; sized up front for the
    // largest block the device is likely to deliver.
    let mut values = Vec::with_capacity(4096);
    let mut positions = Vec::with_capacity(4096);
    let mut position = 0.0_f64;
    let mut elapsed_frames = 0.0_f64;

    let stream = device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                values.clear();
                positions.clear();
                for frame in data.chunks(channels) {
                    // Mix the input down to mono.
                    let mut sum = 0.0_f32;
                    for &sample in frame {
                        sum += sample.to_sample::<f32>();
                    }
                    values.push(sum / channels as f32);

                    let t = elapsed_frames / sample_rate;
                    let rate = 1.25 + (TAU * RATE_LFO_HZ * t).sin();
                    position += rate;
                    if position >= 2.0 * buffer_frames as f64 {
                        position -= buffer_frames as f64;
                    }
                    positions.push(position as f32);
                    elapsed_frames += 1.0;
                }
                recorder.process_block(&values, &positions);
            },
            |err| eprintln!("input stream error: {}", err),
            None,
        )
        .context("build input stream")?;
    Ok(stream)
}
