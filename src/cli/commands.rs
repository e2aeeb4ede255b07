//! CLI Command Implementations
//!
//! Each command runs one operation through the gate and prints what it
//! produced, as plain text or as JSON.

use std::path::{Path, PathBuf};

use log::info;
use serde_json::json;

use crate::error::Result;
use crate::gate::SoxGate;
use crate::ops::{ChannelExport, Mp3Format, Mp3Quality, PcmFormat, TrimRange};

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_outputs(outputs: &[PathBuf], json: bool) -> Result<()> {
    if json {
        return print_json(&json!({ "outputs": outputs }));
    }
    for output in outputs {
        println!("{}", output.display());
    }
    Ok(())
}

/// Trim `input` to `[start, end]` seconds.
pub fn trim(gate: &SoxGate, input: &Path, output: &Path, start: f64, end: f64, json: bool) -> Result<()> {
    info!("Trimming {} ({}s - {}s)", input.display(), start, end);

    gate.trim(input, output, TrimRange::secs(start, end))?;

    print_outputs(&[output.to_path_buf()], json)
}

/// Convert to PCM with an optional bit depth and sample rate.
pub fn convert(
    gate: &SoxGate,
    input: &Path,
    output: &Path,
    bits: Option<u32>,
    rate: Option<f64>,
    json: bool,
) -> Result<()> {
    info!("Converting {} to {}", input.display(), output.display());

    let format = PcmFormat {
        bit_depth: bits,
        sample_rate: rate,
    };
    gate.convert_pcm(input, output, format)?;

    print_outputs(&[output.to_path_buf()], json)
}

/// Encode as MP3.
#[allow(clippy::too_many_arguments)]
pub fn mp3(
    gate: &SoxGate,
    input: &Path,
    output: &Path,
    bitrate: Option<u32>,
    vbr: Option<u8>,
    quality: Option<Mp3Quality>,
    rate: Option<f64>,
    json: bool,
) -> Result<()> {
    let quality = quality.unwrap_or_else(|| gate.mp3_quality());
    info!("Encoding {} as MP3 (quality {})", input.display(), quality);

    let mut format = Mp3Format::new().with_quality(quality);
    if let Some(kbps) = bitrate {
        format = format.with_bit_rate(kbps);
    }
    if let Some(level) = vbr {
        format = format.with_vbr(level);
    }
    if let Some(rate) = rate {
        format = format.with_sample_rate(rate);
    }
    gate.convert_mp3(input, output, format)?;

    print_outputs(&[output.to_path_buf()], json)
}

/// Split a stereo file into left and right mono files.
pub fn split_stereo(gate: &SoxGate, input: &Path, request: &ChannelExport, json: bool) -> Result<()> {
    info!("Splitting stereo: {}", input.display());

    let pair = gate.export_split_stereo(input, request)?;

    if json {
        return print_json(&json!({ "left": pair.left, "right": pair.right }));
    }
    println!("L: {}", pair.left.display());
    println!("R: {}", pair.right.display());
    Ok(())
}

/// Export every channel of a file.
pub fn export_channels(gate: &SoxGate, input: &Path, request: &ChannelExport, json: bool) -> Result<()> {
    info!("Exporting channels: {}", input.display());

    let outputs = gate.export_channels(input, request)?;

    print_outputs(&outputs, json)
}

/// Keep the first channel as a mono file.
pub fn to_mono(gate: &SoxGate, input: &Path, request: &ChannelExport, json: bool) -> Result<()> {
    info!("Converting to mono: {}", input.display());

    let output = gate.stereo_to_mono(input, request)?;

    print_outputs(&[output], json)
}

/// Combine inputs into one multi-channel file.
pub fn mux(gate: &SoxGate, inputs: &[PathBuf], output: &Path, json: bool) -> Result<()> {
    info!("Muxing {} inputs into {}", inputs.len(), output.display());

    gate.create_multichannel_wave(inputs, output)?;

    print_outputs(&[output.to_path_buf()], json)
}

/// Print stream parameters of a file.
pub fn info(gate: &SoxGate, input: &Path, json: bool) -> Result<()> {
    let audio = gate.info(input)?;

    if json {
        let mut value = serde_json::to_value(audio)?;
        value["duration_secs"] = json!(audio.duration_secs());
        return print_json(&value);
    }

    println!("File: {}", input.display());
    println!("Channels: {}", audio.channels);
    println!("Sample rate: {} Hz", audio.sample_rate);
    match audio.bits_per_sample {
        Some(bits) => println!("Precision: {}-bit", bits),
        None => println!("Precision: unknown"),
    }
    println!("Duration: {:.3} s ({} frames)", audio.duration_secs(), audio.frames);

    Ok(())
}
