//! Mock engine for testing
//!
//! Does no signal processing. It records every invocation and writes a
//! silent WAV whose header follows what the invocation asked for, so
//! callers can check channel counts, rates and durations without a real
//! SoX installation.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::engine::{Effect, Engine, Invocation, Outcome, Status};
use crate::error::{Result, SoxError};
use crate::probe::{is_wav, AudioInfo};

/// Shared view of what a `MockEngine` has done
///
/// Clones observe the same engine, so a test can keep one after the engine
/// has been moved into a gate.
#[derive(Debug, Clone, Default)]
pub struct MockLog {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockLog {
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.invocations.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest number of `run` calls observed executing at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self, invocation: &Invocation) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Ok(mut guard) = self.invocations.lock() {
            guard.push(invocation.clone());
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Engine double that synthesizes outputs
#[derive(Debug, Clone)]
pub struct MockEngine {
    status: Status,
    fail_on_call: Option<(usize, Status)>,
    write_outputs: bool,
    latency: Duration,
    info: Option<AudioInfo>,
    calls: usize,
    log: MockLog,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            status: Status::SUCCESS,
            fail_on_call: None,
            write_outputs: true,
            latency: Duration::ZERO,
            info: None,
            calls: 0,
            log: MockLog::default(),
        }
    }

    /// Report this status for every call
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Report `status` for the call with this zero-based index only
    pub fn failing_call(mut self, index: usize, status: Status) -> Self {
        self.fail_on_call = Some((index, status));
        self
    }

    /// Report success without writing anything
    pub fn without_outputs(mut self) -> Self {
        self.write_outputs = false;
        self
    }

    /// Sleep this long inside every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Report these parameters for inputs hound cannot read
    pub fn with_info(mut self, info: AudioInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn log(&self) -> MockLog {
        self.log.clone()
    }

    fn planned_status(&self, index: usize) -> Status {
        match self.fail_on_call {
            Some((failing, status)) if failing == index => status,
            _ => self.status,
        }
    }

    /// Header of an input: hound for WAV, the configured info as fallback
    fn source_info(&self, input: &Path) -> std::result::Result<AudioInfo, String> {
        match AudioInfo::from_wav(input) {
            Ok(info) => Ok(info),
            Err(e) => self.info.ok_or_else(|| e.to_string()),
        }
    }

    fn render(&self, invocation: &Invocation) -> Result<Outcome> {
        for input in invocation.inputs() {
            if !input.exists() {
                return Ok(Outcome::failure(
                    Status::new(2),
                    format!("can't open input file `{}'", input.display()),
                ));
            }
        }

        // Every WAV input must decode, whatever the output format
        let mut sources = Vec::with_capacity(invocation.inputs().len());
        for input in invocation.inputs().iter().filter(|input| is_wav(input)) {
            match self.source_info(input) {
                Ok(info) => sources.push(info),
                Err(reason) => return Ok(Outcome::failure(Status::new(2), reason)),
            }
        }

        if !self.write_outputs {
            return Ok(Outcome::success());
        }

        let output = invocation.output();
        let wav_inputs = sources.len() == invocation.inputs().len();

        if !(is_wav(output) && wav_inputs) {
            // Opaque formats are passed through untouched
            if let Some(first) = invocation.inputs().first() {
                std::fs::copy(first, output)?;
            }
            return Ok(Outcome::success());
        }

        match synthesize(invocation, &sources) {
            Some(target) => {
                write_silence(output, &target)?;
                Ok(Outcome::success())
            }
            None => Ok(Outcome::failure(Status::new(1), "unsupported request")),
        }
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn run(&mut self, invocation: &Invocation) -> Result<Outcome> {
        let index = self.calls;
        self.calls += 1;

        self.log.enter(invocation);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        let status = self.planned_status(index);
        let outcome = if status.is_success() {
            self.render(invocation)
        } else {
            Ok(Outcome::failure(status, "mock failure"))
        };

        self.log.leave();
        outcome
    }

    fn info(&mut self, path: &Path) -> Result<AudioInfo> {
        if is_wav(path) {
            if let Ok(info) = AudioInfo::from_wav(path) {
                return Ok(info);
            }
        }
        self.info.ok_or_else(|| SoxError::InvalidInput {
            path: path.to_path_buf(),
            reason: "mock engine has no info for this format".to_string(),
        })
    }
}

/// Work out the header the real engine would produce
fn synthesize(invocation: &Invocation, sources: &[AudioInfo]) -> Option<AudioInfo> {
    let first = *sources.first()?;

    let mut channels = if invocation.is_merge() {
        sources.iter().map(|info| info.channels).sum()
    } else {
        first.channels
    };
    let mut frames = if invocation.is_merge() {
        sources.iter().map(|info| info.frames).max().unwrap_or(0)
    } else {
        first.frames
    };

    for effect in invocation.effects() {
        match effect {
            Effect::Remix { channel } => {
                if *channel == 0 || *channel > u32::from(channels) {
                    return None;
                }
                channels = 1;
            }
            Effect::Trim { start, end } => {
                let rate = f64::from(first.sample_rate);
                let start_frame = ((start * rate).round() as u64).min(frames);
                let end_frame = end
                    .map(|end| ((end * rate).round() as u64).min(frames))
                    .unwrap_or(frames);
                frames = end_frame.saturating_sub(start_frame);
            }
        }
    }

    let sample_rate = match invocation.requested_sample_rate() {
        Some(rate) => {
            let rate = rate.round() as u32;
            frames = (frames as f64 * f64::from(rate) / f64::from(first.sample_rate)).round() as u64;
            rate
        }
        None => first.sample_rate,
    };

    let bits = invocation
        .requested_bits()
        .map(|bits| bits as u16)
        .or(first.bits_per_sample)
        .unwrap_or(16);

    Some(AudioInfo {
        channels,
        sample_rate,
        bits_per_sample: Some(bits),
        frames,
    })
}

fn write_silence(path: &Path, info: &AudioInfo) -> Result<()> {
    let spec = WavSpec {
        channels: info.channels,
        sample_rate: info.sample_rate,
        bits_per_sample: info.bits_per_sample.unwrap_or(16),
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(hound_to_io)?;
    let samples = info.frames * u64::from(info.channels);
    for _ in 0..samples {
        writer.write_sample(0i32).map_err(hound_to_io)?;
    }
    writer.finalize().map_err(hound_to_io)?;

    Ok(())
}

fn hound_to_io(err: hound::Error) -> SoxError {
    match err {
        hound::Error::IoError(e) => SoxError::Io(e),
        other => SoxError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            other.to_string(),
        )),
    }
}
