//! The engine access point
//!
//! SoX keeps process-global state, so the engine is owned by exactly one
//! worker thread. Callers submit jobs over a channel; the worker runs them
//! one at a time in arrival order. A whole operation, including its header read
//! and every engine call it makes, is a single job.
//!
//! ```text
//! caller ─┐
//! caller ─┼─ job queue (FIFO) ─► "soxgate-engine" thread ─► Box<dyn Engine>
//! caller ─┘        ▲                         │
//!                  └──────── reply ──────────┘
//! ```

#[cfg(feature = "async")]
mod async_gate;

#[cfg(feature = "async")]
pub use async_gate::AsyncSoxGate;

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::{debug, debug_span, error, warn};
use uuid::Uuid;

use crate::config::SoxConfig;
use crate::engine::{Engine, SoxProcess};
use crate::error::{Result, SoxError};
use crate::ops::{self, ChannelExport, Mp3Format, Mp3Quality, PcmFormat, StereoPair, TrimRange};
use crate::probe::AudioInfo;

type Job = Box<dyn FnOnce(&mut dyn Engine) + Send>;

static SHARED: OnceLock<Arc<SoxGate>> = OnceLock::new();

/// Single serialized owner of an engine
pub struct SoxGate {
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    engine_name: String,
    mp3_quality: Mp3Quality,
}

impl SoxGate {
    /// Move `engine` onto a dedicated worker thread
    pub fn new<E: Engine + 'static>(engine: E) -> Self {
        let engine_name = engine.name().to_string();
        let (sender, receiver) = unbounded::<Job>();

        let worker = thread::Builder::new()
            .name("soxgate-engine".to_string())
            .spawn(move || worker_loop(Box::new(engine), receiver));

        match worker {
            Ok(handle) => Self {
                sender: Some(sender),
                worker: Some(handle),
                engine_name,
                mp3_quality: Mp3Quality::DEFAULT,
            },
            Err(e) => {
                // Every call reports WorkerStopped
                error!(error = %e, "Failed to spawn engine worker");
                Self {
                    sender: None,
                    worker: None,
                    engine_name,
                    mp3_quality: Mp3Quality::DEFAULT,
                }
            }
        }
    }

    /// Gate around the `sox` binary configured by `config`
    pub fn from_config(config: &SoxConfig) -> Self {
        let quality = config.mp3_quality().unwrap_or_else(|e| {
            warn!(error = %e, "Using default MP3 quality");
            Mp3Quality::DEFAULT
        });
        Self::new(SoxProcess::from_config(config)).with_mp3_quality(quality)
    }

    /// Quality for MP3 encodes whose format does not pick one
    pub fn with_mp3_quality(mut self, quality: Mp3Quality) -> Self {
        self.mp3_quality = quality;
        self
    }

    pub fn mp3_quality(&self) -> Mp3Quality {
        self.mp3_quality
    }

    /// The process-wide gate, built from the environment on first use
    pub fn shared() -> &'static SoxGate {
        Self::shared_arc().as_ref()
    }

    pub(crate) fn shared_arc() -> &'static Arc<SoxGate> {
        SHARED.get_or_init(|| {
            let config = SoxConfig::from_env().unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring invalid environment configuration");
                SoxConfig::default()
            });
            Arc::new(SoxGate::from_config(&config))
        })
    }

    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    pub(crate) fn submit(&self, job: Job) -> Result<()> {
        self.sender
            .as_ref()
            .ok_or(SoxError::WorkerStopped)?
            .send(job)
            .map_err(|_| SoxError::WorkerStopped)
    }

    /// Run `op` with exclusive access to the engine and wait for its result
    ///
    /// Blocks behind every job submitted earlier.
    pub fn execute<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Engine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, result) = bounded(1);
        self.submit(Box::new(move |engine| {
            let _ = reply.send(op(engine));
        }))?;

        // A dropped reply means the job panicked or the worker died
        result.recv().map_err(|_| SoxError::WorkerStopped)?
    }

    pub fn trim(&self, input: &Path, output: &Path, range: TrimRange) -> Result<()> {
        let (input, output) = (input.to_path_buf(), output.to_path_buf());
        self.execute(move |engine| ops::trim(engine, &input, &output, range))
    }

    /// Trim with both bounds in seconds; an end of 0 keeps the rest of the file
    pub fn trim_range(
        &self,
        input: &Path,
        output: &Path,
        range: std::ops::RangeInclusive<f64>,
    ) -> Result<()> {
        self.trim(input, output, TrimRange::from(range))
    }

    pub fn convert_pcm(&self, input: &Path, output: &Path, format: PcmFormat) -> Result<()> {
        let (input, output) = (input.to_path_buf(), output.to_path_buf());
        self.execute(move |engine| ops::convert_pcm(engine, &input, &output, format))
    }

    pub fn convert_mp3(&self, input: &Path, output: &Path, format: Mp3Format) -> Result<()> {
        let (input, output) = (input.to_path_buf(), output.to_path_buf());
        let format = format.or_quality(self.mp3_quality);
        self.execute(move |engine| ops::convert_mp3(engine, &input, &output, format))
    }

    pub fn export_split_stereo(&self, source: &Path, request: &ChannelExport) -> Result<StereoPair> {
        let (source, request) = (source.to_path_buf(), request.clone());
        self.execute(move |engine| ops::export_split_stereo(engine, &source, &request))
    }

    pub fn export_channels(&self, source: &Path, request: &ChannelExport) -> Result<Vec<PathBuf>> {
        let (source, request) = (source.to_path_buf(), request.clone());
        self.execute(move |engine| ops::export_channels(engine, &source, &request))
    }

    pub fn stereo_to_mono(&self, source: &Path, request: &ChannelExport) -> Result<PathBuf> {
        let (source, request) = (source.to_path_buf(), request.clone());
        self.execute(move |engine| ops::stereo_to_mono(engine, &source, &request))
    }

    pub fn create_multichannel_wave(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let (inputs, output) = (inputs.to_vec(), output.to_path_buf());
        self.execute(move |engine| ops::create_multichannel_wave(engine, &inputs, &output))
    }

    pub fn info(&self, path: &Path) -> Result<AudioInfo> {
        let path = path.to_path_buf();
        self.execute(move |engine| AudioInfo::read(&path, engine))
    }
}

impl Drop for SoxGate {
    fn drop(&mut self) {
        // Closing the queue lets the worker finish what is queued and exit
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Engine worker panicked during shutdown");
            }
        }
    }
}

fn worker_loop(mut engine: Box<dyn Engine>, jobs: Receiver<Job>) {
    debug!(engine = engine.name(), "Engine worker started");

    for job in jobs {
        let job_id = Uuid::new_v4();
        let span = debug_span!("engine_job", %job_id);
        let _entered = span.enter();

        let engine = engine.as_mut();
        if panic::catch_unwind(AssertUnwindSafe(move || job(engine))).is_err() {
            error!(%job_id, "Engine job panicked");
        }
    }

    debug!("Engine worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use std::time::Duration;

    #[test]
    fn test_execute_returns_job_result() {
        let gate = SoxGate::new(MockEngine::new());
        assert_eq!(gate.engine_name(), "mock");

        let name = gate.execute(|engine| Ok(engine.name().to_string())).unwrap();
        assert_eq!(name, "mock");
    }

    #[test]
    fn test_panicking_job_does_not_stop_worker() {
        let gate = SoxGate::new(MockEngine::new());

        let err = gate
            .execute::<(), _>(|_| panic!("job failure"))
            .unwrap_err();
        assert!(matches!(err, SoxError::WorkerStopped));

        assert_eq!(gate.execute(|_| Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_jobs_run_in_submission_order() {
        let gate = Arc::new(SoxGate::new(MockEngine::new()));
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        // Hold the worker so the next jobs queue up behind it
        let (release_tx, release_rx) = bounded::<()>(1);
        gate.submit(Box::new(move |_| {
            let _ = release_rx.recv_timeout(Duration::from_secs(5));
        }))
        .unwrap();

        let mut replies = Vec::new();
        for i in 0..5 {
            let order = Arc::clone(&order);
            let (tx, rx) = bounded(1);
            gate.submit(Box::new(move |_| {
                order.lock().unwrap().push(i);
                let _ = tx.send(());
            }))
            .unwrap();
            replies.push(rx);
        }

        release_tx.send(()).unwrap();
        for rx in replies {
            rx.recv().unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_configured_mp3_quality_applies() {
        let dir = tempfile::tempdir().unwrap();
        // Opaque input, so the mock copies it through
        let input = dir.path().join("take.raw");
        let output = dir.path().join("take.mp3");
        std::fs::write(&input, b"raw").unwrap();

        let engine = MockEngine::new();
        let log = engine.log();
        let gate = SoxGate::new(engine).with_mp3_quality(Mp3Quality::BEST);
        assert_eq!(gate.mp3_quality(), Mp3Quality::BEST);

        gate.convert_mp3(&input, &output, Mp3Format::new().with_bit_rate(128))
            .unwrap();
        gate.convert_mp3(
            &input,
            &output,
            Mp3Format::new().with_bit_rate(128).with_quality(Mp3Quality::FASTEST),
        )
        .unwrap();

        let factors: Vec<String> = log
            .invocations()
            .iter()
            .flat_map(|invocation| invocation.output_options().to_vec())
            .filter_map(|option| match option {
                crate::engine::OutputOption::Compression(factor) => Some(factor),
                _ => None,
            })
            .collect();
        assert_eq!(factors, vec!["128.01".to_string(), "128.9".to_string()]);
    }

    #[test]
    fn test_drop_drains_queue() {
        let engine = MockEngine::new().with_latency(Duration::from_millis(5));
        let log = engine.log();
        let gate = SoxGate::new(engine);

        let invocation = crate::engine::Invocation::new("missing.wav", "out.wav");
        for _ in 0..3 {
            let invocation = invocation.clone();
            gate.submit(Box::new(move |engine| {
                let _ = engine.run(&invocation);
            }))
            .unwrap();
        }
        drop(gate);

        assert_eq!(log.len(), 3);
    }
}
