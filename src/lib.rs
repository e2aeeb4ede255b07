//! soxgate - Serialized access to the SoX audio engine
//!
//! soxgate exposes a small set of file-level audio operations and leaves
//! every bit of signal processing to SoX:
//! - Trimming
//! - PCM conversion (bit depth, sample rate) and MP3 encoding
//! - Channel extraction (stereo split, per-channel export, stereo to mono)
//! - Multi-channel muxing
//!
//! # Architecture
//!
//! - `engine`: the `Engine` trait, SoX argument rendering, the `sox` process
//!   engine and an in-library mock
//! - `ops`: stateless functions turning typed requests into invocations
//! - `gate`: the single owner of the engine; every operation runs as one
//!   job on its worker thread, in arrival order
//!
//! ```no_run
//! use std::path::Path;
//! use soxgate::{SoxGate, TrimRange};
//!
//! let gate = SoxGate::shared();
//! gate.trim(Path::new("take.wav"), Path::new("chunk.wav"), TrimRange::secs(1.0, 2.5))?;
//! # Ok::<(), soxgate::SoxError>(())
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod ops;
pub mod probe;

pub use config::SoxConfig;
pub use engine::{Effect, Engine, Invocation, MockEngine, Outcome, SoxProcess, Status};
pub use error::{Result, SoxError};
#[cfg(feature = "async")]
pub use gate::AsyncSoxGate;
pub use gate::SoxGate;
pub use ops::{
    ChannelExport, Mp3Format, Mp3Quality, Mp3Rate, PcmFormat, StereoPair, TrimEnd, TrimRange,
};
pub use probe::AudioInfo;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose.
/// Records emitted through the `log` facade are forwarded as well.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
