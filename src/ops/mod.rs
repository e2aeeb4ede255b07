//! Operations
//!
//! Stateless translation from a typed request to engine invocations:
//! - trim: time range to `trim` effect
//! - convert: PCM bit depth / sample rate, MP3 bitrate and quality
//! - channels: stereo split, per-channel export, stereo to mono
//! - mux: mono files side by side into one multi-channel file
//!
//! Every function takes the engine by `&mut dyn Engine` and assumes the
//! caller holds exclusive access (see `crate::gate`).

pub mod channels;
pub mod convert;
pub mod mux;
pub mod naming;
pub mod trim;

use std::path::Path;

use tracing::{debug, warn};

use crate::engine::{Engine, Invocation};
use crate::error::{Result, SoxError};

pub use channels::{export_channels, export_split_stereo, stereo_to_mono, ChannelExport, StereoPair};
pub use convert::{convert_mp3, convert_pcm, Mp3Format, Mp3Quality, Mp3Rate, PcmFormat};
pub use mux::create_multichannel_wave;
pub use naming::OutputNaming;
pub use trim::{trim, TrimEnd, TrimRange};

/// Run one invocation and map a non-success status to `EngineFailed`
pub(crate) fn run_checked(
    engine: &mut dyn Engine,
    invocation: &Invocation,
    operation: &str,
) -> Result<()> {
    debug!(engine = engine.name(), operation, args = %invocation.command_line(), "Running invocation");

    let outcome = engine.run(invocation)?;

    if outcome.status.is_success() {
        return Ok(());
    }

    warn!(operation, status = %outcome.status, stderr = %outcome.stderr.trim(), "Engine reported failure");

    let stderr = Some(outcome.stderr).filter(|text| !text.trim().is_empty());
    Err(SoxError::EngineFailed {
        operation: operation.to_string(),
        status: outcome.status,
        stderr,
    })
}

/// Confirm a nominally successful call actually wrote its output
pub(crate) fn require_output(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SoxError::OutputNotProduced {
            path: path.to_path_buf(),
        })
    }
}
