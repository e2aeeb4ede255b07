//! Input metadata probing
//!
//! WAV headers are read directly with hound. Every other format, and any
//! WAV encoding hound does not handle (u-law, A-law, ADPCM, 64-bit float),
//! is handed to the engine, which knows how to decode it.

use std::path::Path;

use hound::WavReader;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::Engine;
use crate::error::{Result, SoxError};

/// Stream parameters of an audio file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioInfo {
    pub channels: u16,
    pub sample_rate: u32,
    /// `None` when the container does not report a precision (e.g. MP3)
    pub bits_per_sample: Option<u16>,
    /// Sample frames per channel
    pub frames: u64,
}

impl AudioInfo {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Read a WAV header
    ///
    /// A file without a readable `fmt ` or `data` chunk is `InvalidInput`.
    pub fn from_wav(path: &Path) -> Result<Self> {
        ensure_exists(path)?;
        Self::read_wav_header(path).map_err(|e| invalid_wav(path, e))
    }

    fn read_wav_header(path: &Path) -> std::result::Result<Self, hound::Error> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();

        Ok(AudioInfo {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: Some(spec.bits_per_sample),
            frames: u64::from(reader.duration()),
        })
    }

    /// Read stream parameters for any format the engine can decode
    ///
    /// A WAV file whose encoding hound rejects goes to the engine as well;
    /// a truncated one (no `data` chunk) is still `InvalidInput`.
    pub fn read(path: &Path, engine: &mut dyn Engine) -> Result<Self> {
        ensure_exists(path)?;

        if !is_wav(path) {
            return engine.info(path);
        }

        match Self::read_wav_header(path) {
            Ok(info) => Ok(info),
            Err(e @ (hound::Error::Unsupported | hound::Error::FormatError(_))) => {
                debug!(path = %path.display(), reason = %e, "WAV header not readable directly, asking engine");
                engine.info(path)
            }
            Err(e) => Err(invalid_wav(path, e)),
        }
    }

    /// Like `read`, but an input without any audio is rejected
    pub fn require_audio(path: &Path, engine: &mut dyn Engine) -> Result<Self> {
        let info = Self::read(path, engine)?;

        if info.channels == 0 {
            return Err(SoxError::InvalidInput {
                path: path.to_path_buf(),
                reason: "no channels".to_string(),
            });
        }

        if info.is_empty() {
            return Err(SoxError::ZeroDuration {
                path: path.to_path_buf(),
            });
        }

        Ok(info)
    }
}

/// Whether the path carries a WAV extension
pub fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("wave"))
        .unwrap_or(false)
}

fn invalid_wav(path: &Path, err: hound::Error) -> SoxError {
    SoxError::InvalidInput {
        path: path.to_path_buf(),
        reason: format!("Failed to open WAV file: {}", err),
    }
}

pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SoxError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}
