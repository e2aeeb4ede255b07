//! Channel extraction
//!
//! Every output here is a single channel pulled out of the source with one
//! `remix <n>` call per output file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{Effect, Engine, Invocation};
use crate::error::{Result, SoxError};
use crate::ops::naming::OutputNaming;
use crate::ops::{require_output, run_checked};
use crate::probe::{ensure_exists, AudioInfo};

/// Where channel exports go and what they are called
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelExport {
    /// Output directory; ignored unless it is an existing directory
    pub destination: Option<PathBuf>,
    /// Base name for outputs instead of the source's file stem
    pub new_name: Option<String>,
    /// Re-render outputs that already exist
    pub overwrite: bool,
}

impl Default for ChannelExport {
    fn default() -> Self {
        Self {
            destination: None,
            new_name: None,
            overwrite: true,
        }
    }
}

impl ChannelExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.new_name = Some(name.into());
        self
    }

    pub fn keep_existing(mut self) -> Self {
        self.overwrite = false;
        self
    }

    pub fn naming(&self, source: &Path) -> OutputNaming {
        OutputNaming::resolve(source, self.destination.as_deref(), self.new_name.as_deref())
    }
}

/// The two mono halves of a stereo file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StereoPair {
    pub left: PathBuf,
    pub right: PathBuf,
}

/// Render channel `channel` of `source` into `output`, unless kept
fn extract(
    engine: &mut dyn Engine,
    source: &Path,
    output: &Path,
    channel: u32,
    overwrite: bool,
) -> Result<()> {
    if !overwrite && output.exists() {
        debug!(output = %output.display(), channel, "Keeping existing channel export");
        return Ok(());
    }

    let invocation = Invocation::new(source, output).effect(Effect::Remix { channel });
    run_checked(engine, &invocation, &format!("remix channel {}", channel))?;
    require_output(output)
}

/// Split a stereo file into `<base>.L.<ext>` and `<base>.R.<ext>`
pub fn export_split_stereo(
    engine: &mut dyn Engine,
    source: &Path,
    request: &ChannelExport,
) -> Result<StereoPair> {
    let source_info = AudioInfo::require_audio(source, engine)?;
    if source_info.channels < 2 {
        return Err(SoxError::InvalidInput {
            path: source.to_path_buf(),
            reason: format!(
                "stereo split needs 2 channels, found {}",
                source_info.channels
            ),
        });
    }

    let naming = request.naming(source);
    let pair = StereoPair {
        left: naming.left(),
        right: naming.right(),
    };

    extract(engine, source, &pair.left, 1, request.overwrite)?;
    extract(engine, source, &pair.right, 2, request.overwrite)?;

    info!(source = %source.display(), left = %pair.left.display(), right = %pair.right.display(), "Split stereo");
    Ok(pair)
}

/// Export every channel as `<base>.<n>.<ext>`, n = 1..=channel count
///
/// Outputs are returned in channel order. The first failing channel stops
/// the export.
pub fn export_channels(
    engine: &mut dyn Engine,
    source: &Path,
    request: &ChannelExport,
) -> Result<Vec<PathBuf>> {
    let source_info = AudioInfo::require_audio(source, engine)?;
    let naming = request.naming(source);

    let mut outputs = Vec::with_capacity(usize::from(source_info.channels));
    for channel in 1..=u32::from(source_info.channels) {
        let output = naming.channel(channel);
        extract(engine, source, &output, channel, request.overwrite)?;
        outputs.push(output);
    }

    info!(source = %source.display(), channels = outputs.len(), "Exported channels");
    Ok(outputs)
}

/// Keep channel 1 of `source` as `<base>.Mono.<ext>`
pub fn stereo_to_mono(
    engine: &mut dyn Engine,
    source: &Path,
    request: &ChannelExport,
) -> Result<PathBuf> {
    ensure_exists(source)?;

    let output = request.naming(source).mono();
    extract(engine, source, &output, 1, request.overwrite)?;

    info!(source = %source.display(), output = %output.display(), "Converted to mono");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockEngine, Status};
    use hound::{SampleFormat, WavSpec, WavWriter};
    use tempfile::tempdir;

    fn write_silence(path: &Path, channels: u16, frames: u32) {
        let spec = WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..frames * u32::from(channels) {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_split_stereo_issues_two_remixes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tabla.wav");
        write_silence(&source, 2, 800);

        let mut engine = MockEngine::new();
        let log = engine.log();
        let pair = export_split_stereo(&mut engine, &source, &ChannelExport::new()).unwrap();

        assert_eq!(pair.left, dir.path().join("tabla.L.wav"));
        assert_eq!(pair.right, dir.path().join("tabla.R.wav"));

        let effects: Vec<Effect> = log
            .invocations()
            .iter()
            .flat_map(|invocation| invocation.effects().to_vec())
            .collect();
        assert_eq!(
            effects,
            vec![Effect::Remix { channel: 1 }, Effect::Remix { channel: 2 }]
        );
    }

    #[test]
    fn test_split_stereo_keeps_existing_outputs() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tabla.wav");
        write_silence(&source, 2, 800);
        std::fs::write(dir.path().join("tabla.L.wav"), b"kept").unwrap();

        let mut engine = MockEngine::new();
        let log = engine.log();
        export_split_stereo(&mut engine, &source, &ChannelExport::new().keep_existing()).unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(std::fs::read(dir.path().join("tabla.L.wav")).unwrap(), b"kept");
    }

    #[test]
    fn test_split_mono_source_is_rejected() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("mono.wav");
        write_silence(&source, 1, 800);

        let mut engine = MockEngine::new();
        let err = export_split_stereo(&mut engine, &source, &ChannelExport::new()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_split_reports_missing_output() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tabla.wav");
        write_silence(&source, 2, 800);

        let mut engine = MockEngine::new().without_outputs();
        let err = export_split_stereo(&mut engine, &source, &ChannelExport::new()).unwrap_err();
        match err {
            SoxError::OutputNotProduced { path } => assert_eq!(path, dir.path().join("tabla.L.wav")),
            other => panic!("Expected OutputNotProduced, got: {:?}", other),
        }
    }

    #[test]
    fn test_export_channels_stops_at_first_failure() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("surround.wav");
        write_silence(&source, 6, 80);

        let mut engine = MockEngine::new().failing_call(2, Status::new(2));
        let log = engine.log();
        let err = export_channels(&mut engine, &source, &ChannelExport::new()).unwrap_err();

        match err {
            SoxError::EngineFailed { operation, .. } => assert_eq!(operation, "remix channel 3"),
            other => panic!("Expected EngineFailed, got: {:?}", other),
        }
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_stereo_to_mono_uses_first_channel() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tabla.wav");
        write_silence(&source, 2, 800);

        let mut engine = MockEngine::new();
        let log = engine.log();
        let output = stereo_to_mono(&mut engine, &source, &ChannelExport::new()).unwrap();

        assert_eq!(output, dir.path().join("tabla.Mono.wav"));
        assert_eq!(log.invocations()[0].effects(), &[Effect::Remix { channel: 1 }]);
        assert_eq!(AudioInfo::from_wav(&output).unwrap().channels, 1);
    }

    #[test]
    fn test_stereo_to_mono_missing_source() {
        let dir = tempdir().unwrap();
        let mut engine = MockEngine::new();
        let err = stereo_to_mono(&mut engine, &dir.path().join("gone.wav"), &ChannelExport::new())
            .unwrap_err();
        assert!(matches!(err, SoxError::FileNotFound { .. }));
    }
}
