//! The `sox` binary as an engine
//!
//! Each invocation spawns the configured binary and waits for it. The exit
//! code becomes the engine status; stderr is kept for diagnostics.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::config::SoxConfig;
use crate::engine::{Engine, Invocation, Outcome, Status};
use crate::error::{Result, SoxError};
use crate::probe::AudioInfo;

/// Engine backed by the `sox` command line program
#[derive(Debug, Clone)]
pub struct SoxProcess {
    binary: PathBuf,
    show_progress: bool,
}

impl SoxProcess {
    pub const DEFAULT_BINARY: &'static str = "sox";

    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            show_progress: false,
        }
    }

    pub fn from_config(config: &SoxConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            show_progress: config.show_progress,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Check whether the binary launches at all
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        if !self.show_progress {
            cmd.arg("--no-show-progress");
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn unavailable(&self, source: std::io::Error) -> SoxError {
        SoxError::EngineUnavailable {
            binary: self.binary.clone(),
            source,
        }
    }
}

impl Default for SoxProcess {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BINARY)
    }
}

impl Engine for SoxProcess {
    fn name(&self) -> &str {
        "sox"
    }

    fn run(&mut self, invocation: &Invocation) -> Result<Outcome> {
        debug!(binary = %self.binary.display(), args = %invocation.command_line(), "Spawning engine");

        let output = self
            .command()
            .args(invocation.args())
            .output()
            .map_err(|e| self.unavailable(e))?;

        let status = match output.status.code() {
            Some(code) => Status::new(code),
            None => Status::KILLED,
        };

        Ok(Outcome {
            status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn info(&mut self, path: &Path) -> Result<AudioInfo> {
        let output = Command::new(&self.binary)
            .arg("--info")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| self.unavailable(e))?;

        if !output.status.success() {
            return Err(SoxError::InvalidInput {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report = String::from_utf8_lossy(&output.stdout);
        parse_info(&report).ok_or_else(|| SoxError::InvalidInput {
            path: path.to_path_buf(),
            reason: "engine did not report channels and sample rate".to_string(),
        })
    }
}

/// Parse the report printed by `sox --info`
///
/// ```text
/// Channels       : 2
/// Sample Rate    : 48000
/// Precision      : 16-bit
/// Duration       : 00:00:04.44 = 213120 samples ~ 333 CDDA sectors
/// ```
pub fn parse_info(report: &str) -> Option<AudioInfo> {
    let mut channels = None;
    let mut sample_rate = None;
    let mut bits_per_sample = None;
    let mut frames = 0u64;

    for line in report.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "Channels" => channels = value.parse::<u16>().ok(),
            "Sample Rate" => {
                sample_rate = value
                    .parse::<f64>()
                    .ok()
                    .map(|rate| rate.round() as u32)
            }
            "Precision" => {
                bits_per_sample = value
                    .trim_end_matches("-bit")
                    .parse::<u16>()
                    .ok()
            }
            "Duration" => {
                // "00:00:04.44 = 213120 samples ~ 333 CDDA sectors"
                frames = value
                    .split_once('=')
                    .and_then(|(_, rest)| rest.split_whitespace().next())
                    .and_then(|count| count.parse::<u64>().ok())
                    .unwrap_or(0);
            }
            _ => {}
        }
    }

    Some(AudioInfo {
        channels: channels?,
        sample_rate: sample_rate?,
        bits_per_sample,
        frames,
    })
}
