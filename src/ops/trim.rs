//! Trim to a time range

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{Effect, Engine, Invocation};
use crate::error::{Result, SoxError};
use crate::ops::{require_output, run_checked};
use crate::probe::ensure_exists;

/// Where a trimmed region stops
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum TrimEnd {
    /// Keep everything after the start
    #[default]
    EndOfFile,
    /// Absolute position in seconds from the start of the input
    At(f64),
}

impl TrimEnd {
    /// Seconds value where anything `<= 0` means "to the end of the file"
    pub fn from_secs(secs: f64) -> Self {
        if secs > 0.0 {
            TrimEnd::At(secs)
        } else {
            TrimEnd::EndOfFile
        }
    }
}

/// Region of the input to keep, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start: f64,
    pub end: TrimEnd,
}

impl TrimRange {
    pub fn new(start: f64, end: TrimEnd) -> Self {
        Self { start, end }
    }

    /// From `start` to the end of the input
    pub fn from_start(start: f64) -> Self {
        Self::new(start, TrimEnd::EndOfFile)
    }

    /// Both bounds in seconds; an `end` of 0 keeps the rest of the file
    pub fn secs(start: f64, end: f64) -> Self {
        Self::new(start, TrimEnd::from_secs(end))
    }

    /// Length of the kept region, when bounded
    pub fn length(&self) -> Option<f64> {
        match self.end {
            TrimEnd::At(end) => Some(end - self.start),
            TrimEnd::EndOfFile => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(SoxError::invalid_parameter(format!(
                "trim start must be a non-negative number of seconds, got {}",
                self.start
            )));
        }

        if let TrimEnd::At(end) = self.end {
            if !end.is_finite() || end <= self.start {
                return Err(SoxError::invalid_parameter(format!(
                    "trim end ({}) must come after start ({})",
                    end, self.start
                )));
            }
        }

        Ok(())
    }

    fn effect(&self) -> Effect {
        Effect::Trim {
            start: self.start,
            end: match self.end {
                TrimEnd::At(end) => Some(end),
                TrimEnd::EndOfFile => None,
            },
        }
    }
}

impl From<RangeInclusive<f64>> for TrimRange {
    fn from(range: RangeInclusive<f64>) -> Self {
        let (start, end) = range.into_inner();
        TrimRange::secs(start, end)
    }
}

/// Keep `range` of `input`, written to `output`
///
/// Succeeds only when the engine reports success and `output` exists.
pub fn trim(engine: &mut dyn Engine, input: &Path, output: &Path, range: TrimRange) -> Result<()> {
    range.validate()?;
    ensure_exists(input)?;

    let invocation = Invocation::new(input, output).effect(range.effect());
    run_checked(engine, &invocation, "trim")?;
    require_output(output)?;

    info!(input = %input.display(), output = %output.display(), start = range.start, end = ?range.end, "Trimmed");
    Ok(())
}
