//! Format conversion
//!
//! PCM conversions take an optional bit depth and an optional sample rate;
//! MP3 encodes take an optional rate selection and a quality. Whatever is
//! left out keeps the engine's default for the output format.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{Engine, Invocation};
use crate::error::{Result, SoxError};
use crate::ops::{require_output, run_checked};
use crate::probe::ensure_exists;

const SUPPORTED_BIT_DEPTHS: [u32; 4] = [8, 16, 24, 32];

fn validate_sample_rate(rate: f64) -> Result<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(SoxError::invalid_parameter(format!(
            "sample rate must be a positive number of Hz, got {}",
            rate
        )))
    }
}

/// Target PCM format
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PcmFormat {
    pub bit_depth: Option<u32>,
    pub sample_rate: Option<f64>,
}

impl PcmFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bit_depth(mut self, bits: u32) -> Self {
        self.bit_depth = Some(bits);
        self
    }

    pub fn with_sample_rate(mut self, rate: f64) -> Self {
        self.sample_rate = Some(rate);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(bits) = self.bit_depth {
            if !SUPPORTED_BIT_DEPTHS.contains(&bits) {
                return Err(SoxError::invalid_parameter(format!(
                    "bit depth must be one of {:?}, got {}",
                    SUPPORTED_BIT_DEPTHS, bits
                )));
            }
        }
        if let Some(rate) = self.sample_rate {
            validate_sample_rate(rate)?;
        }
        Ok(())
    }

    /// Add the requested output options to an invocation
    pub fn apply(&self, mut invocation: Invocation) -> Result<Invocation> {
        self.validate()?;

        if let Some(bits) = self.bit_depth {
            invocation = invocation.bits(bits);
        }
        if let Some(rate) = self.sample_rate {
            invocation = invocation.sample_rate(rate);
        }

        Ok(invocation)
    }
}

/// LAME algorithm quality: 0 is best and slowest, 9 is worst and fastest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Mp3Quality(u8);

impl Mp3Quality {
    pub const BEST: Mp3Quality = Mp3Quality(0);
    /// High quality at a reasonable speed
    pub const DEFAULT: Mp3Quality = Mp3Quality(2);
    pub const FASTEST: Mp3Quality = Mp3Quality(9);

    pub fn new(value: u8) -> Result<Self> {
        if value <= 9 {
            Ok(Mp3Quality(value))
        } else {
            Err(SoxError::invalid_parameter(format!(
                "MP3 quality must be 0-9, got {}",
                value
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Fractional part of the `-C` factor.
    ///
    /// `.0` would mean "encoder default", so the best quality is spelled `.01`.
    fn suffix(&self) -> String {
        match self.0 {
            0 => "01".to_string(),
            q => q.to_string(),
        }
    }
}

impl Default for Mp3Quality {
    fn default() -> Self {
        Mp3Quality::DEFAULT
    }
}

impl TryFrom<u8> for Mp3Quality {
    type Error = SoxError;

    fn try_from(value: u8) -> Result<Self> {
        Mp3Quality::new(value)
    }
}

impl From<Mp3Quality> for u8 {
    fn from(quality: Mp3Quality) -> u8 {
        quality.0
    }
}

impl fmt::Display for Mp3Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// MP3 rate control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mp3Rate {
    /// Constant bitrate in kbps
    Constant(u32),
    /// Variable bitrate level: 0 for large high-quality files, 9 for small ones
    Variable(u8),
}

/// Target MP3 encoding
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mp3Format {
    pub rate: Option<Mp3Rate>,
    /// `None` leaves the choice to the gate's configured quality
    pub quality: Option<Mp3Quality>,
    pub sample_rate: Option<f64>,
}

impl Mp3Format {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constant bitrate in kbps
    pub fn with_bit_rate(mut self, kbps: u32) -> Self {
        self.rate = Some(Mp3Rate::Constant(kbps));
        self
    }

    pub fn with_vbr(mut self, level: u8) -> Self {
        self.rate = Some(Mp3Rate::Variable(level));
        self
    }

    pub fn with_quality(mut self, quality: Mp3Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Fill in `quality` unless one was picked
    pub fn or_quality(mut self, default: Mp3Quality) -> Self {
        self.quality.get_or_insert(default);
        self
    }

    pub fn with_sample_rate(mut self, rate: f64) -> Self {
        self.sample_rate = Some(rate);
        self
    }

    /// The `-C` factor: `<kbps>.<quality>` for CBR, `-<level>.<quality>` for VBR
    pub fn compression(&self) -> Result<Option<String>> {
        let suffix = self.quality.unwrap_or_default().suffix();

        match self.rate {
            None => Ok(None),
            Some(Mp3Rate::Constant(0)) => Err(SoxError::invalid_parameter(
                "MP3 bitrate must be greater than 0 kbps",
            )),
            Some(Mp3Rate::Constant(kbps)) => Ok(Some(format!("{}.{}", kbps, suffix))),
            Some(Mp3Rate::Variable(level)) if level > 9 => Err(SoxError::invalid_parameter(
                format!("MP3 VBR level must be 0-9, got {}", level),
            )),
            Some(Mp3Rate::Variable(level)) => Ok(Some(format!("-{}.{}", level, suffix))),
        }
    }

    pub fn apply(&self, mut invocation: Invocation) -> Result<Invocation> {
        if let Some(factor) = self.compression()? {
            invocation = invocation.compression(factor);
        }
        if let Some(rate) = self.sample_rate {
            validate_sample_rate(rate)?;
            invocation = invocation.sample_rate(rate);
        }
        Ok(invocation)
    }
}

/// Convert `input` to an uncompressed format chosen by `output`'s extension
pub fn convert_pcm(
    engine: &mut dyn Engine,
    input: &Path,
    output: &Path,
    format: PcmFormat,
) -> Result<()> {
    let invocation = format.apply(Invocation::new(input, output))?;
    ensure_exists(input)?;

    run_checked(engine, &invocation, "convert")?;
    require_output(output)?;

    info!(input = %input.display(), output = %output.display(), bits = ?format.bit_depth, sample_rate = ?format.sample_rate, "Converted");
    Ok(())
}

/// Encode `input` as MP3
pub fn convert_mp3(
    engine: &mut dyn Engine,
    input: &Path,
    output: &Path,
    format: Mp3Format,
) -> Result<()> {
    let invocation = format.apply(Invocation::new(input, output))?;
    ensure_exists(input)?;

    run_checked(engine, &invocation, "mp3 encode")?;
    require_output(output)?;

    info!(input = %input.display(), output = %output.display(), rate = ?format.rate, quality = %format.quality.unwrap_or_default(), "Encoded MP3");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OutputOption;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn options(invocation: &Invocation) -> Vec<OutputOption> {
        invocation.output_options().to_vec()
    }

    #[test_case(None, None, vec![] ; "engine defaults")]
    #[test_case(Some(24), None, vec![OutputOption::Bits(24)] ; "bit depth only")]
    #[test_case(None, Some(48000.0), vec![OutputOption::SampleRate(48000.0)] ; "sample rate only")]
    #[test_case(Some(16), Some(44100.0), vec![OutputOption::Bits(16), OutputOption::SampleRate(44100.0)] ; "both")]
    fn test_pcm_call_shapes(bits: Option<u32>, rate: Option<f64>, expected: Vec<OutputOption>) {
        let format = PcmFormat {
            bit_depth: bits,
            sample_rate: rate,
        };
        let invocation = format.apply(Invocation::new("in.wav", "out.wav")).unwrap();
        assert_eq!(options(&invocation), expected);
    }

    #[test]
    fn test_pcm_rejects_bad_values() {
        assert!(PcmFormat::new().with_bit_depth(12).validate().is_err());
        assert!(PcmFormat::new().with_sample_rate(0.0).validate().is_err());
        assert!(PcmFormat::new().with_sample_rate(f64::INFINITY).validate().is_err());
        assert!(PcmFormat::new().with_bit_depth(32).with_sample_rate(96000.0).validate().is_ok());
    }

    #[test_case(Mp3Format::new().with_bit_rate(256), Some("256.2") ; "cbr default quality")]
    #[test_case(Mp3Format::new().with_bit_rate(128).with_quality(Mp3Quality::BEST), Some("128.01") ; "cbr best quality")]
    #[test_case(Mp3Format::new().with_bit_rate(320).with_quality(Mp3Quality::FASTEST), Some("320.9") ; "cbr fastest")]
    #[test_case(Mp3Format::new().with_vbr(4), Some("-4.2") ; "vbr default quality")]
    #[test_case(Mp3Format::new().with_vbr(0).with_quality(Mp3Quality::BEST), Some("-0.01") ; "vbr best")]
    #[test_case(Mp3Format::new(), None ; "encoder defaults")]
    fn test_mp3_compression_factor(format: Mp3Format, expected: Option<&str>) {
        assert_eq!(format.compression().unwrap().as_deref(), expected);
    }

    #[test]
    fn test_mp3_rejects_bad_values() {
        assert!(Mp3Format::new().with_bit_rate(0).compression().is_err());
        assert!(Mp3Format::new().with_vbr(10).compression().is_err());
        assert!(Mp3Quality::new(10).is_err());
        assert_eq!(Mp3Quality::new(9).unwrap(), Mp3Quality::FASTEST);
    }

    #[test]
    fn test_mp3_with_sample_rate() {
        let invocation = Mp3Format::new()
            .with_bit_rate(256)
            .with_sample_rate(48000.0)
            .apply(Invocation::new("in.wav", "out.mp3"))
            .unwrap();
        assert_eq!(
            options(&invocation),
            vec![
                OutputOption::Compression("256.2".to_string()),
                OutputOption::SampleRate(48000.0)
            ]
        );
    }

    #[test]
    fn test_mp3_configured_quality_fills_gap() {
        let unset = Mp3Format::new().with_bit_rate(192).or_quality(Mp3Quality::BEST);
        assert_eq!(unset.compression().unwrap().as_deref(), Some("192.01"));

        let picked = Mp3Format::new()
            .with_bit_rate(192)
            .with_quality(Mp3Quality::FASTEST)
            .or_quality(Mp3Quality::BEST);
        assert_eq!(picked.compression().unwrap().as_deref(), Some("192.9"));
    }

    #[test]
    fn test_mp3_format_partial_json() {
        let format: Mp3Format = serde_json::from_str(r#"{"rate": {"constant": 256}}"#).unwrap();
        assert_eq!(format.rate, Some(Mp3Rate::Constant(256)));
        assert_eq!(format.quality, None);
        assert_eq!(format.compression().unwrap().as_deref(), Some("256.2"));

        let empty: Mp3Format = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Mp3Format::new());
    }

    #[test]
    fn test_mp3_quality_serde() {
        let json = serde_json::to_string(&Mp3Quality::DEFAULT).unwrap();
        assert_eq!(json, "2");
        assert!(serde_json::from_str::<Mp3Quality>("12").is_err());
    }
}
