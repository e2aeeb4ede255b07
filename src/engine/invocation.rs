//! SoX argument vectors
//!
//! An `Invocation` describes one engine call with typed parts and renders
//! them in the order the `sox` command line expects:
//!
//! ```text
//! sox [-M] input... [-b bits] [-r rate] [-C compression] output [effect args]...
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Format options applied to the output file
#[derive(Debug, Clone, PartialEq)]
pub enum OutputOption {
    /// `-b`: bits per sample
    Bits(u32),
    /// `-r`: sample rate in Hz; the engine resamples as needed
    SampleRate(f64),
    /// `-C`: compression factor, already formatted for the output codec
    Compression(String),
}

/// Effects appended after the output file
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// `trim <start> [=<end>]`, seconds; `None` runs to the end of the input
    Trim { start: f64, end: Option<f64> },
    /// `remix <channel>`, 1-based input channel
    Remix { channel: u32 },
}

impl Effect {
    fn render(&self, args: &mut Vec<OsString>) {
        match self {
            Effect::Trim { start, end } => {
                args.push("trim".into());
                args.push(format_number(*start).into());
                if let Some(end) = end {
                    // absolute position, not a length
                    args.push(format!("={}", format_number(*end)).into());
                }
            }
            Effect::Remix { channel } => {
                args.push("remix".into());
                args.push(channel.to_string().into());
            }
        }
    }
}

/// One fully-specified engine call
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    merge: bool,
    inputs: Vec<PathBuf>,
    output: PathBuf,
    output_options: Vec<OutputOption>,
    effects: Vec<Effect>,
}

impl Invocation {
    /// Single input to single output
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Invocation {
            merge: false,
            inputs: vec![input.into()],
            output: output.into(),
            output_options: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Combine inputs side by side: the output carries every channel of every input
    pub fn merge<I, P>(inputs: I, output: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Invocation {
            merge: true,
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: output.into(),
            output_options: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn bits(self, bits: u32) -> Self {
        self.option(OutputOption::Bits(bits))
    }

    pub fn sample_rate(self, rate: f64) -> Self {
        self.option(OutputOption::SampleRate(rate))
    }

    pub fn compression(self, value: impl Into<String>) -> Self {
        self.option(OutputOption::Compression(value.into()))
    }

    pub fn option(mut self, option: OutputOption) -> Self {
        self.output_options.push(option);
        self
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn is_merge(&self) -> bool {
        self.merge
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn output_options(&self) -> &[OutputOption] {
        &self.output_options
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Requested output bit depth, if any
    pub fn requested_bits(&self) -> Option<u32> {
        self.output_options.iter().find_map(|option| match option {
            OutputOption::Bits(bits) => Some(*bits),
            _ => None,
        })
    }

    /// Requested output sample rate, if any
    pub fn requested_sample_rate(&self) -> Option<f64> {
        self.output_options.iter().find_map(|option| match option {
            OutputOption::SampleRate(rate) => Some(*rate),
            _ => None,
        })
    }

    /// Render the argument vector, without the program name
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        if self.merge {
            args.push("-M".into());
        }

        for input in &self.inputs {
            args.push(path_arg(input));
        }

        for option in &self.output_options {
            match option {
                OutputOption::Bits(bits) => {
                    args.push("-b".into());
                    args.push(bits.to_string().into());
                }
                OutputOption::SampleRate(rate) => {
                    args.push("-r".into());
                    args.push(format_number(*rate).into());
                }
                OutputOption::Compression(value) => {
                    args.push("-C".into());
                    args.push(value.into());
                }
            }
        }

        args.push(path_arg(&self.output));

        for effect in &self.effects {
            effect.render(&mut args);
        }

        args
    }

    /// Lossy single-line rendering for logs
    pub fn command_line(&self) -> String {
        self.args()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// File argument that `sox` cannot mistake for an option or for stdio
///
/// A relative path starting with `-` (including `-` itself) gets a `./` prefix.
fn path_arg(path: &Path) -> OsString {
    if path.is_relative() && path.to_string_lossy().starts_with('-') {
        Path::new(".").join(path).into_os_string()
    } else {
        path.as_os_str().to_os_string()
    }
}

/// Shortest decimal form: `48000.0` renders as `48000`, `1.5` as `1.5`
pub fn format_number(value: f64) -> String {
    value.to_string()
}
