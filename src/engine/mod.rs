//! Engine boundary
//!
//! The `Engine` trait is the only way soxgate talks to SoX:
//! - `Invocation` renders one fully-specified SoX argument vector
//! - `SoxProcess` runs invocations through the `sox` binary
//! - `MockEngine` records invocations and synthesizes outputs for tests
//!
//! The engine keeps process-global state, so implementations are driven
//! from a single owner (see `crate::gate`).

pub mod invocation;
pub mod mock;
pub mod sox;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::probe::AudioInfo;

pub use invocation::{Effect, Invocation, OutputOption};
pub use mock::{MockEngine, MockLog};
pub use sox::SoxProcess;

/// Integer status reported by the engine for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Status(i32);

impl Status {
    /// The single success sentinel
    pub const SUCCESS: Status = Status(0);
    /// The engine was terminated before reporting a status
    pub const KILLED: Status = Status(-1);

    pub const fn new(code: i32) -> Self {
        Status(code)
    }

    pub fn code(&self) -> i32 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        *self == Status::SUCCESS
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the engine reported after running one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    /// Diagnostic text, empty when the engine printed nothing
    pub stderr: String,
}

impl Outcome {
    pub fn success() -> Self {
        Outcome {
            status: Status::SUCCESS,
            stderr: String::new(),
        }
    }

    pub fn failure(status: Status, stderr: impl Into<String>) -> Self {
        Outcome {
            status,
            stderr: stderr.into(),
        }
    }
}

/// A non-reentrant audio engine
///
/// `run` returns `Err` only when the engine could not be driven at all
/// (for example the binary is missing). A processing failure is an
/// `Ok(Outcome)` carrying a non-success status.
pub trait Engine: Send {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Execute one invocation to completion
    fn run(&mut self, invocation: &Invocation) -> Result<Outcome>;

    /// Read stream metadata for a file the engine can decode
    fn info(&mut self, path: &Path) -> Result<AudioInfo>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&mut self, invocation: &Invocation) -> Result<Outcome> {
        (**self).run(invocation)
    }

    fn info(&mut self, path: &Path) -> Result<AudioInfo> {
        (**self).info(path)
    }
}
