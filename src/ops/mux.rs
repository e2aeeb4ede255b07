//! Multi-channel muxing

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::engine::{Engine, Invocation};
use crate::error::{Result, SoxError};
use crate::ops::{require_output, run_checked};

/// Combine `inputs` into one file with every input's channels side by side
///
/// Inputs that do not exist are skipped; with none left the call fails
/// with `NoInputs` and the engine is never invoked.
pub fn create_multichannel_wave(
    engine: &mut dyn Engine,
    inputs: &[PathBuf],
    output: &Path,
) -> Result<()> {
    let (existing, missing): (Vec<&PathBuf>, Vec<&PathBuf>) =
        inputs.iter().partition(|input| input.exists());

    for input in &missing {
        warn!(input = %input.display(), "Skipping missing mux input");
    }

    if existing.is_empty() {
        return Err(SoxError::NoInputs);
    }

    let invocation = Invocation::merge(existing.iter().copied(), output);
    run_checked(engine, &invocation, "mux")?;
    require_output(output)?;

    info!(output = %output.display(), inputs = existing.len(), "Muxed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use tempfile::tempdir;

    #[test]
    fn test_no_existing_inputs() {
        let dir = tempdir().unwrap();
        let mut engine = MockEngine::new();
        let log = engine.log();

        let err = create_multichannel_wave(
            &mut engine,
            &[dir.path().join("a.wav"), dir.path().join("b.wav")],
            &dir.path().join("multi.wav"),
        )
        .unwrap_err();

        assert!(matches!(err, SoxError::NoInputs));
        assert!(log.is_empty());
    }

    #[test]
    fn test_empty_input_list() {
        let dir = tempdir().unwrap();
        let mut engine = MockEngine::new();
        let err = create_multichannel_wave(&mut engine, &[], &dir.path().join("multi.wav"))
            .unwrap_err();
        assert_eq!(err.error_code(), "NO_INPUTS");
    }
}
