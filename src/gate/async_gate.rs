//! Async front end for the engine worker
//!
//! Jobs go through the same queue as the blocking methods, so async and
//! blocking callers share one FIFO order. Replies come back on a
//! `tokio::sync::oneshot` channel instead of blocking the calling thread.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::engine::Engine;
use crate::error::{Result, SoxError};
use crate::gate::SoxGate;
use crate::ops::{self, ChannelExport, Mp3Format, PcmFormat, StereoPair, TrimRange};
use crate::probe::AudioInfo;

/// Cloneable async handle to a `SoxGate`
#[derive(Clone)]
pub struct AsyncSoxGate {
    gate: Arc<SoxGate>,
}

impl AsyncSoxGate {
    pub fn new(gate: Arc<SoxGate>) -> Self {
        Self { gate }
    }

    /// Async handle to the process-wide gate
    pub fn shared() -> Self {
        Self::new(Arc::clone(SoxGate::shared_arc()))
    }

    pub fn gate(&self) -> &SoxGate {
        &self.gate
    }

    pub async fn execute<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Engine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        self.gate.submit(Box::new(move |engine| {
            let _ = reply.send(op(engine));
        }))?;

        result.await.map_err(|_| SoxError::WorkerStopped)?
    }

    pub async fn trim(&self, input: &Path, output: &Path, range: TrimRange) -> Result<()> {
        let (input, output) = (input.to_path_buf(), output.to_path_buf());
        self.execute(move |engine| ops::trim(engine, &input, &output, range))
            .await
    }

    pub async fn convert_pcm(&self, input: &Path, output: &Path, format: PcmFormat) -> Result<()> {
        let (input, output) = (input.to_path_buf(), output.to_path_buf());
        self.execute(move |engine| ops::convert_pcm(engine, &input, &output, format))
            .await
    }

    pub async fn convert_mp3(&self, input: &Path, output: &Path, format: Mp3Format) -> Result<()> {
        let (input, output) = (input.to_path_buf(), output.to_path_buf());
        let format = format.or_quality(self.gate.mp3_quality());
        self.execute(move |engine| ops::convert_mp3(engine, &input, &output, format))
            .await
    }

    pub async fn export_split_stereo(
        &self,
        source: &Path,
        request: &ChannelExport,
    ) -> Result<StereoPair> {
        let (source, request) = (source.to_path_buf(), request.clone());
        self.execute(move |engine| ops::export_split_stereo(engine, &source, &request))
            .await
    }

    pub async fn export_channels(
        &self,
        source: &Path,
        request: &ChannelExport,
    ) -> Result<Vec<PathBuf>> {
        let (source, request) = (source.to_path_buf(), request.clone());
        self.execute(move |engine| ops::export_channels(engine, &source, &request))
            .await
    }

    pub async fn stereo_to_mono(&self, source: &Path, request: &ChannelExport) -> Result<PathBuf> {
        let (source, request) = (source.to_path_buf(), request.clone());
        self.execute(move |engine| ops::stereo_to_mono(engine, &source, &request))
            .await
    }

    pub async fn create_multichannel_wave(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let (inputs, output) = (inputs.to_vec(), output.to_path_buf());
        self.execute(move |engine| ops::create_multichannel_wave(engine, &inputs, &output))
            .await
    }

    pub async fn info(&self, path: &Path) -> Result<AudioInfo> {
        let path = path.to_path_buf();
        self.execute(move |engine| AudioInfo::read(&path, engine))
            .await
    }
}

impl From<SoxGate> for AsyncSoxGate {
    fn from(gate: SoxGate) -> Self {
        Self::new(Arc::new(gate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_async_execute() {
        let gate = AsyncSoxGate::from(SoxGate::new(MockEngine::new()));
        let name = gate
            .execute(|engine| Ok(engine.name().to_string()))
            .await
            .unwrap();
        assert_eq!(name, "mock");
    }

    #[tokio::test]
    async fn test_async_mux_without_inputs() {
        let dir = tempdir().unwrap();
        let gate = AsyncSoxGate::from(SoxGate::new(MockEngine::new()));

        let err = gate
            .create_multichannel_wave(&[dir.path().join("a.wav")], &dir.path().join("out.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, SoxError::NoInputs));
    }
}
