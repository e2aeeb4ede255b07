//! Sibling output names for channel exports
//!
//! `<dir>/<base>.<tag>.<ext>`, where `dir` is the requested destination when
//! it is an existing directory and the source's own directory otherwise,
//! `base` is the requested name or the source's file stem, and `ext` is the
//! source's extension.

use std::path::{Path, PathBuf};

/// Resolved directory, base name and extension for derived outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    dir: PathBuf,
    base: String,
    ext: Option<String>,
}

impl OutputNaming {
    pub fn resolve(source: &Path, destination: Option<&Path>, new_name: Option<&str>) -> Self {
        let dir = match destination {
            Some(destination) if destination.is_dir() => destination.to_path_buf(),
            _ => source
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        let base = new_name
            .map(str::to_string)
            .or_else(|| {
                source
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_default();

        let ext = source
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned());

        Self { dir, base, ext }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `<base>.<tag>.<ext>` inside the resolved directory
    pub fn path_for(&self, tag: &str) -> PathBuf {
        let file_name = match &self.ext {
            Some(ext) => format!("{}.{}.{}", self.base, tag, ext),
            None => format!("{}.{}", self.base, tag),
        };
        self.dir.join(file_name)
    }

    pub fn left(&self) -> PathBuf {
        self.path_for("L")
    }

    pub fn right(&self) -> PathBuf {
        self.path_for("R")
    }

    pub fn mono(&self) -> PathBuf {
        self.path_for("Mono")
    }

    /// 1-based channel index
    pub fn channel(&self, index: u32) -> PathBuf {
        self.path_for(&index.to_string())
    }
}
