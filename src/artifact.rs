//! Artifact writer seam. The export engine produces (filename, bytes);
//! a writer decides where they land.

use crate::export::Artifact;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub trait ArtifactWriter {
    fn write_artifact(&mut self, artifact: &Artifact) -> Result<()>;
}

/// Writes artifacts into a target directory, creating it if needed.
#[derive(Clone, Debug)]
pub struct DirArtifactWriter {
    dir: PathBuf,
}

impl DirArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, artifact: &Artifact) -> PathBuf {
        self.dir.join(&artifact.filename)
    }
}

impl ArtifactWriter for DirArtifactWriter {
    fn write_artifact(&mut self, artifact: &Artifact) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Could not create {}", self.dir.display()))?;
        let path = self.path_for(artifact);
        fs::write(&path, &artifact.contents)
            .with_context(|| format!("Could not write {}", path.display()))?;
        tracing::info!("wrote {}", path.display());
        Ok(())
    }
}
