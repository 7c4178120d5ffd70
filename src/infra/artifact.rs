// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Saves and restores the fitted pipeline as one self-contained
// JSON file. This is the only thing the trainer and the predictor
// service exchange.
//
// File layout:
//
//   {
//     "format":         "sleep-quality-pipeline",
//     "format_version": 1,
//     "metadata":       { created_at_ms, train_rows, test_rows,
//                         r2, n_trees, seed },
//     "pipeline":       { encoding_version, feature_columns,
//                         preprocessor, regressor }
//   }
//
// Writing:
//   1. Serialise into `<artifact>.tmp`
//   2. fsync
//   3. Rename over `<artifact>`
//   A failure at any step removes the temp file, so a reader never
//   sees a half-written artifact under the real name.
//
// Reading rejects, in order: unreadable file, malformed JSON, a
// foreign `format`, an unknown `format_version`, and a pipeline
// whose encoding contract does not match this build.
//
// Reference: Rust Book §9 (Error Handling)
//            serde_json documentation (float_roundtrip)

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::traits::Persistable;
use crate::ml::error::ModelError;
use crate::ml::pipeline::SleepPipeline;

pub const ARTIFACT_FORMAT: &str = "sleep-quality-pipeline";
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read artifact '{path}': {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write artifact '{path}': {source}")]
    Write {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact '{path}' is not valid JSON: {source}")]
    Malformed {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialise artifact: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("'{path}' is not a sleep quality artifact (format '{found}')")]
    WrongFormat { path: PathBuf, found: String },

    #[error("artifact format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("artifact pipeline rejected: {0}")]
    Contract(#[from] ModelError),
}

/// Facts about the training run, stored next to the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub created_at_ms: u64,
    pub train_rows:    usize,
    pub test_rows:     usize,
    pub r2:            Option<f64>,
    pub n_trees:       usize,
    pub seed:          u64,
}

impl ArtifactMetadata {
    /// Stamp metadata for `pipeline` with the current wall-clock time
    pub fn new(pipeline: &SleepPipeline, train_rows: usize, test_rows: usize, r2: Option<f64>) -> Self {
        let config = pipeline.regressor.config();
        Self {
            created_at_ms: now_ms(),
            train_rows,
            test_rows,
            r2,
            n_trees: config.n_trees,
            seed:    config.seed,
        }
    }
}

/// A loaded (or about to be saved) artifact
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub metadata: ArtifactMetadata,
    pub pipeline: SleepPipeline,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format:         &'a str,
    format_version: u32,
    metadata:       &'a ArtifactMetadata,
    pipeline:       &'a SleepPipeline,
}

#[derive(Deserialize)]
struct Header {
    format:         String,
    format_version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    metadata: ArtifactMetadata,
    pipeline: SleepPipeline,
}

/// Reads and writes the artifact at a fixed path.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Atomically write `artifact` to the store path.
    pub fn save(&self, artifact: &Artifact) -> Result<(), ArtifactError> {
        let envelope = EnvelopeRef {
            format:         ARTIFACT_FORMAT,
            format_version: ARTIFACT_FORMAT_VERSION,
            metadata:       &artifact.metadata,
            pipeline:       &artifact.pipeline,
        };
        let bytes = serde_json::to_vec(&envelope).map_err(ArtifactError::Serialize)?;

        let tmp = self.temp_path();
        if let Err(source) = write_synced(&tmp, &bytes).and_then(|_| fs::rename(&tmp, &self.path)) {
            // The temp file may not exist if creation itself failed
            let _ = fs::remove_file(&tmp);
            return Err(ArtifactError::Write { path: self.path.clone(), source });
        }

        tracing::debug!("Wrote artifact '{}' ({} bytes)", self.path.display(), bytes.len());
        Ok(())
    }

    /// Read, validate and return the artifact at the store path.
    pub fn load(&self) -> Result<Artifact, ArtifactError> {
        let bytes = fs::read(&self.path).map_err(|source| ArtifactError::Read {
            path: self.path.clone(),
            source,
        })?;

        let malformed = |source: serde_json::Error| ArtifactError::Malformed {
            path: self.path.clone(),
            source,
        };

        let header: Header = serde_json::from_slice(&bytes).map_err(malformed)?;
        if header.format != ARTIFACT_FORMAT {
            return Err(ArtifactError::WrongFormat {
                path:  self.path.clone(),
                found: header.format,
            });
        }
        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                expected: ARTIFACT_FORMAT_VERSION,
                found:    header.format_version,
            });
        }

        let envelope: Envelope = serde_json::from_slice(&bytes).map_err(malformed)?;
        envelope.pipeline.verify_contract()?;

        tracing::debug!(
            "Loaded artifact '{}' ({} trees, trained on {} rows)",
            self.path.display(),
            envelope.metadata.n_trees,
            envelope.metadata.train_rows
        );
        Ok(Artifact { metadata: envelope.metadata, pipeline: envelope.pipeline })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl Persistable for Artifact {
    fn save(&self, path: &str) -> Result<()> {
        ArtifactStore::new(path).save(self)?;
        Ok(())
    }

    fn load(path: &str) -> Result<Self> {
        Ok(ArtifactStore::new(path).load()?)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(bytes)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
