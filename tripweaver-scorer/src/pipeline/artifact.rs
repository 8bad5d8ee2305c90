//! Persisted pipeline artefact and its metadata sidecar.
//!
//! The blob is `bincode` with a magic tag, schema version and the numeric
//! column list ahead of the fitted parameters, so a reader can tell a
//! missing artefact from one written for a different feature schema.

use bincode::Options;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tripweaver_core::NUMERIC_FEATURES;

use super::EmbeddingPipeline;
use crate::PipelineError;

/// File name of the fitted-parameter blob.
pub const MODEL_FILE_NAME: &str = "activity_recommendation_model.bin";
/// File name of the JSON metadata sidecar.
pub const METADATA_FILE_NAME: &str = "model_metadata.json";
/// Version string recorded in the metadata.
pub const MODEL_VERSION: &str = "1.0.0";

/// Magic tag opening every artefact blob.
pub const ARTIFACT_MAGIC: [u8; 4] = *b"TWEP";
/// Binary schema version of the artefact blob.
pub const ARTIFACT_VERSION: u16 = 1;

/// Bincode options used for the artefact blob.
pub(crate) fn bincode_options() -> impl bincode::Options {
    bincode::DefaultOptions::new()
}

/// Training metadata stored alongside the fitted parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// When the pipeline was fitted (UTC).
    pub trained_at: DateTime<Utc>,
    /// Number of activities in the training corpus.
    pub activities_count: usize,
    /// `[rows, columns]` of the training embedding matrix.
    pub feature_matrix_shape: [usize; 2],
    /// Pipeline model version.
    pub model_version: String,
}

impl ArtifactMetadata {
    /// Whole days elapsed between training and `now`.
    #[must_use]
    pub fn age_in_days(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.trained_at).num_days()
    }
}

#[derive(Serialize)]
struct ArtifactRef<'a> {
    magic: [u8; 4],
    version: u16,
    numeric_columns: Vec<String>,
    pipeline: &'a EmbeddingPipeline,
}

#[derive(Deserialize)]
struct ArtifactHeader {
    magic: [u8; 4],
    version: u16,
    numeric_columns: Vec<String>,
}

#[derive(Deserialize)]
struct ArtifactOwned {
    #[serde(rename = "magic")]
    _magic: [u8; 4],
    #[serde(rename = "version")]
    _version: u16,
    #[serde(rename = "numeric_columns")]
    _numeric_columns: Vec<String>,
    pipeline: EmbeddingPipeline,
}

fn current_columns() -> Vec<String> {
    NUMERIC_FEATURES.iter().map(|c| (*c).to_owned()).collect()
}

/// Path of the artefact blob inside `model_dir`.
#[must_use]
pub fn model_path(model_dir: &Utf8Path) -> Utf8PathBuf {
    model_dir.join(MODEL_FILE_NAME)
}

/// Path of the metadata sidecar inside `model_dir`.
#[must_use]
pub fn metadata_path(model_dir: &Utf8Path) -> Utf8PathBuf {
    model_dir.join(METADATA_FILE_NAME)
}

pub(super) fn save(pipeline: &EmbeddingPipeline, model_dir: &Utf8Path) -> Result<(), PipelineError> {
    tripweaver_fs::ensure_dir(model_dir).map_err(|source| PipelineError::CreateParent {
        path: model_dir.to_path_buf(),
        source,
    })?;

    let blob_path = model_path(model_dir);
    let artifact = ArtifactRef {
        magic: ARTIFACT_MAGIC,
        version: ARTIFACT_VERSION,
        numeric_columns: current_columns(),
        pipeline,
    };
    let blob = bincode_options()
        .serialize(&artifact)
        .map_err(|source| PipelineError::Encode {
            path: blob_path.clone(),
            source,
        })?;
    tripweaver_fs::write_atomic(&blob_path, &blob).map_err(|source| PipelineError::Io {
        path: blob_path.clone(),
        source,
    })?;

    let sidecar_path = metadata_path(model_dir);
    let sidecar = serde_json::to_vec_pretty(pipeline.metadata()).map_err(|source| {
        PipelineError::Metadata {
            path: sidecar_path.clone(),
            source,
        }
    })?;
    tripweaver_fs::write_atomic(&sidecar_path, &sidecar).map_err(|source| PipelineError::Io {
        path: sidecar_path,
        source,
    })
}

pub(super) fn load(model_dir: &Utf8Path) -> Result<EmbeddingPipeline, PipelineError> {
    let path = model_path(model_dir);
    let exists = tripweaver_fs::file_is_file(&path).map_err(|source| PipelineError::Io {
        path: path.clone(),
        source,
    })?;
    if !exists {
        return Err(PipelineError::ArtifactNotFound { path });
    }
    let bytes = tripweaver_fs::read_bytes(&path).map_err(|source| PipelineError::Io {
        path: path.clone(),
        source,
    })?;
    let incompatible = |reason: String| PipelineError::IncompatibleArtifact {
        path: path.clone(),
        reason,
    };

    let header: ArtifactHeader = bincode_options()
        .allow_trailing_bytes()
        .deserialize(&bytes)
        .map_err(|err| incompatible(format!("unreadable header: {err}")))?;
    if header.magic != ARTIFACT_MAGIC {
        return Err(incompatible("unrecognised magic tag".to_owned()));
    }
    if header.version != ARTIFACT_VERSION {
        return Err(incompatible(format!(
            "schema version {} (expected {ARTIFACT_VERSION})",
            header.version
        )));
    }
    if header.numeric_columns != current_columns() {
        return Err(incompatible("numeric feature columns differ".to_owned()));
    }

    let artifact: ArtifactOwned = bincode_options()
        .deserialize(&bytes)
        .map_err(|err| incompatible(format!("undecodable parameters: {err}")))?;
    let pipeline = artifact.pipeline;
    if !pipeline.is_consistent() {
        return Err(incompatible(
            "fitted parameters disagree with recorded shape".to_owned(),
        ));
    }
    Ok(pipeline)
}

/// Read only the metadata sidecar from `model_dir`.
///
/// # Errors
/// Returns [`PipelineError::ArtifactNotFound`] when the sidecar is missing,
/// [`PipelineError::Io`] when it cannot be read and
/// [`PipelineError::Metadata`] when it is not valid metadata JSON.
pub fn read_metadata(model_dir: &Utf8Path) -> Result<ArtifactMetadata, PipelineError> {
    let path = metadata_path(model_dir);
    let text = match tripweaver_fs::read_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::ArtifactNotFound { path });
        }
        Err(source) => return Err(PipelineError::Io { path, source }),
    };
    serde_json::from_str(&text).map_err(|source| PipelineError::Metadata { path, source })
}
