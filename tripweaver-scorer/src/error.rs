//! Error types raised while fitting, saving or loading the embedding pipeline.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised by [`EmbeddingPipeline`](crate::EmbeddingPipeline) and
/// [`PipelineHandle`](crate::PipelineHandle).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Training was requested with no activities.
    #[error("cannot fit the embedding pipeline on an empty corpus")]
    EmptyCorpus,
    /// No artefact exists at the expected location.
    #[error("no trained pipeline artefact at {path}")]
    ArtifactNotFound {
        /// Expected artefact path.
        path: Utf8PathBuf,
    },
    /// An artefact exists but does not match the current feature schema.
    #[error("pipeline artefact at {path} is incompatible: {reason}")]
    IncompatibleArtifact {
        /// Artefact path.
        path: Utf8PathBuf,
        /// What did not match.
        reason: String,
    },
    /// Reading or writing an artefact file failed.
    #[error("failed to access {path}")]
    Io {
        /// File being accessed.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Encoding the artefact blob failed.
    #[error("failed to encode pipeline artefact for {path}")]
    Encode {
        /// Target file path.
        path: Utf8PathBuf,
        /// Source error from `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// Reading or writing the metadata sidecar failed.
    #[error("invalid pipeline metadata at {path}")]
    Metadata {
        /// Sidecar path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Creating the model directory failed.
    #[error("failed to create model directory {path}")]
    CreateParent {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
}
