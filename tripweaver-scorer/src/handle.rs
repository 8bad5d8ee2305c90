//! Publication of the active pipeline snapshot.
//!
//! Readers clone the current `Arc` and rank against it for the rest of the
//! request. Training builds a whole new pipeline, saves it, then swaps the
//! pointer, so concurrent requests never see a half-fitted transform.

use std::sync::{Arc, PoisonError, RwLock};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tripweaver_core::Activity;

use crate::pipeline::{ArtifactMetadata, EmbeddingPipeline, model_path, read_metadata};
use crate::{PipelineError, SimilarityRanker};

/// Settings for locating and refreshing the trained pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorerConfig {
    /// Directory holding the artefact and its metadata sidecar.
    pub model_dir: Utf8PathBuf,
    /// Artefacts younger than this many whole days are reused.
    pub max_age_days: i64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            model_dir: Utf8PathBuf::from("models"),
            max_age_days: 7,
        }
    }
}

/// Whether training produced a new pipeline or reused a saved one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainStatus {
    /// A pipeline was fitted and saved.
    Trained,
    /// A fresh artefact was loaded instead of fitting.
    Reused,
}

/// Result of [`PipelineHandle::train`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainOutcome {
    /// What happened.
    pub status: TrainStatus,
    /// Metadata of the published pipeline.
    pub metadata: ArtifactMetadata,
}

/// Model status reported by [`PipelineHandle::info`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelInfo {
    /// No pipeline is published.
    NotTrained,
    /// A pipeline is published.
    Trained {
        /// Training metadata.
        metadata: ArtifactMetadata,
        /// `[rows, columns]` of the training embedding matrix.
        feature_matrix_shape: [usize; 2],
        /// Expected artefact location.
        model_file: Utf8PathBuf,
        /// Whether the artefact exists on disk.
        model_file_exists: bool,
    },
}

/// Holder of the active pipeline snapshot.
#[derive(Debug, Default)]
pub struct PipelineHandle {
    config: ScorerConfig,
    current: RwLock<Option<Arc<EmbeddingPipeline>>>,
}

impl PipelineHandle {
    /// Create a handle with nothing published.
    #[must_use]
    pub fn new(config: ScorerConfig) -> Self {
        Self {
            config,
            current: RwLock::new(None),
        }
    }

    /// Directory holding the artefact.
    #[must_use]
    pub fn model_dir(&self) -> &Utf8Path {
        &self.config.model_dir
    }

    /// Current snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<EmbeddingPipeline>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the published snapshot.
    pub fn publish(&self, pipeline: EmbeddingPipeline) -> Arc<EmbeddingPipeline> {
        let pipeline = Arc::new(pipeline);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&pipeline));
        pipeline
    }

    /// Ranker bound to the current snapshot.
    #[must_use]
    pub fn ranker(&self) -> SimilarityRanker {
        SimilarityRanker::new(self.snapshot())
    }

    /// Publish the saved artefact when one exists.
    ///
    /// Returns `Ok(None)` when no artefact has been saved yet.
    ///
    /// # Errors
    /// Returns [`PipelineError`] when an artefact exists but cannot be read
    /// or is incompatible.
    pub fn load_saved(&self) -> Result<Option<Arc<EmbeddingPipeline>>, PipelineError> {
        match EmbeddingPipeline::load(&self.config.model_dir) {
            Ok(pipeline) => Ok(Some(self.publish(pipeline))),
            Err(PipelineError::ArtifactNotFound { path }) => {
                log::debug!("no saved pipeline at {path}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Train on `activities`, or reuse a fresh saved artefact.
    ///
    /// Unless `force` is set, a saved artefact younger than the configured
    /// age is loaded and published instead of fitting. An artefact that is
    /// present but unloadable is logged and replaced.
    ///
    /// # Errors
    /// Returns [`PipelineError::EmptyCorpus`] when fitting is needed and
    /// `activities` is empty, or another [`PipelineError`] when the new
    /// artefact cannot be saved.
    pub fn train(
        &self,
        activities: &[Activity],
        force: bool,
    ) -> Result<TrainOutcome, PipelineError> {
        self.train_at(activities, force, Utc::now())
    }

    /// [`PipelineHandle::train`] with an explicit clock.
    ///
    /// # Errors
    /// See [`PipelineHandle::train`].
    pub fn train_at(
        &self,
        activities: &[Activity],
        force: bool,
        now: DateTime<Utc>,
    ) -> Result<TrainOutcome, PipelineError> {
        if !force {
            if let Some(pipeline) = self.reusable(now) {
                let metadata = pipeline.metadata().clone();
                self.publish(pipeline);
                return Ok(TrainOutcome {
                    status: TrainStatus::Reused,
                    metadata,
                });
            }
        }

        let pipeline = EmbeddingPipeline::fit_at(activities, now)?;
        pipeline.save(&self.config.model_dir)?;
        let metadata = pipeline.metadata().clone();
        self.publish(pipeline);
        Ok(TrainOutcome {
            status: TrainStatus::Trained,
            metadata,
        })
    }

    fn reusable(&self, now: DateTime<Utc>) -> Option<EmbeddingPipeline> {
        let dir = &self.config.model_dir;
        let metadata = match read_metadata(dir) {
            Ok(metadata) => metadata,
            Err(PipelineError::ArtifactNotFound { .. }) => return None,
            Err(err) => {
                log::warn!("cannot read pipeline metadata ({err}); retraining");
                return None;
            }
        };
        let age = metadata.age_in_days(now);
        if age >= self.config.max_age_days {
            log::info!("saved pipeline is {age} days old; retraining");
            return None;
        }
        match EmbeddingPipeline::load(dir) {
            Ok(pipeline) => {
                log::info!("reusing saved pipeline ({age} days old)");
                Some(pipeline)
            }
            Err(err) => {
                log::warn!("failed to load saved pipeline ({err}); retraining");
                None
            }
        }
    }

    /// Describe the published pipeline.
    #[must_use]
    pub fn info(&self) -> ModelInfo {
        let Some(pipeline) = self.snapshot() else {
            return ModelInfo::NotTrained;
        };
        let model_file = model_path(&self.config.model_dir);
        let model_file_exists = tripweaver_fs::file_is_file(&model_file).unwrap_or_else(|err| {
            log::warn!("cannot stat {model_file}: {err}");
            false
        });
        ModelInfo::Trained {
            metadata: pipeline.metadata().clone(),
            feature_matrix_shape: pipeline.metadata().feature_matrix_shape,
            model_file,
            model_file_exists,
        }
    }
}
