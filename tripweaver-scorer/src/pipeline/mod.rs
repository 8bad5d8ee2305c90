//! The fitted embedding transform.
//!
//! An [`EmbeddingPipeline`] concatenates three sub-transforms fitted jointly
//! on a corpus: a one-hot encoding of the primary category, z-scores of the
//! numeric features and TF-IDF weights of the tag text. Once fitted it is
//! immutable; retraining builds a new value.

mod artifact;
mod encoder;
mod scaler;
mod tfidf;

use camino::Utf8Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tripweaver_core::{Activity, FeatureVector, NUMERIC_FEATURES};

pub use artifact::{
    ARTIFACT_MAGIC, ARTIFACT_VERSION, ArtifactMetadata, METADATA_FILE_NAME, MODEL_FILE_NAME,
    MODEL_VERSION, metadata_path, model_path, read_metadata,
};
pub use encoder::CategoryEncoder;
pub use scaler::StandardScaler;
pub use tfidf::{MAX_VOCABULARY, TfidfVectorizer, tokenize};

use crate::PipelineError;

/// Embeddings produced by a pipeline; all rows share one width.
pub type Embedding = Vec<f64>;

/// Fitted one-hot, z-score and TF-IDF transform with training metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingPipeline {
    encoder: CategoryEncoder,
    scaler: StandardScaler,
    tfidf: TfidfVectorizer,
    frame: Vec<FeatureVector>,
    metadata: ArtifactMetadata,
}

impl EmbeddingPipeline {
    /// Fit the pipeline on `activities`, stamping it with the current time.
    ///
    /// # Errors
    /// Returns [`PipelineError::EmptyCorpus`] when `activities` is empty.
    pub fn fit(activities: &[Activity]) -> Result<Self, PipelineError> {
        Self::fit_at(activities, Utc::now())
    }

    /// Fit the pipeline on `activities`, recording `trained_at`.
    ///
    /// # Errors
    /// Returns [`PipelineError::EmptyCorpus`] when `activities` is empty.
    pub fn fit_at(
        activities: &[Activity],
        trained_at: DateTime<Utc>,
    ) -> Result<Self, PipelineError> {
        if activities.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }
        let frame: Vec<FeatureVector> = activities.iter().map(FeatureVector::extract).collect();
        let encoder = CategoryEncoder::fit(frame.iter().map(|f| f.primary_category.as_str()));
        let numeric: Vec<[f64; 12]> = frame.iter().map(|f| f.numeric).collect();
        let scaler = StandardScaler::fit(&numeric);
        let tfidf = TfidfVectorizer::fit(frame.iter().map(|f| f.text.as_str()));
        let width = encoder.width() + NUMERIC_FEATURES.len() + tfidf.width();
        let metadata = ArtifactMetadata {
            trained_at,
            activities_count: activities.len(),
            feature_matrix_shape: [frame.len(), width],
            model_version: MODEL_VERSION.to_owned(),
        };
        log::info!(
            "fitted embedding pipeline on {} activities ({} columns)",
            frame.len(),
            width
        );
        Ok(Self {
            encoder,
            scaler,
            tfidf,
            frame,
            metadata,
        })
    }

    /// Embedding width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.encoder.width() + NUMERIC_FEATURES.len() + self.tfidf.width()
    }

    /// Embedding position of a named numeric column.
    #[must_use]
    pub fn numeric_component(&self, column: &str) -> Option<usize> {
        FeatureVector::numeric_index(column).map(|idx| self.encoder.width() + idx)
    }

    /// Training metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    /// Feature rows of the training corpus.
    #[must_use]
    pub fn training_frame(&self) -> &[FeatureVector] {
        &self.frame
    }

    /// Report whether the pipeline is younger than `max_age_days` at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age_days: i64) -> bool {
        self.metadata.age_in_days(now) < max_age_days
    }

    /// Embed one feature row.
    #[must_use]
    pub fn embed(&self, features: &FeatureVector) -> Embedding {
        let mut out = Vec::with_capacity(self.width());
        self.encoder
            .encode_into(&features.primary_category, &mut out);
        self.scaler.transform_into(&features.numeric, &mut out);
        self.tfidf.transform_into(&features.text, &mut out);
        out
    }

    /// Extract features from and embed each activity.
    #[must_use]
    pub fn transform(&self, activities: &[Activity]) -> Vec<Embedding> {
        activities
            .iter()
            .map(|activity| self.embed(&FeatureVector::extract(activity)))
            .collect()
    }

    /// Persist the pipeline and its metadata sidecar under `model_dir`.
    ///
    /// Both files are replaced atomically.
    ///
    /// # Errors
    /// Returns [`PipelineError`] when the directory cannot be created or a
    /// file cannot be encoded or written.
    pub fn save(&self, model_dir: &Utf8Path) -> Result<(), PipelineError> {
        artifact::save(self, model_dir)?;
        log::info!("saved embedding pipeline to {}", model_path(model_dir));
        Ok(())
    }

    /// Restore a pipeline saved by [`EmbeddingPipeline::save`].
    ///
    /// # Errors
    /// Returns [`PipelineError::ArtifactNotFound`] when no blob exists and
    /// [`PipelineError::IncompatibleArtifact`] when the blob was written for
    /// a different feature schema or cannot be decoded.
    pub fn load(model_dir: &Utf8Path) -> Result<Self, PipelineError> {
        let pipeline = artifact::load(model_dir)?;
        log::info!(
            "loaded embedding pipeline trained at {}",
            pipeline.metadata.trained_at
        );
        Ok(pipeline)
    }

    fn is_consistent(&self) -> bool {
        self.metadata.feature_matrix_shape == [self.frame.len(), self.width()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tripweaver_core::test_support::museum_restaurant_park;

    #[rstest]
    fn empty_corpus_is_rejected() {
        let err = EmbeddingPipeline::fit(&[]).expect_err("empty corpus");
        assert!(matches!(err, PipelineError::EmptyCorpus));
    }

    #[rstest]
    fn embeddings_share_width() {
        let corpus = museum_restaurant_park();
        let pipeline = EmbeddingPipeline::fit(&corpus).expect("fit");
        // two one-hot levels, twelve numeric columns, three terms
        assert_eq!(pipeline.width(), 17);
        let unseen = Activity::new("Casino").with_types(["casino", "night_club"]);
        for row in pipeline.transform(&[unseen, corpus[0].clone()]) {
            assert_eq!(row.len(), pipeline.width());
        }
        assert_eq!(pipeline.metadata().feature_matrix_shape, [3, 17]);
    }

    #[rstest]
    fn numeric_components_follow_one_hot_block() {
        let pipeline = EmbeddingPipeline::fit(&museum_restaurant_park()).expect("fit");
        assert_eq!(pipeline.numeric_component("rating"), Some(2));
        assert_eq!(pipeline.numeric_component("is_cultural"), Some(7));
        assert_eq!(pipeline.numeric_component("unknown"), None);
    }

    #[rstest]
    #[case(6, true)]
    #[case(7, false)]
    fn freshness_uses_whole_days(#[case] days: i64, #[case] fresh: bool) {
        let trained_at = Utc::now();
        let pipeline =
            EmbeddingPipeline::fit_at(&museum_restaurant_park(), trained_at).expect("fit");
        let now = trained_at + chrono::Duration::days(days) + chrono::Duration::hours(1);
        assert_eq!(pipeline.is_fresh(now, 7), fresh);
    }
}
