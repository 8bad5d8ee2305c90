//! Unit tests for similarity ranking and pipeline persistence.

use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::{Duration, TimeZone, Utc};
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tripweaver_core::test_support::{culture_food_profile, museum_restaurant_park};
use tripweaver_core::{Activity, Pace, Ranker, ScoreSource, UserProfile};

use super::*;
use crate::pipeline::{ARTIFACT_MAGIC, model_path};

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("create temporary directory")
}

fn model_dir(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join("models")).expect("utf8 path")
}

fn future_version_blob() -> Vec<u8> {
    let mut blob = ARTIFACT_MAGIC.to_vec();
    blob.extend([9, 9, 9]);
    blob
}

fn handle_in(dir: &TempDir) -> PipelineHandle {
    PipelineHandle::new(ScorerConfig {
        model_dir: model_dir(dir),
        ..ScorerConfig::default()
    })
}

#[rstest]
fn cosine_of_zero_vector_is_zero() {
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-12);
}

#[rstest]
fn preference_vector_is_unit_length() {
    let pipeline = EmbeddingPipeline::fit(&museum_restaurant_park()).expect("fit");
    let vector = preference_vector(&pipeline, &culture_food_profile());
    let norm: f64 = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    assert!((norm - 1.0).abs() < 1e-12);
    let food = pipeline.numeric_component("is_food").expect("food column");
    let culture = pipeline.numeric_component("is_cultural").expect("culture column");
    assert!((vector[food] - vector[culture]).abs() < 1e-12);
}

#[rstest]
fn unmatched_interests_yield_zero_vector() {
    let pipeline = EmbeddingPipeline::fit(&museum_restaurant_park()).expect("fit");
    let profile = UserProfile::new().with_interests(["nightlife"]);
    assert!(preference_vector(&pipeline, &profile).iter().all(|v| *v == 0.0));
}

#[rstest]
fn second_matched_interest_multiplies_by_boost() {
    let gallery = Activity::new("Gallery")
        .with_types(["art_gallery"])
        .with_price_level(2);
    let one = UserProfile::new().with_interests(["art"]);
    let two = UserProfile::new().with_interests(["art", "gallery"]);
    let ratio = preference_multiplier(&gallery, &two) / preference_multiplier(&gallery, &one);
    assert!((ratio - 1.3).abs() < 1e-12);
}

#[rstest]
fn duplicate_interests_boost_once() {
    let gallery = Activity::new("Gallery").with_types(["art_gallery"]).with_price_level(2);
    let profile = UserProfile::new().with_interests(["art", "ART"]);
    assert!((preference_multiplier(&gallery, &profile) - 1.3).abs() < 1e-12);
}

#[rstest]
#[case(3, 2, Pace::Moderate, 0.7)]
#[case(0, 2, Pace::Moderate, 0.9)]
#[case(1, 2, Pace::Moderate, 1.0)]
#[case(2, 2, Pace::Fast, 0.8)]
#[case(3, 2, Pace::Fast, 0.7 * 0.8)]
fn budget_and_pace_penalties(
    #[case] price: u8,
    #[case] budget: u8,
    #[case] pace: Pace,
    #[case] expected: f64,
) {
    let park = Activity::new("Park").with_types(["park"]).with_price_level(price);
    let profile = UserProfile::new().with_budget(budget).with_pace(pace);
    assert!((preference_multiplier(&park, &profile) - expected).abs() < 1e-12);
}

#[rstest]
fn penalties_raise_negative_similarities() {
    let pricey = Activity::new("Pricey").with_price_level(4);
    let affordable = Activity::new("Affordable").with_price_level(2);
    let profile = UserProfile::new().with_budget(2);
    let base = -0.5;
    let penalised = base * preference_multiplier(&pricey, &profile);
    let plain = base * preference_multiplier(&affordable, &profile);
    assert!((penalised - -0.35).abs() < 1e-12);
    assert!(penalised > plain);
}

#[rstest]
fn relaxed_pace_penalises_amusement_parks() {
    let rides = Activity::new("Rides")
        .with_types(["amusement_park"])
        .with_price_level(2);
    let profile = UserProfile::new().with_pace(Pace::Relaxed);
    assert!((preference_multiplier(&rides, &profile) - 0.8).abs() < 1e-12);
}

#[rstest]
fn restaurant_and_museum_outrank_park() {
    let corpus = museum_restaurant_park();
    let pipeline = Arc::new(EmbeddingPipeline::fit(&corpus).expect("fit"));
    let ranked = SimilarityRanker::new(Some(pipeline)).rank(&culture_food_profile(), &corpus, 3);
    let names: Vec<_> = ranked.iter().map(|r| r.activity.name.as_str()).collect();
    assert_eq!(names, ["Restaurant", "Museum", "Park"]);
    assert!(ranked.iter().all(|r| r.source == ScoreSource::Similarity));

    let museum = &ranked[1];
    let base = museum
        .factors
        .as_ref()
        .and_then(|f| f.base_similarity)
        .expect("base similarity recorded");
    assert!((museum.score - base * 0.7).abs() < 1e-12);
}

#[rstest]
fn untrained_ranker_uses_fallback() {
    let ranked = SimilarityRanker::default().rank(
        &culture_food_profile(),
        &museum_restaurant_park(),
        2,
    );
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|r| r.source == ScoreSource::Fallback));
    assert_eq!(ranked[0].activity.name, "Museum");
}

#[rstest]
fn ranking_is_deterministic() {
    let corpus = museum_restaurant_park();
    let ranker = SimilarityRanker::new(Some(Arc::new(
        EmbeddingPipeline::fit(&corpus).expect("fit"),
    )));
    let first = ranker.rank(&culture_food_profile(), &corpus, 3);
    let second = ranker.rank(&culture_food_profile(), &corpus, 3);
    assert_eq!(first, second);
}

#[rstest]
fn save_then_load_restores_pipeline(temp_dir: TempDir) {
    let dir = model_dir(&temp_dir);
    let pipeline = EmbeddingPipeline::fit(&museum_restaurant_park()).expect("fit");
    pipeline.save(&dir).expect("save");
    let restored = EmbeddingPipeline::load(&dir).expect("load");
    assert_eq!(restored, pipeline);
    let metadata = pipeline::read_metadata(&dir).expect("sidecar");
    assert_eq!(metadata.model_version, "1.0.0");
}

#[rstest]
fn missing_artifact_is_not_found(temp_dir: TempDir) {
    let err = EmbeddingPipeline::load(&model_dir(&temp_dir)).expect_err("nothing saved");
    assert!(matches!(err, PipelineError::ArtifactNotFound { .. }));
}

#[rstest]
#[case::garbage(b"garbage".to_vec())]
#[case::future_version(future_version_blob())]
fn unreadable_artifact_is_incompatible(temp_dir: TempDir, #[case] blob: Vec<u8>) {
    let dir = model_dir(&temp_dir);
    tripweaver_fs::write_atomic(&model_path(&dir), &blob).expect("write blob");
    let err = EmbeddingPipeline::load(&dir).expect_err("bad blob");
    assert!(matches!(err, PipelineError::IncompatibleArtifact { .. }));
}

#[rstest]
fn training_on_empty_corpus_fails(temp_dir: TempDir) {
    let err = handle_in(&temp_dir).train(&[], true).expect_err("empty corpus");
    assert!(matches!(err, PipelineError::EmptyCorpus));
}

#[rstest]
fn fresh_artifact_is_reused(temp_dir: TempDir) {
    let trained_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid date");
    let handle = handle_in(&temp_dir);
    let first = handle
        .train_at(&museum_restaurant_park(), false, trained_at)
        .expect("initial training");
    assert_eq!(first.status, TrainStatus::Trained);

    let later = handle_in(&temp_dir);
    let second = later
        .train_at(&[], false, trained_at + Duration::days(6))
        .expect("reuse");
    assert_eq!(second.status, TrainStatus::Reused);
    assert_eq!(second.metadata.trained_at, trained_at);
    assert!(later.snapshot().is_some());
}

#[rstest]
fn stale_artifact_is_retrained(temp_dir: TempDir) {
    let trained_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid date");
    let handle = handle_in(&temp_dir);
    handle
        .train_at(&museum_restaurant_park(), false, trained_at)
        .expect("initial training");
    let outcome = handle
        .train_at(&museum_restaurant_park(), false, trained_at + Duration::days(7))
        .expect("retrain");
    assert_eq!(outcome.status, TrainStatus::Trained);
}

#[rstest]
fn forced_training_ignores_fresh_artifact(temp_dir: TempDir) {
    let handle = handle_in(&temp_dir);
    handle.train(&museum_restaurant_park(), false).expect("initial");
    let outcome = handle.train(&museum_restaurant_park(), true).expect("forced");
    assert_eq!(outcome.status, TrainStatus::Trained);
}

#[rstest]
fn corrupt_artifact_triggers_retraining(temp_dir: TempDir) {
    let handle = handle_in(&temp_dir);
    handle.train(&museum_restaurant_park(), false).expect("initial");
    tripweaver_fs::write_atomic(&model_path(handle.model_dir()), b"corrupt").expect("corrupt");
    let outcome = handle.train(&museum_restaurant_park(), false).expect("retrain");
    assert_eq!(outcome.status, TrainStatus::Trained);
}

#[rstest]
fn info_reports_training_state(temp_dir: TempDir) {
    let handle = handle_in(&temp_dir);
    assert_eq!(handle.info(), ModelInfo::NotTrained);
    handle.train(&museum_restaurant_park(), false).expect("train");
    match handle.info() {
        ModelInfo::Trained {
            feature_matrix_shape,
            model_file_exists,
            ..
        } => {
            assert_eq!(feature_matrix_shape, [3, 17]);
            assert!(model_file_exists);
        }
        ModelInfo::NotTrained => panic!("expected a trained pipeline"),
    }
}

#[rstest]
fn snapshots_survive_republication() {
    let handle = PipelineHandle::default();
    let corpus = museum_restaurant_park();
    handle.publish(EmbeddingPipeline::fit(&corpus).expect("fit"));
    let held = handle.snapshot().expect("published");
    handle.publish(EmbeddingPipeline::fit(&corpus[..1]).expect("refit"));
    assert_eq!(held.width(), 17);
    assert_ne!(handle.snapshot().map(|p| p.width()), Some(17));
}
