use flate2::write::GzEncoder;
use flate2::Compression;
use nutriscan::artifacts::{
    load_artifact, ArtifactCandidates, ArtifactError, FileSystemSource, HostPlatform,
    InMemorySource, LocatorInputs,
};
use nutriscan::model::{Classifier, LabelEncoder};
use nutriscan::predictor::HealthPredictor;
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn tree_document() -> serde_json::Value {
    json!({
        "estimator": "decision_tree",
        "feature_names": ["sugar", "fat", "sodium", "protein"],
        "classes": [0, 1, 2],
        "nodes": [
            { "feature": 0, "threshold": 10.0, "left": 1, "right": 2 },
            { "value": [20.0, 2.0, 0.0] },
            { "feature": 0, "threshold": 20.0, "left": 3, "right": 4 },
            { "value": [1.0, 12.0, 3.0] },
            { "value": [0.0, 2.0, 15.0] }
        ]
    })
}

fn encoder_document() -> serde_json::Value {
    json!({ "classes": ["Healthy", "Moderate", "Unhealthy"] })
}

fn write_json(path: &Path, value: &serde_json::Value) {
    fs::write(path, serde_json::to_vec(value).expect("serialize")).expect("write artifact");
}

fn write_bundle(path: &Path, value: &serde_json::Value) {
    let file = fs::File::create(path).expect("create bundle");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(&serde_json::to_vec(value).expect("serialize"))
        .expect("compress bundle");
    encoder.finish().expect("finish bundle");
}

fn repo_inputs(dir: &Path) -> LocatorInputs {
    LocatorInputs {
        model_override: None,
        encoder_override: None,
        platform: HostPlatform::Other,
        home_dir: None,
        artifact_dir: dir.to_path_buf(),
    }
}

#[test]
fn loads_last_existing_candidate_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_json(&dir.path().join("trained_model.json"), &tree_document());
    write_json(&dir.path().join("label_encoder.json"), &encoder_document());

    let candidates = ArtifactCandidates::resolve(&repo_inputs(dir.path()));
    let predictor = HealthPredictor::load(&candidates, &FileSystemSource).expect("loads");

    assert_eq!(
        predictor.classifier_path(),
        dir.path().join("trained_model.json")
    );
    assert_eq!(
        predictor.encoder_path(),
        dir.path().join("label_encoder.json")
    );
}

#[test]
fn bundle_takes_precedence_over_generic_model() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_bundle(&dir.path().join("nutrition_bundle.json.gz"), &tree_document());
    write_json(&dir.path().join("trained_model.json"), &json!({ "estimator": "broken" }));

    let candidates = ArtifactCandidates::resolve(&repo_inputs(dir.path()));
    let loaded = load_artifact::<Box<dyn Classifier>>(&candidates.classifier, &FileSystemSource)
        .expect("bundle loads");

    assert_eq!(loaded.path(), dir.path().join("nutrition_bundle.json.gz"));
}

#[test]
fn corrupt_best_model_fails_without_trying_later_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("nutrition_best_model.json"), b"\x80\x04 pickle bytes")
        .expect("write corrupt file");
    write_json(&dir.path().join("trained_model.json"), &tree_document());

    let candidates = ArtifactCandidates::resolve(&repo_inputs(dir.path()));
    let err = load_artifact::<Box<dyn Classifier>>(&candidates.classifier, &FileSystemSource)
        .expect_err("corrupt model is fatal");

    match &err {
        ArtifactError::Unreadable { path, .. } => {
            assert_eq!(path, &dir.path().join("nutrition_best_model.json"));
        }
        other => panic!("expected unreadable model, got {other:?}"),
    }
    assert!(err.to_string().contains("nutrition_best_model.json"));
}

#[test]
fn unknown_estimator_reports_missing_dependency() {
    let source = InMemorySource::new().with_file(
        "models/m.json",
        serde_json::to_vec(&json!({ "estimator": "gradient_boosting", "stages": [] }))
            .expect("serialize"),
    );

    let err = load_artifact::<Box<dyn Classifier>>(&[PathBuf::from("models/m.json")], &source)
        .expect_err("unsupported estimator");

    match &err {
        ArtifactError::MissingDependency { dependency, .. } => {
            assert_eq!(dependency, "gradient_boosting");
        }
        other => panic!("expected missing dependency, got {other:?}"),
    }
    assert!(err.to_string().contains("missing dependency 'gradient_boosting'"));
}

#[test]
fn structurally_invalid_model_is_unreadable() {
    let mut document = tree_document();
    document["nodes"][0]["left"] = json!(0);
    let source = InMemorySource::new()
        .with_file("m.json", serde_json::to_vec(&document).expect("serialize"));

    let err = load_artifact::<Box<dyn Classifier>>(&[PathBuf::from("m.json")], &source)
        .expect_err("cyclic tree rejected");

    assert!(matches!(err, ArtifactError::Unreadable { .. }));
}

#[test]
fn single_class_logistic_model_is_rejected_on_load() {
    let document = json!({
        "estimator": "logistic_regression",
        "classes": [0],
        "coef": [[1.0, 0.0, 0.0, 0.0]],
        "intercept": [0.0]
    });
    let source = InMemorySource::new()
        .with_file("m.json", serde_json::to_vec(&document).expect("serialize"));

    let err = load_artifact::<Box<dyn Classifier>>(&[PathBuf::from("m.json")], &source)
        .expect_err("one class cannot be thresholded");

    assert!(matches!(err, ArtifactError::Unreadable { .. }));
    assert!(err.to_string().contains("at least 2 classes"));
}

#[test]
fn missing_encoder_is_fatal_and_lists_paths() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_json(&dir.path().join("nutrition_best_model.json"), &tree_document());

    let candidates = ArtifactCandidates::resolve(&repo_inputs(dir.path()));
    let err = HealthPredictor::load(&candidates, &FileSystemSource).expect_err("no encoder");

    assert!(matches!(err, ArtifactError::NotFound { .. }));
    let message = err.to_string();
    assert!(message.starts_with("Label encoder not found."));
    assert!(message.contains("label_encoder.json"));
    assert!(message.contains("ENCODER_PATH"));
}

#[test]
fn override_path_is_tried_first() {
    let dir = tempfile::tempdir().expect("temp dir");
    let custom = dir.path().join("custom-encoder.json");
    write_json(&custom, &json!(["Good", "Bad"]));
    write_json(&dir.path().join("label_encoder.json"), &encoder_document());

    let mut inputs = repo_inputs(dir.path());
    inputs.encoder_override = Some(custom.clone());
    let candidates = ArtifactCandidates::resolve(&inputs);

    assert_eq!(candidates.encoder.first(), Some(&custom));
    let loaded = load_artifact::<LabelEncoder>(&candidates.encoder, &FileSystemSource)
        .expect("override loads");
    assert_eq!(loaded.value().classes(), ["Good".to_string(), "Bad".to_string()]);
}

#[test]
fn candidates_never_repeat() {
    let mut inputs = repo_inputs(Path::new("model_training"));
    inputs.model_override = Some(PathBuf::from("model_training/nutrition_best_model.json"));
    inputs.encoder_override = Some(PathBuf::from("model_training/label_encoder.json"));

    let candidates = ArtifactCandidates::resolve(&inputs);

    assert_eq!(candidates.classifier.len(), 3);
    assert_eq!(candidates.encoder.len(), 1);
}

#[test]
fn shipped_artifacts_load_and_predict() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../model_training");
    let candidates = ArtifactCandidates::resolve(&repo_inputs(&dir));

    let predictor = HealthPredictor::load(&candidates, &FileSystemSource).expect("loads");

    assert!(predictor.classifier_path().ends_with("nutrition_best_model.json"));
    let lean = predictor
        .predict(&nutriscan::predictor::RawNutrients::new(4, 3, 0.2, 8))
        .expect("valid input");
    let sweet = predictor
        .predict(&nutriscan::predictor::RawNutrients::new(45, 2, 0.1, 1))
        .expect("valid input");
    assert_eq!(lean.label.to_string(), "Healthy");
    assert_eq!(sweet.label.to_string(), "Unhealthy");
}
