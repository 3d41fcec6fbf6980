use crate::config::ArtifactConfig;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// Classifier filenames in preference order: best model, bundle, generic.
pub const CLASSIFIER_FILENAMES: [&str; 3] = [
    "nutrition_best_model.json",
    "nutrition_bundle.json.gz",
    "trained_model.json",
];

pub const ENCODER_FILENAMES: [&str; 1] = ["label_encoder.json"];

/// Development checkout location under the user's home directory on Windows.
const WINDOWS_DEV_SUBDIR: [&str; 5] = [
    "Desktop",
    "major-project",
    "nutrition-scanner",
    "backend",
    "model_training",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    Other,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Other
        }
    }
}

/// Everything candidate resolution depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorInputs {
    pub model_override: Option<PathBuf>,
    pub encoder_override: Option<PathBuf>,
    pub platform: HostPlatform,
    pub home_dir: Option<PathBuf>,
    pub artifact_dir: PathBuf,
}

impl LocatorInputs {
    /// Combines the loaded configuration with the running host.
    pub fn from_config(config: &ArtifactConfig) -> Self {
        Self {
            model_override: config.model_path.clone(),
            encoder_override: config.encoder_path.clone(),
            platform: HostPlatform::current(),
            home_dir: home_dir(),
            artifact_dir: config.artifact_dir.clone(),
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    ["USERPROFILE", "HOME"]
        .iter()
        .filter_map(|key| env::var_os(key))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Ordered, duplicate-free search paths for both artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactCandidates {
    pub classifier: Vec<PathBuf>,
    pub encoder: Vec<PathBuf>,
}

impl ArtifactCandidates {
    /// Override first, then the Windows development checkout (Windows hosts
    /// only), then the repo-relative artifact directory.
    pub fn resolve(inputs: &LocatorInputs) -> Self {
        let mut classifier: Vec<PathBuf> = inputs.model_override.iter().cloned().collect();
        let mut encoder: Vec<PathBuf> = inputs.encoder_override.iter().cloned().collect();

        if let Some(dev_dir) = windows_dev_dir(inputs) {
            classifier.extend(in_dir(&dev_dir, &CLASSIFIER_FILENAMES));
            encoder.extend(in_dir(&dev_dir, &ENCODER_FILENAMES));
        }

        classifier.extend(in_dir(&inputs.artifact_dir, &CLASSIFIER_FILENAMES));
        encoder.extend(in_dir(&inputs.artifact_dir, &ENCODER_FILENAMES));

        Self {
            classifier: dedup(classifier),
            encoder: dedup(encoder),
        }
    }
}

fn windows_dev_dir(inputs: &LocatorInputs) -> Option<PathBuf> {
    if inputs.platform != HostPlatform::Windows {
        return None;
    }
    let home = inputs.home_dir.as_ref()?;
    Some(WINDOWS_DEV_SUBDIR.iter().fold(home.clone(), |dir, part| dir.join(part)))
}

fn in_dir<'a>(dir: &'a Path, names: &'a [&'a str]) -> impl Iterator<Item = PathBuf> + 'a {
    names.iter().map(move |name| dir.join(name))
}

fn dedup(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}
