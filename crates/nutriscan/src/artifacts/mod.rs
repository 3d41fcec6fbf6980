//! Locating and loading the serialized classifier and label encoder.
//!
//! Candidate paths come from [`ArtifactCandidates::resolve`]; [`load_artifact`]
//! walks them in order. Absent files are skipped, but the first file that
//! exists decides the outcome: it either loads or the whole load fails.

mod loader;
mod locator;
mod source;

pub use loader::{load_artifact, read_document};
pub use locator::{
    ArtifactCandidates, HostPlatform, LocatorInputs, CLASSIFIER_FILENAMES, ENCODER_FILENAMES,
};
pub use source::{ArtifactSource, FileSystemSource, InMemorySource};

use crate::model::{parse_classifier, Classifier, LabelEncoder, ParsedClassifier};
use serde_json::Value;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Which artifact a load concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Classifier,
    LabelEncoder,
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Classifier => "Model",
            ArtifactKind::LabelEncoder => "Label encoder",
        }
    }

    /// Environment variable that overrides the search.
    pub fn override_var(&self) -> &'static str {
        match self {
            ArtifactKind::Classifier => "MODEL_PATH",
            ArtifactKind::LabelEncoder => "ENCODER_PATH",
        }
    }

    /// Classifiers honour the bundle extension; encoders are always plain.
    pub fn format_for(&self, path: &Path) -> ArtifactFormat {
        match self {
            ArtifactKind::Classifier => ArtifactFormat::for_path(path),
            ArtifactKind::LabelEncoder => ArtifactFormat::Generic,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// On-disk encoding of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Gzip-compressed JSON.
    Bundle,
    /// Plain JSON.
    Generic,
}

pub const BUNDLE_EXTENSIONS: [&str; 2] = ["gz", "bundle"];

impl ArtifactFormat {
    pub fn for_path(path: &Path) -> Self {
        let is_bundle = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                BUNDLE_EXTENSIONS
                    .iter()
                    .any(|bundle| ext.eq_ignore_ascii_case(bundle))
            })
            .unwrap_or(false);

        if is_bundle {
            Self::Bundle
        } else {
            Self::Generic
        }
    }
}

/// A deserialized artifact and the file it came from. Held for the process
/// lifetime; never reloaded.
#[derive(Debug)]
pub struct LoadedArtifact<T> {
    value: T,
    path: PathBuf,
}

impl<T> LoadedArtifact<T> {
    pub fn new(value: T, path: impl Into<PathBuf>) -> Self {
        Self {
            value,
            path: path.into(),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Why a present file could not be turned into an artifact.
#[derive(Debug, thiserror::Error)]
pub enum DecodeFailure {
    #[error("requires unsupported component '{0}'")]
    MissingDependency(String),
    #[error("{0}")]
    Malformed(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Types the loader can produce from a decoded JSON document.
pub trait Artifact: Sized {
    const KIND: ArtifactKind;

    fn decode(document: Value) -> Result<Self, DecodeFailure>;
}

impl Artifact for Box<dyn Classifier> {
    const KIND: ArtifactKind = ArtifactKind::Classifier;

    fn decode(document: Value) -> Result<Self, DecodeFailure> {
        match parse_classifier(document) {
            Ok(ParsedClassifier::Ready(classifier)) => Ok(classifier),
            Ok(ParsedClassifier::Unsupported(estimator)) => {
                Err(DecodeFailure::MissingDependency(estimator))
            }
            Err(err) => Err(DecodeFailure::Malformed(err.to_string())),
        }
    }
}

impl Artifact for LabelEncoder {
    const KIND: ArtifactKind = ArtifactKind::LabelEncoder;

    fn decode(document: Value) -> Result<Self, DecodeFailure> {
        LabelEncoder::from_document(document).map_err(|err| DecodeFailure::Malformed(err.to_string()))
    }
}

/// Fatal startup failure while loading an artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error(
        "{kind} not found.\nTried:\n{}\n\nPlace it in the artifact directory or set {}.",
        list_paths(.tried),
        .kind.override_var()
    )]
    NotFound { kind: ArtifactKind, tried: Vec<PathBuf> },
    #[error(
        "{kind} at {} requires missing dependency '{dependency}'; supported estimators: {}.\nTried:\n{}",
        .path.display(),
        crate::model::SUPPORTED_ESTIMATORS.join(", "),
        list_paths(.tried)
    )]
    MissingDependency {
        kind: ArtifactKind,
        path: PathBuf,
        dependency: String,
        tried: Vec<PathBuf>,
    },
    #[error(
        "failed loading {kind} from {}: {source}\nTried:\n{}",
        .path.display(),
        list_paths(.tried)
    )]
    Unreadable {
        kind: ArtifactKind,
        path: PathBuf,
        tried: Vec<PathBuf>,
        #[source]
        source: DecodeFailure,
    },
}

impl ArtifactError {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactError::NotFound { kind, .. }
            | ArtifactError::MissingDependency { kind, .. }
            | ArtifactError::Unreadable { kind, .. } => *kind,
        }
    }

    /// Every path considered before the load stopped.
    pub fn tried(&self) -> &[PathBuf] {
        match self {
            ArtifactError::NotFound { tried, .. }
            | ArtifactError::MissingDependency { tried, .. }
            | ArtifactError::Unreadable { tried, .. } => tried,
        }
    }
}

fn list_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
