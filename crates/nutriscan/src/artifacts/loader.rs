use super::{Artifact, ArtifactError, ArtifactFormat, ArtifactSource, DecodeFailure, LoadedArtifact};
use flate2::read::GzDecoder;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads the first existing candidate.
///
/// Missing paths are skipped. Once a path exists, its decode result is final:
/// a corrupt file fails the load even when later candidates are valid.
pub fn load_artifact<T: Artifact>(
    candidates: &[PathBuf],
    source: &dyn ArtifactSource,
) -> Result<LoadedArtifact<T>, ArtifactError> {
    let kind = T::KIND;
    let mut tried = Vec::with_capacity(candidates.len());

    for path in candidates {
        tried.push(path.clone());

        if !source.exists(path) {
            debug!(artifact = %kind, path = %path.display(), "artifact candidate absent");
            continue;
        }

        let format = kind.format_for(path);
        return match read_document(source, path, format).and_then(T::decode) {
            Ok(value) => Ok(LoadedArtifact::new(value, path.clone())),
            Err(DecodeFailure::MissingDependency(dependency)) => {
                Err(ArtifactError::MissingDependency {
                    kind,
                    path: path.clone(),
                    dependency,
                    tried,
                })
            }
            Err(cause) => Err(ArtifactError::Unreadable {
                kind,
                path: path.clone(),
                tried,
                source: cause,
            }),
        };
    }

    Err(ArtifactError::NotFound { kind, tried })
}

/// Reads and parses one artifact file into a JSON document.
pub fn read_document(
    source: &dyn ArtifactSource,
    path: &Path,
    format: ArtifactFormat,
) -> Result<Value, DecodeFailure> {
    let reader = source.open(path)?;
    let parsed = match format {
        ArtifactFormat::Bundle => serde_json::from_reader(GzDecoder::new(reader)),
        ArtifactFormat::Generic => serde_json::from_reader(reader),
    };

    parsed.map_err(|err| DecodeFailure::Malformed(format!("invalid {format:?} artifact: {err}")))
}
