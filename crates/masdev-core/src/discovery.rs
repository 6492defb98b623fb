//! Discover application descriptors (`*.jcm`) in a project directory.

use std::path::Path;

use crate::error::DiscoveryError;

/// File extension of a JaCaMo application descriptor.
pub const APP_EXTENSION: &str = "jcm";

/// One application descriptor eligible for launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCandidate {
    /// The descriptor's file name, e.g. `hello.jcm`.
    pub file_name: String,
    /// The file name without its extension, e.g. `hello`. This is the name
    /// the toolchain reports for a running instance.
    pub derived_name: String,
}

impl LaunchCandidate {
    /// Build a candidate from a file name, or `None` if it is not a
    /// descriptor.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let derived_name = file_name.strip_suffix(&format!(".{APP_EXTENSION}"))?;
        if derived_name.is_empty() {
            return None;
        }
        Some(Self {
            file_name: file_name.to_string(),
            derived_name: derived_name.to_string(),
        })
    }
}

/// List the descriptors directly inside `dir`, sorted by file name.
///
/// Subdirectories are not searched. An empty result is an error: there is
/// nothing to run.
pub fn discover_candidates(dir: &Path) -> Result<Vec<LaunchCandidate>, DiscoveryError> {
    let read_err = |source| DiscoveryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(candidate) = LaunchCandidate::from_file_name(file_name) {
            candidates.push(candidate);
        }
    }

    if candidates.is_empty() {
        return Err(DiscoveryError::NoApplications {
            path: dir.to_path_buf(),
        });
    }

    candidates.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    tracing::debug!(dir = %dir.display(), count = candidates.len(), "discovered applications");
    Ok(candidates)
}
