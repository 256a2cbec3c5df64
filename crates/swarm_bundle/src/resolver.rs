//! Artifact resolution.
//!
//! The packaging engine never resolves versions itself. It hands each
//! coordinate to an [`ArtifactResolver`] and expects a file back.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use swarm_artifact::{ArtifactKey, ArtifactSpec};

use crate::error::{Error, Result};

/// Turns a coordinate into a file on disk.
pub trait ArtifactResolver: Send + Sync {
    fn resolve(&self, spec: &ArtifactSpec) -> Result<Utf8PathBuf>;
}

/// Resolves artifacts from a Maven-layout repository directory such as
/// `~/.m2/repository`.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: Utf8PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Where `spec` lives (or would live) in this repository.
    pub fn path_of(&self, spec: &ArtifactSpec) -> Utf8PathBuf {
        self.root.join(spec.repository_path())
    }
}

impl ArtifactResolver for LocalRepository {
    fn resolve(&self, spec: &ArtifactSpec) -> Result<Utf8PathBuf> {
        let path = self.path_of(spec);
        if path.as_std_path().is_file() {
            Ok(path)
        } else {
            Err(Error::resolution(
                spec.to_string(),
                format!("not found in local repository at {}", path),
            ))
        }
    }
}

/// Resolves from a fixed map of coordinates to files.
///
/// Used by hosts that already fetched everything, and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    files: HashMap<(ArtifactKey, String), Utf8PathBuf>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, spec: &ArtifactSpec, file: impl Into<Utf8PathBuf>) -> Self {
        self.insert(spec, file);
        self
    }

    pub fn insert(&mut self, spec: &ArtifactSpec, file: impl Into<Utf8PathBuf>) {
        self.files
            .insert((spec.key(), spec.version.clone()), file.into());
    }
}

impl ArtifactResolver for StaticResolver {
    fn resolve(&self, spec: &ArtifactSpec) -> Result<Utf8PathBuf> {
        self.files
            .get(&(spec.key(), spec.version.clone()))
            .cloned()
            .ok_or_else(|| Error::resolution(spec.to_string(), "no file registered"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_repository_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let repo = LocalRepository::new(root.clone());
        let spec = ArtifactSpec::new("org.example", "lib-a", "2.0");

        assert!(matches!(repo.resolve(&spec), Err(Error::Resolution { .. })));

        let expected = root.join("org/example/lib-a/2.0/lib-a-2.0.jar");
        std::fs::create_dir_all(expected.parent().unwrap()).unwrap();
        std::fs::write(&expected, b"jar").unwrap();

        assert_eq!(repo.resolve(&spec).unwrap(), expected);
    }

    #[test]
    fn static_resolver_matches_version() {
        let spec = ArtifactSpec::new("g", "a", "1.0");
        let resolver = StaticResolver::new().with(&spec, "/libs/a-1.0.jar");

        assert_eq!(
            resolver.resolve(&spec).unwrap(),
            Utf8PathBuf::from("/libs/a-1.0.jar")
        );
        assert!(resolver.resolve(&ArtifactSpec::new("g", "a", "2.0")).is_err());
    }
}
