use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoordinateError;

/// The artifact type assumed when a coordinate does not name one.
pub const DEFAULT_ARTIFACT_TYPE: &str = "jar";

/// Dependency scope as declared by the host build.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Runtime,
    Provided,
    Test,
}

impl Scope {
    /// Whether a dependency with this scope may be embedded in a packaged archive.
    ///
    /// `provided` and `test` dependencies are supplied by the runtime or only
    /// exist for tests, so they never end up inside the archive.
    pub fn is_embeddable(self) -> bool {
        matches!(self, Scope::Compile | Scope::Runtime)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::Test => "test",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compile" => Ok(Scope::Compile),
            "runtime" => Ok(Scope::Runtime),
            "provided" => Ok(Scope::Provided),
            "test" => Ok(Scope::Test),
            other => Err(CoordinateError::UnknownScope(other.to_string())),
        }
    }
}

/// Identity of an artifact, ignoring its version.
///
/// Two specs with the same key describe the same library; only one of them
/// may be embedded in an archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactKey {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: Option<String>,
    pub artifact_type: String,
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.group_id, self.artifact_id, self.artifact_type
        )?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

/// Immutable descriptor of one dependency.
///
/// Coordinates follow the Maven convention. `file` is set once the artifact has
/// been resolved to a location on disk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ArtifactSpec {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,

    #[serde(rename = "type", default = "default_artifact_type")]
    pub artifact_type: String,

    #[serde(default)]
    pub scope: Scope,

    /// Resolved location of the artifact, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,
}

fn default_artifact_type() -> String {
    DEFAULT_ARTIFACT_TYPE.to_string()
}

impl ArtifactSpec {
    /// Create a `jar` spec with `compile` scope and no resolved file.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: None,
            artifact_type: default_artifact_type(),
            scope: Scope::Compile,
            file: None,
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = artifact_type.into();
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_file(mut self, file: impl Into<Utf8PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// The version-independent identity of this artifact.
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier.clone(),
            artifact_type: self.artifact_type.clone(),
        }
    }

    /// `groupId:artifactId:version`
    pub fn gav(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    /// File name of the artifact in a Maven repository,
    /// e.g. `lib-a-2.0.jar` or `lib-a-2.0-tests.jar`.
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, classifier, self.artifact_type
            ),
            None => format!(
                "{}-{}.{}",
                self.artifact_id, self.version, self.artifact_type
            ),
        }
    }

    /// Relative location of the artifact inside a Maven repository layout.
    ///
    /// Always uses `/` separators so the result can double as an archive entry name.
    pub fn repository_path(&self) -> Utf8PathBuf {
        let mut path = Utf8PathBuf::new();
        for segment in self.group_id.split('.') {
            path.push(segment);
        }
        path.push(&self.artifact_id);
        path.push(&self.version);
        path.push(self.file_name());
        Utf8PathBuf::from(path.as_str().replace('\\', "/"))
    }

    /// Whether this artifact's file is a zip-based archive whose entries can be read.
    pub fn is_archive(&self) -> bool {
        matches!(
            self.artifact_type.as_str(),
            "jar" | "war" | "ear" | "zip" | "ejb" | "bundle" | "test-jar"
        )
    }

    pub fn resolved_file(&self) -> Option<&Utf8Path> {
        self.file.as_deref()
    }
}

impl fmt::Display for ArtifactSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        match &self.classifier {
            Some(classifier) => write!(f, ":{}:{}", self.artifact_type, classifier)?,
            None if self.artifact_type != DEFAULT_ARTIFACT_TYPE => {
                write!(f, ":{}", self.artifact_type)?
            }
            None => {}
        }
        write!(f, ":{}", self.version)
    }
}

impl FromStr for ArtifactSpec {
    type Err = CoordinateError;

    /// Parse a Maven coordinate.
    ///
    /// Accepted forms:
    /// - `groupId:artifactId:version`
    /// - `groupId:artifactId:type:version`
    /// - `groupId:artifactId:type:classifier:version`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if let Some(idx) = parts.iter().position(|p| p.trim().is_empty()) {
            return Err(CoordinateError::EmptySegment {
                coordinate: s.to_string(),
                index: idx,
            });
        }

        let spec = match parts.as_slice() {
            [group, artifact, version] => ArtifactSpec::new(*group, *artifact, *version),
            [group, artifact, ty, version] => {
                ArtifactSpec::new(*group, *artifact, *version).with_type(*ty)
            }
            [group, artifact, ty, classifier, version] => {
                ArtifactSpec::new(*group, *artifact, *version)
                    .with_type(*ty)
                    .with_classifier(*classifier)
            }
            _ => return Err(CoordinateError::Malformed(s.to_string())),
        };

        Ok(spec)
    }
}

/// Whether `s` looks like a full `groupId:artifactId:...:version` coordinate
/// rather than a bare name or `name:version` pair.
pub fn is_full_coordinate(s: &str) -> bool {
    s.split(':').count() >= 3
}
