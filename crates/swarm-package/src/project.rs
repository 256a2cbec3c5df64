//! The `swarm.toml` project descriptor.
//!
//! ```toml
//! fractions = ["jaxrs", "cdi:2018.2.0"]
//! catalog = "fractions.json"
//!
//! [project]
//! group-id = "com.example"
//! artifact-id = "app"
//! version = "1.0"
//! file = "target/app-1.0.jar"
//!
//! [build]
//! executable = true
//! main-class = "com.example.Main"
//!
//! [[presolved]]
//! group-id = "org.example"
//! artifact-id = "lib-a"
//! version = "2.0"
//! file = "libs/lib-a-2.0.jar"
//! ```
//!
//! Relative paths are resolved against the directory holding the descriptor.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use swarm_artifact::ArtifactSpec;
use swarm_bundle::{BuildConfiguration, BuildRequest, ProjectArtifact};

use crate::errors::CliError;

pub const PROJECT_FILE_NAME: &str = "swarm.toml";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SwarmProject {
    /// Fraction names, `name:version` pairs or full coordinates.
    #[serde(default)]
    pub fractions: Vec<String>,

    /// Fraction catalog file (`.json` or `.toml`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Utf8PathBuf>,

    /// Maven repository directory used to resolve dependencies without a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Utf8PathBuf>,

    pub project: ProjectSection,

    #[serde(default)]
    pub build: BuildConfiguration,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<ArtifactSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presolved: Vec<ArtifactSpec>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectSection {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,

    #[serde(default = "default_packaging")]
    pub packaging: String,

    /// The built application archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,

    /// Defaults to `<artifact-id>-<version>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_name: Option<String>,

    #[serde(default = "default_output_dir")]
    pub output_dir: Utf8PathBuf,
}

fn default_packaging() -> String {
    "jar".to_string()
}

fn default_output_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("target")
}

impl SwarmProject {
    pub fn from_toml(path: &Utf8Path, contents: &str) -> Result<Self, CliError> {
        toml::from_str(contents).map_err(|e| CliError::project_parse_error(path.to_path_buf(), e))
    }

    /// Read a descriptor and anchor its relative paths at its directory.
    pub fn load(path: &Utf8Path) -> Result<Self, CliError> {
        if !path.is_file() {
            return Err(CliError::file_not_found(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut project = Self::from_toml(path, &contents)?;
        if let Some(base) = path.parent() {
            project.resolve_paths(base);
        }
        Ok(project)
    }

    pub fn final_name(&self) -> String {
        self.project
            .final_name
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.project.artifact_id, self.project.version))
    }

    pub fn resolve_paths(&mut self, base: &Utf8Path) {
        let anchor = |path: &mut Utf8PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        self.catalog.iter_mut().for_each(anchor);
        self.repository.iter_mut().for_each(anchor);
        self.project.file.iter_mut().for_each(anchor);
        anchor(&mut self.project.output_dir);
        self.build.executable_script.iter_mut().for_each(anchor);
        self.build.resource_dirs.iter_mut().for_each(anchor);
        self.build.module_dirs.iter_mut().for_each(anchor);
        self.dependencies
            .iter_mut()
            .chain(self.presolved.iter_mut())
            .filter_map(|spec| spec.file.as_mut())
            .for_each(anchor);
    }

    pub fn to_request(&self) -> BuildRequest {
        let mut artifact = ProjectArtifact::new(
            self.project.group_id.as_str(),
            self.project.artifact_id.as_str(),
            self.project.version.as_str(),
            self.project.packaging.as_str(),
        );
        artifact.file = self.project.file.clone();

        let mut request = BuildRequest::new(artifact, self.final_name(), self.project.output_dir.clone());
        request.fractions = self.fractions.clone();
        request.explicit = self.dependencies.clone();
        request.presolved = self.presolved.clone();
        request
    }
}

/// Find `swarm.toml` in `dir`.
pub fn find_project(dir: &Utf8Path) -> Result<Utf8PathBuf, CliError> {
    let path = dir.join(PROJECT_FILE_NAME);
    if path.is_file() {
        Ok(path)
    } else {
        Err(CliError::project_not_found(dir.to_path_buf()))
    }
}
