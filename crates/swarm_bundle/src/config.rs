//! Immutable build configuration.
//!
//! A [`BuildConfiguration`] is created once before a build starts and is only
//! read afterwards. It deserializes from the `[build]` table of a project
//! descriptor:
//!
//! ```toml
//! [build]
//! hollow = false
//! executable = true
//! fraction-detection-mode = "when-missing"
//! dependency-layout = "flatten"
//! main-class = "com.example.Main"
//! resource-dirs = ["src/main/resources"]
//! timeout-secs = 300
//!
//! [build.properties]
//! "swarm.http.port" = "8181"
//! ```

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Whether fractions are inferred from application classes, and how strictly
/// missing fractions are treated.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FractionDetectionMode {
    /// Never infer fractions. Unresolvable requested fractions are skipped.
    #[serde(alias = "off")]
    Never,
    /// Infer fractions only when none are declared. Unresolvable requested
    /// fractions are skipped with a warning.
    #[default]
    #[serde(alias = "warn")]
    WhenMissing,
    /// Always infer fractions. Any unresolvable requested fraction fails the build.
    Force,
}

impl FractionDetectionMode {
    /// Whether fractions found by scanning may join the dependency set.
    pub fn allows_detection(self) -> bool {
        !matches!(self, FractionDetectionMode::Never)
    }

    pub fn is_strict(self) -> bool {
        matches!(self, FractionDetectionMode::Force)
    }
}

/// Winner when an explicit and a fraction-derived dependency share an identity
/// key. Presolved dependencies beat both regardless of this setting.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FractionConflictPolicy {
    #[default]
    PreferExplicit,
    PreferFraction,
}

/// How bundled dependencies are laid out inside the archive.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyLayout {
    /// Merge every dependency's entries into the archive root.
    #[default]
    Flatten,
    /// Embed each dependency jar whole under `m2repo/` in Maven repository layout.
    Repository,
}

/// Snapshot of every flag that shapes a build.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct BuildConfiguration {
    /// Embed dependencies in the archive. When disabled they are only listed
    /// in the swarm manifest and fetched at runtime.
    pub bundle_dependencies: bool,

    /// Prepend a launch script so the archive can be run directly.
    pub executable: bool,

    /// Custom launch script used instead of the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable_script: Option<Utf8PathBuf>,

    /// Leave the application's own entries out of the archive.
    pub hollow: bool,

    pub fraction_detection_mode: FractionDetectionMode,

    pub fraction_conflict_policy: FractionConflictPolicy,

    pub dependency_layout: DependencyLayout,

    /// Application entry point started by the bootstrap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,

    /// Arbitrary key/value properties recorded in the swarm manifest.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,

    /// Directories whose files are merged into the archive root.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_dirs: Vec<Utf8PathBuf>,

    /// Directories embedded as standalone module roots under `modules/`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub module_dirs: Vec<Utf8PathBuf>,

    /// Overall time limit for a build, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            bundle_dependencies: true,
            executable: false,
            executable_script: None,
            hollow: false,
            fraction_detection_mode: FractionDetectionMode::default(),
            fraction_conflict_policy: FractionConflictPolicy::default(),
            dependency_layout: DependencyLayout::default(),
            main_class: None,
            properties: BTreeMap::new(),
            resource_dirs: Vec::new(),
            module_dirs: Vec::new(),
            timeout_secs: None,
        }
    }
}

impl BuildConfiguration {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Classifier of the attached artifact: `swarm` or `hollowswarm`.
    pub fn classifier(&self) -> &'static str {
        if self.hollow {
            "hollowswarm"
        } else {
            "swarm"
        }
    }

    /// File name of the produced archive for a project's final name,
    /// e.g. `app-1.0-swarm.jar` or `app-1.0-hollow-swarm.jar`.
    pub fn output_file_name(&self, final_name: &str) -> String {
        let base = strip_package_extension(final_name);
        if self.hollow {
            format!("{}-hollow-swarm.jar", base)
        } else {
            format!("{}-swarm.jar", base)
        }
    }
}

fn strip_package_extension(final_name: &str) -> &str {
    for ext in [".jar", ".war"] {
        if let Some(stripped) = final_name.strip_suffix(ext) {
            return stripped;
        }
    }
    final_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BuildConfiguration::default();
        assert!(config.bundle_dependencies);
        assert!(!config.executable);
        assert!(!config.hollow);
        assert_eq!(
            config.fraction_detection_mode,
            FractionDetectionMode::WhenMissing
        );
        assert_eq!(config.dependency_layout, DependencyLayout::Flatten);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn output_names() {
        let mut config = BuildConfiguration::default();
        assert_eq!(config.output_file_name("app-1.0"), "app-1.0-swarm.jar");
        assert_eq!(config.output_file_name("app-1.0.war"), "app-1.0-swarm.jar");
        assert_eq!(config.classifier(), "swarm");

        config.hollow = true;
        assert_eq!(config.output_file_name("app-1.0"), "app-1.0-hollow-swarm.jar");
        assert_eq!(config.classifier(), "hollowswarm");
    }

    #[test]
    fn deserialize_from_toml() {
        let config: BuildConfiguration = toml::from_str(
            r#"
            hollow = true
            bundle-dependencies = false
            fraction-detection-mode = "off"
            dependency-layout = "repository"
            main-class = "com.example.Main"
            module-dirs = ["target/classes/modules"]
            timeout-secs = 30

            [properties]
            "swarm.http.port" = "8181"
            "#,
        )
        .unwrap();

        assert!(config.hollow);
        assert!(!config.bundle_dependencies);
        assert!(!config.executable);
        assert_eq!(config.fraction_detection_mode, FractionDetectionMode::Never);
        assert_eq!(config.dependency_layout, DependencyLayout::Repository);
        assert_eq!(config.main_class.as_deref(), Some("com.example.Main"));
        assert_eq!(config.properties["swarm.http.port"], "8181");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn detection_mode_aliases() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: FractionDetectionMode,
        }

        let warn: Wrapper = toml::from_str(r#"mode = "warn""#).unwrap();
        assert_eq!(warn.mode, FractionDetectionMode::WhenMissing);
        let force: Wrapper = toml::from_str(r#"mode = "force""#).unwrap();
        assert!(force.mode.is_strict());
        assert!(!FractionDetectionMode::Never.allows_detection());
    }
}
