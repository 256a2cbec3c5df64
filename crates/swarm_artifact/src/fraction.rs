use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::artifact::{ArtifactSpec, Scope};
use crate::error::CatalogError;

/// Group id assumed for fractions that don't declare one.
pub const DEFAULT_FRACTION_GROUP: &str = "org.wildfly.swarm";

/// A named, versioned bundle of dependencies providing one runtime capability.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FractionDescriptor {
    #[serde(default = "default_fraction_group")]
    pub group_id: String,

    /// Lookup key in the catalog, e.g. `jaxrs`.
    pub artifact_id: String,

    pub version: String,

    /// Human-readable name, e.g. `JAX-RS`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Artifact ids of other fractions this one pulls in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Java packages whose use in application classes implies this fraction,
    /// e.g. `javax.ws.rs`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
}

fn default_fraction_group() -> String {
    DEFAULT_FRACTION_GROUP.to_string()
}

impl FractionDescriptor {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            name: String::new(),
            description: None,
            dependencies: Vec::new(),
            packages: Vec::new(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages = packages.into_iter().map(Into::into).collect();
        self
    }

    /// Copy of this descriptor pinned to another version.
    pub fn at_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    pub fn gav(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    /// The jar this fraction is distributed as.
    pub fn to_artifact_spec(&self) -> ArtifactSpec {
        ArtifactSpec::new(&self.group_id, &self.artifact_id, &self.version)
            .with_scope(Scope::Compile)
    }
}

/// Read-only lookup of fractions by artifact id.
pub trait FractionCatalog: Send + Sync {
    /// Find a fraction by its artifact id.
    fn lookup(&self, artifact_id: &str) -> Option<&FractionDescriptor>;

    /// All fractions, in a stable order.
    fn descriptors(&self) -> Vec<&FractionDescriptor>;

    /// Whether `spec` names a fraction known to this catalog.
    fn is_fraction(&self, spec: &ArtifactSpec) -> bool {
        self.lookup(&spec.artifact_id)
            .is_some_and(|d| d.group_id == spec.group_id)
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "fraction")]
    fractions: Vec<FractionDescriptor>,
}

/// In-memory fraction catalog keyed by artifact id.
#[derive(Debug, Clone, Default)]
pub struct FractionList {
    fractions: BTreeMap<String, FractionDescriptor>,
}

impl FractionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = FractionDescriptor>,
    {
        let mut list = Self::new();
        for descriptor in descriptors {
            list.insert(descriptor)?;
        }
        Ok(list)
    }

    /// Parse a JSON array of fraction descriptors.
    pub fn from_json(contents: &str) -> Result<Self, CatalogError> {
        let descriptors: Vec<FractionDescriptor> = serde_json::from_str(contents)?;
        Self::from_descriptors(descriptors)
    }

    /// Parse a TOML document made of `[[fraction]]` tables.
    pub fn from_toml(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::from_descriptors(file.fractions)
    }

    /// Load a catalog file, choosing the parser from its extension.
    pub fn load(path: &Utf8Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path.as_std_path())?;
        match path.extension() {
            Some("json") => Self::from_json(&contents),
            Some("toml") => Self::from_toml(&contents),
            _ => Err(CatalogError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn insert(&mut self, descriptor: FractionDescriptor) -> Result<(), CatalogError> {
        if self.fractions.contains_key(&descriptor.artifact_id) {
            return Err(CatalogError::DuplicateFraction(descriptor.artifact_id));
        }
        self.fractions
            .insert(descriptor.artifact_id.clone(), descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }
}

impl FractionCatalog for FractionList {
    fn lookup(&self, artifact_id: &str) -> Option<&FractionDescriptor> {
        self.fractions.get(artifact_id)
    }

    fn descriptors(&self) -> Vec<&FractionDescriptor> {
        self.fractions.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"[
        {
            "artifactId": "jaxrs",
            "version": "2017.1.0",
            "name": "JAX-RS",
            "dependencies": ["undertow"],
            "packages": ["javax.ws.rs"]
        },
        {
            "groupId": "org.wildfly.swarm",
            "artifactId": "undertow",
            "version": "2017.1.0"
        }
    ]"#;

    #[test]
    fn parse_json_catalog() {
        let list = FractionList::from_json(CATALOG_JSON).unwrap();
        assert_eq!(list.len(), 2);

        let jaxrs = list.lookup("jaxrs").unwrap();
        assert_eq!(jaxrs.group_id, DEFAULT_FRACTION_GROUP);
        assert_eq!(jaxrs.dependencies, vec!["undertow".to_string()]);
        assert_eq!(jaxrs.gav(), "org.wildfly.swarm:jaxrs:2017.1.0");
        assert!(list.lookup("cdi").is_none());
    }

    #[test]
    fn parse_toml_catalog() {
        let list = FractionList::from_toml(
            r#"
            [[fraction]]
            artifactId = "cdi"
            version = "1.0"

            [[fraction]]
            groupId = "com.example"
            artifactId = "metrics"
            version = "0.3"
            "#,
        )
        .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.lookup("metrics").unwrap().group_id, "com.example");
        let names: Vec<_> = list
            .descriptors()
            .iter()
            .map(|d| d.artifact_id.as_str())
            .collect();
        assert_eq!(names, vec!["cdi", "metrics"]);
    }

    #[test]
    fn duplicate_fraction_rejected() {
        let result = FractionList::from_descriptors([
            FractionDescriptor::new(DEFAULT_FRACTION_GROUP, "cdi", "1.0"),
            FractionDescriptor::new(DEFAULT_FRACTION_GROUP, "cdi", "2.0"),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateFraction(name)) if name == "cdi"));
    }

    #[test]
    fn descriptor_converts_to_spec() {
        let descriptor = FractionDescriptor::new(DEFAULT_FRACTION_GROUP, "cdi", "1.0");
        let spec = descriptor.at_version("1.1").to_artifact_spec();
        assert_eq!(spec.gav(), "org.wildfly.swarm:cdi:1.1");
        assert_eq!(spec.artifact_type, "jar");
        assert_eq!(spec.scope, Scope::Compile);
    }

    #[test]
    fn is_fraction_checks_group() {
        let list = FractionList::from_json(CATALOG_JSON).unwrap();
        assert!(list.is_fraction(&ArtifactSpec::new(DEFAULT_FRACTION_GROUP, "jaxrs", "1")));
        assert!(!list.is_fraction(&ArtifactSpec::new("com.other", "jaxrs", "1")));
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("fractions.yaml")).unwrap();
        std::fs::write(path.as_std_path(), "[]").unwrap();
        assert!(matches!(
            FractionList::load(&path),
            Err(CatalogError::UnsupportedFormat(_))
        ));
    }
}
