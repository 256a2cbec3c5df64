//! Bootstrap metadata written into every archive.
//!
//! Two entries make an archive runnable, hollow or not:
//!
//! - `META-INF/MANIFEST.MF` points the JVM at the bootstrap entry point and
//!   names the application main class in `Start-Class`.
//! - `META-INF/swarm-manifest.json` tells the bootstrap what to load: the
//!   dependency coordinates, module roots and build properties.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
pub const SWARM_MANIFEST_PATH: &str = "META-INF/swarm-manifest.json";

/// Entry point of the bootstrap that loads dependencies at runtime.
pub const BOOTSTRAP_MAIN_CLASS: &str = "org.wildfly.swarm.bootstrap.Main";

/// Maximum manifest line length in bytes, excluding the line break.
const MANIFEST_LINE_LIMIT: usize = 72;

/// Contents of `META-INF/swarm-manifest.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SwarmManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,

    pub hollow: bool,

    pub bundle_dependencies: bool,

    /// File name of the application archive, absent for hollow archives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,

    /// Coordinates of every dependency, embedded or not.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Names of the module roots under `modules/`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl SwarmManifest {
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Render `META-INF/MANIFEST.MF`.
pub fn jar_manifest(start_class: Option<&str>) -> Vec<u8> {
    let mut out = String::new();
    write_attribute(&mut out, "Manifest-Version", "1.0");
    write_attribute(&mut out, "Created-By", "swarm-package");
    write_attribute(&mut out, "Main-Class", BOOTSTRAP_MAIN_CLASS);
    if let Some(start_class) = start_class {
        write_attribute(&mut out, "Start-Class", start_class);
    }
    out.push_str("\r\n");
    out.into_bytes()
}

/// Append `name: value`, folding onto continuation lines (leading space) so
/// no line exceeds 72 bytes. Multi-byte characters are never split.
fn write_attribute(out: &mut String, name: &str, value: &str) {
    let line = format!("{}: {}", name, value);
    let mut limit = MANIFEST_LINE_LIMIT;
    let mut current = 0;
    let mut first = true;

    for ch in line.chars() {
        if current + ch.len_utf8() > limit {
            out.push_str("\r\n ");
            current = 0;
            if first {
                limit = MANIFEST_LINE_LIMIT - 1;
                first = false;
            }
        }
        out.push(ch);
        current += ch.len_utf8();
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_contains_bootstrap() {
        let manifest = String::from_utf8(jar_manifest(Some("com.example.Main"))).unwrap();
        assert!(manifest.starts_with("Manifest-Version: 1.0\r\n"));
        assert!(manifest.contains("Main-Class: org.wildfly.swarm.bootstrap.Main\r\n"));
        assert!(manifest.contains("Start-Class: com.example.Main\r\n"));
        assert!(manifest.ends_with("\r\n\r\n"));
    }

    #[test]
    fn long_attributes_are_folded() {
        let class = format!("com.example.{}.Main", "very".repeat(30));
        let manifest = String::from_utf8(jar_manifest(Some(&class))).unwrap();

        for line in manifest.split("\r\n") {
            assert!(line.len() <= 72, "line too long: {}", line);
        }

        let unfolded = manifest.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("Start-Class: {}\r\n", class)));
    }

    #[test]
    fn swarm_manifest_json_roundtrip_shape() {
        let manifest = SwarmManifest {
            main_class: Some("com.example.Main".into()),
            hollow: false,
            bundle_dependencies: true,
            application: Some("app-1.0.jar".into()),
            dependencies: vec!["org.example:lib-a:2.0".into()],
            modules: vec![],
            properties: BTreeMap::new(),
        };
        let json: serde_json::Value = serde_json::from_slice(&manifest.to_bytes().unwrap()).unwrap();

        assert_eq!(json["mainClass"], "com.example.Main");
        assert_eq!(json["bundleDependencies"], true);
        assert!(json.get("modules").is_none());
        assert_eq!(
            SwarmManifest::from_bytes(&manifest.to_bytes().unwrap()).unwrap(),
            manifest
        );
    }
}
