//! Collection of extra filesystem trees to embed: resource directories merged
//! into the archive root, and module directories kept as their own roots
//! under `modules/`.

use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

use crate::error::Result;

/// Archive prefix under which additional module trees are embedded.
pub const MODULES_PREFIX: &str = "modules/";

/// One file found under a collected root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    /// The directory this file was found under.
    pub root: Utf8PathBuf,
    /// Absolute location on disk.
    pub file: Utf8PathBuf,
    /// Destination entry name inside the archive (always `/`-separated).
    pub archive_path: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceCollector {
    resource_dirs: Vec<Utf8PathBuf>,
    module_dirs: Vec<Utf8PathBuf>,
}

impl ResourceCollector {
    pub fn new(resource_dirs: Vec<Utf8PathBuf>, module_dirs: Vec<Utf8PathBuf>) -> Self {
        Self {
            resource_dirs,
            module_dirs,
        }
    }

    /// Files of every resource directory, in directory order, each tree sorted by name.
    ///
    /// Directories that don't exist are skipped; build tools routinely declare
    /// resource roots that are never created.
    pub fn resources(&self) -> Result<Vec<CollectedFile>> {
        let mut files = Vec::new();
        for dir in &self.resource_dirs {
            files.extend(collect_tree(dir, "")?);
        }
        Ok(files)
    }

    /// Files of every module directory, placed under [`MODULES_PREFIX`].
    pub fn modules(&self) -> Result<Vec<CollectedFile>> {
        let mut files = Vec::new();
        for dir in &self.module_dirs {
            files.extend(collect_tree(dir, MODULES_PREFIX)?);
        }
        Ok(files)
    }

    /// Module directories that exist on disk.
    pub fn module_roots(&self) -> Vec<&Utf8Path> {
        self.module_dirs
            .iter()
            .filter(|d| d.as_std_path().is_dir())
            .map(|d| d.as_path())
            .collect()
    }
}

fn collect_tree(root: &Utf8Path, prefix: &str) -> Result<Vec<CollectedFile>> {
    if !root.as_std_path().is_dir() {
        tracing::debug!("Skipping missing directory {}", root);
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root.as_std_path()).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(p) => p,
            Err(p) => {
                tracing::warn!("Skipping non-UTF-8 path: {}", p.display());
                continue;
            }
        };

        let rel = path.strip_prefix(root).unwrap_or(&path);
        let archive_path = format!("{}{}", prefix, rel.as_str().replace('\\', "/"));
        files.push(CollectedFile {
            root: root.to_path_buf(),
            archive_path,
            file: path,
        });
    }

    tracing::debug!("Collected {} file(s) from {}", files.len(), root);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn utf8(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn collects_resources_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        fs::create_dir_all(root.join("META-INF")).unwrap();
        fs::write(root.join("b.properties"), "b").unwrap();
        fs::write(root.join("a.properties"), "a").unwrap();
        fs::write(root.join("META-INF/beans.xml"), "<beans/>").unwrap();

        let collector = ResourceCollector::new(vec![root.clone(), root.join("missing")], vec![]);
        let paths: Vec<_> = collector
            .resources()
            .unwrap()
            .into_iter()
            .map(|f| f.archive_path)
            .collect();

        assert_eq!(
            paths,
            vec!["META-INF/beans.xml", "a.properties", "b.properties"]
        );
    }

    #[test]
    fn modules_keep_their_own_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir).join("modules-src");
        fs::create_dir_all(root.join("com/example/main")).unwrap();
        fs::write(root.join("com/example/main/module.xml"), "<module/>").unwrap();

        let collector = ResourceCollector::new(vec![], vec![root.clone()]);
        let modules = collector.modules().unwrap();

        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].archive_path, "modules/com/example/main/module.xml");
        assert_eq!(modules[0].root, root);
        assert_eq!(collector.module_roots(), vec![root.as_path()]);
    }
}
