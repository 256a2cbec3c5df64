//! Archive planning and writing.
//!
//! Building an archive happens in two passes:
//!
//! 1. [`ArchiveWriter::plan`] lists every input and decides, for each
//!    in-archive path, which source provides it. The result is an
//!    [`ArchiveEntryPlan`] that also records every path collision.
//! 2. [`ArchiveWriter::emit`] streams the plan into a temporary file next to
//!    the output and moves it into place once the archive is complete.
//!
//! Precedence between origins:
//!
//! - bootstrap metadata and application entries are never replaced;
//! - between dependencies the earlier one wins;
//! - resource files replace dependency entries;
//! - between resource directories the earlier one wins.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use swarm_artifact::ArtifactSpec;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::config::{BuildConfiguration, DependencyLayout};
use crate::error::{Error, Result};
use crate::manifest::{jar_manifest, SwarmManifest, MANIFEST_PATH, SWARM_MANIFEST_PATH};
use crate::resources::ResourceCollector;
use crate::signal::BuildSignal;

/// Prefix under which dependency jars are embedded with [`DependencyLayout::Repository`].
pub const REPOSITORY_PREFIX: &str = "m2repo/";

/// Where a planned entry comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOrigin {
    /// Generated manifest and swarm metadata.
    Bootstrap,
    /// The application's own archive.
    Primary,
    /// A dependency, identified by its coordinate.
    Dependency(String),
    /// A resource directory.
    Resource(Utf8PathBuf),
    /// An additional module directory.
    Module(Utf8PathBuf),
}

impl EntryOrigin {
    fn replaces(&self, existing: &EntryOrigin) -> bool {
        matches!(
            (self, existing),
            (EntryOrigin::Resource(_), EntryOrigin::Dependency(_))
        )
    }
}

impl fmt::Display for EntryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryOrigin::Bootstrap => f.write_str("bootstrap"),
            EntryOrigin::Primary => f.write_str("application"),
            EntryOrigin::Dependency(gav) => write!(f, "dependency {}", gav),
            EntryOrigin::Resource(dir) => write!(f, "resource dir {}", dir),
            EntryOrigin::Module(dir) => write!(f, "module dir {}", dir),
        }
    }
}

/// How the bytes of a planned entry are obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    /// Generated in memory.
    Bytes(Vec<u8>),
    /// An entry of another archive, copied without recompression.
    ArchiveEntry { archive: Utf8PathBuf, name: String },
    /// A file on disk.
    File(Utf8PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    pub path: String,
    pub origin: EntryOrigin,
    pub source: EntrySource,
}

/// Two origins offered the same path; `kept` provides it in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCollision {
    pub path: String,
    pub kept: EntryOrigin,
    pub discarded: EntryOrigin,
}

impl fmt::Display for EntryCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: kept {}, discarded {}",
            self.path, self.kept, self.discarded
        )
    }
}

/// Ordered set of unique in-archive paths and their sources.
#[derive(Debug, Clone, Default)]
pub struct ArchiveEntryPlan {
    entries: Vec<PlannedEntry>,
    index: HashMap<String, usize>,
    collisions: Vec<EntryCollision>,
}

impl ArchiveEntryPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer `path` from `origin`. Returns whether `source` now provides the path.
    ///
    /// A replaced entry keeps its original position so entry order only
    /// depends on the order inputs were first seen.
    pub fn insert(&mut self, path: impl Into<String>, origin: EntryOrigin, source: EntrySource) -> bool {
        let path = path.into();
        match self.index.get(&path) {
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push(PlannedEntry {
                    path,
                    origin,
                    source,
                });
                true
            }
            Some(&slot) => {
                let existing = &mut self.entries[slot];
                if origin.replaces(&existing.origin) {
                    let discarded = std::mem::replace(&mut existing.origin, origin);
                    existing.source = source;
                    self.collisions.push(EntryCollision {
                        path,
                        kept: existing.origin.clone(),
                        discarded,
                    });
                    true
                } else {
                    self.collisions.push(EntryCollision {
                        path,
                        kept: existing.origin.clone(),
                        discarded: origin,
                    });
                    false
                }
            }
        }
    }

    pub fn entries(&self) -> &[PlannedEntry] {
        &self.entries
    }

    pub fn collisions(&self) -> &[EntryCollision] {
        &self.collisions
    }

    pub fn get(&self, path: &str) -> Option<&PlannedEntry> {
        self.index.get(path).map(|&slot| &self.entries[slot])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything an archive is assembled from.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveInputs<'a> {
    /// The application archive; ignored for hollow archives.
    pub primary: Option<&'a Utf8Path>,
    /// Reconciled dependencies, each resolved to a file when bundling.
    pub dependencies: &'a [ArtifactSpec],
    pub resources: &'a ResourceCollector,
}

/// Result of writing an archive.
#[derive(Debug, Clone)]
pub struct ArchiveWriteReport {
    pub path: Utf8PathBuf,
    pub entries: usize,
    pub collisions: Vec<EntryCollision>,
}

/// Plans and writes fat or hollow archives.
#[derive(Debug, Clone, Default)]
pub struct ArchiveWriter {
    hollow: bool,
    bundle_dependencies: bool,
    layout: DependencyLayout,
    main_class: Option<String>,
    properties: BTreeMap<String, String>,
}

impl ArchiveWriter {
    pub fn from_config(config: &BuildConfiguration) -> Self {
        Self {
            hollow: config.hollow,
            bundle_dependencies: config.bundle_dependencies,
            layout: config.dependency_layout,
            main_class: config.main_class.clone(),
            properties: config.properties.clone(),
        }
    }

    /// Plan and emit in one go.
    pub fn write(
        &self,
        inputs: &ArchiveInputs<'_>,
        output: &Utf8Path,
        signal: &BuildSignal,
    ) -> Result<ArchiveWriteReport> {
        let plan = self.plan(inputs)?;
        signal.check()?;
        self.emit(&plan, output, signal)
    }

    /// Decide the content of the archive without writing anything.
    pub fn plan(&self, inputs: &ArchiveInputs<'_>) -> Result<ArchiveEntryPlan> {
        let mut plan = ArchiveEntryPlan::new();

        // Bootstrap
        let manifest = self.swarm_manifest(inputs);
        plan.insert(
            MANIFEST_PATH,
            EntryOrigin::Bootstrap,
            EntrySource::Bytes(jar_manifest(self.main_class.as_deref())),
        );
        plan.insert(
            SWARM_MANIFEST_PATH,
            EntryOrigin::Bootstrap,
            EntrySource::Bytes(manifest.to_bytes()?),
        );

        // Application
        match (self.hollow, inputs.primary) {
            (true, _) => tracing::debug!("Hollow archive, skipping application entries"),
            (false, Some(primary)) => {
                let mut copied = 0;
                for name in list_entries(primary)? {
                    if name.eq_ignore_ascii_case(MANIFEST_PATH) {
                        continue;
                    }
                    let source = EntrySource::ArchiveEntry {
                        archive: primary.to_path_buf(),
                        name: name.clone(),
                    };
                    if plan.insert(name, EntryOrigin::Primary, source) {
                        copied += 1;
                    }
                }
                tracing::debug!("Planned {} application entries from {}", copied, primary);
            }
            (false, None) => {
                return Err(Error::InvalidInput(
                    "a non-hollow archive needs an application archive".to_string(),
                ))
            }
        }

        // Dependencies
        if self.bundle_dependencies {
            self.plan_dependencies(&mut plan, inputs.dependencies)?;
        } else {
            tracing::debug!(
                "Not bundling {} dependencies, listing them in the swarm manifest only",
                inputs.dependencies.len()
            );
        }

        // Resources
        for file in inputs.resources.resources()? {
            let origin = EntryOrigin::Resource(file.root);
            plan.insert(file.archive_path, origin, EntrySource::File(file.file));
        }

        // Modules
        for file in inputs.resources.modules()? {
            let origin = EntryOrigin::Module(file.root);
            plan.insert(file.archive_path, origin, EntrySource::File(file.file));
        }

        tracing::info!(
            "Planned {} archive entries ({} collisions)",
            plan.len(),
            plan.collisions().len()
        );
        for collision in plan.collisions() {
            tracing::debug!("Collision at {}", collision);
        }

        Ok(plan)
    }

    fn swarm_manifest(&self, inputs: &ArchiveInputs<'_>) -> SwarmManifest {
        let application = if self.hollow {
            None
        } else {
            inputs
                .primary
                .and_then(|p| p.file_name())
                .map(str::to_string)
        };

        SwarmManifest {
            main_class: self.main_class.clone(),
            hollow: self.hollow,
            bundle_dependencies: self.bundle_dependencies,
            application,
            dependencies: inputs.dependencies.iter().map(|d| d.to_string()).collect(),
            modules: inputs
                .resources
                .module_roots()
                .iter()
                .filter_map(|root| root.file_name())
                .map(str::to_string)
                .collect(),
            properties: self.properties.clone(),
        }
    }

    fn plan_dependencies(&self, plan: &mut ArchiveEntryPlan, dependencies: &[ArtifactSpec]) -> Result<()> {
        let mut archives = Vec::with_capacity(dependencies.len());
        for spec in dependencies {
            if !spec.is_archive() {
                tracing::debug!("Skipping non-archive dependency {}", spec);
                continue;
            }
            let file = spec
                .resolved_file()
                .ok_or_else(|| Error::resolution(spec.to_string(), "dependency has no file"))?;
            archives.push((spec, file));
        }

        match self.layout {
            DependencyLayout::Repository => {
                for (spec, file) in archives {
                    let path = format!("{}{}", REPOSITORY_PREFIX, spec.repository_path());
                    plan.insert(
                        path,
                        EntryOrigin::Dependency(spec.gav()),
                        EntrySource::File(file.to_path_buf()),
                    );
                }
            }
            DependencyLayout::Flatten => {
                let listings = archives
                    .par_iter()
                    .map(|(_, file)| list_entries(file))
                    .collect::<Result<Vec<_>>>()?;

                for ((spec, file), names) in archives.iter().zip(listings) {
                    for name in names {
                        if is_excluded_from_flatten(&name) {
                            continue;
                        }
                        let source = EntrySource::ArchiveEntry {
                            archive: file.to_path_buf(),
                            name: name.clone(),
                        };
                        plan.insert(name, EntryOrigin::Dependency(spec.gav()), source);
                    }
                }
            }
        }
        Ok(())
    }

    /// Write `plan` to `output`.
    ///
    /// Bytes go to a temporary file in the output directory that is renamed
    /// over `output` only after the archive is finished. On any error,
    /// cancellation included, the temporary file is removed and `output` is
    /// left as it was.
    pub fn emit(
        &self,
        plan: &ArchiveEntryPlan,
        output: &Utf8Path,
        signal: &BuildSignal,
    ) -> Result<ArchiveWriteReport> {
        let dir = output
            .parent()
            .ok_or_else(|| Error::InvalidInput(format!("output {} has no parent", output)))?;
        fs::create_dir_all(dir.as_std_path())?;

        let temp = NamedTempFile::new_in(dir.as_std_path())?;
        {
            let mut zip = ZipWriter::new(BufWriter::new(temp.as_file()));
            // planned entries are grouped by source, so one open archive is enough
            let mut current: Option<(&Utf8Path, ZipArchive<BufReader<File>>)> = None;

            for entry in plan.entries() {
                signal.check()?;

                match &entry.source {
                    EntrySource::Bytes(bytes) => {
                        zip.start_file(entry.path.as_str(), entry_options(CompressionMethod::Deflated))?;
                        zip.write_all(bytes)?;
                    }
                    EntrySource::File(file) => {
                        let method = if entry.path.starts_with(REPOSITORY_PREFIX) {
                            CompressionMethod::Stored
                        } else {
                            CompressionMethod::Deflated
                        };
                        zip.start_file(entry.path.as_str(), entry_options(method))?;
                        let mut reader = BufReader::new(File::open(file.as_std_path())?);
                        io::copy(&mut reader, &mut zip)?;
                    }
                    EntrySource::ArchiveEntry { archive, name } => {
                        let mut reader = match current.take() {
                            Some((path, reader)) if path == archive.as_path() => reader,
                            _ => open_archive(archive)?,
                        };
                        zip.raw_copy_file(reader.by_name(name)?)?;
                        current = Some((archive.as_path(), reader));
                    }
                }
            }

            let mut writer = zip.finish()?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        set_output_permissions(temp.as_file())?;
        temp.persist(output.as_std_path()).map_err(|e| e.error)?;

        tracing::info!("Wrote {} entries to {}", plan.len(), output);
        Ok(ArchiveWriteReport {
            path: output.to_path_buf(),
            entries: plan.len(),
            collisions: plan.collisions().to_vec(),
        })
    }
}

/// Fixed timestamp and permissions keep repeated builds byte-identical.
fn entry_options(method: CompressionMethod) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

#[cfg(unix)]
fn set_output_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_output_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}

pub(crate) fn open_archive(path: &Utf8Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path.as_std_path())?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

/// Names of the file entries of an archive, in central directory order.
pub(crate) fn list_entries(path: &Utf8Path) -> Result<Vec<String>> {
    let mut archive = open_archive(path)?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if !entry.is_dir() {
            names.push(entry.name().to_string());
        }
    }
    Ok(names)
}

/// Dependency manifests and signatures describe the dependency jar itself and
/// are invalid once its entries are merged into another archive.
fn is_excluded_from_flatten(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    let Some(rest) = upper.strip_prefix("META-INF/") else {
        return false;
    };
    if rest == "MANIFEST.MF" || rest == "INDEX.LIST" {
        return true;
    }
    !rest.contains('/') && [".SF", ".DSA", ".RSA", ".EC"].iter().any(|ext| rest.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::CancellationToken;
    use std::io::Read;

    fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path).unwrap()
    }

    fn write_jar(path: &Utf8Path, entries: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn read_entry(path: &Utf8Path, name: &str) -> String {
        let mut archive = open_archive(path).unwrap();
        let mut content = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn plan_precedence() {
        let mut plan = ArchiveEntryPlan::new();
        let dep_a = EntryOrigin::Dependency("g:a:1".into());
        let dep_b = EntryOrigin::Dependency("g:b:1".into());
        let res = EntryOrigin::Resource("res".into());

        assert!(plan.insert("App.class", EntryOrigin::Primary, EntrySource::Bytes(vec![1])));
        assert!(plan.insert("lib.properties", dep_a.clone(), EntrySource::Bytes(vec![2])));
        assert!(!plan.insert("lib.properties", dep_b.clone(), EntrySource::Bytes(vec![3])));
        assert!(plan.insert("lib.properties", res.clone(), EntrySource::Bytes(vec![4])));
        assert!(!plan.insert("App.class", res.clone(), EntrySource::Bytes(vec![5])));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.entries()[1].path, "lib.properties");
        assert_eq!(plan.get("lib.properties").unwrap().origin, res);
        assert_eq!(plan.get("App.class").unwrap().origin, EntryOrigin::Primary);

        let collisions = plan.collisions();
        assert_eq!(collisions.len(), 3);
        assert_eq!(collisions[0].kept, dep_a);
        assert_eq!(collisions[0].discarded, dep_b);
        assert_eq!(collisions[1].kept, res);
        assert_eq!(collisions[1].discarded, dep_a);
        assert_eq!(collisions[2].kept, EntryOrigin::Primary);
    }

    #[test]
    fn flatten_exclusions() {
        assert!(is_excluded_from_flatten("META-INF/MANIFEST.MF"));
        assert!(is_excluded_from_flatten("meta-inf/manifest.mf"));
        assert!(is_excluded_from_flatten("META-INF/SIGNER.SF"));
        assert!(is_excluded_from_flatten("META-INF/SIGNER.RSA"));
        assert!(!is_excluded_from_flatten("META-INF/services/javax.ws.rs.ext.Providers"));
        assert!(!is_excluded_from_flatten("META-INF/maven/g/a/keys.RSA"));
        assert!(!is_excluded_from_flatten("com/example/Lib.class"));
    }

    #[test]
    fn writes_planned_archive() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path().to_path_buf());

        let app = root.join("app.jar");
        write_jar(
            &app,
            &[
                ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\r\n"),
                ("com/example/App.class", "app"),
            ],
        );
        let lib = root.join("lib-a-2.0.jar");
        write_jar(
            &lib,
            &[
                ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\r\n"),
                ("META-INF/LIB.SF", "sig"),
                ("com/example/App.class", "shadowed"),
                ("org/lib/A.class", "a"),
                ("lib.properties", "from-lib"),
            ],
        );
        let resources = root.join("resources");
        fs::create_dir_all(&resources).unwrap();
        fs::write(resources.join("lib.properties"), "from-resources").unwrap();

        let deps = vec![ArtifactSpec::new("org.lib", "lib-a", "2.0").with_file(lib.clone())];
        let collector = ResourceCollector::new(vec![resources.clone()], vec![]);
        let config = BuildConfiguration {
            main_class: Some("com.example.Main".into()),
            ..Default::default()
        };
        let writer = ArchiveWriter::from_config(&config);
        let inputs = ArchiveInputs {
            primary: Some(&app),
            dependencies: &deps,
            resources: &collector,
        };

        let output = root.join("out/app-swarm.jar");
        let report = writer.write(&inputs, &output, &BuildSignal::none()).unwrap();
        assert_eq!(report.path, output);
        assert_eq!(report.collisions.len(), 2);

        let archive = open_archive(&output).unwrap();
        let names: Vec<_> = archive.file_names().collect();
        assert!(names.contains(&"org/lib/A.class"));
        assert!(!names.contains(&"META-INF/LIB.SF"));
        assert_eq!(report.entries, archive.len());

        assert_eq!(read_entry(&output, "com/example/App.class"), "app");
        assert_eq!(read_entry(&output, "lib.properties"), "from-resources");
        assert!(read_entry(&output, MANIFEST_PATH).contains("Start-Class: com.example.Main"));

        let swarm: SwarmManifest =
            serde_json::from_str(&read_entry(&output, SWARM_MANIFEST_PATH)).unwrap();
        assert_eq!(swarm.application.as_deref(), Some("app.jar"));
        assert_eq!(swarm.dependencies, vec!["org.lib:lib-a:2.0"]);
    }

    #[test]
    fn repository_layout_embeds_jars_whole() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path().to_path_buf());
        let app = root.join("app.jar");
        write_jar(&app, &[("App.class", "app")]);
        let lib = root.join("lib-a-2.0.jar");
        write_jar(&lib, &[("org/lib/A.class", "a")]);

        let deps = vec![
            ArtifactSpec::new("org.lib", "lib-a", "2.0").with_file(lib.clone()),
            ArtifactSpec::new("org.lib", "parent", "2.0").with_type("pom"),
        ];
        let config = BuildConfiguration {
            dependency_layout: DependencyLayout::Repository,
            ..Default::default()
        };
        let collector = ResourceCollector::default();
        let plan = ArchiveWriter::from_config(&config)
            .plan(&ArchiveInputs {
                primary: Some(&app),
                dependencies: &deps,
                resources: &collector,
            })
            .unwrap();

        let embedded = plan.get("m2repo/org/lib/lib-a/2.0/lib-a-2.0.jar").unwrap();
        assert_eq!(embedded.source, EntrySource::File(lib));
        assert!(!plan.contains("org/lib/A.class"));
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn writes_hundreds_of_dependency_jars() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path().to_path_buf());
        let app = root.join("app.jar");
        write_jar(&app, &[("App.class", "app")]);

        let deps: Vec<_> = (0..300)
            .map(|i| {
                let jar = root.join(format!("lib-{i}-1.0.jar"));
                let class = format!("org/lib{i}/A.class");
                write_jar(&jar, &[(class.as_str(), "a"), ("shared.txt", "dup")]);
                ArtifactSpec::new("org.lib", format!("lib-{i}"), "1.0").with_file(jar)
            })
            .collect();
        let collector = ResourceCollector::new(vec![], vec![]);
        let writer = ArchiveWriter::from_config(&BuildConfiguration::default());
        let inputs = ArchiveInputs {
            primary: Some(&app),
            dependencies: &deps,
            resources: &collector,
        };

        let plan = writer.plan(&inputs).unwrap();
        let mut sources: Vec<&Utf8Path> = Vec::new();
        for entry in plan.entries() {
            if let EntrySource::ArchiveEntry { archive, .. } = &entry.source {
                if sources.last() != Some(&archive.as_path()) {
                    assert!(!sources.contains(&archive.as_path()), "{} planned twice", archive);
                    sources.push(archive.as_path());
                }
            }
        }
        assert_eq!(sources.len(), 301);

        let output = root.join("out/app-swarm.jar");
        let report = writer.emit(&plan, &output, &BuildSignal::none()).unwrap();
        assert_eq!(report.collisions.len(), 299);

        let archive = open_archive(&output).unwrap();
        assert_eq!(report.entries, archive.len());
        assert_eq!(read_entry(&output, "org/lib299/A.class"), "a");
        assert_eq!(read_entry(&output, "shared.txt"), "dup");
    }

    #[test]
    fn cancelled_write_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path().to_path_buf());
        let app = root.join("app.jar");
        write_jar(&app, &[("App.class", "app")]);

        let collector = ResourceCollector::default();
        let writer = ArchiveWriter::from_config(&BuildConfiguration::default());
        let plan = writer
            .plan(&ArchiveInputs {
                primary: Some(&app),
                dependencies: &[],
                resources: &collector,
            })
            .unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let output = root.join("out/app-swarm.jar");
        let result = writer.emit(&plan, &output, &BuildSignal::new(token, None));

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(!output.exists());
        assert_eq!(fs::read_dir(root.join("out")).unwrap().count(), 0);
    }

    #[test]
    fn non_hollow_requires_application() {
        let collector = ResourceCollector::default();
        let writer = ArchiveWriter::from_config(&BuildConfiguration::default());
        let result = writer.plan(&ArchiveInputs {
            primary: None,
            dependencies: &[],
            resources: &collector,
        });
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
