//! Build orchestration.
//!
//! [`BuildTool`] runs the packaging pipeline for one project. Stages run in a
//! fixed order and each is attempted once:
//!
//! 1. **Configured**: validate the request, compute the output path and lock it.
//! 2. **FractionsResolved**: expand requested fractions through the catalog
//!    and, depending on [`FractionDetectionMode`](crate::FractionDetectionMode),
//!    detect further fractions from the application's classes.
//! 3. **DependenciesReconciled**: merge presolved, explicit and fraction
//!    dependencies into one [`DependencySet`] view and resolve every bundled
//!    dependency to a file. Nothing has been written up to here.
//! 4. **ArchiveWritten**: plan and write the fat or hollow archive.
//! 5. **Wrapped**: prepend the launch script when the archive is executable.
//! 6. **Repackaged**: for `war` projects, put the archive into the war's
//!    `WEB-INF/lib/`.
//!
//! The first error aborts the run. It is reported to the [`BuildLogger`] and
//! returned as a single [`BuildFailure`] naming the stage it happened in.

use std::fmt;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use swarm_artifact::{ArtifactSpec, FractionCatalog};

use crate::archive::{ArchiveInputs, ArchiveWriter, EntryCollision};
use crate::config::{BuildConfiguration, FractionDetectionMode};
use crate::dependencies::{DependencySet, DependencySource};
use crate::error::{BuildFailure, Error, Result};
use crate::executable::{ExecutableWrapper, WrapOutcome};
use crate::fraction::{FractionDetector, FractionResolver};
use crate::lock::OutputLock;
use crate::logger::{BuildLogger, NoopLogger};
use crate::repackage::RepackageStep;
use crate::resolver::ArtifactResolver;
use crate::resources::ResourceCollector;
use crate::signal::{BuildSignal, CancellationToken};

/// Type of the attached artifact record.
pub const ATTACHED_ARTIFACT_TYPE: &str = "jar";

/// Stages of the build pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildStage {
    Configured,
    FractionsResolved,
    DependenciesReconciled,
    ArchiveWritten,
    Wrapped,
    Repackaged,
    Done,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildStage::Configured => "configure",
            BuildStage::FractionsResolved => "resolve fractions",
            BuildStage::DependenciesReconciled => "reconcile dependencies",
            BuildStage::ArchiveWritten => "write archive",
            BuildStage::Wrapped => "wrap executable",
            BuildStage::Repackaged => "repackage",
            BuildStage::Done => "done",
        })
    }
}

/// The project being packaged, as reported by the host build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Packaging type, e.g. `jar` or `war`.
    pub packaging: String,
    /// The built application archive. Only optional for hollow builds.
    pub file: Option<Utf8PathBuf>,
}

impl ProjectArtifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        packaging: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            packaging: packaging.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<Utf8PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Per-invocation inputs gathered by the host build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub project: ProjectArtifact,
    /// Base name of the output, e.g. `app-1.0`.
    pub final_name: String,
    pub output_dir: Utf8PathBuf,
    /// Fraction names, `name:version` pairs or full coordinates.
    pub fractions: Vec<String>,
    pub explicit: Vec<ArtifactSpec>,
    pub presolved: Vec<ArtifactSpec>,
}

impl BuildRequest {
    pub fn new(
        project: ProjectArtifact,
        final_name: impl Into<String>,
        output_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            project,
            final_name: final_name.into(),
            output_dir: output_dir.into(),
            fractions: Vec::new(),
            explicit: Vec::new(),
            presolved: Vec::new(),
        }
    }
}

/// Secondary artifact record the host attaches to its project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// `swarm` or `hollowswarm`.
    pub classifier: String,
    pub artifact_type: String,
    pub file: Utf8PathBuf,
}

/// Summary of a successful build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub archive: Utf8PathBuf,
    pub wrap: WrapOutcome,
    pub attached: AttachedArtifact,
    /// The reconciled dependency list, in archive order.
    pub dependencies: Vec<ArtifactSpec>,
    /// Paths offered by more than one input.
    pub collisions: Vec<EntryCollision>,
    /// The rewritten war, for web projects.
    pub repackaged: Option<Utf8PathBuf>,
    pub build_time: Duration,
}

/// Runs the packaging pipeline.
///
/// The configuration is fixed at construction. Catalog and resolver are
/// borrowed collaborators owned by the host.
pub struct BuildTool<'a> {
    config: BuildConfiguration,
    catalog: &'a dyn FractionCatalog,
    resolver: &'a dyn ArtifactResolver,
    logger: Box<dyn BuildLogger + 'a>,
    token: CancellationToken,
}

impl<'a> BuildTool<'a> {
    pub fn new(
        config: BuildConfiguration,
        catalog: &'a dyn FractionCatalog,
        resolver: &'a dyn ArtifactResolver,
    ) -> Self {
        Self {
            config,
            catalog,
            resolver,
            logger: Box::new(NoopLogger),
            token: CancellationToken::new(),
        }
    }

    pub fn with_logger<L: BuildLogger + 'a>(mut self, logger: L) -> Self {
        self.logger = Box::new(logger);
        self
    }

    /// Cancel the build from another thread through `token`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn config(&self) -> &BuildConfiguration {
        &self.config
    }

    /// Run every stage for `request`.
    pub fn build(&self, request: &BuildRequest) -> std::result::Result<BuildOutcome, BuildFailure> {
        let start = Instant::now();
        let signal = BuildSignal::new(self.token.clone(), self.config.timeout());
        let mut stage = BuildStage::Configured;

        match self.run(request, &signal, &mut stage, start) {
            Ok(outcome) => {
                self.logger.info(&format!(
                    "Built {} in {:.2}s",
                    outcome.archive,
                    outcome.build_time.as_secs_f64()
                ));
                Ok(outcome)
            }
            Err(source) => {
                let failure = BuildFailure { stage, source };
                self.logger.error_with_cause(
                    &format!(
                        "Unable to create {}",
                        self.config.output_file_name(&request.final_name)
                    ),
                    &failure,
                );
                Err(failure)
            }
        }
    }

    fn run(
        &self,
        request: &BuildRequest,
        signal: &BuildSignal,
        stage: &mut BuildStage,
        start: Instant,
    ) -> Result<BuildOutcome> {
        // Configured
        let output = self.validate(request)?;
        let _lock = OutputLock::acquire(&output)?;
        signal.check()?;

        // FractionsResolved
        *stage = BuildStage::FractionsResolved;
        let set = self.collect_dependencies(request)?;
        signal.check()?;

        // DependenciesReconciled
        *stage = BuildStage::DependenciesReconciled;
        let dependencies = self.reconcile(&set)?;
        signal.check()?;

        // ArchiveWritten
        *stage = BuildStage::ArchiveWritten;
        let collector = ResourceCollector::new(
            self.config.resource_dirs.clone(),
            self.config.module_dirs.clone(),
        );
        let primary = if self.config.hollow {
            None
        } else {
            request.project.file.as_deref()
        };
        let inputs = ArchiveInputs {
            primary,
            dependencies: &dependencies,
            resources: &collector,
        };
        let report = ArchiveWriter::from_config(&self.config).write(&inputs, &output, signal)?;
        if !report.collisions.is_empty() {
            self.logger.info(&format!(
                "{} archive path(s) were provided by more than one input",
                report.collisions.len()
            ));
        }

        // Wrapped
        *stage = BuildStage::Wrapped;
        signal.check()?;
        let wrap = ExecutableWrapper::from_config(&self.config).wrap(&output, signal)?;
        if wrap.wrapped {
            self.logger.info(&format!("Made {} executable", output));
        }

        // Repackaged
        *stage = BuildStage::Repackaged;
        let repackaged = match &request.project.file {
            Some(package) if RepackageStep::applies_to(&request.project.packaging) => {
                signal.check()?;
                let path = RepackageStep::new().repackage(package, &output, signal)?;
                self.logger.info(&format!("Repackaged {}", path));
                Some(path)
            }
            _ => None,
        };

        *stage = BuildStage::Done;
        let attached = AttachedArtifact {
            group_id: request.project.group_id.clone(),
            artifact_id: request.project.artifact_id.clone(),
            version: request.project.version.clone(),
            classifier: self.config.classifier().to_string(),
            artifact_type: ATTACHED_ARTIFACT_TYPE.to_string(),
            file: output.clone(),
        };

        Ok(BuildOutcome {
            archive: output,
            wrap,
            attached,
            dependencies,
            collisions: report.collisions,
            repackaged,
            build_time: start.elapsed(),
        })
    }

    fn validate(&self, request: &BuildRequest) -> Result<Utf8PathBuf> {
        if request.final_name.trim().is_empty() {
            return Err(Error::InvalidInput("final name is empty".to_string()));
        }

        let output = request
            .output_dir
            .join(self.config.output_file_name(&request.final_name));

        match &request.project.file {
            Some(file) if !file.as_std_path().is_file() => {
                return Err(Error::InvalidInput(format!(
                    "application archive {} does not exist",
                    file
                )));
            }
            Some(file) if file == &output => {
                return Err(Error::InvalidInput(format!(
                    "application archive {} is also the output",
                    file
                )));
            }
            None if !self.config.hollow => {
                return Err(Error::InvalidInput(
                    "no application archive to package".to_string(),
                ));
            }
            _ => {}
        }

        self.logger.info(&format!(
            "Packaging {}:{}:{} into {}",
            request.project.group_id, request.project.artifact_id, request.project.version, output
        ));
        Ok(output)
    }

    /// Fill a [`DependencySet`] from the request, requested fractions and,
    /// when the mode allows it, detected fractions.
    fn collect_dependencies(&self, request: &BuildRequest) -> Result<DependencySet> {
        let mode = self.config.fraction_detection_mode;
        let mut set = DependencySet::new(mode, self.config.fraction_conflict_policy);

        for spec in &request.presolved {
            set.add(DependencySource::Presolved, spec.clone());
        }
        for spec in &request.explicit {
            set.add(DependencySource::Explicit, spec.clone());
        }

        let resolver = FractionResolver::new(self.catalog);
        let mut resolved = 0;
        for name in &request.fractions {
            match resolver.resolve(name) {
                Ok(specs) => {
                    for spec in specs {
                        if set.add(DependencySource::Fraction, spec) {
                            resolved += 1;
                        }
                    }
                }
                Err(Error::UnknownFraction(_)) => set.add_unresolved_fraction(name.clone()),
                Err(e) => return Err(e),
            }
        }
        if !request.fractions.is_empty() {
            self.logger.info(&format!(
                "Resolved {} of {} requested fraction(s) into {} artifact(s)",
                request.fractions.len() - set.unresolved_fractions().len(),
                request.fractions.len(),
                resolved
            ));
        }

        if self.should_detect(request) {
            if let Some(primary) = &request.project.file {
                self.add_detected(&mut set, primary)?;
            }
        }

        Ok(set)
    }

    fn should_detect(&self, request: &BuildRequest) -> bool {
        match self.config.fraction_detection_mode {
            FractionDetectionMode::Never => false,
            FractionDetectionMode::Force => true,
            FractionDetectionMode::WhenMissing => {
                let declared = !request.fractions.is_empty()
                    || request
                        .presolved
                        .iter()
                        .chain(&request.explicit)
                        .any(|spec| self.catalog.is_fraction(spec));
                if declared {
                    tracing::debug!("Fractions already declared, skipping detection");
                }
                !declared
            }
        }
    }

    fn add_detected(&self, set: &mut DependencySet, primary: &Utf8Path) -> Result<()> {
        let detected = FractionDetector::new(self.catalog).detect(primary)?;
        if detected.is_empty() {
            return Ok(());
        }

        let resolver = FractionResolver::new(self.catalog);
        let mut added = Vec::new();
        for descriptor in detected {
            let specs = match resolver.resolve_descriptor(descriptor) {
                Ok(specs) => specs,
                Err(Error::UnknownFraction(_)) => {
                    set.add_unresolved_fraction(descriptor.artifact_id.clone());
                    continue;
                }
                Err(e) => return Err(e),
            };
            for spec in specs {
                if set.add_detected(spec) {
                    added.push(descriptor.artifact_id.as_str());
                }
            }
        }
        added.dedup();
        if !added.is_empty() {
            self.logger
                .info(&format!("Detected fractions: {}", added.join(", ")));
        }
        Ok(())
    }

    /// Merge the set and make sure every dependency that will be embedded has a file.
    fn reconcile(&self, set: &DependencySet) -> Result<Vec<ArtifactSpec>> {
        let mut dependencies = set.resolve()?;

        if self.config.bundle_dependencies {
            for spec in dependencies.iter_mut().filter(|s| s.is_archive()) {
                let file = match spec.resolved_file() {
                    Some(file) if file.as_std_path().is_file() => continue,
                    Some(file) => {
                        tracing::debug!("{} does not exist, resolving {}", file, spec);
                        self.resolver.resolve(spec)?
                    }
                    None => self.resolver.resolve(spec)?,
                };
                spec.file = Some(file);
            }
        }

        self.logger.info(&format!(
            "Reconciled {} dependencies",
            dependencies.len()
        ));
        Ok(dependencies)
    }
}
