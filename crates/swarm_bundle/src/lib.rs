//! Packaging engine for swarm archives.
//!
//! This crate turns a compiled application and its dependencies into one
//! runnable archive. It supports:
//!
//! - **Fat archives**: application entries plus every runtime dependency
//! - **Hollow archives**: dependencies and bootstrap metadata only, for
//!   application classes supplied at runtime
//! - **Executable archives**: a shell launcher in front of a valid archive
//! - **Fractions**: named dependency bundles resolved through a catalog, or
//!   detected from the packages the application uses
//! - **War repackaging**: the built archive placed into a war's `WEB-INF/lib/`
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use swarm_artifact::{ArtifactSpec, FractionList};
//! use swarm_bundle::{
//!     BuildConfiguration, BuildRequest, BuildTool, LocalRepository, ProjectArtifact,
//!     TracingLogger,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = FractionList::load(Utf8Path::new("fractions.json"))?;
//! let repository = LocalRepository::new("/home/me/.m2/repository");
//! let config = BuildConfiguration {
//!     executable: true,
//!     main_class: Some("com.example.Main".to_string()),
//!     ..Default::default()
//! };
//!
//! let project = ProjectArtifact::new("com.example", "app", "1.0", "jar")
//!     .with_file("target/app-1.0.jar");
//! let mut request = BuildRequest::new(project, "app-1.0", "target");
//! request.fractions.push("jaxrs".to_string());
//! request
//!     .presolved
//!     .push(ArtifactSpec::new("org.example", "lib-a", "2.0"));
//!
//! let outcome = BuildTool::new(config, &catalog, &repository)
//!     .with_logger(TracingLogger)
//!     .build(&request)?;
//! println!("Built {}", outcome.archive);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod builder;
pub mod config;
pub mod dependencies;
pub mod error;
pub mod executable;
pub mod fraction;
pub mod lock;
pub mod logger;
pub mod manifest;
pub mod repackage;
pub mod resolver;
pub mod resources;
pub mod signal;

// Re-export main types
pub use archive::{
    ArchiveEntryPlan, ArchiveInputs, ArchiveWriteReport, ArchiveWriter, EntryCollision,
    EntryOrigin, EntrySource, PlannedEntry,
};
pub use builder::{
    AttachedArtifact, BuildOutcome, BuildRequest, BuildStage, BuildTool, ProjectArtifact,
};
pub use config::{
    BuildConfiguration, DependencyLayout, FractionConflictPolicy, FractionDetectionMode,
};
pub use dependencies::{DependencySet, DependencySource};
pub use error::{BuildFailure, Error, Result};
pub use executable::{ExecutableWrapper, WrapOutcome, DEFAULT_LAUNCH_SCRIPT};
pub use fraction::{FractionDetector, FractionResolver};
pub use logger::{BuildLogger, NoopLogger, TracingLogger};
pub use manifest::SwarmManifest;
pub use repackage::RepackageStep;
pub use resolver::{ArtifactResolver, LocalRepository, StaticResolver};
pub use resources::{CollectedFile, ResourceCollector};
pub use signal::{BuildSignal, CancellationToken};
