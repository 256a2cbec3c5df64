use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use miette::Result;
use swarm_artifact::FractionList;
use swarm_bundle::{BuildTool, FractionDetectionMode, LocalRepository, TracingLogger};

use crate::errors::CliError;
use crate::project::{find_project, SwarmProject};
use crate::println_pad;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DetectionArg {
    Never,
    WhenMissing,
    Force,
}

impl From<DetectionArg> for FractionDetectionMode {
    fn from(arg: DetectionArg) -> Self {
        match arg {
            DetectionArg::Never => FractionDetectionMode::Never,
            DetectionArg::WhenMissing => FractionDetectionMode::WhenMissing,
            DetectionArg::Force => FractionDetectionMode::Force,
        }
    }
}

#[derive(Debug, Default)]
pub struct PackageArgs {
    pub project_path: Option<String>,
    pub output_dir: Option<String>,
    pub fractions: Vec<String>,
    pub hollow: bool,
    pub executable: bool,
    pub script: Option<String>,
    pub detect: Option<DetectionArg>,
    pub catalog: Option<String>,
    pub repository: Option<String>,
}

pub fn package_project(args: PackageArgs) -> Result<()> {
    let project_path = resolve_project_path(args.project_path.as_deref())?;
    let mut project = SwarmProject::load(&project_path)?;
    apply_overrides(&mut project, &args);
    tracing::debug!("Loaded project from {}", project_path);

    println!(
        "{} {}",
        "📦 Packaging project:".bright_blue().bold(),
        format!(
            "{}:{}:{}",
            project.project.group_id, project.project.artifact_id, project.project.version
        )
        .bright_cyan()
        .bold()
    );
    if project.build.hollow {
        println!("{}", "   hollow archive, application classes are left out".dimmed());
    }

    let catalog = match &project.catalog {
        Some(path) => FractionList::load(path)
            .map_err(|e| CliError::catalog_load_failed(path.clone(), e))?,
        None => FractionList::new(),
    };
    let repository = LocalRepository::new(match &project.repository {
        Some(path) => path.clone(),
        None => default_repository().ok_or(CliError::RepositoryNotFound)?,
    });

    let request = project.to_request();
    let outcome = BuildTool::new(project.build.clone(), &catalog, &repository)
        .with_logger(TracingLogger)
        .build(&request)
        .map_err(CliError::from)?;

    println!(
        "{} {}",
        "🔗 Dependencies:".bright_magenta().bold(),
        outcome.dependencies.len().to_string().bright_white().bold()
    );
    for dependency in &outcome.dependencies {
        println_pad!("{} {}", "•".bright_cyan(), dependency.to_string().bright_white());
    }

    if !outcome.collisions.is_empty() {
        println!(
            "{} {}",
            "⚠️  Path collisions:".bright_yellow().bold(),
            outcome.collisions.len().to_string().bright_white()
        );
        for collision in &outcome.collisions {
            println_pad!("{} {}", "•".bright_yellow(), collision.to_string().dimmed());
        }
    }

    println!(
        "{}\n{} {}",
        "✅ Archive created successfully!".bright_green().bold(),
        "📍 Path:".bright_green(),
        outcome.archive.as_str().bright_white().bold()
    );
    println!(
        "{} {}",
        "🏷️  Classifier:".bright_green(),
        outcome.attached.classifier.bright_white()
    );
    if outcome.wrap.wrapped {
        println!(
            "{} {}",
            "🚀 Executable:".bright_green(),
            format!("launcher prefix of {} bytes", outcome.wrap.prefix_len).bright_white()
        );
    }
    if let Some(war) = &outcome.repackaged {
        println!(
            "{} {}",
            "🔁 Repackaged:".bright_green(),
            war.as_str().bright_white()
        );
    }

    Ok(())
}

fn resolve_project_path(project_path: Option<&str>) -> Result<Utf8PathBuf> {
    match project_path {
        Some(path) => Ok(Utf8PathBuf::from(path)),
        None => {
            let cwd = std::env::current_dir().map_err(CliError::from)?;
            let cwd = Utf8PathBuf::from_path_buf(cwd)
                .map_err(|p| miette::miette!("Working directory is not UTF-8: {}", p.display()))?;
            Ok(find_project(&cwd)?)
        }
    }
}

fn apply_overrides(project: &mut SwarmProject, args: &PackageArgs) {
    if let Some(output_dir) = &args.output_dir {
        project.project.output_dir = Utf8PathBuf::from(output_dir);
    }
    project.fractions.extend(args.fractions.iter().cloned());
    if args.hollow {
        project.build.hollow = true;
    }
    if args.executable {
        project.build.executable = true;
    }
    if let Some(script) = &args.script {
        project.build.executable_script = Some(Utf8PathBuf::from(script));
    }
    if let Some(detect) = args.detect {
        project.build.fraction_detection_mode = detect.into();
    }
    if let Some(catalog) = &args.catalog {
        project.catalog = Some(Utf8PathBuf::from(catalog));
    }
    if let Some(repository) = &args.repository {
        project.repository = Some(Utf8PathBuf::from(repository));
    }
}

/// `~/.m2/repository`
fn default_repository() -> Option<Utf8PathBuf> {
    let dirs = directories_next::BaseDirs::new()?;
    let home = Utf8Path::from_path(dirs.home_dir())?;
    Some(home.join(".m2").join("repository"))
}
