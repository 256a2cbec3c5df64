use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    inspect_archive, package_project, DetectionArg, InspectArgs, PackageArgs,
};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod errors;
mod project;
mod utils;

const DEFAULT_LOG_FILTER: &str = "swarm_package=info,swarm_bundle=info";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a fat, hollow or executable archive from a swarm.toml project
    Package {
        /// The path to the swarm.toml project file
        #[arg(short, long)]
        project: Option<String>,

        /// The directory to write the archive to
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Additional fraction to include (name, name:version or full coordinate)
        #[arg(short, long = "fraction")]
        fractions: Vec<String>,

        /// Leave the application's own classes out of the archive
        #[arg(long)]
        hollow: bool,

        /// Prepend a launch script so the archive can be run directly
        #[arg(short = 'x', long)]
        executable: bool,

        /// Custom launch script for executable archives
        #[arg(long)]
        script: Option<String>,

        /// When to detect fractions from application classes
        #[arg(long, value_enum)]
        detect: Option<DetectionArg>,

        /// Fraction catalog file (.json or .toml)
        #[arg(long)]
        catalog: Option<String>,

        /// Maven repository used to resolve dependencies
        #[arg(long)]
        repository: Option<String>,
    },
    /// Show the layout and swarm metadata of an archive
    Inspect {
        /// The path to the archive
        #[arg(short, long)]
        file_path: String,

        /// List every entry
        #[arg(long)]
        entries: bool,
    },
}

fn parse_args() -> Result<Args> {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).into_diagnostic()
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let args = parse_args()?;

    match args.command {
        Commands::Package {
            project,
            output_dir,
            fractions,
            hollow,
            executable,
            script,
            detect,
            catalog,
            repository,
        } => package_project(PackageArgs {
            project_path: project,
            output_dir,
            fractions,
            hollow,
            executable,
            script,
            detect,
            catalog,
            repository,
        }),
        Commands::Inspect {
            file_path,
            entries,
        } => inspect_archive(InspectArgs { file_path, entries }),
    }
}
