use camino::Utf8PathBuf;
use miette::Diagnostic;
use swarm_bundle::BuildFailure;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Project file not found")]
    #[diagnostic(
        code(project::not_found),
        help("Create a swarm.toml file in your project directory or pass --project")
    )]
    ProjectNotFound { search_path: Utf8PathBuf },

    #[error("Project file error: {path}")]
    #[diagnostic(
        code(project::parse_error),
        help("Check your swarm.toml file for syntax errors")
    )]
    ProjectParseError {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Fraction catalog could not be loaded: {path}")]
    #[diagnostic(
        code(catalog::load_failed),
        help("The catalog must be a .json array or a .toml file with [[fraction]] tables")
    )]
    CatalogLoadFailed {
        path: Utf8PathBuf,
        #[source]
        source: swarm_artifact::CatalogError,
    },

    #[error("No local repository found")]
    #[diagnostic(
        code(repository::not_found),
        help("Pass --repository or set `repository` in swarm.toml")
    )]
    RepositoryNotFound,

    #[error("Packaging failed during {}", .source.stage)]
    #[diagnostic(
        code(build::failed),
        help("Run with RUST_LOG=swarm_bundle=debug for a detailed trace")
    )]
    BuildFailed {
        #[source]
        source: BuildFailure,
    },

    #[error("File not found: {path}")]
    #[diagnostic(
        code(file::not_found),
        help("Make sure the file exists and the path is correct")
    )]
    FileNotFound { path: Utf8PathBuf },

    #[error("Not a readable archive: {path}")]
    #[diagnostic(code(archive::invalid))]
    InvalidArchive {
        path: Utf8PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn project_not_found(search_path: Utf8PathBuf) -> Self {
        Self::ProjectNotFound { search_path }
    }

    pub fn project_parse_error(path: Utf8PathBuf, source: toml::de::Error) -> Self {
        Self::ProjectParseError { path, source }
    }

    pub fn catalog_load_failed(path: Utf8PathBuf, source: swarm_artifact::CatalogError) -> Self {
        Self::CatalogLoadFailed { path, source }
    }

    pub fn file_not_found(path: Utf8PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_archive(path: Utf8PathBuf, source: zip::result::ZipError) -> Self {
        Self::InvalidArchive { path, source }
    }
}

impl From<BuildFailure> for CliError {
    fn from(source: BuildFailure) -> Self {
        Self::BuildFailed { source }
    }
}
