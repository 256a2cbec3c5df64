mod inspect;
mod package;

pub use inspect::{inspect_archive, InspectArgs};
pub use package::{package_project, DetectionArg, PackageArgs};
