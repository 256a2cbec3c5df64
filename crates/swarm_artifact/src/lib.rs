//! Artifact coordinates and fraction catalog types shared by the swarm
//! packaging crates.
//!
//! - [`ArtifactSpec`] describes one dependency: Maven coordinates, scope and
//!   (once resolved) its file on disk.
//! - [`FractionDescriptor`] describes a fraction, a named and versioned bundle
//!   of dependencies providing one runtime capability.
//! - [`FractionCatalog`] is the lookup interface the packaging engine uses to
//!   turn fraction names into coordinates. [`FractionList`] is the in-memory
//!   implementation loaded from JSON or TOML.

mod artifact;
mod error;
mod fraction;

pub use artifact::{is_full_coordinate, ArtifactKey, ArtifactSpec, Scope, DEFAULT_ARTIFACT_TYPE};
pub use error::{CatalogError, CoordinateError};
pub use fraction::{FractionCatalog, FractionDescriptor, FractionList, DEFAULT_FRACTION_GROUP};
