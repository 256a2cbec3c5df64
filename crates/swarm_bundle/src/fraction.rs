//! Fraction resolution and detection.
//!
//! [`FractionResolver`] expands a requested fraction (a catalog name, a
//! `name:version` pair, or a full coordinate) into the artifacts it brings in.
//! [`FractionDetector`] infers fractions from the Java packages the
//! application's classes reference.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};

use camino::Utf8Path;
use swarm_artifact::{is_full_coordinate, ArtifactSpec, FractionCatalog, FractionDescriptor};
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Maps fraction names or coordinates to artifact specs via a catalog.
pub struct FractionResolver<'a> {
    catalog: &'a dyn FractionCatalog,
}

impl<'a> FractionResolver<'a> {
    pub fn new(catalog: &'a dyn FractionCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve one requested fraction.
    ///
    /// A full `groupId:artifactId:version` coordinate is taken as-is without a
    /// catalog lookup. A bare name or `name:version` pair is looked up by
    /// artifact id; an explicit version overrides the catalog's. Catalog
    /// fractions expand depth-first through their `dependencies`, each
    /// fraction appearing once, the requested one first.
    pub fn resolve(&self, name_or_gav: &str) -> Result<Vec<ArtifactSpec>> {
        let input = name_or_gav.trim();
        if input.is_empty() {
            return Err(Error::UnknownFraction(name_or_gav.to_string()));
        }

        if is_full_coordinate(input) {
            let spec: ArtifactSpec = input.parse()?;
            tracing::debug!("Fraction '{}' is a full coordinate", input);
            return Ok(vec![spec]);
        }

        let (name, version) = match input.split_once(':') {
            Some((name, version)) => (name, Some(version)),
            None => (input, None),
        };

        let descriptor = self
            .catalog
            .lookup(name)
            .ok_or_else(|| Error::UnknownFraction(input.to_string()))?;
        let descriptor = match version {
            Some(version) => descriptor.at_version(version),
            None => descriptor.clone(),
        };

        let mut seen = HashSet::new();
        let mut specs = Vec::new();
        self.expand(&descriptor, &mut seen, &mut specs)?;

        tracing::debug!(
            "Fraction '{}' expanded to [{}]",
            input,
            specs
                .iter()
                .map(|s| s.gav())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(specs)
    }

    /// Resolve a fraction that is already known to be in the catalog.
    pub fn resolve_descriptor(&self, descriptor: &FractionDescriptor) -> Result<Vec<ArtifactSpec>> {
        let mut seen = HashSet::new();
        let mut specs = Vec::new();
        self.expand(descriptor, &mut seen, &mut specs)?;
        Ok(specs)
    }

    fn expand(
        &self,
        descriptor: &FractionDescriptor,
        seen: &mut HashSet<String>,
        out: &mut Vec<ArtifactSpec>,
    ) -> Result<()> {
        if !seen.insert(descriptor.artifact_id.clone()) {
            return Ok(());
        }
        out.push(descriptor.to_artifact_spec());

        for dependency in &descriptor.dependencies {
            let nested = self.catalog.lookup(dependency).ok_or_else(|| {
                Error::UnknownFraction(format!(
                    "{} (required by {})",
                    dependency, descriptor.artifact_id
                ))
            })?;
            self.expand(nested, seen, out)?;
        }
        Ok(())
    }
}

/// Infers fractions from the packages referenced by application classes.
///
/// Class files store referenced type names in internal form
/// (`javax/ws/rs/Path`), so each catalog package `javax.ws.rs` is searched as
/// the byte string `javax/ws/rs/` inside every `.class` entry.
pub struct FractionDetector<'a> {
    catalog: &'a dyn FractionCatalog,
}

impl<'a> FractionDetector<'a> {
    pub fn new(catalog: &'a dyn FractionCatalog) -> Self {
        Self { catalog }
    }

    /// Scan the application archive and return matching fractions in catalog order.
    pub fn detect(&self, archive: &Utf8Path) -> Result<Vec<&'a FractionDescriptor>> {
        let candidates: Vec<(&'a FractionDescriptor, Vec<Vec<u8>>)> = self
            .catalog
            .descriptors()
            .into_iter()
            .filter(|d| !d.packages.is_empty())
            .map(|d| {
                let markers = d
                    .packages
                    .iter()
                    .map(|p| format!("{}/", p.replace('.', "/")).into_bytes())
                    .collect();
                (d, markers)
            })
            .collect();

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut found = vec![false; candidates.len()];
        let mut zip = ZipArchive::new(BufReader::new(File::open(archive.as_std_path())?))?;
        let mut buffer = Vec::new();

        for i in 0..zip.len() {
            if found.iter().all(|f| *f) {
                break;
            }

            let mut entry = zip.by_index(i)?;
            if entry.is_dir() || !entry.name().ends_with(".class") {
                continue;
            }

            buffer.clear();
            entry.read_to_end(&mut buffer)?;

            for (idx, (_, markers)) in candidates.iter().enumerate() {
                if !found[idx] && markers.iter().any(|m| contains(&buffer, m)) {
                    found[idx] = true;
                }
            }
        }

        let detected: Vec<_> = candidates
            .into_iter()
            .zip(found)
            .filter_map(|((descriptor, _), hit)| hit.then_some(descriptor))
            .collect();

        tracing::info!(
            "Detected {} fraction(s) in {}: [{}]",
            detected.len(),
            archive,
            detected
                .iter()
                .map(|d| d.artifact_id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(detected)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
