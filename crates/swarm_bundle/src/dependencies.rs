//! Dependency reconciliation.
//!
//! A build sees dependencies from three places:
//!
//! - **presolved**: the host's own resolution result, i.e. what will actually be
//!   on the runtime classpath;
//! - **explicit**: dependencies declared directly by the project;
//! - **fraction**: artifacts implied by requested or detected fractions.
//!
//! [`DependencySet`] collects all three and merges them into one list with a
//! single entry per [`ArtifactKey`].
//!
//! # Merge policy
//!
//! 1. Presolved entries always win an identity conflict.
//! 2. Explicit and fraction entries fill the remaining gaps. Which of the two
//!    wins when both name the same key is [`FractionConflictPolicy`]
//!    (explicit by default).
//! 3. Within one bucket the last insertion wins.
//! 4. The merged order is the order in which each key first appears when
//!    scanning presolved, then explicit, then fraction entries. Identical
//!    inputs always produce the identical order.
//!
//! `provided` and `test` scoped entries are rejected on insertion.

use std::collections::HashMap;

use swarm_artifact::{ArtifactKey, ArtifactSpec};

use crate::config::{FractionConflictPolicy, FractionDetectionMode};
use crate::error::{Error, Result};

/// Where a dependency came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencySource {
    Presolved,
    Explicit,
    Fraction,
}

impl std::fmt::Display for DependencySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DependencySource::Presolved => "presolved",
            DependencySource::Explicit => "explicit",
            DependencySource::Fraction => "fraction",
        })
    }
}

#[derive(Debug, Clone)]
struct FractionEntry {
    spec: ArtifactSpec,
    detected: bool,
}

/// Reconciles presolved, explicit and fraction-derived dependencies.
#[derive(Debug, Clone)]
pub struct DependencySet {
    mode: FractionDetectionMode,
    policy: FractionConflictPolicy,
    presolved: Vec<ArtifactSpec>,
    explicit: Vec<ArtifactSpec>,
    fractions: Vec<FractionEntry>,
    unresolved_fractions: Vec<String>,
}

impl DependencySet {
    pub fn new(mode: FractionDetectionMode, policy: FractionConflictPolicy) -> Self {
        Self {
            mode,
            policy,
            presolved: Vec::new(),
            explicit: Vec::new(),
            fractions: Vec::new(),
            unresolved_fractions: Vec::new(),
        }
    }

    /// Add a dependency to one of the buckets.
    ///
    /// Returns `false` if the entry was rejected because its scope must never be
    /// embedded.
    pub fn add(&mut self, source: DependencySource, spec: ArtifactSpec) -> bool {
        if !spec.scope.is_embeddable() {
            tracing::debug!(
                "Skipping {} dependency {} with scope {}",
                source,
                spec,
                spec.scope
            );
            return false;
        }

        match source {
            DependencySource::Presolved => self.presolved.push(spec),
            DependencySource::Explicit => self.explicit.push(spec),
            DependencySource::Fraction => self.fractions.push(FractionEntry {
                spec,
                detected: false,
            }),
        }
        true
    }

    /// Add an artifact implied by fraction detection rather than requested by the user.
    ///
    /// Such entries are dropped from the merged view when detection is disabled.
    pub fn add_detected(&mut self, spec: ArtifactSpec) -> bool {
        if !self.mode.allows_detection() {
            tracing::debug!("Ignoring detected fraction {} (detection disabled)", spec);
            return false;
        }
        self.fractions.push(FractionEntry {
            spec,
            detected: true,
        });
        true
    }

    /// Record a requested fraction that could not be resolved.
    pub fn add_unresolved_fraction(&mut self, name: impl Into<String>) {
        self.unresolved_fractions.push(name.into());
    }

    /// Entries of one bucket, in insertion order.
    pub fn bucket(&self, source: DependencySource) -> Vec<&ArtifactSpec> {
        match source {
            DependencySource::Presolved => self.presolved.iter().collect(),
            DependencySource::Explicit => self.explicit.iter().collect(),
            DependencySource::Fraction => self.fractions.iter().map(|f| &f.spec).collect(),
        }
    }

    pub fn unresolved_fractions(&self) -> &[String] {
        &self.unresolved_fractions
    }

    fn rank(&self, source: DependencySource) -> u8 {
        match (source, self.policy) {
            (DependencySource::Presolved, _) => 3,
            (DependencySource::Explicit, FractionConflictPolicy::PreferExplicit) => 2,
            (DependencySource::Explicit, FractionConflictPolicy::PreferFraction) => 1,
            (DependencySource::Fraction, FractionConflictPolicy::PreferExplicit) => 1,
            (DependencySource::Fraction, FractionConflictPolicy::PreferFraction) => 2,
        }
    }

    /// Merge all buckets into one deduplicated, ordered list.
    ///
    /// Fails with [`Error::Conflict`] if detection mode is strict and a requested
    /// fraction could not be resolved.
    pub fn resolve(&self) -> Result<Vec<ArtifactSpec>> {
        if !self.unresolved_fractions.is_empty() {
            if self.mode.is_strict() {
                return Err(Error::Conflict {
                    unresolved: self.unresolved_fractions.clone(),
                });
            }
            tracing::warn!(
                "Skipping unresolvable fractions: {}",
                self.unresolved_fractions.join(", ")
            );
        }

        let fractions = self
            .fractions
            .iter()
            .filter(|f| !f.detected || self.mode.allows_detection())
            .map(|f| (DependencySource::Fraction, &f.spec));
        let candidates = self
            .presolved
            .iter()
            .map(|s| (DependencySource::Presolved, s))
            .chain(self.explicit.iter().map(|s| (DependencySource::Explicit, s)))
            .chain(fractions);

        let mut merged: Vec<(u8, &ArtifactSpec)> = Vec::new();
        let mut index: HashMap<ArtifactKey, usize> = HashMap::new();

        for (source, spec) in candidates {
            let rank = self.rank(source);
            match index.get(&spec.key()) {
                None => {
                    index.insert(spec.key(), merged.len());
                    merged.push((rank, spec));
                }
                Some(&slot) => {
                    let (current_rank, current) = merged[slot];
                    if rank >= current_rank {
                        if current.version != spec.version {
                            tracing::debug!(
                                "{} replaces {} ({} wins)",
                                spec,
                                current,
                                source
                            );
                        }
                        merged[slot] = (rank, spec);
                    } else if current.version != spec.version {
                        tracing::debug!("{} ignored in favour of {}", spec, current);
                    }
                }
            }
        }

        Ok(merged.into_iter().map(|(_, spec)| spec.clone()).collect())
    }
}

impl Default for DependencySet {
    fn default() -> Self {
        Self::new(FractionDetectionMode::default(), FractionConflictPolicy::default())
    }
}
