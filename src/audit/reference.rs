//! Reference consistency: does every referenced module exist at the
//! referenced version?

use std::cmp::Ordering;

use super::finding::{Finding, VersionDirection};
use crate::catalog::Catalog;
use crate::filter::SystemPrefixSet;
use crate::module::{ModuleRecord, ModuleReference, ModuleVersion};

/// How one reference resolves against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceStatus {
    /// A platform module; not checked.
    Exempt,
    /// A module with exactly this name and version is cataloged.
    Satisfied,
    /// No module with this name is cataloged.
    Missing,
    /// The nearest module with this name has another version.
    Mismatch {
        available: ModuleVersion,
        direction: VersionDirection,
        difference: String,
    },
}

/// Checks references of inspected modules against the whole catalog.
///
/// When several versions of a referenced name are cataloged and none match
/// exactly, the one compared against is the first in catalog order.
pub struct ReferenceChecker<'a> {
    catalog: &'a Catalog,
    prefixes: &'a SystemPrefixSet,
}

impl<'a> ReferenceChecker<'a> {
    pub fn new(catalog: &'a Catalog, prefixes: &'a SystemPrefixSet) -> Self {
        Self { catalog, prefixes }
    }

    /// Resolve a single reference.
    pub fn classify(&self, reference: &ModuleReference) -> ReferenceStatus {
        if self.prefixes.is_system(&reference.name) {
            return ReferenceStatus::Exempt;
        }
        if self.catalog.contains(reference) {
            return ReferenceStatus::Satisfied;
        }

        let Some(nearest) = self.catalog.first_named(&reference.name) else {
            return ReferenceStatus::Missing;
        };

        let available = nearest.version();
        let direction = match available.cmp(&reference.version) {
            Ordering::Less => VersionDirection::Newer,
            _ => VersionDirection::Older,
        };
        ReferenceStatus::Mismatch {
            available,
            direction,
            difference: reference.version.significant_difference(&available),
        }
    }

    /// Findings for every unresolved reference of `module`, in reference order.
    pub fn check(&self, module: &ModuleRecord) -> Vec<Finding> {
        module
            .references()
            .iter()
            .filter_map(|reference| match self.classify(reference) {
                ReferenceStatus::Exempt | ReferenceStatus::Satisfied => None,
                ReferenceStatus::Missing => Some(Finding::Missing {
                    module: module.identity().clone(),
                    reference: reference.clone(),
                }),
                ReferenceStatus::Mismatch {
                    available,
                    direction,
                    difference,
                } => Some(Finding::VersionMismatch {
                    module: module.identity().clone(),
                    reference: reference.clone(),
                    available,
                    direction,
                    difference,
                }),
            })
            .collect()
    }
}
