//! The catalog of every module found under a library root.
//!
//! # Overview
//!
//! - [`Catalog`] - Modules sorted by full identity, unique by identity
//! - [`CatalogBuilder`] - Walks a directory and fills a catalog
//! - [`SkippedFile`] - A candidate file that did not make it in
//!
//! # Example
//!
//! ```
//! use libcheck::catalog::Catalog;
//! use libcheck::module::{ArchitectureDescriptor, ModuleIdentity, ModuleRecord, ModuleVersion};
//!
//! let record = |name: &str| {
//!     ModuleRecord::new(
//!         ModuleIdentity::new(name, ModuleVersion::new(1, 0, 0, 0)),
//!         vec![],
//!         ArchitectureDescriptor::portable(),
//!         format!("{}.dll", name),
//!     )
//! };
//!
//! let mut catalog = Catalog::new();
//! catalog.insert(record("Lib.B")).unwrap();
//! catalog.insert(record("Lib.A")).unwrap();
//! assert!(catalog.insert(record("Lib.A")).is_err());
//!
//! let names: Vec<_> = catalog.iter().map(|r| r.name()).collect();
//! assert_eq!(names, ["Lib.A", "Lib.B"]);
//! ```

pub mod builder;

use std::collections::btree_map::{self, BTreeMap, Entry};
use std::path::PathBuf;

use thiserror::Error;

use crate::module::{ModuleIdentity, ModuleRecord};

pub use builder::{CatalogBuilder, ScanResult, SkippedFile};

/// A record was rejected because its identity is already cataloged.
#[derive(Debug, Error)]
#[error("duplicate of {existing}")]
pub struct DuplicateModule {
    /// Path of the record already in the catalog.
    pub existing: PathBuf,
    /// The rejected record.
    pub rejected: Box<ModuleRecord>,
}

/// Modules sorted by full identity string (ordinal, ascending).
///
/// Records are keyed by their full name, computed once on insert.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: BTreeMap<String, ModuleRecord>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record at its sorted position.
    ///
    /// Fails if a record with the same name and version is present.
    pub fn insert(&mut self, record: ModuleRecord) -> Result<(), DuplicateModule> {
        match self.records.entry(record.identity().full_name()) {
            Entry::Occupied(existing) => Err(DuplicateModule {
                existing: existing.get().path().to_path_buf(),
                rejected: Box::new(record),
            }),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// Records in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record with exactly this identity exists.
    pub fn contains(&self, identity: &ModuleIdentity) -> bool {
        self.records
            .get(&identity.full_name())
            .is_some_and(|r| r.identity() == identity)
    }

    /// The first record in catalog order carrying `name`, any version.
    ///
    /// Every key for `name` starts with `"<name>, Version="`, so the
    /// candidates form one contiguous run of the ordered keys.
    pub fn first_named(&self, name: &str) -> Option<&ModuleRecord> {
        let prefix = format!("{}, Version=", name);
        self.records
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(_, record)| record)
            .find(|record| record.name() == name)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ModuleRecord;
    type IntoIter = btree_map::Values<'a, String, ModuleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
