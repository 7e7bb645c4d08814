//! Cross-module integrity checks.
//!
//! # Overview
//!
//! The audit consists of:
//!
//! - **Reference check** - every non-system reference of an inspected
//!   module must exist in the catalog at the referenced version
//!   ([`ReferenceChecker`])
//! - **Architecture check** - inspected modules should be architecture
//!   neutral and agree on machine kind ([`ArchitectureChecker`])
//! - **Findings** - classified results with a severity ([`Finding`])
//!
//! # Example
//!
//! ```
//! use libcheck::audit::Auditor;
//! use libcheck::catalog::Catalog;
//! use libcheck::filter::{PatternFilter, SystemPrefixSet};
//! use libcheck::module::{ArchitectureDescriptor, ModuleIdentity, ModuleRecord, ModuleVersion};
//!
//! let lib_a = ModuleRecord::new(
//!     ModuleIdentity::new("Lib.A", ModuleVersion::new(1, 0, 0, 0)),
//!     vec![],
//!     ArchitectureDescriptor::portable(),
//!     "Lib.A.dll",
//! );
//! let lib_b = ModuleRecord::new(
//!     ModuleIdentity::new("Lib.B", ModuleVersion::new(2, 0, 0, 0)),
//!     vec![ModuleIdentity::new("Lib.A", ModuleVersion::new(1, 1, 0, 0))],
//!     ArchitectureDescriptor::portable(),
//!     "Lib.B.dll",
//! );
//!
//! let mut catalog = Catalog::new();
//! catalog.insert(lib_a).unwrap();
//! catalog.insert(lib_b).unwrap();
//!
//! let prefixes = SystemPrefixSet::builtin();
//! let filter = PatternFilter::new(["Lib.B"]).unwrap();
//! let report = Auditor::new(&catalog, &prefixes).run(&filter);
//!
//! assert_eq!(report.error_count(), 1);
//! ```

pub mod architecture;
pub mod finding;
pub mod reference;

use std::path::PathBuf;

use tracing::debug;

pub use architecture::ArchitectureChecker;
pub use finding::{ArchitectureMember, Finding, Severity, VersionDirection};
pub use reference::{ReferenceChecker, ReferenceStatus};

use crate::catalog::{Catalog, SkippedFile};
use crate::filter::{PatternFilter, SystemPrefixSet};
use crate::module::{ModuleIdentity, ModuleRecord};

/// Findings for one inspected module.
#[derive(Debug, Clone)]
pub struct ModuleAudit {
    pub module: ModuleIdentity,
    /// File name of the module image.
    pub file: String,
    pub path: PathBuf,
    /// Reference findings in reference order, then any architecture finding.
    pub findings: Vec<Finding>,
}

/// The result of one audit run.
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    /// Files that could not be cataloged.
    pub skipped: Vec<SkippedFile>,
    /// Inspected modules in catalog order.
    pub modules: Vec<ModuleAudit>,
    /// Machine-kind groups, present only when kinds disagree.
    pub inconsistencies: Vec<Finding>,
}

impl AuditReport {
    fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.modules
            .iter()
            .flat_map(|m| m.findings.iter())
            .chain(self.inconsistencies.iter())
    }

    /// Number of missing and mismatched references.
    pub fn error_count(&self) -> usize {
        self.findings().filter(|f| f.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings()
            .filter(|f| f.severity() == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Attach the catalog's skipped files.
    pub fn with_skipped(mut self, skipped: Vec<SkippedFile>) -> Self {
        self.skipped = skipped;
        self
    }
}

/// Runs both checks over the modules selected from a catalog.
pub struct Auditor<'a> {
    catalog: &'a Catalog,
    prefixes: &'a SystemPrefixSet,
}

impl<'a> Auditor<'a> {
    pub fn new(catalog: &'a Catalog, prefixes: &'a SystemPrefixSet) -> Self {
        Self { catalog, prefixes }
    }

    /// Audit the catalog modules whose names match `filter`.
    pub fn run(&self, filter: &PatternFilter) -> AuditReport {
        let inspected = filter.select(self.catalog);
        debug!(
            "Inspecting {} of {} cataloged modules",
            inspected.len(),
            self.catalog.len()
        );
        self.audit(&inspected)
    }

    /// Audit an explicit list of modules.
    pub fn audit(&self, inspected: &[&ModuleRecord]) -> AuditReport {
        let references = ReferenceChecker::new(self.catalog, self.prefixes);
        let mut architecture = ArchitectureChecker::new();

        let modules = inspected
            .iter()
            .map(|module| {
                let mut findings = references.check(module);
                findings.extend(architecture.observe(module));
                ModuleAudit {
                    module: module.identity().clone(),
                    file: module.file_name(),
                    path: module.path().to_path_buf(),
                    findings,
                }
            })
            .collect();

        AuditReport {
            skipped: Vec::new(),
            modules,
            inconsistencies: architecture.finish(),
        }
    }
}
