//! Libcheck - Reference and architecture audit for managed module directories.
//!
//! Libcheck catalogs every managed module found under a directory, then
//! checks the modules selected by name patterns: every reference they
//! declare must resolve to a cataloged module at exactly the referenced
//! version, and their target architectures should agree.
//!
//! # Modules
//!
//! - [`audit`] - Reference and architecture checks
//! - [`catalog`] - Directory scanning and the sorted module catalog
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Optional YAML configuration
//! - [`error`] - Error types and result aliases
//! - [`filter`] - Name patterns and system prefixes
//! - [`metadata`] - PE and CLI metadata reader
//! - [`module`] - Module identity, version and architecture types
//! - [`report`] - Human and JSON report output
//!
//! # Example
//!
//! ```
//! use libcheck::audit::Auditor;
//! use libcheck::catalog::CatalogBuilder;
//! use libcheck::filter::{PatternFilter, SystemPrefixSet};
//! use libcheck::metadata::ImageBuilder;
//! use libcheck::module::ModuleVersion;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! ImageBuilder::new("Lib.A", ModuleVersion::new(1, 0, 0, 0))
//!     .write_to(temp.path().join("Lib.A.dll"))
//!     .unwrap();
//! ImageBuilder::new("Lib.B", ModuleVersion::new(2, 0, 0, 0))
//!     .reference("Lib.A", ModuleVersion::new(1, 1, 0, 0))
//!     .write_to(temp.path().join("Lib.B.dll"))
//!     .unwrap();
//!
//! let scan = CatalogBuilder::new().scan(temp.path()).unwrap();
//! let prefixes = SystemPrefixSet::builtin();
//! let filter = PatternFilter::new(["Lib.B"]).unwrap();
//! let report = Auditor::new(&scan.catalog, &prefixes).run(&filter);
//!
//! assert_eq!(report.error_count(), 1);
//! ```

pub mod audit;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod metadata;
pub mod module;
pub mod report;

pub use error::{LibcheckError, Result};
