//! Module records: what libcheck knows about one compiled module.
//!
//! A [`ModuleRecord`] is produced by the metadata reader and owned by the
//! [`Catalog`](crate::catalog::Catalog). Records are never mutated after
//! extraction.

pub mod architecture;
pub mod version;

use std::fmt;
use std::path::{Path, PathBuf};

pub use architecture::{cli_flags, ArchitectureDescriptor, MachineKind, PortabilityKind};
pub use version::ModuleVersion;

/// Name and version of a module.
///
/// Two identities are equal only when both name and version match exactly
/// (name comparison is case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
    pub name: String,
    pub version: ModuleVersion,
}

impl ModuleIdentity {
    /// Create an identity.
    pub fn new(name: impl Into<String>, version: ModuleVersion) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// The full identity string used for catalog ordering.
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Version={}", self.name, self.version)
    }
}

/// A declared dependency of one module on another.
pub type ModuleReference = ModuleIdentity;

/// Everything read from one module file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    identity: ModuleIdentity,
    references: Vec<ModuleReference>,
    architecture: ArchitectureDescriptor,
    path: PathBuf,
}

impl ModuleRecord {
    /// Create a record.
    pub fn new(
        identity: ModuleIdentity,
        references: Vec<ModuleReference>,
        architecture: ArchitectureDescriptor,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            identity,
            references,
            architecture,
            path: path.into(),
        }
    }

    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn version(&self) -> ModuleVersion {
        self.identity.version
    }

    /// References in metadata order.
    pub fn references(&self) -> &[ModuleReference] {
        &self.references
    }

    pub fn architecture(&self) -> ArchitectureDescriptor {
        self.architecture
    }

    /// The file this record was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the module image, falling back to the module name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.identity.name.clone())
    }
}
