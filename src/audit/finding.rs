//! Audit findings.
//!
//! A [`Finding`] is one classified observation about a module or a
//! reference. Its [`Severity`] decides whether it counts toward the run's
//! error total.

use std::fmt;

use crate::module::{
    ArchitectureDescriptor, MachineKind, ModuleIdentity, ModuleReference, ModuleVersion,
    PortabilityKind,
};

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Advisory; does not fail the run.
    Warning,
    /// Counted toward the error total.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Which way a referenced version is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionDirection {
    /// The reference needs a newer version than the one present.
    Newer,
    /// The reference needs an older version than the one present.
    Older,
}

impl fmt::Display for VersionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionDirection::Newer => write!(f, "NEWER"),
            VersionDirection::Older => write!(f, "OLDER"),
        }
    }
}

/// A module carrying a given machine kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchitectureMember {
    pub module: ModuleIdentity,
    pub file: String,
    pub portability: PortabilityKind,
}

/// A classified observation produced by a checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// No module with the referenced name exists.
    Missing {
        module: ModuleIdentity,
        reference: ModuleReference,
    },

    /// A module with the referenced name exists, but not at that version.
    VersionMismatch {
        module: ModuleIdentity,
        reference: ModuleReference,
        available: ModuleVersion,
        direction: VersionDirection,
        difference: String,
    },

    /// The module targets a specific processor.
    ArchitectureSpecific {
        module: ModuleIdentity,
        file: String,
        architecture: ArchitectureDescriptor,
    },

    /// Inspected modules disagree on machine kind; one finding per kind.
    ArchitectureInconsistent {
        machine: MachineKind,
        modules: Vec<ArchitectureMember>,
    },
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self {
            Finding::Missing { .. } | Finding::VersionMismatch { .. } => Severity::Error,
            Finding::ArchitectureSpecific { .. } | Finding::ArchitectureInconsistent { .. } => {
                Severity::Warning
            }
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// Stable identifier of the finding kind.
    pub fn code(&self) -> &'static str {
        match self {
            Finding::Missing { .. } => "missing",
            Finding::VersionMismatch { .. } => "version-mismatch",
            Finding::ArchitectureSpecific { .. } => "architecture-specific",
            Finding::ArchitectureInconsistent { .. } => "architecture-inconsistent",
        }
    }

    /// The offending reference, for reference findings.
    pub fn reference(&self) -> Option<&ModuleReference> {
        match self {
            Finding::Missing { reference, .. } | Finding::VersionMismatch { reference, .. } => {
                Some(reference)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str, version: &str) -> ModuleIdentity {
        ModuleIdentity::new(name, version.parse().unwrap())
    }

    #[test]
    fn reference_findings_are_errors() {
        let missing = Finding::Missing {
            module: id("Lib.B", "2.0"),
            reference: id("Lib.A", "1.0"),
        };
        assert_eq!(missing.severity(), Severity::Error);
        assert!(missing.is_error());
        assert_eq!(missing.reference().unwrap().name, "Lib.A");
    }

    #[test]
    fn architecture_findings_are_warnings() {
        let specific = Finding::ArchitectureSpecific {
            module: id("Lib.X", "1.0"),
            file: "Lib.X.dll".into(),
            architecture: ArchitectureDescriptor::portable(),
        };
        let inconsistent = Finding::ArchitectureInconsistent {
            machine: MachineKind::Amd64,
            modules: vec![],
        };
        assert_eq!(specific.severity(), Severity::Warning);
        assert!(!inconsistent.is_error());
        assert!(specific.reference().is_none());
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn direction_display() {
        assert_eq!(VersionDirection::Newer.to_string(), "NEWER");
        assert_eq!(VersionDirection::Older.to_string(), "OLDER");
    }
}
