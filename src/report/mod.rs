//! Audit report output.
//!
//! This module renders an [`AuditReport`] either as the classic
//! line-oriented terminal listing or as JSON for tooling integration.

pub mod human;
pub mod json;
pub mod theme;

use std::io::Write;

use crate::audit::AuditReport;

/// Output format for audit results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Trait for rendering audit reports.
pub trait Reporter {
    /// Write the report. Missing and mismatched references and the error
    /// count go to `errors`; everything else goes to `out`.
    fn report<W: Write, E: Write>(
        &self,
        report: &AuditReport,
        out: &mut W,
        errors: &mut E,
    ) -> std::io::Result<()>;
}

pub use human::HumanReporter;
pub use json::JsonReporter;
pub use theme::{should_use_colors, ReportTheme};
