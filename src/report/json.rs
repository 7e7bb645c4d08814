//! JSON report.
//!
//! Formats an audit report as machine-readable JSON.

use std::io::Write;

use serde::Serialize;

use super::Reporter;
use crate::audit::{AuditReport, Finding};

/// Formats audit reports as JSON.
pub struct JsonReporter;

#[derive(Serialize)]
struct JsonOutput {
    skipped: Vec<JsonSkipped>,
    modules: Vec<JsonModule>,
    inconsistencies: Vec<JsonMachineGroup>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSkipped {
    path: String,
    reason: String,
}

#[derive(Serialize)]
struct JsonModule {
    name: String,
    version: String,
    path: String,
    findings: Vec<JsonFinding>,
}

#[derive(Serialize)]
struct JsonFinding {
    code: &'static str,
    severity: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    difference: Option<String>,
}

#[derive(Serialize)]
struct JsonMachineGroup {
    machine: String,
    modules: Vec<JsonMember>,
}

#[derive(Serialize)]
struct JsonMember {
    name: String,
    file: String,
    portability: String,
}

#[derive(Serialize)]
struct JsonSummary {
    errors: usize,
    warnings: usize,
    skipped: usize,
}

impl JsonReporter {
    /// Create a new JSON reporter.
    pub fn new() -> Self {
        Self
    }

    fn finding(finding: &Finding) -> JsonFinding {
        let (message, available, difference) = match finding {
            Finding::Missing { reference, .. } => (
                format!("missing {} {}", reference.name, reference.version),
                None,
                None,
            ),
            Finding::VersionMismatch {
                reference,
                available,
                direction,
                difference,
                ..
            } => (
                format!(
                    "{} {} is present, need {} version {}",
                    reference.name, available, direction, difference
                ),
                Some(available.to_string()),
                Some(difference.clone()),
            ),
            Finding::ArchitectureSpecific {
                file, architecture, ..
            } => (
                format!(
                    "{} targets {} {}",
                    file, architecture.portability, architecture.machine
                ),
                None,
                None,
            ),
            Finding::ArchitectureInconsistent { machine, modules } => (
                format!("{} module(s) target {}", modules.len(), machine),
                None,
                None,
            ),
        };

        JsonFinding {
            code: finding.code(),
            severity: finding.severity().to_string(),
            message,
            reference: finding.reference().map(|r| r.full_name()),
            available,
            difference,
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    /// The whole document goes to `writer`; tooling reads a single stream.
    fn report<W: Write, E: Write>(
        &self,
        report: &AuditReport,
        writer: &mut W,
        _errors: &mut E,
    ) -> std::io::Result<()> {
        let output = JsonOutput {
            skipped: report
                .skipped
                .iter()
                .map(|s| JsonSkipped {
                    path: s.path.display().to_string(),
                    reason: s.reason.clone(),
                })
                .collect(),
            modules: report
                .modules
                .iter()
                .map(|m| JsonModule {
                    name: m.module.name.clone(),
                    version: m.module.version.to_string(),
                    path: m.path.display().to_string(),
                    findings: m.findings.iter().map(Self::finding).collect(),
                })
                .collect(),
            inconsistencies: report
                .inconsistencies
                .iter()
                .filter_map(|f| match f {
                    Finding::ArchitectureInconsistent { machine, modules } => {
                        Some(JsonMachineGroup {
                            machine: machine.to_string(),
                            modules: modules
                                .iter()
                                .map(|member| JsonMember {
                                    name: member.module.name.clone(),
                                    file: member.file.clone(),
                                    portability: member.portability.to_string(),
                                })
                                .collect(),
                        })
                    }
                    _ => None,
                })
                .collect(),
            summary: JsonSummary {
                errors: report.error_count(),
                warnings: report.warning_count(),
                skipped: report.skipped.len(),
            },
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        Ok(())
    }
}
