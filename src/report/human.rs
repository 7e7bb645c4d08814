//! Human-readable report.
//!
//! Formats an audit report for terminal display with optional color support.

use std::io::Write;

use super::theme::ReportTheme;
use super::Reporter;
use crate::audit::{AuditReport, Finding, Severity};

/// Formats audit reports for human consumption.
pub struct HumanReporter {
    theme: ReportTheme,
    /// Whether to list files that could not be cataloged.
    pub show_skipped: bool,
}

impl HumanReporter {
    /// Create a new human reporter.
    pub fn new(use_color: bool) -> Self {
        Self {
            theme: if use_color {
                ReportTheme::new()
            } else {
                ReportTheme::plain()
            },
            show_skipped: true,
        }
    }

    /// Hide skipped-file lines.
    pub fn quiet(mut self) -> Self {
        self.show_skipped = false;
        self
    }

    /// The indented line for a per-module finding.
    fn finding_line(&self, finding: &Finding) -> String {
        match finding {
            Finding::Missing { reference, .. } => self.theme.format_error(&format!(
                "   Missing: {} {}",
                reference.name, reference.version
            )),
            Finding::VersionMismatch {
                reference,
                available,
                direction,
                difference,
                ..
            } => self.theme.format_error(&format!(
                "   Wrong version: {} {} (I need {} version {})",
                reference.name, available, direction, difference
            )),
            Finding::ArchitectureSpecific {
                file, architecture, ..
            } => self.theme.format_warning(&format!(
                "   Warning: specific portable executable kind {} {} {}",
                file, architecture.portability, architecture.machine
            )),
            Finding::ArchitectureInconsistent { machine, .. } => {
                self.theme.format_warning(&format!("   Warning: machine {}", machine))
            }
        }
    }
}

impl Reporter for HumanReporter {
    fn report<W: Write, E: Write>(
        &self,
        report: &AuditReport,
        out: &mut W,
        errors: &mut E,
    ) -> std::io::Result<()> {
        if self.show_skipped {
            for skipped in &report.skipped {
                writeln!(
                    out,
                    "{}",
                    self.theme.format_dim(&format!(
                        "Ignored: {} : {}",
                        skipped.path.display(),
                        skipped.reason
                    ))
                )?;
            }
        }

        for module in &report.modules {
            writeln!(
                out,
                "{}",
                self.theme
                    .format_module(&format!("{} {}", module.file, module.module.version))
            )?;
            out.flush()?;
            for finding in &module.findings {
                if finding.severity() == Severity::Error {
                    writeln!(errors, "{}", self.finding_line(finding))?;
                    errors.flush()?;
                } else {
                    writeln!(out, "{}", self.finding_line(finding))?;
                }
            }
        }

        if !report.inconsistencies.is_empty() {
            writeln!(
                out,
                "{}",
                self.theme
                    .format_warning("Warning: different machine types detected:")
            )?;
            for finding in &report.inconsistencies {
                if let Finding::ArchitectureInconsistent { machine, modules } = finding {
                    writeln!(out, "{}", self.theme.format_module(&machine.to_string()))?;
                    for member in modules {
                        writeln!(
                            out,
                            "{}",
                            self.theme.format_module(&format!(
                                "   {} {} {}",
                                member.file, member.portability, machine
                            ))
                        )?;
                    }
                }
            }
        }
        out.flush()?;

        let count = report.error_count();
        if count > 0 {
            writeln!(
                errors,
                "{}",
                self.theme.format_error(&format!("{} errors found", count))
            )?;
        }

        Ok(())
    }
}
