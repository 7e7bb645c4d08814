//! The audit command.
//!
//! Catalogs every module under the root, inspects those matching the
//! patterns and prints the report. The command fails with exit code 1 when
//! any missing or mismatched reference is found.

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::audit::Auditor;
use crate::catalog::CatalogBuilder;
use crate::cli::args::Cli;
use crate::config::load_config;
use crate::error::Result;
use crate::filter::PatternFilter;
use crate::report::{HumanReporter, JsonReporter, OutputFormat, Reporter};

use super::{Command, CommandResult};

/// The check command implementation.
#[derive(Debug, Clone)]
pub struct CheckCommand {
    root: PathBuf,
    patterns: Vec<String>,
    config: Option<PathBuf>,
    format: OutputFormat,
    quiet: bool,
    use_color: bool,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new<I, S>(root: impl Into<PathBuf>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: root.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            config: None,
            format: OutputFormat::Human,
            quiet: false,
            use_color: false,
        }
    }

    /// Build the command from parsed arguments.
    pub fn from_cli(cli: &Cli, use_color: bool) -> Self {
        Self {
            root: cli.root.clone(),
            patterns: cli.patterns.clone(),
            config: cli.config.clone(),
            format: cli.format,
            quiet: cli.quiet,
            use_color,
        }
    }

    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl Command for CheckCommand {
    fn execute(&self, mut out: &mut dyn Write, mut err: &mut dyn Write) -> Result<CommandResult> {
        let config = load_config(self.config.as_deref())?;
        let prefixes = config.system_prefix_set();
        debug!("Exempt reference prefixes: {:?}", prefixes.prefixes());
        let filter = PatternFilter::new(&self.patterns)?;

        let scan = CatalogBuilder::new()
            .extensions(config.extensions.iter().cloned())
            .scan(&self.root)?;

        let report = Auditor::new(&scan.catalog, &prefixes)
            .run(&filter)
            .with_skipped(scan.skipped);

        match self.format {
            OutputFormat::Json => JsonReporter::new().report(&report, &mut out, &mut err)?,
            OutputFormat::Human => {
                let reporter = HumanReporter::new(self.use_color);
                let reporter = if self.quiet { reporter.quiet() } else { reporter };
                reporter.report(&report, &mut out, &mut err)?;
            }
        }

        if report.has_errors() {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibcheckError;
    use crate::metadata::ImageBuilder;
    use crate::module::ModuleVersion;
    use std::fs;
    use tempfile::TempDir;

    /// Run the command, returning the result with its stdout and stderr text.
    fn run(command: &CheckCommand) -> (CommandResult, String, String) {
        let mut output = Vec::new();
        let mut errors = Vec::new();
        let result = command.execute(&mut output, &mut errors).unwrap();
        (
            result,
            String::from_utf8(output).unwrap(),
            String::from_utf8(errors).unwrap(),
        )
    }

    fn lib_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        ImageBuilder::new("Lib.A", ModuleVersion::new(1, 0, 0, 0))
            .write_to(&temp.path().join("Lib.A.dll"))
            .unwrap();
        ImageBuilder::new("Lib.B", ModuleVersion::new(2, 0, 0, 0))
            .reference("Lib.A", ModuleVersion::new(1, 1, 0, 0))
            .reference("System.Xml", ModuleVersion::new(4, 0, 0, 0))
            .write_to(&temp.path().join("Lib.B.dll"))
            .unwrap();
        temp
    }

    #[test]
    fn reports_version_mismatch() {
        let temp = lib_dir();
        let (result, output, errors) = run(&CheckCommand::new(temp.path(), ["Lib.B"]));

        assert_eq!(result.exit_code, 1);
        assert_eq!(output, "Lib.B.dll 2.0.0.0\n");
        assert!(errors.contains("Wrong version: Lib.A 1.0.0.0 (I need NEWER version x.1.0.0)"));
        assert!(errors.contains("1 errors found"));
    }

    #[test]
    fn clean_selection_succeeds() {
        let temp = lib_dir();
        let (result, output, errors) = run(&CheckCommand::new(temp.path(), ["Lib.A"]));

        assert!(result.success);
        assert_eq!(output, "Lib.A.dll 1.0.0.0\n");
        assert!(errors.is_empty());
    }

    #[test]
    fn config_prefixes_exempt_references() {
        let temp = lib_dir();
        let config = temp.path().join("libcheck.yml");
        fs::write(&config, "system_prefixes: [Lib.A]\n").unwrap();

        let command = CheckCommand::new(temp.path(), ["Lib.B"]).config(&config);
        let (result, _, _) = run(&command);
        assert!(result.success);
    }

    #[test]
    fn quiet_hides_skipped_files() {
        let temp = lib_dir();
        fs::write(temp.path().join("junk.dll"), b"not an image").unwrap();

        let (_, loud, _) = run(&CheckCommand::new(temp.path(), ["Lib.A"]));
        assert!(loud.contains("Ignored:"));

        let (_, quiet, _) = run(&CheckCommand::new(temp.path(), ["Lib.A"]).quiet(true));
        assert!(!quiet.contains("Ignored:"));
    }

    #[test]
    fn json_format_writes_document() {
        let temp = lib_dir();
        let command = CheckCommand::new(temp.path(), ["Lib.*"]).format(OutputFormat::Json);
        let (result, output, errors) = run(&command);

        assert_eq!(result.exit_code, 1);
        assert!(errors.is_empty());
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["summary"]["errors"], 1);
        assert_eq!(json["modules"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let command = CheckCommand::new(temp.path().join("absent"), ["Lib"]);
        let mut output = Vec::new();
        let mut errors = Vec::new();

        let err = command.execute(&mut output, &mut errors).unwrap_err();
        assert!(matches!(err, LibcheckError::RootEnumeration { .. }));
    }
}
