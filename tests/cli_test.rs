//! Integration tests for the libcheck binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use libcheck::metadata::ImageBuilder;
use libcheck::module::{cli_flags, MachineKind, ModuleVersion};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn v(major: u16, minor: u16) -> ModuleVersion {
    ModuleVersion::new(major, minor, 0, 0)
}

/// Lib.A 1.0 and Lib.B 2.0, where Lib.B wants Lib.A 1.1.
fn setup_lib() -> TempDir {
    let temp = TempDir::new().unwrap();
    ImageBuilder::new("Lib.A", v(1, 0))
        .reference("mscorlib", v(4, 0))
        .write_to(temp.path().join("Lib.A.dll"))
        .unwrap();
    ImageBuilder::new("Lib.B", v(2, 0))
        .reference("mscorlib", v(4, 0))
        .reference("Lib.A", v(1, 1))
        .write_to(temp.path().join("Lib.B.dll"))
        .unwrap();
    temp
}

fn libcheck() -> Command {
    let mut cmd = Command::new(cargo_bin("libcheck"));
    cmd.env_remove("LIBCHECK_CONFIG").env("NO_COLOR", "1");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    libcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reference and architecture audit"))
        .stdout(predicate::str::contains("Example: libcheck"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    libcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_a_pattern() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    libcheck()
        .arg(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PATTERN"));
    Ok(())
}

#[test]
fn cli_reports_version_mismatch() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_lib();
    let assert = libcheck().arg(temp.path()).arg("Lib.B").assert().code(1);
    let output = assert.get_output();

    let streams = format!(
        "stdout:\n{}stderr:\n{}",
        String::from_utf8(output.stdout.clone())?,
        String::from_utf8(output.stderr.clone())?
    );
    insta::assert_snapshot!(streams, @r"
    stdout:
    Lib.B.dll 2.0.0.0
    stderr:
       Wrong version: Lib.A 1.0.0.0 (I need NEWER version x.1.0.0)
    1 errors found
    ");
    Ok(())
}

#[test]
fn cli_clean_selection_exits_zero() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_lib();
    libcheck()
        .arg(temp.path())
        .arg("lib.a")
        .assert()
        .success()
        .stdout("Lib.A.dll 1.0.0.0\n");
    Ok(())
}

#[test]
fn cli_reports_missing_reference() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_lib();
    ImageBuilder::new("App", v(3, 0))
        .reference("Lib.Gone", v(1, 0))
        .write_to(temp.path().join("App.dll"))?;

    libcheck()
        .arg(temp.path())
        .arg("App")
        .assert()
        .code(1)
        .stdout("App.dll 3.0.0.0\n")
        .stderr(predicate::str::contains("   Missing: Lib.Gone 1.0.0.0"))
        .stderr(predicate::str::contains("1 errors found"));
    Ok(())
}

#[test]
fn cli_scans_subdirectories_and_lists_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_lib();
    let nested = temp.path().join("plugins");
    fs::create_dir_all(&nested)?;
    ImageBuilder::new("Plugin", v(1, 0))
        .reference("Lib.A", v(1, 0))
        .write_to(nested.join("Plugin.dll"))?;
    ImageBuilder::new("Native", v(1, 0))
        .native()
        .write_to(nested.join("Native.dll"))?;
    fs::write(temp.path().join("readme.txt"), "not a module")?;

    libcheck()
        .arg(temp.path())
        .arg("Plugin")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plugin.dll 1.0.0.0"))
        .stdout(predicate::str::contains("Ignored:").and(predicate::str::contains("Native.dll")))
        .stdout(predicate::str::contains("readme.txt").not());
    Ok(())
}

#[test]
fn cli_quiet_hides_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_lib();
    fs::write(temp.path().join("broken.dll"), b"MZ")?;

    libcheck()
        .arg("--quiet")
        .arg(temp.path())
        .arg("Lib.A")
        .assert()
        .success()
        .stdout("Lib.A.dll 1.0.0.0\n");
    Ok(())
}

#[test]
fn cli_warns_on_mixed_machines() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    ImageBuilder::new("M.Any", v(1, 0)).write_to(temp.path().join("M.Any.dll"))?;
    ImageBuilder::new("M.X64", v(1, 0))
        .machine(MachineKind::Amd64)
        .pe32_plus(true)
        .cli_flags(cli_flags::IL_ONLY)
        .write_to(temp.path().join("M.X64.dll"))?;

    libcheck()
        .arg(temp.path())
        .arg("M.*")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "   Warning: specific portable executable kind M.X64.dll ILOnly, PE32Plus AMD64",
        ))
        .stdout(predicate::str::contains(
            "Warning: different machine types detected:",
        ))
        .stdout(predicate::str::contains("   M.Any.dll ILOnly I386"));
    Ok(())
}

#[test]
fn cli_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_lib();
    let output = libcheck()
        .args(["--format", "json"])
        .arg(temp.path())
        .arg("Lib.*")
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(json["summary"]["errors"], 1);
    assert_eq!(json["modules"][0]["name"], "Lib.A");
    assert_eq!(json["modules"][1]["findings"][0]["difference"], "x.1.0.0");
    Ok(())
}

#[test]
fn cli_config_extends_system_prefixes() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_lib();
    let config = temp.path().join("libcheck.yml");
    fs::write(&config, "system_prefixes: [Lib.A]\n")?;

    libcheck()
        .arg("--config")
        .arg(&config)
        .arg(temp.path())
        .arg("Lib.B")
        .assert()
        .success();
    Ok(())
}

#[test]
fn cli_config_from_environment() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_lib();
    let config = temp.path().join("libcheck.yml");
    fs::write(&config, "system_prefixes: [Lib.A]\n")?;

    libcheck()
        .env("LIBCHECK_CONFIG", &config)
        .arg(temp.path())
        .arg("Lib.B")
        .assert()
        .success();
    Ok(())
}

#[test]
fn cli_missing_config_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_lib();
    libcheck()
        .arg("--config")
        .arg(temp.path().join("absent.yml"))
        .arg(temp.path())
        .arg("Lib.B")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
    Ok(())
}

#[test]
fn cli_missing_root_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    libcheck()
        .arg(temp.path().join("absent"))
        .arg("Lib")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error:"));
    Ok(())
}

#[test]
fn cli_exe_extension_from_config() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_lib();
    ImageBuilder::new("Tool", v(1, 0))
        .reference("Lib.A", v(1, 0))
        .write_to(temp.path().join("Tool.exe"))?;
    let config = temp.path().join("libcheck.yml");
    fs::write(&config, "extensions: [dll, exe]\n")?;

    libcheck()
        .arg(temp.path())
        .arg("Tool")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    libcheck()
        .arg("--config")
        .arg(&config)
        .arg(temp.path())
        .arg("Tool")
        .assert()
        .success()
        .stdout("Tool.exe 1.0.0.0\n");
    Ok(())
}
