//! End-to-end tests for the `larva` binary.
//!
//! Each test runs the compiled binary inside a temporary project with
//! `LARVA_CC` and `LARVA_CXX` pointed at a [`FakeCompiler`] script, so paths in the project
//! file stay relative exactly as a user would write them.
#![cfg(unix)]

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use test_support::mtime::age;
use test_support::{FakeCompiler, TempProject};

const GAME: &str = r#"
[project]
name = "game"

[targets.game]
kind = "executable"
language = "c99"
sources = ["src/*.c"]

[[post_build]]
copy = ["assets/*.txt"]
run_linux = "touch {output}/hooked"

[commands.run]
description = "Copy assets and start the launcher"
steps = ["post_build", "exec:tools/launch.sh"]

[commands.clean]
remove = ["build"]
"#;

fn project() -> TempProject {
    let project = TempProject::new();
    project.write_manifest(GAME);
    for name in ["src/a.c", "src/b.c", "assets/readme.txt"] {
        let path = project.write(name, "int x;\n");
        age(&path, 120);
    }
    project
}

fn larva(project: &TempProject, fake: &FakeCompiler) -> Result<Command> {
    let mut cmd = Command::cargo_bin("larva").context("locate larva binary")?;
    cmd.current_dir(project.root()).envs(fake.env());
    Ok(cmd)
}

#[test]
fn second_build_skips_unchanged_sources() -> Result<()> {
    let project = project();
    let fake = FakeCompiler::new(0);

    larva(&project, &fake)?.assert().success();
    ensure!(
        fake.invocations().len() == 3,
        "two compiles and a link, got {:?}",
        fake.invocations()
    );
    ensure!(project.path("build/game").exists(), "executable is linked");
    ensure!(
        project.path("build/readme.txt").exists(),
        "assets are copied"
    );
    ensure!(project.path("build/hooked").exists(), "hook runs");

    fake.clear();
    let output = larva(&project, &fake)?
        .arg("build")
        .output()
        .context("run larva build")?;
    ensure!(output.status.success(), "second build should succeed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    ensure!(
        stderr.contains("skip a.c (unchanged)") && stderr.contains("skip b.c (unchanged)"),
        "expected skip lines, got: {stderr}"
    );
    ensure!(
        fake.invocations().len() == 1,
        "only the link runs, got {:?}",
        fake.invocations()
    );
    Ok(())
}

#[test]
fn compiler_failure_exits_non_zero() -> Result<()> {
    let project = project();
    let fake = FakeCompiler::new(1);
    larva(&project, &fake)?
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed"));
    ensure!(
        fake.invocations().len() == 1,
        "the build stops at the first failing compile"
    );
    ensure!(!project.path("build/game").exists(), "nothing is linked");
    Ok(())
}

#[test]
fn missing_project_file_is_reported() -> Result<()> {
    let project = TempProject::new();
    let fake = FakeCompiler::new(0);
    larva(&project, &fake)?
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    ensure!(fake.invocations().is_empty(), "nothing is compiled");
    Ok(())
}

#[test]
fn list_shows_project_commands() -> Result<()> {
    let project = project();
    let fake = FakeCompiler::new(0);
    larva(&project, &fake)?
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: larva [command]"))
        .stdout(predicate::str::contains(
            "  run        Copy assets and start the launcher",
        ));
    Ok(())
}

#[test]
fn unknown_command_prints_usage_and_fails() -> Result<()> {
    let project = project();
    let fake = FakeCompiler::new(0);
    larva(&project, &fake)?
        .arg("deploy")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Usage: larva"))
        .stderr(predicate::str::contains("unknown command 'deploy'"));
    ensure!(fake.invocations().is_empty(), "nothing is compiled");
    Ok(())
}

#[test]
fn clean_removes_build_directory() -> Result<()> {
    let project = project();
    let fake = FakeCompiler::new(0);
    larva(&project, &fake)?.assert().success();
    ensure!(project.path("build").exists(), "build creates output");

    larva(&project, &fake)?
        .arg("clean")
        .assert()
        .success()
        .stderr(predicate::str::contains("Cleaned."));
    ensure!(!project.path("build").exists(), "clean removes output");
    Ok(())
}

#[test]
fn directory_option_selects_project() -> Result<()> {
    let project = project();
    let fake = FakeCompiler::new(0);
    let elsewhere = TempProject::new();
    let mut cmd = Command::cargo_bin("larva").context("locate larva binary")?;
    cmd.current_dir(elsewhere.root())
        .envs(fake.env())
        .arg("-C")
        .arg(project.root().as_str())
        .assert()
        .success();
    ensure!(project.path("build/game").exists(), "builds in the -C dir");
    ensure!(
        !elsewhere.path("build").exists(),
        "nothing lands in the launch directory"
    );
    Ok(())
}

#[test]
fn custom_command_execs_from_output_directory() -> Result<()> {
    let project = project();
    let script = project.write("tools/launch.sh", "#!/bin/sh\ntouch launched\n");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
        .context("make launcher executable")?;
    let fake = FakeCompiler::new(0);

    larva(&project, &fake)?.arg("run").assert().success();
    ensure!(
        project.path("build/launched").exists(),
        "launcher runs with the output directory as cwd"
    );
    ensure!(
        project.path("build/readme.txt").exists(),
        "post_build step copies assets"
    );
    ensure!(fake.invocations().is_empty(), "run does not compile");
    Ok(())
}

#[test]
fn failing_custom_step_exits_non_zero() -> Result<()> {
    let project = project();
    let script = project.write("tools/launch.sh", "#!/bin/sh\nexit 3\n");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
        .context("make launcher executable")?;
    let fake = FakeCompiler::new(0);
    larva(&project, &fake)?
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("exit status: 3"));
    Ok(())
}

#[test]
fn project_without_executable_only_runs_post_build() -> Result<()> {
    let project = TempProject::new();
    project.write_manifest(
        r#"
        [project]
        name = "assets-only"

        [[post_build]]
        copy = ["assets/*.txt"]
        "#,
    );
    project.write("assets/readme.txt", "hello");
    let fake = FakeCompiler::new(0);
    larva(&project, &fake)?.assert().success();
    ensure!(fake.invocations().is_empty(), "nothing to compile or link");
    let copied = fs::read_to_string(project.path("build/readme.txt"))
        .context("read copied asset")?;
    ensure!(copied == "hello", "asset copied verbatim");
    Ok(())
}

#[test]
fn list_works_when_targets_are_ambiguous() -> Result<()> {
    let project = TempProject::new();
    project.write_manifest(
        r#"
        [project]
        name = "game"

        [targets.game]
        kind = "executable"
        language = "c99"

        [targets.editor]
        kind = "executable"
        language = "c99"
        "#,
    );
    let fake = FakeCompiler::new(0);
    larva(&project, &fake)?
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: larva [command]"));
    larva(&project, &fake)?
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("multiple executable targets"));
    Ok(())
}
