//! Unit tests for command dispatch.

use super::*;
use crate::build::BuildError;
use crate::config::ConfigError;
use crate::platform::Platform;
use crate::status::BuildEvent;
use crate::toolchain::{CompilerFamily, Toolchain};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use std::cell::RefCell;
use std::fs;
use tempfile::TempDir;

#[derive(Default)]
struct Recorder {
    commands: Vec<ToolCommand>,
}

impl CommandRunner for Recorder {
    fn run(&mut self, command: &ToolCommand) -> Result<(), RunnerError> {
        let args = command.arguments();
        if let Some(pos) = args.iter().position(|arg| arg == "-o")
            && let Some(output) = args.get(pos + 1)
        {
            fs::write(output, "").map_err(|source| RunnerError::Spawn {
                program: command.program().to_owned(),
                source,
            })?;
        }
        self.commands.push(command.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Lines(RefCell<Vec<String>>);

impl StatusReporter for Lines {
    fn report(&self, event: &BuildEvent<'_>) {
        self.0.borrow_mut().push(event.to_string());
    }
}

struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    fn load(&self, body: &str) -> (Config, BuildContext) {
        let text = body.replace("@ROOT@", self.root.as_str());
        let config = manifest::from_str(&text).expect("parse");
        let ctx = BuildContext::resolve(
            &config,
            Platform::Linux,
            BuildMode::Debug,
            self.root.clone(),
            Toolchain::for_family(CompilerFamily::Gnu),
        )
        .expect("context");
        (config, ctx)
    }

    fn write(&self, name: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(&path, name).expect("write file");
        path
    }
}

#[fixture]
fn project() -> Project {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
    Project { _dir: dir, root }
}

const GAME: &str = r#"
[project]
name = "game"

[targets.game]
kind = "executable"
language = "c99"
sources = ["@ROOT@/src/*.c"]

[targets.game.platform.linux]
output = "@ROOT@/out"

[targets.game.debug]
flags = ["-g"]

[targets.game.release]
flags = ["-O2"]

[commands.run]
description = "Run the game"
steps = ["build", "exec:{output}/{exe}"]

[commands.clean]
remove = ["@ROOT@/out", "@ROOT@/never-created"]
"#;

fn dispatch(
    command: &Commands,
    config: &Config,
    ctx: &BuildContext,
) -> (Result<()>, Recorder, Vec<String>, String) {
    dispatch_with(command, config, &|mode: BuildMode| Ok(ctx.with_mode(mode)))
}

fn dispatch_with(
    command: &Commands,
    config: &Config,
    resolve: &dyn Fn(BuildMode) -> Result<BuildContext>,
) -> (Result<()>, Recorder, Vec<String>, String) {
    let mut runner = Recorder::default();
    let reporter = Lines::default();
    let mut out = Vec::new();
    let result = execute(command, config, resolve, &mut runner, &reporter, &mut out);
    let lines = reporter.0.into_inner();
    let text = String::from_utf8(out).expect("utf8 output");
    (result, runner, lines, text)
}

#[rstest]
#[case(Commands::Build(BuildArgs { release: false }), "-g")]
#[case(Commands::Build(BuildArgs { release: true }), "-O2")]
#[case(Commands::Release, "-O2")]
fn build_commands_select_mode_flags(
    project: Project,
    #[case] command: Commands,
    #[case] flag: &str,
) {
    project.write("src/main.c");
    let (config, ctx) = project.load(GAME);
    let (result, runner, _, _) = dispatch(&command, &config, &ctx);
    result.expect("build");
    let compile = runner.commands.first().expect("compile command");
    assert_eq!(compile.program(), "gcc");
    assert!(compile.arguments().iter().any(|arg| arg == flag));
    assert_eq!(runner.commands.len(), 2, "compile then link");
}

#[rstest]
fn list_prints_commands(project: Project) {
    let (config, ctx) = project.load(GAME);
    let (result, runner, _, text) = dispatch(&Commands::List, &config, &ctx);
    result.expect("list");
    assert!(runner.commands.is_empty());
    assert!(text.contains("  run        Run the game\n"));
}

#[rstest]
fn unknown_command_lists_and_fails(project: Project) {
    let (config, ctx) = project.load(GAME);
    let command = Commands::Custom(vec!["deploy".to_owned()]);
    let (result, runner, _, text) = dispatch(&command, &config, &ctx);
    let err = result.expect_err("unknown command");
    assert!(matches!(
        err.downcast_ref::<RunnerError>(),
        Some(RunnerError::UnknownCommand { name }) if name == "deploy"
    ));
    assert!(text.starts_with("larva - build system"));
    assert!(runner.commands.is_empty());
}

#[rstest]
fn custom_exec_runs_from_output_dir(project: Project) {
    project.write("src/main.c");
    let (config, ctx) = project.load(GAME);
    let command = Commands::Custom(vec!["run".to_owned()]);
    let (result, runner, _, _) = dispatch(&command, &config, &ctx);
    result.expect("custom command");
    let exec = runner.commands.last().expect("exec step");
    assert_eq!(exec.program(), project.root.join("out/game").as_str());
    assert!(exec.arguments().is_empty());
    assert_eq!(exec.working_dir(), Some(project.root.join("out").as_path()));
}

#[rstest]
fn play_runs_linked_executable(project: Project) {
    project.write("src/main.c");
    let (config, ctx) = project.load(GAME);
    let (result, runner, _, _) =
        dispatch(&Commands::Play(BuildArgs::default()), &config, &ctx);
    result.expect("play");
    let programs: Vec<&str> = runner.commands.iter().map(ToolCommand::program).collect();
    let exe = project.root.join("out/game");
    assert_eq!(programs, ["gcc", "gcc", exe.as_str()]);
}

#[rstest]
fn clean_removes_listed_directories(project: Project) {
    project.write("out/game.o");
    let (config, ctx) = project.load(GAME);
    let (result, _, lines, _) = dispatch(&Commands::Clean, &config, &ctx);
    result.expect("clean");
    assert!(!project.root.join("out").exists());
    assert_eq!(
        lines,
        [
            format!("  removed {}", project.root.join("out")),
            "Cleaned.".to_owned()
        ]
    );
}

#[cfg(unix)]
#[rstest]
fn clean_attempts_every_directory(project: Project) {
    use std::os::unix::fs::PermissionsExt;

    let locked = project.root.join("locked");
    project.write("locked/inner/file");
    project.write("second/file");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).expect("chmod");
    let body = r#"
        [project]
        name = "game"
        [commands.clean]
        remove = ["@ROOT@/locked/inner", "@ROOT@/second"]
    "#;
    let (config, ctx) = project.load(body);
    let (result, _, _, _) = dispatch(&Commands::Clean, &config, &ctx);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("restore");

    assert!(!project.root.join("second").exists());
    if locked.join("inner").exists() {
        let err = result.expect_err("locked directory cannot be removed");
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::CleanFailed { paths }) if paths.len() == 1
        ));
    }
}

const TWO_EXECUTABLES: &str = r#"
[project]
name = "game"

[targets.game]
kind = "executable"
language = "c99"

[targets.editor]
kind = "executable"
language = "c99"

[commands.clean]
remove = ["@ROOT@/out"]
"#;

#[rstest]
#[case(Commands::List, true)]
#[case(Commands::Clean, true)]
#[case(Commands::Custom(vec!["deploy".to_owned()]), false)]
fn listing_and_clean_need_no_build_context(
    project: Project,
    #[case] command: Commands,
    #[case] succeeds: bool,
) {
    project.write("out/game.o");
    let text = TWO_EXECUTABLES.replace("@ROOT@", project.root.as_str());
    let config = manifest::from_str(&text).expect("parse");
    let resolve = |mode: BuildMode| -> Result<BuildContext> {
        Ok(BuildContext::resolve(
            &config,
            Platform::Linux,
            mode,
            project.root.clone(),
            Toolchain::for_family(CompilerFamily::Gnu),
        )?)
    };
    let (result, runner, _, _) = dispatch_with(&command, &config, &resolve);
    assert_eq!(result.is_ok(), succeeds, "got {result:?}");
    if let Err(err) = result {
        assert!(matches!(
            err.downcast_ref::<RunnerError>(),
            Some(RunnerError::UnknownCommand { .. })
        ));
    }
    assert!(runner.commands.is_empty());
}

#[rstest]
fn build_reports_ambiguous_executables(project: Project) {
    let text = TWO_EXECUTABLES.replace("@ROOT@", project.root.as_str());
    let config = manifest::from_str(&text).expect("parse");
    let resolve = |mode: BuildMode| -> Result<BuildContext> {
        Ok(BuildContext::resolve(
            &config,
            Platform::Linux,
            mode,
            project.root.clone(),
            Toolchain::for_family(CompilerFamily::Gnu),
        )?)
    };
    let (result, _, _, _) =
        dispatch_with(&Commands::Build(BuildArgs::default()), &config, &resolve);
    let err = result.expect_err("two executables");
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MultipleExecutables { names }) if names.len() == 2
    ));
}
