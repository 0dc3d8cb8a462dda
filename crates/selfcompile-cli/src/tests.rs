//! Unit tests for the CLI runtime.

use std::ffi::OsString;
use std::process::ExitCode;
use std::time::Duration;

use camino::Utf8PathBuf;
use rstest::rstest;
use selfcompile::EmptyPluginPolicy;
use selfcompile_config::{Config, EmptyPlugins};
use tempfile::TempDir;

use crate::config::ConfigLoader;
use crate::{AppError, compile_options, run_with_loader};

/// Loader returning a fixed configuration and recording what it was given.
struct StaticLoader {
    config: Config,
    seen: std::cell::RefCell<Vec<OsString>>,
}

impl StaticLoader {
    fn new(config: Config) -> Self {
        Self {
            config,
            seen: std::cell::RefCell::new(Vec::new()),
        }
    }
}

impl ConfigLoader for StaticLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        self.seen.borrow_mut().extend_from_slice(args);
        Ok(self.config.clone())
    }
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn run(args: &[&str], loader: &StaticLoader) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run_with_loader(
        args.iter().map(OsString::from),
        &mut stdout,
        &mut stderr,
        loader,
    );
    Outcome {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

fn config_with_root(root: &TempDir) -> Config {
    Config {
        install_target: Some(String::from("example.org/app")),
        tmp_root: Some(Utf8PathBuf::from_path_buf(root.path().to_path_buf()).expect("utf-8 root")),
        ..Config::default()
    }
}

#[test]
fn missing_assets_dir_reports_missing_restorer() {
    let root = TempDir::new().expect("root");
    let loader = StaticLoader::new(config_with_root(&root));

    let outcome = run(&["selfcompile", "--plugin", "a/x"], &loader);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(
        outcome.stderr.contains("missing asset restoration function"),
        "stderr: {}",
        outcome.stderr
    );
    assert!(outcome.stdout.is_empty());
    assert_eq!(std::fs::read_dir(root.path()).expect("root").count(), 0);
}

#[test]
fn only_configuration_flags_reach_the_loader() {
    let root = TempDir::new().expect("root");
    let loader = StaticLoader::new(config_with_root(&root));

    run(
        &["selfcompile", "--log-filter", "debug", "--plugin", "a/x"],
        &loader,
    );

    assert_eq!(
        loader.seen.borrow().as_slice(),
        [
            OsString::from("selfcompile"),
            OsString::from("--log-filter"),
            OsString::from("debug"),
        ]
    );
}

#[test]
fn malformed_plugin_is_reported_before_staging() {
    let root = TempDir::new().expect("root");
    let loader = StaticLoader::new(config_with_root(&root));

    let outcome = run(&["selfcompile", "--plugin", "a\"b"], &loader);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("invalid plugin"), "{}", outcome.stderr);
}

#[test]
fn invalid_install_target_is_reported() {
    let loader = StaticLoader::new(Config {
        install_target: Some(String::from("../escape")),
        ..Config::default()
    });

    let outcome = run(&["selfcompile", "--plugin", "a/x"], &loader);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(
        outcome.stderr.contains("invalid install target"),
        "{}",
        outcome.stderr
    );
}

#[test]
fn unknown_arguments_are_usage_errors() {
    let loader = StaticLoader::new(Config::default());
    let outcome = run(&["selfcompile", "--frobnicate"], &loader);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("--frobnicate"), "{}", outcome.stderr);
    assert!(loader.seen.borrow().is_empty());
}

#[test]
fn help_is_written_to_stdout() {
    let loader = StaticLoader::new(Config::default());
    let outcome = run(&["selfcompile", "--help"], &loader);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("--plugin"), "{}", outcome.stdout);
}

#[rstest]
#[case(EmptyPlugins::Reject, EmptyPluginPolicy::Reject)]
#[case(EmptyPlugins::RenderEmpty, EmptyPluginPolicy::RenderEmpty)]
fn options_follow_configuration(#[case] policy: EmptyPlugins, #[case] expected: EmptyPluginPolicy) {
    let config = Config {
        install_target: Some(String::from("example.org/app")),
        auto_cleanup: true,
        tmp_prefix: Some(String::from("rebuild-")),
        tmp_root: Some(Utf8PathBuf::from("/var/tmp")),
        package: Some(String::from("tool")),
        empty_plugins: policy,
        build_timeout_secs: Some(120),
        ..Config::default()
    };

    let options = compile_options(&config).expect("options");

    assert_eq!(
        options.install_target().map(|t| t.as_str()),
        Some("example.org/app")
    );
    assert!(options.auto_cleanup());
    assert_eq!(options.prefix(), "rebuild-");
    assert_eq!(options.root(), Some(std::path::Path::new("/var/tmp")));
    assert_eq!(options.package(), "tool");
    assert_eq!(options.empty_plugins(), expected);
    assert_eq!(options.build_timeout(), Some(Duration::from_secs(120)));
}

#[test]
fn unset_values_fall_back_to_orchestrator_defaults() {
    let options = compile_options(&Config::default()).expect("options");
    assert_eq!(options.package(), "main");
    assert_eq!(options.prefix(), "go-selfcompile");
    assert_eq!(options.root(), None);
    assert!(options.install_target().is_none());
}
