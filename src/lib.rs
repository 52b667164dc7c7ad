//! # A regression-test driver for command-line utilities
//!
//! This crate runs a single textual test case against a program under
//! test: it stages declared input files into a fresh sandbox, spawns the
//! program with its declared arguments/environment/stdin, captures
//! stdout/stderr and the exit status, and compares all three against
//! the test case's expectations, falling back to a Myers minimum-diff
//! display on mismatch.
//!
//! ## Test-case file format
//!
//! A test case is a line-oriented directive file, one directive per
//! line:
//!
//! ```text
//! program ./echo
//! args hello world
//! return 0
//! stdout hello world
//! ```
//!
//! See [`directive::TEST_CASE_DIRECTIVES`] for the full directive table,
//! and the `cmdcase` binary's `--help` for the command-line surface.
//!
//! This crate runs exactly one test case per invocation -- it is not a
//! suite runner, and it does not provide an assertion DSL, parallel
//! scheduling, or flaky-retry logic.

pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod diff;
pub(crate) mod directive;
pub(crate) mod error;
pub(crate) mod features;
pub(crate) mod filecmp;
pub(crate) mod os;
pub(crate) mod parser;
pub(crate) mod runner;
pub(crate) mod subprocess;
pub(crate) mod testcase;
pub(crate) mod variables;

pub use error::Error;

use clap::Parser;
use config::Retention;

/// Parses `std::env::args`, runs the named test case to completion, and
/// returns the process exit code (`0` PASS, `1` FAIL, `2` SKIP, `3`
/// ERROR), same mapping as `examples/original_source/src/nihtest.cc`'s
/// `main`.
pub fn run() -> i32 {
    let cli = cli::Cli::parse();
    let parsed = match cli.split_trailing() {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("cmdcase: {message}");
            return 3;
        }
    };

    let mut variables = variables::Variables::new(true);
    for assignment in &parsed.variables {
        variables.add(assignment);
    }

    match run_test(&cli, &variables, &parsed.testcase) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("cmdcase: {err}");
            3
        }
    }
}

fn run_test(cli: &cli::Cli, variables: &variables::Variables, testcase_arg: &str) -> Result<i32, Error> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from("nihtest.conf"));
    let mut config = config::Configuration::load(&config_path)?;

    if let Some(source_directory) = variables.get("SOURCE_DIRECTORY") {
        config.source_directory = Some(source_directory);
    }
    if let Some(top_build_directory) = variables.get("TOP_BUILD_DIRECTORY") {
        config.top_build_directory = Some(top_build_directory);
    }

    if let Some(print_results) = cli.print_results_override() {
        config.print_results = print_results;
    }
    config.keep_sandbox = cli.keep_sandbox_override(config.keep_sandbox);
    if config.print_results != Retention::Never && variables.is_set("VERBOSE") {
        config.print_results = Retention::Always;
    }
    if config.keep_sandbox == Retention::Never && variables.is_set("KEEP_BROKEN") {
        config.keep_sandbox = Retention::OnFailure;
    }

    let (name, file_name) = match testcase_arg.find('.') {
        Some(dot) => (testcase_arg[..dot].to_string(), testcase_arg.to_string()),
        None => (testcase_arg.to_string(), format!("{testcase_arg}.test")),
    };

    let test_path = std::path::Path::new(&file_name);
    if !test_path.exists() {
        return Err(Error::Setup(format!("cannot open test case '{file_name}'")));
    }

    let mut builder = testcase::TestCaseBuilder::new(&name);
    parser::parse(test_path, directive::TEST_CASE_DIRECTIVES, &mut builder)?;
    let case = builder.finish();

    let top_build_directory = config
        .top_build_directory
        .clone()
        .unwrap_or_else(|| ".".to_string());
    let features = features::Features::new(std::path::Path::new(&top_build_directory).join("config.h"));

    match runner::run(&case, &config, &features, cli.setup_only) {
        Ok(outcome) => {
            if let Some(line) = outcome.report(&case.name, config.print_results) {
                println!("{line}");
            }
            Ok(outcome.exit_code())
        }
        Err(err) => {
            if let Some(line) = runner::Outcome::report_error(&case.name, &err, config.print_results) {
                eprintln!("{line}");
            }
            Ok(3)
        }
    }
}
