//! Subprocess engine: program resolution, preload-library resolution,
//! and concurrent stdin/stdout/stderr handling for the child under test.
//!
//! The original (`examples/original_source/src/OS-Unix-run.cc`) hand-rolls
//! `fork`/`pipe`/`poll`/`execv` around a fixed 1 MiB `Buffer`. This keeps
//! the same contract -- concurrent stdin-write with stdout/stderr-read,
//! `LD_PRELOAD` injection, signal-name exit classification -- but gets
//! the concurrency from `std::process::Command` plus reader/writer
//! threads, the same shape as the teacher's `command::wait_with_input_output`
//! (`src/command.rs`): spawn with piped stdio, hand stdin-writing and
//! stdout/stderr-reading each to their own thread, join before `wait()`.
//! This avoids the deadlock a sequential write-then-read would hit once
//! the child blocks on a full stdout pipe, without needing raw `poll(2)`.

use std::io::{Read, Write};

use crate::error::{Error, Result};

/// Where the child's stdin comes from.
pub(crate) enum Stdin {
    None,
    Lines(Vec<String>),
    File(std::path::PathBuf),
}

/// Everything `run_command` needs: the C++ original's `Command` struct.
pub(crate) struct CommandSpec {
    pub(crate) program: String,
    pub(crate) arguments: Vec<String>,
    pub(crate) environment: std::collections::HashMap<String, String>,
    pub(crate) stdin: Stdin,
    pub(crate) search_path: Vec<std::path::PathBuf>,
    pub(crate) preload_library: Option<String>,
}

pub(crate) struct CommandOutput {
    pub(crate) status: String,
    pub(crate) output: Vec<String>,
    pub(crate) error_output: Vec<String>,
}

/// Absolute paths must already exist; relative ones are searched for in
/// `search_path`, first hit wins.
fn resolve_program(program: &str, search_path: &[std::path::PathBuf]) -> Result<std::path::PathBuf> {
    let as_path = std::path::Path::new(program);
    if as_path.is_absolute() {
        return if as_path.exists() {
            Ok(as_path.to_path_buf())
        } else {
            Err(Error::setup(format!("can't find program '{program}'")))
        };
    }
    for dir in search_path {
        let candidate = dir.join(program);
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(Error::setup(format!("can't find program '{program}'")))
}

/// `<cwd>/../<dir>/.libs/<name>`, falling back to `.../lib<name>`.
fn resolve_preload(name: &str) -> Result<std::path::PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| Error::system_errno("can't get current directory", e))?;
    let path = std::path::Path::new(name);
    let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
        .to_string();

    let mut base = cwd.join("..");
    if let Some(directory) = directory {
        base = base.join(directory);
    }

    let candidate = base.join(".libs").join(&file_name);
    if candidate.exists() {
        return Ok(candidate);
    }
    let candidate = base.join(format!("lib{file_name}"));
    if candidate.exists() {
        return Ok(candidate);
    }
    Err(Error::setup(format!(
        "preload library '{name}' doesn't exist"
    )))
}

#[cfg(unix)]
fn classify_status(status: std::process::ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    if let Some(code) = status.code() {
        return code.to_string();
    }
    match status.signal() {
        Some(libc::SIGABRT) => "SIGABRT".to_string(),
        Some(libc::SIGALRM) => "SIGALRM".to_string(),
        Some(libc::SIGBUS) => "SIGBUS".to_string(),
        Some(libc::SIGFPE) => "SIGFPE".to_string(),
        Some(libc::SIGHUP) => "SIGHUP".to_string(),
        Some(libc::SIGILL) => "SIGILL".to_string(),
        Some(libc::SIGINT) => "SIGINT".to_string(),
        Some(libc::SIGKILL) => "SIGKILL".to_string(),
        Some(libc::SIGPIPE) => "SIGPIPE".to_string(),
        Some(libc::SIGQUIT) => "SIGQUIT".to_string(),
        Some(libc::SIGSEGV) => "SIGSEGV".to_string(),
        Some(libc::SIGSYS) => "SIGSYS".to_string(),
        Some(libc::SIGTERM) => "SIGTERM".to_string(),
        Some(libc::SIGTRAP) => "SIGTRAP".to_string(),
        Some(other) => format!("unknown signal {other}"),
        None => "unknown status".to_string(),
    }
}

#[cfg(windows)]
fn classify_status(status: std::process::ExitStatus) -> String {
    status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "unknown status".to_string())
}

/// Split a captured output buffer into lines, dropping a trailing
/// fragment that has no terminating `\n` -- matches `getline`-style
/// semantics the original relies on.
fn split_lines(bytes: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    // `split` always yields a trailing element after the last `\n` (empty
    // when the buffer ended in one, a partial fragment otherwise); both
    // are dropped, matching the getline-style semantics in `spec.md` §4.5.
    lines.pop();
    lines
}

#[cfg(unix)]
pub(crate) fn run_command(spec: &CommandSpec) -> Result<CommandOutput> {
    use std::os::unix::process::CommandExt;

    let program = resolve_program(&spec.program, &spec.search_path)?;
    let preload = spec
        .preload_library
        .as_deref()
        .map(resolve_preload)
        .transpose()?;

    let mut command = std::process::Command::new(&program);
    command.arg0(&spec.program);
    command.args(&spec.arguments);
    command.envs(&spec.environment);
    if let Some(preload) = &preload {
        command.env("LD_PRELOAD", preload);
    }
    command.stdout(std::process::Stdio::piped());
    command.stderr(std::process::Stdio::piped());

    let stdin_bytes = match &spec.stdin {
        Stdin::None => None,
        Stdin::Lines(lines) => {
            let mut buf = String::new();
            for line in lines {
                buf.push_str(line);
                buf.push('\n');
            }
            Some(buf.into_bytes())
        }
        Stdin::File(path) => Some(
            std::fs::read(path)
                .map_err(|e| Error::system_errno(format!("can't open '{}'", path.display()), e))?,
        ),
    };
    command.stdin(if stdin_bytes.is_some() {
        std::process::Stdio::piped()
    } else {
        std::process::Stdio::null()
    });

    let mut child = command
        .spawn()
        .map_err(|e| Error::system_errno(format!("can't start program '{}'", spec.program), e))?;

    let writer = stdin_bytes.map(|bytes| {
        let mut stdin = child.stdin.take().expect("stdin was piped");
        std::thread::spawn(move || stdin.write_all(&bytes))
    });

    fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> std::thread::JoinHandle<Vec<u8>> {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf);
            buf
        })
    }
    let stdout_reader = spawn_reader(child.stdout.take().expect("stdout was piped"));
    let stderr_reader = spawn_reader(child.stderr.take().expect("stderr was piped"));

    if let Some(writer) = writer {
        let _ = writer.join();
    }
    let status = child
        .wait()
        .map_err(|e| Error::system_errno("wait failed", e))?;

    let stdout_bytes = stdout_reader.join().unwrap_or_default();
    let stderr_bytes = stderr_reader.join().unwrap_or_default();

    Ok(CommandOutput {
        status: classify_status(status),
        output: split_lines(&stdout_bytes),
        error_output: split_lines(&stderr_bytes),
    })
}

#[cfg(windows)]
pub(crate) fn run_command(_spec: &CommandSpec) -> Result<CommandOutput> {
    Err(Error::setup(
        "subprocess engine is not implemented on this platform",
    ))
}
