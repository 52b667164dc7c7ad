//! Tagged error type shared by every layer of the driver.
//!
//! The original `nihtest` throws and catches a single `Exception` class
//! across layers; here each layer returns a typed variant instead so
//! callers can tell a syntax problem in a test file apart from a sandbox
//! or subprocess failure without string-matching a message.

/// Everything that can keep a test case from producing a PASS/FAIL/SKIP
/// verdict. Comparison mismatches are *not* represented here -- they are
/// never fatal and are collected by [`crate::runner`] instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A test-case or configuration file failed to parse: bad arity,
    /// unknown directive, unterminated quote, duplicate once-only
    /// directive, or a required directive missing at EOF. `message`
    /// aggregates every line error found during the pass.
    #[error("{path}: {message}")]
    Parse { path: String, message: String },

    /// Setup failed before the program under test could be launched:
    /// missing program, missing preload library, unresolvable input
    /// file, or sandbox creation failure.
    #[error("{0}")]
    Setup(String),

    /// A subprocess/OS-level failure: fork/exec/pipe/wait, or any other
    /// syscall the driver depends on. `os_error` carries the underlying
    /// `std::io::Error` when one is available ("consult last OS error"
    /// in the original design).
    #[error("{message}{}", os_error.as_ref().map(|e| format!(": {e}")).unwrap_or_default())]
    System {
        message: String,
        os_error: Option<std::io::Error>,
    },
}

impl Error {
    pub(crate) fn setup(message: impl Into<String>) -> Self {
        Self::Setup(message.into())
    }

    pub(crate) fn system(message: impl Into<String>) -> Self {
        Self::System {
            message: message.into(),
            os_error: None,
        }
    }

    pub(crate) fn system_errno(message: impl Into<String>, os_error: std::io::Error) -> Self {
        Self::System {
            message: message.into(),
            os_error: Some(os_error),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
