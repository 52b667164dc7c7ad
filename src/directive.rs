//! Declarative directive schema: name, arity rules, and once/required flags.
//!
//! Mirrors `Parser::Directive` / `Test::Directive` in the C++ original
//! (`examples/original_source/src/Parser.h`, `Configuration.cc`'s own
//! directive table). `min_args == -1` means "take the rest of the line
//! verbatim as one argument" (used for `description` and `stderr`/`stdout`/
//! `stdin`'s free-text forms); `max_args == 0` defaults to `min_args`, and
//! `-1` means unbounded.

#[derive(Clone, Copy, Debug)]
pub(crate) struct Directive {
    pub(crate) name: &'static str,
    #[allow(dead_code)]
    pub(crate) usage: &'static str,
    pub(crate) min_args: i32,
    pub(crate) max_args: i32,
    pub(crate) required: bool,
    pub(crate) only_once: bool,
}

impl Directive {
    pub(crate) const fn new(
        name: &'static str,
        usage: &'static str,
        min_args: i32,
        required: bool,
        only_once: bool,
        max_args: i32,
    ) -> Self {
        let max_args = if max_args == 0 { min_args } else { max_args };
        Self {
            name,
            usage,
            min_args,
            max_args,
            required,
            only_once,
        }
    }

    /// `n` arguments is in range for this directive. Always true for the
    /// `min_args == -1` "rest of line" form, which never tokenizes into a
    /// count to check.
    pub(crate) fn accepts(&self, n: usize) -> bool {
        if self.min_args < 0 {
            return true;
        }
        let n = n as i32;
        n >= self.min_args && (self.max_args < 0 || n <= self.max_args)
    }
}

/// The full directive table for a test-case file, per `spec.md` §6.
pub(crate) const TEST_CASE_DIRECTIVES: &[Directive] = &[
    Directive::new("args", "[arg ...]", 0, false, true, -1),
    Directive::new("description", "text", -1, false, true, 0),
    Directive::new("features", "feature ...", 1, false, true, -1),
    Directive::new("file", "name in [out]", 2, false, false, 3),
    Directive::new("file-del", "name in", 2, false, false, 0),
    Directive::new("file-new", "name out", 2, false, false, 0),
    Directive::new("mkdir", "mode name", 2, false, false, 0),
    Directive::new("precheck", "cmd [args ...]", 1, false, true, -1),
    Directive::new("preload", "library", 1, false, true, 0),
    Directive::new("program", "name", 1, false, true, 0),
    Directive::new("return", "exit-code", 1, true, true, 0),
    Directive::new("setenv", "var value", 2, false, false, 0),
    Directive::new("stderr", "text", -1, false, false, 0),
    Directive::new("stderr-replace", "pattern replacement", 2, false, false, 0),
    Directive::new("stdin", "text", -1, false, false, 0),
    Directive::new("stdin-file", "file", 1, false, true, 0),
    Directive::new("stdout", "text", -1, false, false, 0),
    Directive::new("touch", "mtime file", 2, false, false, 0),
    Directive::new("ulimit", "limit value", 2, false, false, 0),
];

/// The configuration-file directive table, per `spec.md` §6.
pub(crate) const CONFIG_DIRECTIVES: &[Directive] = &[
    Directive::new("default-program", "directory", 1, true, true, 0),
    Directive::new(
        "file-compare",
        "test-extension source-extension command [args ...]",
        3,
        false,
        false,
        -1,
    ),
    Directive::new("keep-sandbox", "when", 1, true, true, 0),
    Directive::new("print-results", "when", 1, true, true, 0),
    Directive::new("sandbox-directory", "directory", 1, true, true, 0),
    Directive::new("source-directory", "directory", 1, true, true, 0),
    Directive::new("top-build-directory", "directory", 1, true, true, 0),
];
