//! Name to value mapping with fallback to the process environment.
//!
//! Grounded on `examples/original_source/src/Variables.cc`: a small
//! override table consulted before `getenv`, plus an `add` helper that
//! splits a `VAR=VALUE` command-line argument.

#[derive(Clone, Debug, Default)]
pub(crate) struct Variables {
    values: std::collections::HashMap<String, String>,
    use_environment: bool,
}

impl Variables {
    pub(crate) fn new(use_environment: bool) -> Self {
        Self {
            values: Default::default(),
            use_environment,
        }
    }

    /// Parse a `VAR=VALUE` assignment, as fed from the CLI's trailing
    /// argument list. Silently ignores assignments without an `=`, same
    /// as the original.
    pub(crate) fn add(&mut self, assignment: &str) {
        if let Some((name, value)) = assignment.split_once('=') {
            self.set(name, value);
        }
    }

    pub(crate) fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub(crate) fn get(&self, name: &str) -> Option<String> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }
        if self.use_environment {
            return std::env::var(name).ok();
        }
        None
    }

    pub(crate) fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name) || (self.use_environment && std::env::var_os(name).is_some())
    }
}
