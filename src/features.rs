//! Feature table: `HAVE_*` symbols harvested from a generated
//! `config.h`, used to satisfy a test case's `features` directive.
//!
//! Grounded on `examples/original_source/src/Test.cc`'s `read_features`,
//! widened per `spec.md` §4.7 to the `^#define HAVE_([_A-Za-z0-9]+)$`
//! form (the original's own regex is looser and not anchored to the
//! `HAVE_` prefix, but `spec.md` is canonical here). Lazily built on
//! first query and cached for the life of the run.

use crate::error::{Error, Result};
use crate::variables::Variables;

pub(crate) struct Features {
    table: std::sync::OnceLock<Variables>,
    config_header: std::path::PathBuf,
}

impl Features {
    pub(crate) fn new(config_header: std::path::PathBuf) -> Self {
        Self {
            table: std::sync::OnceLock::new(),
            config_header,
        }
    }

    pub(crate) fn is_set(&self, name: &str) -> Result<bool> {
        Ok(self.table()?.is_set(name))
    }

    fn table(&self) -> Result<&Variables> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let table = scan(&self.config_header)?;
        Ok(self.table.get_or_init(|| table))
    }
}

fn scan(config_header: &std::path::Path) -> Result<Variables> {
    let mut table = Variables::new(false);
    let text = std::fs::read_to_string(config_header).map_err(|e| {
        Error::system_errno(
            format!("cannot open config header '{}'", config_header.display()),
            e,
        )
    })?;
    for line in text.lines() {
        if let Some(symbol) = parse_define(line) {
            table.set(symbol, "YES");
        }
    }
    Ok(table)
}

/// Matches `^#define HAVE_([_A-Za-z0-9]+)$` without pulling in a regex
/// dependency the rest of this small, line-oriented scanner doesn't need.
fn parse_define(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("#define HAVE_")?;
    let rest = rest.trim_end();
    if !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Some(rest)
    } else {
        None
    }
}
