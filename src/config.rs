//! Run-wide configuration: sandbox/source directories, the default
//! program, the file-comparator registry, and the retention policies.
//!
//! Grounded on `examples/original_source/src/Configuration.cc`. A
//! missing configuration file is not an error -- only parse errors
//! inside an existing file are -- matching the original's
//! open-then-ignore-ENOENT behavior.

use crate::error::Result;
use crate::filecmp::ComparatorRegistry;
use crate::parser::DirectiveSink;

/// When a sandbox is kept, or results are printed. Mirrors `Test::When`
/// / `Configuration::When` in the original.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) enum Retention {
    #[default]
    Never,
    OnFailure,
    Always,
}

impl Retention {
    fn parse(arg: &str) -> std::result::Result<Self, String> {
        match arg {
            "never" => Ok(Self::Never),
            "failed" => Ok(Self::OnFailure),
            "always" => Ok(Self::Always),
            other => Err(format!("unknown setting '{other}'")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Configuration {
    pub(crate) default_program: Option<String>,
    pub(crate) file_comparators: ComparatorRegistry,
    pub(crate) keep_sandbox: Retention,
    pub(crate) print_results: Retention,
    pub(crate) sandbox_directory: Option<String>,
    pub(crate) source_directory: Option<String>,
    pub(crate) top_build_directory: Option<String>,
}

impl Configuration {
    /// Load `path`. A missing file yields the defaults, same as the
    /// original's optional configuration file; a present-but-malformed
    /// file still fails with a parse error.
    pub(crate) fn load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let mut builder = ConfigBuilder::default();
        crate::parser::parse(path, crate::directive::CONFIG_DIRECTIVES, &mut builder)?;
        Ok(builder.config)
    }
}

#[derive(Default)]
struct ConfigBuilder {
    config: Configuration,
}

impl DirectiveSink for ConfigBuilder {
    fn accept(&mut self, directive: &'static str, args: Vec<String>) -> std::result::Result<(), String> {
        match directive {
            "default-program" => self.config.default_program = Some(args[0].clone()),
            "file-compare" => {
                let key = (args[0].clone(), args[1].clone());
                if self.config.file_comparators.contains_key(&key) {
                    return Err(format!(
                        "duplicate file-compare for extensions '{}' and '{}'",
                        args[0], args[1]
                    ));
                }
                self.config.file_comparators.insert(key, args[2..].to_vec());
            }
            "keep-sandbox" => self.config.keep_sandbox = Retention::parse(&args[0])?,
            "print-results" => self.config.print_results = Retention::parse(&args[0])?,
            "sandbox-directory" => self.config.sandbox_directory = Some(args[0].clone()),
            "source-directory" => self.config.source_directory = Some(args[0].clone()),
            "top-build-directory" => self.config.top_build_directory = Some(args[0].clone()),
            other => return Err(format!("unhandled directive '{other}'")),
        }
        Ok(())
    }
}
