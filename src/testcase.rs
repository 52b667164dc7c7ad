//! In-memory test-case model plus the [`DirectiveSink`] that builds one
//! from a parsed test-case file.
//!
//! Field names follow `examples/original_source/src/Test.h` closely; the
//! directive-to-field mapping is `Test::process_directive` ported line by
//! line, with `mkdir`/`touch`/`ulimit` kept as parsed-but-rejected stubs
//! per `spec.md` §9's note that the source itself never implemented them.

use crate::parser::DirectiveSink;

/// One `file`/`file-del`/`file-new` entry. `input` empty means nothing is
/// staged before the run; `output` empty means nothing is compared after
/// it (the file must be absent instead).
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FileSpec {
    pub(crate) name: String,
    pub(crate) input: String,
    pub(crate) output: String,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TestCase {
    pub(crate) name: String,
    pub(crate) program: Option<String>,
    pub(crate) arguments: Vec<String>,
    pub(crate) environment: std::collections::HashMap<String, String>,
    pub(crate) standard_environment: std::collections::HashMap<String, String>,
    pub(crate) input: Vec<String>,
    pub(crate) input_file: Option<std::path::PathBuf>,
    pub(crate) preload_library: Option<String>,
    pub(crate) required_features: Vec<String>,
    pub(crate) precheck_command: Vec<String>,
    pub(crate) expected_exit: String,
    pub(crate) expected_output: Vec<String>,
    pub(crate) expected_error_output: Vec<String>,
    pub(crate) error_output_rewrites: Vec<(String, String)>,
    pub(crate) files: Vec<FileSpec>,
}

/// Builds a [`TestCase`] from parser events. Owns the parse-time
/// bookkeeping (`stdin`/`stdin-file` exclusivity, the not-implemented
/// directives) that doesn't belong on the finished value.
#[derive(Default)]
pub(crate) struct TestCaseBuilder {
    case: TestCase,
    saw_stdin_file: bool,
}

impl TestCaseBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            case: TestCase {
                name: name.into(),
                ..Default::default()
            },
            saw_stdin_file: false,
        }
    }

    pub(crate) fn finish(self) -> TestCase {
        let mut case = self.case;
        case.files.sort_by(|a, b| a.name.cmp(&b.name));
        case
    }
}

impl DirectiveSink for TestCaseBuilder {
    fn accept(&mut self, directive: &'static str, mut args: Vec<String>) -> Result<(), String> {
        match directive {
            "args" => self.case.arguments = args,
            "description" => {}
            "features" => self.case.required_features.extend(args),
            "file" => {
                let name = args.remove(0);
                let input = args.remove(0);
                let output = args.into_iter().next().unwrap_or_default();
                self.case.files.push(FileSpec {
                    name,
                    input,
                    output,
                });
            }
            "file-del" => {
                let name = args.remove(0);
                let input = args.remove(0);
                self.case.files.push(FileSpec {
                    name,
                    input,
                    output: String::new(),
                });
            }
            "file-new" => {
                let name = args.remove(0);
                let output = args.remove(0);
                self.case.files.push(FileSpec {
                    name,
                    input: String::new(),
                    output,
                });
            }
            "mkdir" => return Err("not implemented: mkdir".to_string()),
            "precheck" => self.case.precheck_command = args,
            "preload" => self.case.preload_library = Some(args.remove(0)),
            "program" => self.case.program = Some(args.remove(0)),
            "return" => self.case.expected_exit = args.remove(0),
            "setenv" => {
                let name = args.remove(0);
                let value = args.remove(0);
                self.case.environment.insert(name, value);
            }
            "stderr" => self.case.expected_error_output.push(args.remove(0)),
            "stderr-replace" => {
                let pattern = args.remove(0);
                let replacement = args.remove(0);
                self.case.error_output_rewrites.push((pattern, replacement));
            }
            "stdin" => {
                if self.saw_stdin_file {
                    return Err("'stdin' and 'stdin-file' are mutually exclusive".to_string());
                }
                self.case.input.push(args.remove(0));
            }
            "stdin-file" => {
                if !self.case.input.is_empty() {
                    return Err("'stdin' and 'stdin-file' are mutually exclusive".to_string());
                }
                self.saw_stdin_file = true;
                self.case.input_file = Some(std::path::PathBuf::from(args.remove(0)));
            }
            "stdout" => self.case.expected_output.push(args.remove(0)),
            "touch" => return Err("not implemented: touch".to_string()),
            "ulimit" => return Err("not implemented: ulimit".to_string()),
            other => return Err(format!("unhandled directive '{other}'")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn build(lines: &str) -> Result<TestCase, crate::error::Error> {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", lines).unwrap();
        let mut builder = TestCaseBuilder::new("t");
        crate::parser::parse(file.path(), crate::directive::TEST_CASE_DIRECTIVES, &mut builder)?;
        Ok(builder.finish())
    }

    #[test]
    fn builds_program_args_and_exit() {
        let case = build("program ./echo\nargs hello world\nreturn 0\n").unwrap();
        assert_eq!(case.program.as_deref(), Some("./echo"));
        assert_eq!(case.arguments, vec!["hello", "world"]);
        assert_eq!(case.expected_exit, "0");
    }

    #[test]
    fn file_directive_splits_into_input_and_output() {
        let case = build("return 0\nfile greeting.txt greeting-in.txt greeting-out.txt\n").unwrap();
        assert_eq!(
            case.files,
            vec![FileSpec {
                name: "greeting.txt".to_string(),
                input: "greeting-in.txt".to_string(),
                output: "greeting-out.txt".to_string(),
            }]
        );
    }

    #[test]
    fn files_are_sorted_by_name() {
        let case = build(
            "return 0\nfile-new zz.txt zz-out.txt\nfile-new aa.txt aa-out.txt\n",
        )
        .unwrap();
        assert_eq!(case.files[0].name, "aa.txt");
        assert_eq!(case.files[1].name, "zz.txt");
    }

    #[test]
    fn file_del_leaves_output_empty() {
        let case = build("return 0\nfile-del stale.txt stale-in.txt\n").unwrap();
        assert_eq!(case.files[0].output, "");
    }

    #[test]
    fn stdin_then_stdin_file_is_rejected() {
        let err = build("return 0\nstdin alpha\nstdin-file alt.txt\n").unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn stdin_file_then_stdin_is_rejected() {
        let err = build("return 0\nstdin-file alt.txt\nstdin alpha\n").unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn mkdir_is_not_implemented() {
        let err = build("return 0\nmkdir 0755 sub\n").unwrap_err();
        assert!(err.to_string().contains("not implemented: mkdir"));
    }

    #[test]
    fn touch_is_not_implemented() {
        let err = build("return 0\ntouch 12345 f\n").unwrap_err();
        assert!(err.to_string().contains("not implemented: touch"));
    }

    #[test]
    fn ulimit_is_not_implemented() {
        let err = build("return 0\nulimit c 0\n").unwrap_err();
        assert!(err.to_string().contains("not implemented: ulimit"));
    }

    #[test]
    fn stderr_replace_collects_pattern_and_replacement() {
        let case = build("return 0\nstderr-replace foo bar\n").unwrap();
        assert_eq!(
            case.error_output_rewrites,
            vec![("foo".to_string(), "bar".to_string())]
        );
    }
}
