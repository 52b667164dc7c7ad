//! Line-oriented directive-language parser.
//!
//! Ported from `examples/original_source/src/TestParser.cc`'s `parse`/
//! `tokenize`: one directive per line, `#`-prefixed comments, quoted
//! arguments with backslash escapes, a raw "rest of line" mode for
//! free-text directives, and required/only-once enforcement at EOF.
//! Errors are accumulated per line and only raised as one aggregate
//! [`crate::Error::Parse`] after the whole file has been read, matching
//! the original's "collect errors, fail once at the end" behavior.

use crate::directive::Directive;
use crate::error::{Error, Result};

/// Receives `(directive, arguments)` events from the parser. [`crate::testcase::TestCaseBuilder`]
/// and [`crate::config::ConfigBuilder`] both implement this, mirroring the
/// `process_directive` virtual dispatch the C++ original uses for `Test`
/// and `Configuration`.
pub(crate) trait DirectiveSink {
    fn accept(&mut self, directive: &'static str, args: Vec<String>) -> std::result::Result<(), String>;
}

pub(crate) fn parse(
    path: &std::path::Path,
    schema: &[Directive],
    sink: &mut dyn DirectiveSink,
) -> Result<()> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::system_errno(format!("cannot open test case '{}'", path.display()), e)
    })?;

    let mut errors: Vec<String> = Vec::new();
    let mut seen: std::collections::HashSet<&'static str> = std::collections::HashSet::new();

    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let space = line.find(' ');
        let command = match space {
            Some(idx) => &line[..idx],
            None => line,
        };

        let directive = match schema.iter().find(|d| d.name == command) {
            Some(d) => d,
            None => {
                errors.push(format!("{}: unknown directive '{}'", line_no, command));
                continue;
            }
        };

        if directive.only_once && seen.contains(directive.name) {
            errors.push(format!(
                "{}: directive '{}' only allowed once",
                line_no, directive.name
            ));
            continue;
        }
        seen.insert(directive.name);

        let args = if directive.min_args < 0 {
            vec![space.map(|idx| line[idx + 1..].to_string()).unwrap_or_default()]
        } else {
            match space {
                Some(idx) => match tokenize(&line[idx + 1..]) {
                    Ok(args) => args,
                    Err(message) => {
                        errors.push(format!("{}: {}", line_no, message));
                        continue;
                    }
                },
                None => Vec::new(),
            }
        };

        if !directive.accepts(args.len()) {
            errors.push(format!(
                "{}: wrong number of arguments to directive '{}'",
                line_no, directive.name
            ));
            continue;
        }

        if let Err(message) = sink.accept(directive.name, args) {
            errors.push(format!("{}: {}", line_no, message));
        }
    }

    for directive in schema {
        if directive.required && !seen.contains(directive.name) {
            errors.push(format!("directive '{}' is required", directive.name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Parse {
            path: path.display().to_string(),
            message: errors.join("\n"),
        })
    }
}

/// Tokenize the argument region of a line: whitespace-separated tokens,
/// with `"`-quoted tokens supporting `\\`, `\"`, `\b`, `\f`, `\n`, `\r`,
/// `\t` escapes.
fn tokenize(rest: &str) -> std::result::Result<Vec<String>, String> {
    let chars: Vec<char> = rest.chars().collect();
    let mut i = 0;
    let mut args = Vec::new();

    let skip_ws = |chars: &[char], mut i: usize| {
        while i < chars.len() && (chars[i] == ' ' || chars[i] == '\t') {
            i += 1;
        }
        i
    };

    i = skip_ws(&chars, i);
    while i < chars.len() {
        if chars[i] == '"' {
            i += 1;
            let mut arg = String::new();
            let mut terminated = false;
            while i < chars.len() {
                match chars[i] {
                    '"' => {
                        terminated = true;
                        i += 1;
                        break;
                    }
                    '\\' => {
                        if i + 1 >= chars.len() {
                            return Err("incomplete backslash escape".to_string());
                        }
                        let escaped = match chars[i + 1] {
                            '\\' => '\\',
                            '"' => '"',
                            'b' => '\u{8}',
                            'f' => '\u{c}',
                            'n' => '\n',
                            'r' => '\r',
                            't' => '\t',
                            other => {
                                return Err(format!("unknown escape sequence '\\{}'", other));
                            }
                        };
                        arg.push(escaped);
                        i += 2;
                    }
                    c => {
                        arg.push(c);
                        i += 1;
                    }
                }
            }
            if !terminated {
                return Err("unterminated quoted argument".to_string());
            }
            args.push(arg);
            i = skip_ws(&chars, i);
        } else {
            let start = i;
            while i < chars.len() && chars[i] != ' ' && chars[i] != '\t' {
                i += 1;
            }
            args.push(chars[start..i].iter().collect());
            i = skip_ws(&chars, i);
        }
    }

    Ok(args)
}
