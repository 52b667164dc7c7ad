//! File-set comparator: pairs expected output files against the files
//! actually produced in the sandbox.
//!
//! Ported from `examples/original_source/src/CompareFiles.cc`'s merge
//! walk over two name-sorted sequences. Per `spec.md` §4.3, only
//! `FileSpec` entries with a non-empty `output` participate; a matched
//! pair is handed to the comparator registered for its extension pair,
//! an expected-only entry is `-name`, an observed-only entry is `+name`.

use crate::testcase::FileSpec;

/// Registry of external comparator commands, keyed by
/// `(test-extension, source-extension)` -- the same key the
/// `file-compare` configuration directive builds.
pub(crate) type ComparatorRegistry = std::collections::HashMap<(String, String), Vec<String>>;

fn extension(name: &str) -> &str {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

/// Run a registered external comparator for a matched pair of files.
/// Exit status `0` means equal, anything else means different. If no
/// comparator is registered for the pair's extensions, the pair is
/// skipped (treated as equal) -- reserved for future binary comparison,
/// per `spec.md` §4.3.
fn files_differ(
    registry: &ComparatorRegistry,
    observed_path: &std::path::Path,
    expected_path: &std::path::Path,
    name_ext: &str,
    source_ext: &str,
) -> bool {
    let key = (name_ext.to_string(), source_ext.to_string());
    let Some(command) = registry.get(&key) else {
        return false;
    };
    let Some((program, args)) = command.split_first() else {
        return false;
    };
    match std::process::Command::new(program)
        .args(args)
        .arg(observed_path)
        .arg(expected_path)
        .status()
    {
        Ok(status) => !status.success(),
        Err(_) => true,
    }
}

/// Compare the expected file catalog against the sandbox's observed file
/// list. Returns the list of discrepancy lines (`-name`/`+name`/`!name`)
/// in merge order; an empty list means the file set matched.
pub(crate) fn compare_files(
    expected: &[FileSpec],
    observed: &[String],
    sandbox: &std::path::Path,
    source_lookup: impl Fn(&str) -> Option<std::path::PathBuf>,
    registry: &ComparatorRegistry,
) -> Vec<String> {
    let expected: Vec<&FileSpec> = expected.iter().filter(|f| !f.output.is_empty()).collect();

    let mut discrepancies = Vec::new();
    let mut ei = 0usize;
    let mut oi = 0usize;

    while ei < expected.len() && oi < observed.len() {
        let exp = expected[ei];
        let obs = &observed[oi];
        match exp.name.cmp(obs) {
            std::cmp::Ordering::Equal => {
                let observed_path = sandbox.join(obs);
                if let Some(expected_path) = source_lookup(&exp.output) {
                    let name_ext = extension(&exp.name);
                    let source_ext = extension(&exp.output);
                    if files_differ(registry, &observed_path, &expected_path, name_ext, source_ext)
                    {
                        discrepancies.push(format!("!{}", exp.name));
                    }
                }
                ei += 1;
                oi += 1;
            }
            std::cmp::Ordering::Less => {
                discrepancies.push(format!("-{}", exp.name));
                ei += 1;
            }
            std::cmp::Ordering::Greater => {
                discrepancies.push(format!("+{}", obs));
                oi += 1;
            }
        }
    }
    while ei < expected.len() {
        discrepancies.push(format!("-{}", expected[ei].name));
        ei += 1;
    }
    while oi < observed.len() {
        discrepancies.push(format!("+{}", observed[oi]));
        oi += 1;
    }

    discrepancies
}

/// Write a verbose report of the discrepancies, with a `Unexpected
/// files:` header before the first one, per `spec.md` §4.3.
pub(crate) fn write_report(discrepancies: &[String], writer: &mut impl std::fmt::Write) {
    if discrepancies.is_empty() {
        return;
    }
    let _ = writeln!(writer, "Unexpected files:");
    for line in discrepancies {
        let _ = writeln!(writer, "{}", line);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn spec(name: &str, input: &str, output: &str) -> FileSpec {
        FileSpec {
            name: name.to_string(),
            input: input.to_string(),
            output: output.to_string(),
        }
    }

    #[test]
    fn missing_expected_file_is_reported() {
        let expected = vec![spec("a.txt", "a-in.txt", "a-out.txt")];
        let observed: Vec<String> = Vec::new();
        let got = compare_files(&expected, &observed, std::path::Path::new("."), |_| None, &Default::default());
        assert_eq!(got, vec!["-a.txt".to_string()]);
    }

    #[test]
    fn extra_observed_file_is_reported() {
        let expected: Vec<FileSpec> = Vec::new();
        let observed = vec!["extra.txt".to_string()];
        let got = compare_files(&expected, &observed, std::path::Path::new("."), |_| None, &Default::default());
        assert_eq!(got, vec!["+extra.txt".to_string()]);
    }

    #[test]
    fn matched_pair_without_comparator_is_skipped() {
        let expected = vec![spec("a.txt", "a-in.txt", "a-out.txt")];
        let observed = vec!["a.txt".to_string()];
        let got = compare_files(
            &expected,
            &observed,
            std::path::Path::new("."),
            |_| Some(std::path::PathBuf::from("a-out.txt")),
            &Default::default(),
        );
        assert!(got.is_empty());
    }

    #[test]
    fn file_del_entries_do_not_participate() {
        let expected = vec![spec("a.txt", "a-in.txt", "")];
        let observed: Vec<String> = Vec::new();
        let got = compare_files(&expected, &observed, std::path::Path::new("."), |_| None, &Default::default());
        assert!(got.is_empty());
    }
}
