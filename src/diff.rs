//! Array comparator: quiet equality check plus a verbose Myers O(ND)
//! minimal-diff renderer.
//!
//! The C++ original (`examples/original_source/src/CompareArrays.cc`)
//! only walks the two arrays pairwise and reports whatever doesn't line
//! up -- not a minimal diff. `spec.md` §4.2 upgrades this to the real
//! Myers shortest-edit-script algorithm while keeping the original's
//! output convention: a `Unexpected <what>:` header on first mismatch,
//! then `-`/`+`/` ` prefixed lines in source order.

/// `true` iff the two sequences are equal element-wise.
pub(crate) fn compare_quiet(expected: &[String], got: &[String]) -> bool {
    expected == got
}

#[derive(Debug, PartialEq, Eq)]
enum Edit<'a> {
    Context(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

/// Compare `expected` against `got`; if unequal, write a minimal diff to
/// `writer` headed by `Unexpected <what>:`. Returns whether they were
/// equal (same contract as [`compare_quiet`]).
pub(crate) fn compare_verbose(
    expected: &[String],
    got: &[String],
    what: &str,
    writer: &mut impl std::fmt::Write,
) -> bool {
    if compare_quiet(expected, got) {
        return true;
    }

    let script = myers_diff(expected, got);
    let _ = writeln!(writer, "Unexpected {}:", what);
    for edit in script {
        match edit {
            Edit::Context(line) => {
                let _ = writeln!(writer, " {}", line);
            }
            Edit::Delete(line) => {
                let _ = writeln!(writer, "-{}", line);
            }
            Edit::Insert(line) => {
                let _ = writeln!(writer, "+{}", line);
            }
        }
    }
    false
}

/// Greatest `x` reachable on diagonal `k` for edit distance `d`, stored
/// in a flat array offset by `max` (so negative diagonals are valid
/// indices).
struct VArray {
    data: Vec<i32>,
    offset: i32,
}

impl VArray {
    fn new(max: i32) -> Self {
        Self {
            data: vec![0; (2 * max + 1).max(1) as usize],
            offset: max,
        }
    }

    fn get(&self, k: i32) -> i32 {
        self.data[(k + self.offset) as usize]
    }

    fn set(&mut self, k: i32, value: i32) {
        self.data[(k + self.offset) as usize] = value;
    }
}

fn myers_diff<'a>(expected: &'a [String], got: &'a [String]) -> Vec<Edit<'a>> {
    let n = expected.len() as i32;
    let m = got.len() as i32;
    let max = n + m;

    let mut v = VArray::new(max.max(1));
    let mut history: Vec<VArray> = Vec::new();
    let mut found_d = max;

    'outer: for d in 0..=max {
        let mut k = -d;
        while k <= d {
            let go_down = k == -d || (k != d && v.get(k - 1) < v.get(k + 1));
            let mut x = if go_down { v.get(k + 1) } else { v.get(k - 1) + 1 };
            let mut y = x - k;
            while x < n && y < m && expected[x as usize] == got[y as usize] {
                x += 1;
                y += 1;
            }
            v.set(k, x);
            if x >= n && y >= m {
                found_d = d;
                history.push(snapshot(&v, max));
                break 'outer;
            }
            k += 2;
        }
        history.push(snapshot(&v, max));
    }

    backtrack(expected, got, &history, found_d, max)
}

fn snapshot(v: &VArray, _max: i32) -> VArray {
    VArray {
        data: v.data.clone(),
        offset: v.offset,
    }
}

fn backtrack<'a>(
    expected: &'a [String],
    got: &'a [String],
    history: &[VArray],
    found_d: i32,
    _max: i32,
) -> Vec<Edit<'a>> {
    let mut x = expected.len() as i32;
    let mut y = got.len() as i32;
    let mut edits_rev: Vec<Edit<'a>> = Vec::new();

    let mut d = found_d;
    while d > 0 {
        let v = &history[(d - 1) as usize];
        let k = x - y;
        let go_down = k == -d || (k != d && v.get(k - 1) < v.get(k + 1));
        let prev_k = if go_down { k + 1 } else { k - 1 };
        let prev_x = v.get(prev_k);
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            edits_rev.push(Edit::Context(&expected[x as usize]));
        }

        if x == prev_x {
            y -= 1;
            edits_rev.push(Edit::Insert(&got[y as usize]));
        } else {
            x -= 1;
            edits_rev.push(Edit::Delete(&expected[x as usize]));
        }

        d -= 1;
    }

    while x > 0 && y > 0 {
        x -= 1;
        y -= 1;
        edits_rev.push(Edit::Context(&expected[x as usize]));
    }

    edits_rev.reverse();
    edits_rev
}

#[cfg(test)]
mod test {
    use super::*;

    fn lines(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn equal_sequences_compare_quiet_true() {
        let a = lines(&["a", "b", "c"]);
        assert!(compare_quiet(&a, &a));
    }

    #[test]
    fn equal_sequences_produce_no_diff_output() {
        let a = lines(&["a", "b", "c"]);
        let mut out = String::new();
        assert!(compare_verbose(&a, &a, "output", &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn single_substitution_reported_per_spec_example() {
        let expected = lines(&["a", "b", "c"]);
        let got = lines(&["a", "x", "c"]);
        let mut out = String::new();
        assert!(!compare_verbose(&expected, &got, "output", &mut out));
        assert_eq!(out, "Unexpected output:\n a\n-b\n+x\n c\n");
    }

    #[test]
    fn pure_insertion() {
        let expected = lines(&["a", "c"]);
        let got = lines(&["a", "b", "c"]);
        let mut out = String::new();
        assert!(!compare_verbose(&expected, &got, "stdout", &mut out));
        assert_eq!(out, "Unexpected stdout:\n a\n+b\n c\n");
    }

    #[test]
    fn pure_deletion() {
        let expected = lines(&["a", "b", "c"]);
        let got = lines(&["a", "c"]);
        let mut out = String::new();
        assert!(!compare_verbose(&expected, &got, "stdout", &mut out));
        assert_eq!(out, "Unexpected stdout:\n a\n-b\n c\n");
    }

    #[test]
    fn empty_vs_empty_is_equal() {
        let a: Vec<String> = Vec::new();
        assert!(compare_quiet(&a, &a));
    }

    #[test]
    fn edit_distance_matches_n_plus_m_minus_2_lcs() {
        // len(A) + len(B) - 2*lcs(A,B); lcs(abc,axc) = 2 ("a","c")
        let expected = lines(&["a", "b", "c"]);
        let got = lines(&["a", "x", "c"]);
        let edits = myers_diff(&expected, &got);
        let non_context = edits
            .iter()
            .filter(|e| !matches!(e, Edit::Context(_)))
            .count();
        assert_eq!(non_context, 2); // one delete + one insert = edit distance 2
    }
}
