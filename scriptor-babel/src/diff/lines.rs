//! Line diff engine
//!
//! Longest-common-subsequence diff over lines. `dp[i][j]` holds the LCS length
//! of `a[i..]` and `b[j..]`, filled bottom-up; the script is read off by
//! walking from `(0, 0)`. When skipping either side keeps the same LCS length
//! the baseline line is deleted first, so replacements come out as a delete
//! followed by an insert.
//!
//! Time and memory are O(m·n), fine for documents of a few thousand lines.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Context,
    Insert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiffEntry {
    pub kind: LineKind,
    pub line: String,
}

impl LineDiffEntry {
    fn new(kind: LineKind, line: &str) -> Self {
        LineDiffEntry {
            kind,
            line: line.to_string(),
        }
    }
}

/// Counts of each entry kind in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiffSummary {
    pub context: usize,
    pub inserted: usize,
    pub deleted: usize,
}

impl DiffSummary {
    pub fn of(entries: &[LineDiffEntry]) -> Self {
        entries
            .iter()
            .fold(DiffSummary::default(), |mut summary, entry| {
                match entry.kind {
                    LineKind::Context => summary.context += 1,
                    LineKind::Insert => summary.inserted += 1,
                    LineKind::Delete => summary.deleted += 1,
                }
                summary
            })
    }

    pub fn is_unchanged(&self) -> bool {
        self.inserted == 0 && self.deleted == 0
    }
}

/// Splits on `\n`, dropping a `\r` before it. The empty string has no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Edit script turning `baseline` into `updated`.
pub fn diff_lines(baseline: &str, updated: &str) -> Vec<LineDiffEntry> {
    let a = split_lines(baseline);
    let b = split_lines(updated);
    let (m, n) = (a.len(), b.len());

    let width = n + 1;
    let mut dp = vec![0usize; (m + 1) * width];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            dp[i * width + j] = if a[i] == b[j] {
                dp[(i + 1) * width + j + 1] + 1
            } else {
                dp[(i + 1) * width + j].max(dp[i * width + j + 1])
            };
        }
    }

    let mut entries = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if a[i] == b[j] {
            entries.push(LineDiffEntry::new(LineKind::Context, a[i]));
            i += 1;
            j += 1;
        } else if dp[(i + 1) * width + j] >= dp[i * width + j + 1] {
            entries.push(LineDiffEntry::new(LineKind::Delete, a[i]));
            i += 1;
        } else {
            entries.push(LineDiffEntry::new(LineKind::Insert, b[j]));
            j += 1;
        }
    }
    entries.extend(a[i..].iter().map(|line| LineDiffEntry::new(LineKind::Delete, line)));
    entries.extend(b[j..].iter().map(|line| LineDiffEntry::new(LineKind::Insert, line)));
    entries
}
