//! Prose checks over Markdown source
//!
//! Three checks run over the raw text, each producing [`LintIssue`]s that point
//! back into it:
//!
//! - sentences longer than [`LintRules::sentence_word_limit`] words (`warn`)
//! - banned phrases, reported with the hint that goes with them (`error`)
//! - stop terms, words that should not appear at all (`info`)
//!
//! Phrase and term matching is case-insensitive. A whole-word pattern only
//! requires a word boundary on the sides where the phrase itself starts or ends
//! with a word character, so `etc.` still matches before a space.
//!
//! Offsets are byte offsets into the checked text; columns count characters.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A sentence ends after `.`, `!` or `?` followed by whitespace.
static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence break regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
        }
    }
}

/// One finding, located in the checked text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub severity: Severity,
    pub message: String,
    /// Byte offset of the first character
    pub from: usize,
    /// Byte offset just past the last character
    pub to: usize,
    /// 1-based line of `from`
    pub line: usize,
    /// 1-based character column of `from`
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannedPhrase {
    pub phrase: String,
    /// Suggested alternative, shown in the message
    pub hint: String,
    pub whole_word: bool,
}

impl BannedPhrase {
    pub fn new(phrase: &str, hint: &str) -> Self {
        BannedPhrase {
            phrase: phrase.to_string(),
            hint: hint.to_string(),
            whole_word: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTerm {
    pub term: String,
    pub whole_word: bool,
}

impl StopTerm {
    pub fn new(term: &str) -> Self {
        StopTerm {
            term: term.to_string(),
            whole_word: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintRules {
    pub sentence_word_limit: usize,
    pub banned_phrases: Vec<BannedPhrase>,
    pub stop_terms: Vec<StopTerm>,
}

impl Default for LintRules {
    fn default() -> Self {
        LintRules {
            sentence_word_limit: 40,
            banned_phrases: Vec::new(),
            stop_terms: Vec::new(),
        }
    }
}

/// Maps byte offsets to 1-based line and column.
struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(index, _)| index + 1));
        LineIndex { text, starts }
    }

    fn locate(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset);
        let line_start = self.starts[line - 1];
        let column = self.text[line_start..offset].chars().count() + 1;
        (line, column)
    }

    fn issue(&self, severity: Severity, message: String, from: usize, to: usize) -> LintIssue {
        let (line, column) = self.locate(from);
        LintIssue {
            severity,
            message,
            from,
            to,
            line,
            column,
        }
    }
}

/// Run every check over `text`, issues ordered by position.
pub fn lint(text: &str, rules: &LintRules) -> Vec<LintIssue> {
    let index = LineIndex::new(text);
    let mut issues = long_sentences(text, rules.sentence_word_limit, &index);

    for banned in &rules.banned_phrases {
        let message = if banned.hint.is_empty() {
            format!("Avoid \"{}\"", banned.phrase)
        } else {
            format!("Avoid \"{}\" ({})", banned.phrase, banned.hint)
        };
        issues.extend(
            find_all(text, &banned.phrase, banned.whole_word)
                .into_iter()
                .map(|(from, to)| index.issue(Severity::Error, message.clone(), from, to)),
        );
    }

    for stop in &rules.stop_terms {
        let message = format!("Contains stop term \"{}\"", stop.term);
        issues.extend(
            find_all(text, &stop.term, stop.whole_word)
                .into_iter()
                .map(|(from, to)| index.issue(Severity::Info, message.clone(), from, to)),
        );
    }

    issues.sort_by_key(|issue| (issue.from, issue.severity));
    tracing::debug!(issues = issues.len(), "lint finished");
    issues
}

/// Byte spans of sentences, leading whitespace excluded.
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for found in SENTENCE_BREAK.find_iter(text) {
        // The punctuation is ASCII, one byte.
        spans.push((start, found.start() + 1));
        start = found.end();
    }
    spans.push((start, text.len()));
    spans
        .into_iter()
        .filter_map(|(from, to)| {
            let sentence = &text[from..to];
            let trimmed = sentence.trim_start();
            let from = from + sentence.len() - trimmed.len();
            (from < to).then_some((from, to))
        })
        .collect()
}

fn long_sentences(text: &str, limit: usize, index: &LineIndex<'_>) -> Vec<LintIssue> {
    sentence_spans(text)
        .into_iter()
        .filter_map(|(from, to)| {
            let words = text[from..to].split_whitespace().count();
            (words > limit).then(|| {
                index.issue(
                    Severity::Warn,
                    format!("Sentence longer than {limit} words ({words})"),
                    from,
                    to,
                )
            })
        })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn phrase_pattern(phrase: &str, whole_word: bool) -> String {
    let escaped = regex::escape(phrase);
    if !whole_word {
        return format!("(?i){escaped}");
    }
    let open = if phrase.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let close = if phrase.chars().last().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    format!("(?i){open}{escaped}{close}")
}

fn find_all(text: &str, phrase: &str, whole_word: bool) -> Vec<(usize, usize)> {
    if phrase.is_empty() {
        return Vec::new();
    }
    match Regex::new(&phrase_pattern(phrase, whole_word)) {
        Ok(pattern) => pattern
            .find_iter(text)
            .map(|found| (found.start(), found.end()))
            .collect(),
        Err(err) => {
            tracing::warn!(%phrase, error = %err, "skipping lint phrase");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> LintRules {
        LintRules {
            sentence_word_limit: 5,
            banned_phrases: vec![
                BannedPhrase::new("and/or", "choose one"),
                BannedPhrase::new("etc.", "be specific"),
            ],
            stop_terms: vec![StopTerm::new("PII")],
        }
    }

    #[test]
    fn flags_long_sentences_with_position() {
        let text = "Short one. This sentence has far too many words in it.\nOk.";
        let issues = lint(text, &rules());
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.severity, Severity::Warn);
        assert_eq!(issue.message, "Sentence longer than 5 words (9)");
        assert_eq!(&text[issue.from..issue.to], "This sentence has far too many words in it.");
        assert_eq!((issue.line, issue.column), (1, 12));
    }

    #[test]
    fn sentence_limit_is_exclusive() {
        let text = "one two three four five.";
        assert!(lint(text, &rules()).is_empty());
    }

    #[test]
    fn finds_banned_phrases_case_insensitively() {
        let text = "Apples AND/OR pears,\netc. and so on";
        let issues = lint(text, &rules());
        let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Avoid \"and/or\" (choose one)",
                "Avoid \"etc.\" (be specific)"
            ]
        );
        assert_eq!(&text[issues[0].from..issues[0].to], "AND/OR");
        assert_eq!((issues[1].line, issues[1].column), (2, 1));
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
    }

    #[test]
    fn whole_word_matching_skips_partial_words() {
        let mut rules = LintRules {
            stop_terms: vec![StopTerm::new("ib")],
            ..LintRules::default()
        };
        assert!(lint("A fibre and a rib.", &rules).is_empty());
        assert_eq!(lint("Ask the IB team.", &rules).len(), 1);

        rules.stop_terms[0].whole_word = false;
        assert_eq!(lint("A fibre and a rib.", &rules).len(), 2);
    }

    #[test]
    fn reports_stop_terms_as_info() {
        let issues = lint("No PII here, pii there.", &rules());
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Info);
        assert_eq!(issues[0].message, "Contains stop term \"PII\"");
        assert_eq!(issues[1].column, 14);
    }

    #[test]
    fn columns_count_characters() {
        let rules = LintRules {
            stop_terms: vec![StopTerm::new("PII")],
            ..LintRules::default()
        };
        let issues = lint("héllo PII", &rules);
        assert_eq!(issues[0].from, 7);
        assert_eq!(issues[0].column, 7);
    }

    #[test]
    fn issues_are_ordered_by_position() {
        let text = "PII and/or a very long sentence that goes on. Then etc. PII";
        let issues = lint(text, &rules());
        let froms: Vec<usize> = issues.iter().map(|i| i.from).collect();
        let mut sorted = froms.clone();
        sorted.sort();
        assert_eq!(froms, sorted);
        assert_eq!(issues[0].severity, Severity::Warn);
        assert_eq!(issues[1].severity, Severity::Info);
        assert_eq!(issues.len(), 5);
    }

    #[test]
    fn empty_text_has_no_issues() {
        assert!(lint("", &rules()).is_empty());
        assert!(lint("   \n", &rules()).is_empty());
    }
}
