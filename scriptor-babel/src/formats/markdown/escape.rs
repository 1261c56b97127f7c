//! Escaping rules for Markdown text
//!
//! Text runs are escaped the way comrak's CommonMark formatter escapes them:
//! inline markup characters always, block markers (`-`, `+`, `=`, `1.`) only
//! where a line's content begins. On top of that, bare `www.` and `scheme://`
//! runs are broken up so the autolink extension leaves them as text.
//!
//! Emphasis delimiters are checked against the CommonMark flanking rules so a
//! run written as `_x_` reads back as emphasis rather than literal underscores.

/// Where the writer stands on the current output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineState {
    /// True from the start of a line until something other than a digit is written.
    pub begin_content: bool,
    /// Last character written, if any.
    pub prev: Option<char>,
    /// Length of the current word while it is made of `w` only.
    w_run: Option<u8>,
}

impl LineState {
    pub fn line_start() -> Self {
        LineState {
            begin_content: true,
            prev: None,
            w_run: Some(0),
        }
    }

    /// Mid-line, directly after `prev`.
    pub fn after(prev: Option<char>) -> Self {
        let mut state = LineState {
            begin_content: false,
            prev: None,
            w_run: Some(0),
        };
        if let Some(prev) = prev {
            state.push(prev);
        }
        state
    }

    /// Records literal markup that was written without escaping.
    pub fn wrote(&mut self, markup: &str) {
        for c in markup.chars() {
            self.push(c);
        }
    }

    fn push(&mut self, c: char) {
        self.begin_content = self.begin_content && c.is_ascii_digit();
        self.w_run = match (c, self.w_run) {
            ('w', Some(run)) => Some(run.saturating_add(1)),
            (c, _) if c.is_alphanumeric() => None,
            _ => Some(0),
        };
        self.prev = Some(c);
    }
}

/// Escapes one run of already collapsed text.
pub fn escape_run(text: &str, state: &mut LineState, in_table: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (index, &c) in chars.iter().enumerate() {
        let next = chars.get(index + 1).copied();
        let follows_digit = state.prev.is_some_and(|prev| prev.is_ascii_digit());
        let escape = match c {
            '*' | '_' | '[' | ']' | '#' | '<' | '>' | '\\' | '`' | '~' => true,
            '&' => next.is_some_and(|n| n.is_ascii_alphabetic()),
            '|' => in_table,
            '-' | '+' | '=' => state.begin_content && !follows_digit,
            ')' => closes_ordered_marker(state, follows_digit, next),
            // `www.` at a word start turns into a link.
            '.' => closes_ordered_marker(state, follows_digit, next) || state.w_run == Some(3),
            ':' => chars.get(index + 1..index + 3) == Some(&['/', '/'][..]),
            _ => false,
        };

        if (c as u32) < 0x20 {
            out.push_str(&format!("&#{};", c as u32));
        } else {
            if escape {
                out.push('\\');
            }
            out.push(c);
        }
        state.push(c);
    }
    out
}

fn closes_ordered_marker(state: &LineState, follows_digit: bool, next: Option<char>) -> bool {
    state.begin_content && follows_digit && next.map_or(true, char::is_whitespace)
}

/// Escapes a link or image title for a `"…"` wrapper.
pub fn escape_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if matches!(c, '`' | '<' | '>' | '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flank {
    Space,
    Punct,
    Word,
}

fn flank(c: Option<char>) -> Flank {
    match c {
        None => Flank::Space,
        Some(c) if c.is_whitespace() => Flank::Space,
        Some(c) if c.is_ascii_punctuation() || !(c.is_ascii() || c.is_alphanumeric()) => {
            Flank::Punct
        }
        Some(_) => Flank::Word,
    }
}

fn left_flanking(prev: Flank, next: Flank) -> bool {
    next != Flank::Space && (next != Flank::Punct || prev != Flank::Word)
}

fn right_flanking(prev: Flank, next: Flank) -> bool {
    prev != Flank::Space && (prev != Flank::Punct || next != Flank::Word)
}

/// Whether `delimiter` around `core` is read back as emphasis.
///
/// `before` and `after` are the characters written directly outside the
/// delimiters; `None` means a line edge.
pub fn delimiter_fits(
    delimiter: &str,
    before: Option<char>,
    core: &str,
    after: Option<char>,
) -> bool {
    let Some(mark) = delimiter.chars().next() else {
        return false;
    };
    if before == Some(mark) {
        return false;
    }
    let (first, last) = (core.chars().next(), core.chars().last());
    if first.is_none() || first == Some(mark) || last == Some(mark) {
        return false;
    }

    let (open_prev, open_next) = (flank(before), flank(first));
    let open_left = left_flanking(open_prev, open_next);
    let open_right = right_flanking(open_prev, open_next);
    let can_open = open_left && (mark != '_' || !open_right || open_prev == Flank::Punct);

    let (close_prev, close_next) = (flank(last), flank(after));
    let close_left = left_flanking(close_prev, close_next);
    let close_right = right_flanking(close_prev, close_next);
    let can_close = close_right && (mark != '_' || !close_left || close_next == Flank::Punct);

    can_open && can_close
}

/// The other emphasis character with the same run length (`_` ↔ `*`).
pub fn swapped_delimiter(delimiter: &str) -> Option<String> {
    let mark = delimiter.chars().next()?;
    let other = match mark {
        '_' => '*',
        '*' => '_',
        _ => return None,
    };
    Some(other.to_string().repeat(delimiter.chars().count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn esc(text: &str) -> String {
        escape_run(text, &mut LineState::line_start(), false)
    }

    #[test]
    fn escapes_inline_markup_everywhere() {
        assert_eq!(esc("a *b* _c_ [d] `e` ~f~"), r"a \*b\* \_c\_ \[d\] \`e\` \~f\~");
        assert_eq!(esc("x < y > z"), r"x \< y \> z");
        assert_eq!(esc("Item #"), r"Item \#");
    }

    #[test]
    fn escapes_entities_but_not_bare_ampersands() {
        assert_eq!(esc("a & b &amp; &#35;"), r"a & b \&amp; &\#35;");
    }

    #[test]
    fn block_markers_only_at_line_start() {
        assert_eq!(esc("- item"), r"\- item");
        assert_eq!(esc("+ item"), r"\+ item");
        assert_eq!(esc("== x"), r"\== x");
        assert_eq!(esc("a - b + c = d"), "a - b + c = d");
        assert_eq!(esc("1986. A year"), r"1986\. A year");
        assert_eq!(esc("2) two"), r"2\) two");
        assert_eq!(esc("1.5 and 2-3"), "1.5 and 2-3");
    }

    #[test]
    fn line_state_carries_across_runs() {
        let mut state = LineState::line_start();
        assert_eq!(escape_run("12", &mut state, false), "12");
        assert_eq!(escape_run(". x", &mut state, false), r"\. x");

        let mut mid = LineState::after(Some('a'));
        assert_eq!(escape_run("- x", &mut mid, false), "- x");
    }

    #[test]
    fn www_split_across_runs_is_still_escaped() {
        let mut state = LineState::line_start();
        assert_eq!(escape_run("ww", &mut state, false), "ww");
        assert_eq!(escape_run("w.example", &mut state, false), r"w\.example");

        let mut inside = LineState::after(Some('x'));
        assert_eq!(escape_run("www.x", &mut inside, false), "www.x");
    }

    #[test]
    fn pipes_only_in_tables() {
        assert_eq!(esc("a|b"), "a|b");
        assert_eq!(
            escape_run("a|b", &mut LineState::after(None), true),
            r"a\|b"
        );
    }

    #[test]
    fn breaks_up_bare_urls() {
        assert_eq!(esc("see www.example.com now"), r"see www\.example.com now");
        assert_eq!(esc("go https://example.org"), r"go https\://example.org");
        assert_eq!(esc("awww.x"), "awww.x");
    }

    #[test]
    fn escapes_titles() {
        assert_eq!(escape_title(r#"say "hi" \o/"#), r#"say \"hi\" \\o/"#);
    }

    #[test]
    fn underscore_does_not_fit_inside_words() {
        assert!(!delimiter_fits("_", Some('n'), "believ", Some('a')));
        assert!(delimiter_fits("*", Some('n'), "believ", Some('a')));
        assert!(delimiter_fits("_", None, "word", Some(' ')));
    }

    #[test]
    fn punctuation_next_to_a_letter_does_not_fit() {
        assert!(!delimiter_fits("_", None, "a.", Some('b')));
        assert!(!delimiter_fits("*", None, "a.", Some('b')));
        assert!(delimiter_fits("_", None, "a", Some('.')));
    }

    #[test]
    fn same_mark_next_to_delimiter_does_not_fit() {
        assert!(!delimiter_fits("*", Some('*'), "x", None));
        assert!(!delimiter_fits("**", None, "*x*", None));
        assert!(delimiter_fits("**", None, "_x_", None));
    }

    #[test]
    fn swaps_emphasis_characters() {
        assert_eq!(swapped_delimiter("_").as_deref(), Some("*"));
        assert_eq!(swapped_delimiter("**").as_deref(), Some("__"));
        assert_eq!(swapped_delimiter("~~"), None);
    }
}
