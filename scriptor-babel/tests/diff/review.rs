use crate::fixture;
use scriptor_babel::diff::render::{lines_to_html, lines_to_text};
use scriptor_babel::diff::{diff_lines, DiffSummary, LineKind};

#[test]
fn test_fixture_versions_diff() {
    let entries = diff_lines(&fixture("baseline.md"), &fixture("updated.md"));
    let script: Vec<(LineKind, &str)> = entries.iter().map(|e| (e.kind, e.line.as_str())).collect();

    assert_eq!(
        script,
        vec![
            (LineKind::Context, "# Notes"),
            (LineKind::Context, ""),
            (LineKind::Context, "one"),
            (LineKind::Delete, "two"),
            (LineKind::Insert, "two-edited"),
            (LineKind::Context, "three"),
            (LineKind::Insert, "four"),
            (LineKind::Context, ""),
        ]
    );
    assert_eq!(
        DiffSummary::of(&entries),
        DiffSummary {
            context: 5,
            inserted: 2,
            deleted: 1
        }
    );
}

#[test]
fn test_fixture_versions_render_as_text() {
    let entries = diff_lines(&fixture("baseline.md"), &fixture("updated.md"));
    assert_eq!(
        lines_to_text(&entries),
        "  # Notes\n  \n  one\n- two\n+ two-edited\n  three\n+ four\n  \n"
    );
}

#[test]
fn test_fixture_versions_render_as_html() {
    let entries = diff_lines(&fixture("baseline.md"), &fixture("updated.md"));
    let html = lines_to_html(&entries);
    assert!(html.starts_with("<div># Notes</div>\n<div></div>\n<div>one</div>\n"));
    assert!(html.contains("<div class=\"removed\">- two</div>\n<div class=\"added\">+ two-edited</div>"));
    assert_eq!(html.lines().count(), entries.len());
}

#[test]
fn test_crlf_baseline_matches_lf_update() {
    let baseline = fixture("baseline.md").replace('\n', "\r\n");
    let entries = diff_lines(&baseline, &fixture("baseline.md"));
    assert!(DiffSummary::of(&entries).is_unchanged());
}

#[test]
fn test_everything_against_nothing() {
    let text = fixture("updated.md");
    assert!(diff_lines(&text, "")
        .iter()
        .all(|e| e.kind == LineKind::Delete));
    assert!(diff_lines("", &text)
        .iter()
        .all(|e| e.kind == LineKind::Insert));
}
