use crate::fixture;
use scriptor_babel::diff::LineKind;
use scriptor_babel::formats::markdown::MarkdownConverter;
use scriptor_babel::ir::nodes::{RichDocument, RichNode};
use scriptor_babel::session::{
    DirtyState, DraftStore, EditMode, FileDraftStore, Session, SessionOptions,
};

fn session_in(dir: &std::path::Path) -> Session {
    Session::new(MarkdownConverter::new())
        .with_drafts(FileDraftStore::new(dir))
        .start()
}

#[test]
fn test_draft_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut session = session_in(dir.path());
    let report = session.set_source("# Draft\n\nUnsaved words here\n");
    assert_eq!(report.state, DirtyState::Dirty);
    assert_eq!(report.words, 5);
    drop(session);

    let restored = session_in(dir.path());
    assert_eq!(restored.snapshot(), "# Draft\n\nUnsaved words here\n");
    assert_eq!(restored.state(), DirtyState::Clean);
    assert_eq!(restored.mode(), EditMode::Rich);
    assert_eq!(
        restored.current_text(),
        "# Draft\n\nUnsaved words here\n"
    );
}

#[test]
fn test_custom_draft_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = SessionOptions {
        draft_key: "notes".to_string(),
        ..SessionOptions::default()
    };
    let mut session = Session::new(MarkdownConverter::new())
        .with_options(options)
        .with_drafts(FileDraftStore::new(dir.path()))
        .start();
    session.set_source("text\n");

    let store = FileDraftStore::new(dir.path());
    assert_eq!(store.read("notes").as_deref(), Some("text\n"));
    assert_eq!(store.read("draft"), None);
}

#[test]
fn test_load_edit_export_cycle() {
    let mut session = Session::new(MarkdownConverter::new()).start();

    let source = fixture("kitchensink.md");
    session
        .load("kitchensink.txt", Some("text/plain"), &source)
        .expect("load");
    assert_eq!(session.header().get("title"), Some("Kitchen sink"));
    assert_eq!(session.file_name(), Some("kitchensink.txt"));

    let mut children = session.document().children.clone();
    children.push(RichNode::paragraph(vec![RichNode::text("Appended")]));
    let report = session.replace_document(RichDocument::new(children));
    assert_eq!(report.state, DirtyState::Dirty);
    assert!(session.confirm_before_close());

    let changes = session.unsaved_changes();
    assert!(changes
        .iter()
        .any(|e| e.kind == LineKind::Insert && e.line == "Appended"));

    let exported = session.export().expect("exported");
    assert_eq!(exported.file_name, "kitchensink.md");
    assert!(exported.contents.starts_with("---\ntitle: Kitchen sink\nauthor: Scriptor\n---\n\n# Kitchen sink\n"));
    assert!(exported.contents.ends_with("Appended\n"));
    assert!(!session.confirm_before_close());

    let baseline = session.compare(&exported.contents);
    assert!(baseline.iter().all(|e| e.kind == LineKind::Context));
}
