//! Change-tracking session
//!
//! A [`Session`] is everything an editor host keeps between keystrokes: the
//! edit mode, the loaded file name, the metadata header, the rich document
//! (or the raw source buffer while in source mode) and the snapshot of the
//! last persisted payload.
//!
//! # State
//!
//! ```text
//!            edit (payload != snapshot)
//!   Clean ─────────────────────────────▶ Dirty
//!     ▲                                    │
//!     └──────── load / export ─────────────┘
//! ```
//!
//! Every input goes through the same step: recompute the payload, write it to
//! the draft store, compare with the snapshot and, when they differ, build a
//! character-level preview of the unsaved changes. The snapshot only moves on
//! load and export.
//!
//! The host is a plain caller: each method returns its result, nothing is
//! registered as a callback. Notifications ("Loaded notes.md", "Nothing to
//! export") go through the [`Notifier`] the session was built with.

pub mod draft;
pub mod notify;
pub mod sample;

use crate::common::header::{self, MetadataHeader};
use crate::common::text::{char_count, word_count};
use crate::diff::{diff_chars, diff_lines, InlineDiffSpan, LineDiffEntry};
use crate::error::{FormatError, SessionError};
use crate::formats::markdown::MarkdownConverter;
use crate::ir::nodes::RichDocument;
use crate::transforms;
use serde::Serialize;

pub use draft::{DraftStore, FileDraftStore, MemoryDraftStore};
pub use notify::{Notifier, Severity, TracingNotifier};
pub use sample::SAMPLE_DOCUMENT;

const ACCEPTED_MIME_TYPES: &[&str] = &["text/markdown", "text/plain"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Key the draft store keeps the working payload under.
    pub draft_key: String,
    /// Export name used when nothing was loaded from a file.
    pub default_file_name: String,
    pub export_extension: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            draft_key: "draft".to_string(),
            default_file_name: "untitled".to_string(),
            export_extension: "md".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    Rich,
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirtyState {
    Clean,
    Dirty,
}

/// What the host needs to refresh its status line after an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputReport {
    pub state: DirtyState,
    pub words: usize,
    pub chars: usize,
    /// Unsaved changes against the snapshot; empty while clean.
    pub preview: Vec<InlineDiffSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub contents: String,
}

pub struct Session {
    options: SessionOptions,
    converter: MarkdownConverter,
    drafts: Box<dyn DraftStore>,
    notifier: Box<dyn Notifier>,
    mode: EditMode,
    file_name: Option<String>,
    header: MetadataHeader,
    document: RichDocument,
    source: String,
    snapshot: String,
    state: DirtyState,
    preview: Vec<InlineDiffSpan>,
}

impl Session {
    /// Empty session with an in-memory draft store and log notifications.
    pub fn new(converter: MarkdownConverter) -> Self {
        Session {
            options: SessionOptions::default(),
            converter,
            drafts: Box::new(MemoryDraftStore::new()),
            notifier: Box::new(TracingNotifier),
            mode: EditMode::Rich,
            file_name: None,
            header: MetadataHeader::new(),
            document: RichDocument::default(),
            source: String::new(),
            snapshot: String::new(),
            state: DirtyState::Clean,
            preview: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_drafts(mut self, drafts: impl DraftStore + 'static) -> Self {
        self.drafts = Box::new(drafts);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Restores the saved draft, or opens the sample document when there is
    /// none. The restored text becomes the snapshot.
    ///
    /// Text the converter cannot read (for instance when it has no import
    /// stages) is opened in source mode instead.
    pub fn start(mut self) -> Self {
        let (text, origin) = match self.drafts.read(&self.options.draft_key) {
            Some(draft) if !draft.is_empty() => (draft, "draft"),
            _ => (SAMPLE_DOCUMENT.to_string(), "sample"),
        };

        if let Err(err) = self.open_text(&text) {
            tracing::warn!(%origin, error = %err, "opening in source mode");
            self.mode = EditMode::Source;
            self.source = text.clone();
        }
        tracing::info!(%origin, len = text.len(), "session started");
        self.mark_persisted(text);
        self
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn state(&self) -> DirtyState {
        self.state
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn header(&self) -> &MetadataHeader {
        &self.header
    }

    pub fn document(&self) -> &RichDocument {
        &self.document
    }

    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn preview(&self) -> &[InlineDiffSpan] {
        &self.preview
    }

    pub fn drafts(&self) -> &dyn DraftStore {
        self.drafts.as_ref()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The full payload as it would be persisted right now.
    ///
    /// In source mode this is the buffer itself; otherwise the header plus the
    /// body serialized from a normalized copy of the document.
    pub fn current_text(&self) -> String {
        match self.mode {
            EditMode::Source => self.source.clone(),
            EditMode::Rich => {
                let doc = transforms::normalize(&self.document);
                header::compose(&self.header, &self.converter.to_text(&doc))
            }
        }
    }

    /// Status for the current payload without recording an input.
    pub fn report(&self) -> InputReport {
        self.report_for(&self.current_text())
    }

    /// The rich surface changed.
    pub fn replace_document(&mut self, document: RichDocument) -> InputReport {
        self.document = document;
        self.mode = EditMode::Rich;
        self.source.clear();
        self.handle_input()
    }

    /// The source buffer changed.
    pub fn set_source(&mut self, text: impl Into<String>) -> InputReport {
        self.source = text.into();
        self.mode = EditMode::Source;
        self.handle_input()
    }

    /// Sets one header field. Blank keys are ignored; values are trimmed.
    pub fn set_header_field(&mut self, key: &str, value: &str) -> InputReport {
        let key = key.trim();
        if !key.is_empty() {
            let value = value.trim();
            self.edit_header(|header| header.insert(key, value));
        }
        self.handle_input()
    }

    pub fn remove_header_field(&mut self, key: &str) -> InputReport {
        let key = key.trim();
        if !key.is_empty() {
            self.edit_header(|header| {
                header.remove(key);
            });
        }
        self.handle_input()
    }

    /// Replaces header and document with a file's contents.
    ///
    /// Accepts `text/markdown` and `text/plain`, or any name ending in `.md`.
    /// A missing MIME type counts as Markdown. On failure the previous state
    /// is kept.
    pub fn load(
        &mut self,
        name: &str,
        mime: Option<&str>,
        raw: &str,
    ) -> Result<InputReport, SessionError> {
        if !is_accepted(name, mime) {
            self.notifier.notify("Unsupported mime type", Severity::Warn);
            return Err(SessionError::UnsupportedFile {
                name: name.to_string(),
                mime: mime.unwrap_or_default().to_string(),
            });
        }

        if let Err(err) = self.open_text(raw) {
            self.notifier.notify("Failed to parse file", Severity::Warn);
            return Err(err.into());
        }

        self.file_name = Some(name.to_string());
        self.mark_persisted(raw.to_string());
        tracing::info!(file = %name, len = raw.len(), "loaded document");
        self.notifier
            .notify(&format!("Loaded {name}"), Severity::Success);
        Ok(self.report_for(raw))
    }

    /// Produces the export file and makes its contents the new snapshot.
    ///
    /// Returns `None`, with a warning, when the payload is blank.
    pub fn export(&mut self) -> Option<ExportedFile> {
        let contents = self.current_text();
        if contents.trim().is_empty() {
            self.notifier.notify("Nothing to export", Severity::Warn);
            return None;
        }

        let base = self
            .file_name
            .as_deref()
            .unwrap_or(&self.options.default_file_name);
        let file_name = replace_extension(base, &self.options.export_extension);

        self.mark_persisted(contents.clone());
        tracing::info!(file = %file_name, len = contents.len(), "exported document");
        self.notifier
            .notify(&format!("Exported {file_name}"), Severity::Success);
        Some(ExportedFile {
            file_name,
            contents,
        })
    }

    /// Line diff from `baseline` to the current payload.
    pub fn compare(&self, baseline: &str) -> Vec<LineDiffEntry> {
        diff_lines(baseline, &self.current_text())
    }

    /// Line diff from the snapshot to the current payload.
    pub fn unsaved_changes(&self) -> Vec<LineDiffEntry> {
        self.compare(&self.snapshot)
    }

    /// Switches between the rich surface and the source buffer.
    ///
    /// Going to source mode fills the buffer with the full payload. Going back
    /// reads the buffer; if that fails the session stays in source mode.
    pub fn toggle_source(&mut self) -> Result<EditMode, SessionError> {
        match self.mode {
            EditMode::Rich => {
                self.source = self.current_text();
                self.mode = EditMode::Source;
            }
            EditMode::Source => {
                let text = self.source.clone();
                if let Err(err) = self.open_text(&text) {
                    self.notifier.notify("Failed to parse file", Severity::Warn);
                    return Err(err.into());
                }
            }
        }
        tracing::debug!(mode = ?self.mode, "toggled edit mode");
        Ok(self.mode)
    }

    /// Whether closing now would lose unsaved changes.
    pub fn confirm_before_close(&self) -> bool {
        self.state == DirtyState::Dirty
    }

    fn handle_input(&mut self) -> InputReport {
        let text = self.current_text();
        self.drafts.write(&self.options.draft_key, &text);

        if text == self.snapshot {
            self.state = DirtyState::Clean;
            self.preview.clear();
        } else {
            self.state = DirtyState::Dirty;
            self.preview = diff_chars(&self.snapshot, &text);
        }
        tracing::debug!(state = ?self.state, len = text.len(), "input handled");
        self.report_for(&text)
    }

    fn report_for(&self, text: &str) -> InputReport {
        InputReport {
            state: self.state,
            words: word_count(text),
            chars: char_count(text),
            preview: self.preview.clone(),
        }
    }

    /// Reads a payload into header and document, switching to rich mode.
    /// Nothing changes unless the body converts.
    fn open_text(&mut self, text: &str) -> Result<(), FormatError> {
        let parsed = header::decompose(text);
        let document = self.converter.from_text(&parsed.body)?;
        self.header = parsed.header;
        self.document = document;
        self.source.clear();
        self.mode = EditMode::Rich;
        Ok(())
    }

    fn mark_persisted(&mut self, text: String) {
        self.drafts.write(&self.options.draft_key, &text);
        self.snapshot = text;
        self.state = DirtyState::Clean;
        self.preview.clear();
    }

    fn edit_header(&mut self, edit: impl FnOnce(&mut MetadataHeader)) {
        match self.mode {
            EditMode::Rich => edit(&mut self.header),
            EditMode::Source => {
                let mut parsed = header::decompose(&self.source);
                edit(&mut parsed.header);
                self.source = header::compose(&parsed.header, &parsed.body);
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("file_name", &self.file_name)
            .field("state", &self.state)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

fn is_accepted(name: &str, mime: Option<&str>) -> bool {
    let mime = mime.filter(|m| !m.is_empty()).unwrap_or("text/markdown");
    let mime_ok = ACCEPTED_MIME_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(mime));
    mime_ok || name.to_ascii_lowercase().ends_with(".md")
}

/// `notes.txt` → `notes.md`; names without an extension just gain one.
fn replace_extension(name: &str, extension: &str) -> String {
    let stem = match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => &name[..dot],
        _ => name,
    };
    format!("{stem}.{extension}")
}
