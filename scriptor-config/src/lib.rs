//! Shared configuration loader for the Scriptor toolchain.
//!
//! `defaults/scriptor.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`ScriptorConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use scriptor_babel::formats::markdown::expander::{ExpanderOptions, Extensions};
use scriptor_babel::formats::markdown::serializer::{HeadingStyle, SerializerRules};
use scriptor_babel::formats::markdown::MarkdownConverter;
use scriptor_babel::lint::{BannedPhrase, LintRules, StopTerm};
use scriptor_babel::session::SessionOptions;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/scriptor.default.toml");

/// Top-level configuration consumed by Scriptor applications.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptorConfig {
    pub markdown: MarkdownConfig,
    pub session: SessionConfig,
    pub diff: DiffConfig,
    pub lint: LintConfig,
}

impl ScriptorConfig {
    /// Markdown converter with the configured rules and import options.
    pub fn converter(&self) -> MarkdownConverter {
        MarkdownConverter::new()
            .with_rules(SerializerRules::from(&self.markdown))
            .with_import_options(ExpanderOptions::from(&self.markdown.import))
    }
}

/// Mirrors the knobs exposed by the Markdown writer.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub heading_style: HeadingStyleConfig,
    pub bullet_marker: char,
    pub code_fence: String,
    pub emphasis_delimiter: String,
    pub strong_delimiter: String,
    pub strike_delimiter: String,
    pub horizontal_rule: String,
    pub diagram_language: String,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyleConfig {
    Atx,
    Setext,
}

impl From<HeadingStyleConfig> for HeadingStyle {
    fn from(style: HeadingStyleConfig) -> Self {
        match style {
            HeadingStyleConfig::Atx => HeadingStyle::Atx,
            HeadingStyleConfig::Setext => HeadingStyle::Setext,
        }
    }
}

impl From<&MarkdownConfig> for SerializerRules {
    fn from(config: &MarkdownConfig) -> Self {
        SerializerRules {
            heading_style: config.heading_style.into(),
            bullet_marker: config.bullet_marker,
            code_fence: config.code_fence.clone(),
            emphasis_delimiter: config.emphasis_delimiter.clone(),
            strong_delimiter: config.strong_delimiter.clone(),
            strike_delimiter: config.strike_delimiter.clone(),
            horizontal_rule: config.horizontal_rule.clone(),
            diagram_language: config.diagram_language.clone(),
        }
    }
}

/// How Markdown is expanded when it is read back.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub disallow_raw_markup: bool,
    pub autolink_bare_urls: bool,
    pub convert_line_breaks: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
}

impl From<&ImportConfig> for ExpanderOptions {
    fn from(config: &ImportConfig) -> Self {
        ExpanderOptions {
            disallow_raw_markup: config.disallow_raw_markup,
            autolink_bare_urls: config.autolink_bare_urls,
            convert_line_breaks: config.convert_line_breaks,
            extensions: Extensions {
                tables: config.tables,
                strikethrough: config.strikethrough,
                tasklists: config.tasklists,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub draft_key: String,
    pub default_file_name: String,
    pub export_extension: String,
}

impl From<&SessionConfig> for SessionOptions {
    fn from(config: &SessionConfig) -> Self {
        SessionOptions {
            draft_key: config.draft_key.clone(),
            default_file_name: config.default_file_name.clone(),
            export_extension: config.export_extension.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiffConfig {
    pub style: DiffStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStyle {
    Text,
    Html,
}

/// Prose checks run by `scriptor check`.
#[derive(Debug, Clone, Deserialize)]
pub struct LintConfig {
    pub sentence_word_limit: usize,
    #[serde(default)]
    pub banned_phrases: Vec<BannedPhraseConfig>,
    #[serde(default)]
    pub stop_terms: Vec<StopTermConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BannedPhraseConfig {
    pub phrase: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default = "whole_word_default")]
    pub whole_word: bool,
}

/// A bare term, or a table that can turn whole-word matching off.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StopTermConfig {
    Term(String),
    Detailed {
        term: String,
        #[serde(default = "whole_word_default")]
        whole_word: bool,
    },
}

fn whole_word_default() -> bool {
    true
}

impl From<&LintConfig> for LintRules {
    fn from(config: &LintConfig) -> Self {
        LintRules {
            sentence_word_limit: config.sentence_word_limit,
            banned_phrases: config
                .banned_phrases
                .iter()
                .map(|banned| BannedPhrase {
                    phrase: banned.phrase.clone(),
                    hint: banned.hint.clone(),
                    whole_word: banned.whole_word,
                })
                .collect(),
            stop_terms: config
                .stop_terms
                .iter()
                .map(|stop| match stop {
                    StopTermConfig::Term(term) => StopTerm::new(term),
                    StopTermConfig::Detailed { term, whole_word } => StopTerm {
                        term: term.clone(),
                        whole_word: *whole_word,
                    },
                })
                .collect(),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ScriptorConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ScriptorConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptor_babel::ir::nodes::{RichDocument, RichNode};

    #[test]
    fn defaults_match_library_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(SerializerRules::from(&config.markdown), SerializerRules::default());
        assert_eq!(
            ExpanderOptions::from(&config.markdown.import),
            ExpanderOptions::default()
        );
        assert_eq!(SessionOptions::from(&config.session), SessionOptions::default());
        assert_eq!(config.diff.style, DiffStyle::Text);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("markdown.emphasis_delimiter", "*")
            .expect("override to apply")
            .set_override("diff.style", "html")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.markdown.emphasis_delimiter, "*");
        assert_eq!(config.diff.style, DiffStyle::Html);
    }

    #[test]
    fn layers_user_files_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scriptor.toml");
        std::fs::write(
            &path,
            "[markdown]\nheading_style = \"setext\"\n\n[session]\ndraft_key = \"notes\"\n",
        )
        .expect("write config");

        let config = Loader::new().with_file(&path).build().expect("config to build");
        assert_eq!(config.markdown.heading_style, HeadingStyleConfig::Setext);
        assert_eq!(config.markdown.bullet_marker, '-');
        assert_eq!(config.session.draft_key, "notes");
    }

    #[test]
    fn default_lint_rules() {
        let config = load_defaults().expect("defaults to deserialize");
        let rules = LintRules::from(&config.lint);
        assert_eq!(rules.sentence_word_limit, 60);
        assert_eq!(rules.banned_phrases.len(), 4);
        assert_eq!(
            rules.banned_phrases[0],
            BannedPhrase::new("and/or", "choose one, and or or")
        );
        assert!(rules.stop_terms.is_empty());
    }

    #[test]
    fn reads_stop_terms_in_both_forms() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scriptor.toml");
        std::fs::write(
            &path,
            "[lint]\nsentence_word_limit = 20\nstop_terms = [\"PII\", { term = \"ib\", whole_word = false }]\n",
        )
        .expect("write config");

        let config = Loader::new().with_file(&path).build().expect("config to build");
        let rules = LintRules::from(&config.lint);
        assert_eq!(rules.sentence_word_limit, 20);
        assert_eq!(
            rules.stop_terms,
            vec![
                StopTerm::new("PII"),
                StopTerm {
                    term: "ib".to_string(),
                    whole_word: false,
                },
            ]
        );
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/scriptor.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.session.export_extension, "md");
    }

    #[test]
    fn converter_uses_configured_rules() {
        let config = Loader::new()
            .set_override("markdown.strong_delimiter", "__")
            .expect("override to apply")
            .build()
            .expect("config to build");
        let doc = RichDocument::new(vec![RichNode::paragraph(vec![RichNode::element(
            "strong",
            vec![RichNode::text("loud")],
        )])]);
        assert_eq!(config.converter().to_text(&doc), "__loud__\n");
    }
}
