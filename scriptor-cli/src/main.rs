// Command-line interface for Scriptor
//
// This binary drives the scriptor-babel library from a terminal: converting between Markdown and
// the editing-surface HTML, exporting a file the way the editor does, reviewing changes between
// two versions, reading metadata headers and checking prose.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected from the file extension,
// while being overwrittable by an explicit --from flag.
// Usage:
//  scriptor <input> --to <format> [--from <format>] [--output <file>]   - Convert between formats (default)
//  scriptor convert <input> --to <format> [--from <format>] [-o <file>] - Same as above (explicit)
//  scriptor export <input> [-o <dir>] [--draft-dir <dir>]               - Normalize and export as <name>.md
//  scriptor diff <baseline> <updated> [--html] [--stat]                 - Line diff between two files
//  scriptor header <input> [--json]                                     - Print the metadata header
//  scriptor check <input> [--json]                                      - Lint the prose of a document
//  scriptor --list-formats                                              - List available formats
//
// Extra Parameters:
//
// Configuration values can be overridden with --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and layers the value over the loaded configuration.
// Example:
//  scriptor notes.md --to markdown --extra-emphasis "*" --extra-heading-style setext

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use scriptor_babel::common::header;
use scriptor_babel::diff::{diff_lines, render, DiffSummary};
use scriptor_babel::formats::{HtmlFormat, MarkdownFormat};
use scriptor_babel::lint::{lint, LintRules, Severity};
use scriptor_babel::session::{FileDraftStore, SessionOptions};
use scriptor_babel::{FormatRegistry, Session};
use scriptor_config::{DiffStyle, Loader, ScriptorConfig};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "export", "diff", "header", "check", "help"];

/// `--extra-<key>` names and the configuration keys they override
const CONFIG_OVERRIDES: &[(&[&str], &str)] = &[
    (&["heading-style"], "markdown.heading_style"),
    (&["bullet", "bullet-marker"], "markdown.bullet_marker"),
    (&["code-fence"], "markdown.code_fence"),
    (&["emphasis"], "markdown.emphasis_delimiter"),
    (&["strong"], "markdown.strong_delimiter"),
    (&["strike"], "markdown.strike_delimiter"),
    (&["hr", "horizontal-rule"], "markdown.horizontal_rule"),
    (&["diagram-language"], "markdown.diagram_language"),
    (&["raw-markup"], "markdown.import.disallow_raw_markup"),
    (&["line-breaks"], "markdown.import.convert_line_breaks"),
    (&["draft-key"], "session.draft_key"),
    (&["diff-style"], "diff.style"),
    (&["sentence-limit", "sentence-word-limit"], "lint.sentence_word_limit"),
];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));

        if let Some(key) = key_opt {
            // A following argument is the value unless it looks like a flag.
            // A lone "-" or "*" is still a value (bullet and emphasis markers).
            let has_value = match args.get(i + 1) {
                Some(next) => !next.starts_with("--") && (next == "-" || !next.starts_with('-')),
                None => false,
            };

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("scriptor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert, export and compare Scriptor Markdown documents")
        .long_about(
            "scriptor works with the Markdown documents written in the Scriptor editor.\n\n\
            Commands:\n  \
            - convert: Transform between markdown and editing-surface html\n  \
            - export:  Normalize a document and write it as <name>.md\n  \
            - diff:    Line diff between a baseline and an updated file\n  \
            - header:  Print the metadata header of a document\n  \
            - check:   Lint the prose against the [lint] rules\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to override configuration values.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            scriptor notes.md --to html                   # Convert to html (stdout)\n  \
            scriptor export notes.txt -o out/             # Writes out/notes.md\n  \
            scriptor diff old.md new.md                   # Unified line diff\n  \
            scriptor notes.md --to markdown --extra-emphasis '*'",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a scriptor.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log conversion steps to stderr (repeat for more detail)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - markdown: Markdown (.md, .markdown)\n  \
                    - html:     Editing-surface html (.html, .htm)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\
                    A metadata header is kept when converting markdown to markdown.\n\n\
                    Examples:\n  \
                    scriptor convert notes.md --to html -o notes.html\n  \
                    scriptor convert page.html --to markdown\n  \
                    scriptor notes.md --to markdown              # 'convert' is optional",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Normalize a document and write it as Markdown")
                .long_about(
                    "Load a file the way the editor does and export it.\n\n\
                    The file must be markdown or plain text. The exported name is the input\n\
                    name with its extension replaced by .md.\n\n\
                    Examples:\n  \
                    scriptor export notes.txt                    # Writes ./notes.md\n  \
                    scriptor export notes.md -o out/ --draft-dir ~/.scriptor",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("DIR")
                        .help("Directory to write the exported file to (defaults to .)")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("draft-dir")
                        .long("draft-dir")
                        .value_name("DIR")
                        .help("Keep the working draft in this directory")
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("Show line changes between two versions of a document")
                .arg(
                    Arg::new("baseline")
                        .help("Baseline file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("updated")
                        .help("Updated file")
                        .required(true)
                        .index(2)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help("Render the diff as html")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("stat")
                        .long("stat")
                        .help("Only print the number of unchanged, inserted and deleted lines")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("header")
                .about("Print the metadata header of a document")
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the header as a JSON object")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Lint the prose of a document")
                .long_about(
                    "Check a Markdown file against the rules in the [lint] section.\n\n\
                    Each issue is printed as <file>:<line>:<column>: <severity>: <message>.\n\
                    The exit status is 1 when any error-level issue is found.\n\n\
                    Examples:\n  \
                    scriptor check notes.md\n  \
                    scriptor check notes.md --json --extra-sentence-limit 30",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the issues as a JSON array")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A bare path as first argument means "convert"
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_logging(matches.get_count("verbose"));

    let config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        &mut extra_params,
    );
    for key in extra_params.keys() {
        tracing::warn!(parameter = %key, "ignoring unknown --extra parameter");
    }

    if matches.get_flag("list-formats") {
        handle_list_formats_command(&config);
        return;
    }

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            let registry = registry_from_config(&config);

            // Auto-detect --from if not provided
            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => match registry.detect_format_from_filename(input) {
                    Some(detected) => detected,
                    None => {
                        eprintln!("Error: Could not detect format from filename '{input}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }
                },
            };

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&registry, input, &from, to, output);
        }
        Some(("export", sub_matches)) => {
            let input = required(sub_matches, "input");
            let output_dir = sub_matches
                .get_one::<String>("output")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let draft_dir = sub_matches.get_one::<String>("draft-dir").map(PathBuf::from);
            handle_export_command(input, &output_dir, draft_dir, &config);
        }
        Some(("diff", sub_matches)) => {
            let baseline = required(sub_matches, "baseline");
            let updated = required(sub_matches, "updated");
            let style = if sub_matches.get_flag("html") {
                DiffStyle::Html
            } else {
                config.diff.style
            };
            handle_diff_command(baseline, updated, style, sub_matches.get_flag("stat"));
        }
        Some(("header", sub_matches)) => {
            let input = required(sub_matches, "input");
            handle_header_command(input, sub_matches.get_flag("json"));
        }
        Some(("check", sub_matches)) => {
            let input = required(sub_matches, "input");
            let rules = LintRules::from(&config.lint);
            handle_check_command(input, &rules, sub_matches.get_flag("json"));
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(|s| s.as_str())
        .unwrap_or_else(|| {
            eprintln!("Missing required argument '{name}'");
            std::process::exit(2);
        })
}

/// Logs go to stderr so they never mix with converted output on stdout.
/// `RUST_LOG` wins over `-v` when set.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("scriptor_babel={level},scriptor_cli={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn registry_from_config(config: &ScriptorConfig) -> FormatRegistry {
    let mut registry = FormatRegistry::new();
    registry.register(MarkdownFormat::new(config.converter()));
    registry.register(HtmlFormat::new());
    registry
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
) {
    // Validate formats exist
    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = read_file(input);

    // The markdown format drops the header; carry it across markdown → markdown
    let (header, body) = if from == "markdown" {
        let parsed = header::decompose(&source);
        (parsed.header, parsed.body)
    } else {
        (Default::default(), source)
    };

    let doc = registry.parse(&body, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let mut result = registry.serialize(&doc, to).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });
    if to == "markdown" {
        result = header::compose(&header, &result);
    }

    match output {
        Some(path) => {
            fs::write(path, result).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{result}"),
    }
}

/// Handle the export command
fn handle_export_command(
    input: &str,
    output_dir: &Path,
    draft_dir: Option<PathBuf>,
    config: &ScriptorConfig,
) {
    let raw = read_file(input);
    let name = Path::new(input)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(input);

    let mut session =
        Session::new(config.converter()).with_options(SessionOptions::from(&config.session));
    if let Some(dir) = draft_dir {
        session = session.with_drafts(FileDraftStore::new(dir));
    }

    if let Err(e) = session.load(name, guess_mime(name), &raw) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let Some(exported) = session.export() else {
        eprintln!("Nothing to export: '{input}' is empty");
        std::process::exit(1);
    };

    let target = output_dir.join(&exported.file_name);
    fs::create_dir_all(output_dir)
        .and_then(|_| fs::write(&target, &exported.contents))
        .unwrap_or_else(|e| {
            eprintln!("Error writing file '{}': {e}", target.display());
            std::process::exit(1);
        });
    println!("{}", target.display());
}

/// MIME type a browser would report for a dropped file, from its extension.
fn guess_mime(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    Some(match extension.as_str() {
        "md" | "markdown" => "text/markdown",
        "txt" | "text" => "text/plain",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    })
}

/// Handle the diff command
fn handle_diff_command(baseline: &str, updated: &str, style: DiffStyle, stat: bool) {
    let entries = diff_lines(&read_file(baseline), &read_file(updated));

    if stat {
        let summary = DiffSummary::of(&entries);
        println!(
            "{} unchanged, {} inserted, {} deleted",
            summary.context, summary.inserted, summary.deleted
        );
        return;
    }

    match style {
        DiffStyle::Text => print!("{}", render::lines_to_text(&entries)),
        DiffStyle::Html => println!("{}", render::lines_to_html(&entries)),
    }
}

/// Handle the header command
fn handle_header_command(input: &str, json: bool) {
    let parsed = header::parse(&read_file(input));

    if json {
        let text = serde_json::to_string_pretty(&parsed.header).unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });
        println!("{text}");
    } else if !parsed.header.is_empty() {
        println!("{}", header::serialize(&parsed.header));
    }
}

/// Handle the check command
fn handle_check_command(input: &str, rules: &LintRules, json: bool) {
    let issues = lint(&read_file(input), rules);
    tracing::info!(file = %input, issues = issues.len(), "checked");

    if json {
        let text = serde_json::to_string_pretty(&issues).unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });
        println!("{text}");
    } else {
        for issue in &issues {
            println!(
                "{input}:{}:{}: {}: {}",
                issue.line,
                issue.column,
                issue.severity.as_str(),
                issue.message
            );
        }
    }

    if issues.iter().any(|issue| issue.severity == Severity::Error) {
        std::process::exit(1);
    }
}

/// Handle the list-formats command
fn handle_list_formats_command(config: &ScriptorConfig) {
    println!("Available formats:\n");
    let registry = registry_from_config(config);
    for format_name in registry.list_formats() {
        let description = registry
            .get(&format_name)
            .map(|f| f.description().to_string())
            .unwrap_or_default();
        println!("  {format_name:<10} {description}");
    }
}

fn load_cli_config(
    explicit_path: Option<&str>,
    extra_params: &mut HashMap<String, String>,
) -> ScriptorConfig {
    let loader = Loader::new().with_optional_file("scriptor.toml");
    let mut loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    for (names, key) in CONFIG_OVERRIDES {
        if let Some(raw) = take_override(extra_params, names) {
            let value = if key.starts_with("markdown.import.") {
                parse_bool_arg(names[0], &raw).to_string()
            } else {
                raw
            };
            loader = loader.set_override(key, value).unwrap_or_else(|err| {
                eprintln!("Invalid value for --extra-{}: {err}", names[0]);
                std::process::exit(1);
            });
        }
    }

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}
