use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the format names registered in src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_FORMATS: &[&str] = &["markdown", "html"];

fn input_arg(name: &'static str, index: usize) -> Arg {
    Arg::new(name)
        .required(true)
        .index(index)
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let formats = clap::builder::PossibleValuesParser::new(AVAILABLE_FORMATS);

    let mut cmd = Command::new("scriptor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert, export and compare Scriptor Markdown documents")
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
        .subcommand(
            Command::new("convert")
                .arg(input_arg("input", 1))
                .arg(Arg::new("from").long("from").value_parser(formats.clone()))
                .arg(Arg::new("to").long("to").value_parser(formats))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("export")
                .arg(input_arg("input", 1))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("draft-dir")
                        .long("draft-dir")
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .subcommand(
            Command::new("diff")
                .arg(input_arg("baseline", 1))
                .arg(input_arg("updated", 2))
                .arg(Arg::new("html").long("html").action(ArgAction::SetTrue))
                .arg(Arg::new("stat").long("stat").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("header")
                .arg(input_arg("input", 1))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("check")
                .arg(input_arg("input", 1))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "scriptor", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "scriptor", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "scriptor", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
