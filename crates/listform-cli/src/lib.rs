//! Listform command-line harness
//!
//! Loads schemas and entry files, then checks, validates, flattens or
//! rehydrates them. Everything reads files and writes JSON to stdout.

#![warn(unreachable_pub)]

pub mod commands;

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

fn schema_arg() -> Arg {
    Arg::new("schema")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Schema file (.json, .yaml or .yml)")
}

fn root_key_arg() -> Arg {
    Arg::new("root-key")
        .long("root-key")
        .required(true)
        .help("Dotted key the collection is recorded under")
}

/// Command-line definition
#[must_use]
pub fn cli() -> Command {
    Command::new("listform")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Schema engine for repeating structured-entry forms")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("check")
                .about("Load a schema and report configuration errors")
                .arg(schema_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate every entry in a JSON array of entries")
                .arg(schema_arg())
                .arg(
                    Arg::new("entries")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of entry objects"),
                ),
        )
        .subcommand(
            Command::new("flatten")
                .about("Serialize entries into the flattened record with totals")
                .arg(schema_arg())
                .arg(
                    Arg::new("entries")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of entry objects"),
                )
                .arg(root_key_arg()),
        )
        .subcommand(
            Command::new("rehydrate")
                .about("Rebuild entries from previously submitted data")
                .arg(schema_arg())
                .arg(
                    Arg::new("record")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON object of previous output"),
                )
                .arg(root_key_arg()),
        )
        .subcommand(Command::new("json-schema").about("Print the JSON Schema of the schema format"))
}
