//! `listform` binary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use listform_cli::{cli, commands};
use serde_json::Value as JsonValue;
use tracing_subscriber::EnvFilter;

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing <{name}>"))
}

fn root_key(args: &ArgMatches) -> Result<&str> {
    args.get_one::<String>("root-key")
        .map(String::as_str)
        .context("missing --root-key")
}

fn print(value: &JsonValue) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("check", args)) => print(&commands::check(path(args, "schema")?)?),
        Some(("validate", args)) => {
            let (valid, report) = commands::validate(path(args, "schema")?, path(args, "entries")?)?;
            print(&report)?;
            std::process::exit(if valid { 0 } else { 1 });
        }
        Some(("flatten", args)) => print(&commands::flatten(
            path(args, "schema")?,
            path(args, "entries")?,
            root_key(args)?,
        )?),
        Some(("rehydrate", args)) => print(&commands::rehydrate_record(
            path(args, "schema")?,
            path(args, "record")?,
            root_key(args)?,
        )?),
        Some(("json-schema", _)) => print(&commands::json_schema()?),
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}
