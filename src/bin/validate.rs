//! `walbottle-validate [--schema FILE]... [--quiet] [--ignore-errors] FILE...`
//! - checks one or more JSON instance files against one or more schema files
//!   (spec.md §6).
//!
//! Exit codes:
//!   0 - every instance validated against every schema
//!   1 - bad options (no `--schema` given, or no instance files given)
//!   2 - an instance file is not well-formed JSON
//!   3 - a schema file is not a well-formed draft-04 schema
//!   4 - an instance failed validation against a schema
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use walbottle::{Outcome, Schema, Value};

#[derive(Parser)]
#[command(name = "walbottle-validate", about = "Validate JSON instances against one or more draft-04 schemas")]
struct Args {
    /// Instance files to validate.
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Schema file to validate against (repeatable).
    #[arg(long = "schema")]
    schema: Vec<PathBuf>,
    /// Suppress per-instance output; only the exit code reports the outcome.
    #[arg(short, long)]
    quiet: bool,
    /// Keep going after a failure instead of stopping at the first one.
    #[arg(long = "ignore-errors")]
    ignore_errors: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.schema.is_empty() {
        eprintln!("at least one --schema FILE is required");
        return ExitCode::from(1);
    }

    let mut schemas = Vec::with_capacity(args.schema.len());
    let mut worst = 0u8;
    for path in &args.schema {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("could not read {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
        };
        match Schema::load(&text) {
            Ok(schema) => schemas.push((path, schema)),
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                worst = worst.max(3);
                if !args.ignore_errors {
                    return ExitCode::from(worst);
                }
            }
        }
    }
    for path in &args.files {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("could not read {}: {}", path.display(), e);
                worst = worst.max(2);
                if !args.ignore_errors {
                    return ExitCode::from(worst);
                }
                continue;
            }
        };
        let instance = match Value::from_json_text(&text) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{}: not well-formed JSON: {}", path.display(), e);
                worst = worst.max(2);
                if !args.ignore_errors {
                    return ExitCode::from(worst);
                }
                continue;
            }
        };

        for (schema_path, schema) in &schemas {
            match schema.apply(&instance) {
                Outcome::Ok => {
                    if !args.quiet {
                        println!("{}: valid against {}", path.display(), schema_path.display());
                    }
                }
                Outcome::Invalid(reasons) => {
                    worst = worst.max(4);
                    if !args.quiet {
                        println!("{}: invalid against {}", path.display(), schema_path.display());
                        for message in reasons.messages() {
                            println!("  {}", message);
                        }
                    }
                    if !args.ignore_errors {
                        return ExitCode::from(worst);
                    }
                }
            }
        }
    }

    ExitCode::from(worst)
}
