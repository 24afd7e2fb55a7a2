//! `walbottle-validate-schema [--no-hyper] [--ignore-errors] [--quiet] FILE...`
//! - checks that one or more schema files are themselves well-formed draft-04
//!   schemas, and conform to the bundled meta-schema (hyper-meta-schema by
//!   default, or the plain one with `--no-hyper`) (spec.md §6, §8's
//!   self-hosting property).
//!
//! Exit codes:
//!   0 - every schema is well-formed and conforms to the meta-schema
//!   1 - bad options (no FILE given)
//!   2 - a schema file is not well-formed JSON or not a well-formed schema
//!   3 - a schema does not conform to the meta-schema
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use walbottle::{load_meta_schema, MetaSchemaKind, Outcome, Schema, Value};

#[derive(Parser)]
#[command(
    name = "walbottle-validate-schema",
    about = "Check that files are well-formed draft-04 schemas conforming to the meta-schema"
)]
struct Args {
    /// Schema files to check.
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Validate against the plain meta-schema instead of the hyper one.
    #[arg(long = "no-hyper")]
    no_hyper: bool,
    /// Keep going after a failure instead of stopping at the first one.
    #[arg(long = "ignore-errors")]
    ignore_errors: bool,
    /// Suppress per-file output; only the exit code reports the outcome.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let meta_kind = if args.no_hyper {
        MetaSchemaKind::MetaSchema
    } else {
        MetaSchemaKind::HyperMetaSchema
    };
    let meta_schema = load_meta_schema(meta_kind);

    let mut worst = 0u8;
    for path in &args.files {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("could not read {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
        };

        let raw = match Value::from_json_text(&text) {
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

        if let Err(e) = Schema::from_value(&raw) {
            eprintln!("{}: {}", path.display(), e);
            worst = worst.max(2);
            if !args.ignore_errors {
                return ExitCode::from(worst);
            }
            continue;
        }

        match meta_schema.apply(&raw) {
            Outcome::Ok => {
                if !args.quiet {
                    println!("{}: valid", path.display());
                }
            }
            Outcome::Invalid(reasons) => {
                worst = worst.max(3);
                if !args.quiet {
                    println!("{}: does not conform to the meta-schema", path.display());
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

    ExitCode::from(worst)
}
