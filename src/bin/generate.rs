//! `walbottle-generate [--valid-only|-v] [--invalid-only|-n] [--no-invalid-json|-j]
//! [--format plain|c] [--c-variable-name NAME] [--show-timings] [--quiet] FILE...`
//! - generates a labelled corpus of test-vector instances for one or more
//!   schemas (spec.md §4.4/§4.5/§6).
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use walbottle::{GenerateFlags, GenerationConfig, Schema};

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Plain,
    C,
}

#[derive(Parser)]
#[command(name = "walbottle-generate", about = "Generate test-vector instances for draft-04 schemas")]
struct Args {
    /// Schema files to generate vectors for.
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Omit instances labelled valid.
    #[arg(short = 'n', long = "invalid-only")]
    invalid_only: bool,
    /// Omit instances labelled invalid.
    #[arg(short = 'v', long = "valid-only")]
    valid_only: bool,
    /// Do not include the fixed set of malformed-JSON byte sequences.
    #[arg(short = 'j', long = "no-invalid-json")]
    no_invalid_json: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Plain)]
    format: Format,
    /// Variable name to use in `--format c` output.
    #[arg(long, default_value = "test_vectors")]
    c_variable_name: String,
    /// Print per-subschema generation timings after the corpus.
    #[arg(long)]
    show_timings: bool,
    /// Suppress the per-file banner printed ahead of each schema's corpus.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.valid_only && args.invalid_only {
        eprintln!("--valid-only and --invalid-only are mutually exclusive");
        return ExitCode::from(1);
    }

    let flags = GenerateFlags {
        ignore_valid: args.invalid_only,
        ignore_invalid: args.valid_only,
        invalid_json: !args.no_invalid_json,
    };
    let config = GenerationConfig {
        collect_telemetry: args.show_timings,
        ..GenerationConfig::default()
    };

    for path in &args.files {
        let schema_text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("could not read {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        };
        let schema = match Schema::load(&schema_text) {
            Ok(schema) => schema,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        };

        if !args.quiet && args.files.len() > 1 {
            println!("# {}", path.display());
        }

        let instances = schema.generate_with_config(flags, &config);

        match args.format {
            Format::Plain => {
                for instance in &instances {
                    println!("{}", instance.json_text);
                }
            }
            Format::C => {
                println!(
                    "static const struct {{ const char *json; int valid; }} {}[] = {{",
                    args.c_variable_name
                );
                for instance in &instances {
                    println!(
                        "    {{\"{}\", {}}},",
                        escape_c_string(&instance.json_text),
                        i32::from(instance.is_valid)
                    );
                }
                println!("}};");
            }
        }

        if args.show_timings {
            for entry in schema.telemetry_report() {
                eprintln!(
                    "{}: {} invocation(s), {} instance(s), {:?}",
                    entry.pointer, entry.invocations, entry.instances_produced, entry.cumulative_time
                );
            }
        }
    }

    ExitCode::from(0)
}

fn escape_c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}
