//! Test-vector generation (spec §4.4/§4.5): composes candidate instances
//! from a schema's keywords and labels each one valid or invalid by running
//! it back through the evaluator against the whole schema.
mod compose;
mod probes;

use compose::ComposeCtx;
use crate::config::{EvaluationConfig, GenerateFlags, GenerationConfig};
use crate::resolver::Resolver;
use crate::schema::SchemaNode;
use crate::telemetry::Telemetry;
use crate::value::Value;

/// One generated test vector: its JSON text and whether it is labelled
/// valid against the schema it was generated from.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedInstance {
    pub json_text: String,
    pub is_valid: bool,
}

/// A handful of byte sequences that are not well-formed JSON at all, used to
/// round out the invalid set when `GenerateFlags::invalid_json` is set
/// (spec §4.4/§6: malformed-input vectors a validator must also reject).
const MALFORMED_JSON_SAMPLES: &[&str] = &["", "{", "[1,2", "{\"a\":}", "nul", "'single'"];

pub(crate) fn generate(
    root: &std::rc::Rc<SchemaNode>,
    flags: GenerateFlags,
    config: &GenerationConfig,
    resolver: &Resolver,
    telemetry: &Telemetry,
) -> Vec<GeneratedInstance> {
    let ctx = ComposeCtx::new(config, resolver, telemetry);
    let candidates = compose::candidates(root, &ctx, 0);
    let eval_config = EvaluationConfig {
        max_ref_depth: config.max_ref_depth,
    };

    let mut out = Vec::new();
    for candidate in candidates {
        let is_valid = crate::evaluate::apply(root, &candidate, resolver, &eval_config).is_ok();
        if is_valid && flags.ignore_valid {
            continue;
        }
        if !is_valid && flags.ignore_invalid {
            continue;
        }
        out.push(GeneratedInstance {
            json_text: candidate.canonical(),
            is_valid,
        });
    }

    if flags.invalid_json && !flags.ignore_invalid {
        for sample in MALFORMED_JSON_SAMPLES {
            if Value::from_json_text(sample).is_ok() {
                continue;
            }
            out.push(GeneratedInstance {
                json_text: sample.to_string(),
                is_valid: false,
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use crate::config::GenerateFlags;
    use crate::schema::Schema;
    use crate::value::Value;
    use std::collections::HashSet;

    fn generate(schema_text: &str) -> Vec<super::GeneratedInstance> {
        let schema = Schema::load(schema_text).unwrap();
        schema.generate(GenerateFlags::all())
    }

    #[test]
    fn dedup_is_by_canonical_form() {
        let instances = generate(r#"{"type": "integer"}"#);
        let mut seen = HashSet::new();
        for instance in &instances {
            assert!(seen.insert(instance.json_text.clone()), "duplicate: {}", instance.json_text);
        }
    }

    #[test]
    fn labelling_is_sound() {
        let schema_text = r#"{"multipleOf": 5}"#;
        let schema = Schema::load(schema_text).unwrap();
        for instance in schema.generate(GenerateFlags::all()) {
            let parsed = match Value::from_json_text(&instance.json_text) {
                Ok(v) => v,
                Err(_) => continue, // the malformed-JSON vectors aren't parseable by design
            };
            assert_eq!(schema.is_valid(&parsed), instance.is_valid, "{}", instance.json_text);
        }
    }

    #[test]
    fn every_enum_element_is_emitted_as_valid() {
        let schema_text = r#"{"enum": [1, "hi", {"a": 0}]}"#;
        let schema = Schema::load(schema_text).unwrap();
        let instances = schema.generate(GenerateFlags::all());
        for expected in ["1", r#""hi""#, r#"{"a":0}"#] {
            let expected_canonical = Value::from_json_text(expected).unwrap().canonical();
            assert!(
                instances
                    .iter()
                    .any(|i| i.json_text == expected_canonical && i.is_valid),
                "missing valid vector for {}",
                expected
            );
        }
    }

    #[test]
    fn multiple_of_five_includes_expected_vectors() {
        let instances = generate(r#"{"multipleOf": 5}"#);
        let find = |text: &str| instances.iter().find(|i| i.json_text == text);
        assert!(find("0").map(|i| i.is_valid).unwrap_or(false));
        assert!(find("5").map(|i| i.is_valid).unwrap_or(false));
        assert!(find("6").map(|i| !i.is_valid).unwrap_or(false));
    }

    #[test]
    fn ignore_valid_and_ignore_invalid_flags_filter_output() {
        let schema = Schema::load(r#"{"type": "integer", "minimum": 0}"#).unwrap();
        let valid_only = schema.generate(GenerateFlags {
            ignore_invalid: true,
            ..GenerateFlags::default()
        });
        assert!(valid_only.iter().all(|i| i.is_valid));
        let invalid_only = schema.generate(GenerateFlags {
            ignore_valid: true,
            ..GenerateFlags::default()
        });
        assert!(invalid_only.iter().all(|i| !i.is_valid));
    }

    #[test]
    fn invalid_json_flag_adds_malformed_byte_sequences() {
        let schema = Schema::load("{}").unwrap();
        let with_flag = schema.generate(GenerateFlags {
            invalid_json: true,
            ..GenerateFlags::default()
        });
        let without_flag = schema.generate(GenerateFlags::default());
        assert!(with_flag.len() > without_flag.len());
        assert!(with_flag.iter().any(|i| i.json_text == "{" && !i.is_valid));
    }
}
