//! The evaluator: applies a schema node to a JSON instance and reports
//! conforms/fails with a reason tree (spec §4.3). Never aborts on a
//! malformed instance — every keyword's mismatch becomes an entry in the
//! reason tree rather than a thrown error.
use crate::config::EvaluationConfig;
use crate::resolver::Resolver;
use crate::schema::{Dependency, ItemsConstraint, SchemaNode};
use crate::value::Value;
use std::fmt;

/// One failing keyword (or nested schema) in a validation run.
#[derive(Debug, Clone)]
pub struct ReasonTree {
    pub pointer: String,
    pub message: String,
    pub children: Vec<ReasonTree>,
}

impl fmt::Display for ReasonTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}: {}", self.pointer, self.message)
    }
}

impl ReasonTree {
    fn leaf(pointer: &str, message: impl Into<String>) -> Self {
        ReasonTree {
            pointer: pointer.to_string(),
            message: message.into(),
            children: Vec::new(),
        }
    }

    /// Every leaf message in this tree, depth-first, for flat reporting.
    pub fn messages(&self) -> Vec<String> {
        let mut out = vec![format!("{}", self)];
        for child in &self.children {
            out.extend(child.messages());
        }
        out
    }
}

/// The result of applying a schema to an instance.
#[derive(Debug, Clone)]
pub enum Outcome {
    Ok,
    Invalid(ReasonTree),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

struct Ctx<'a> {
    resolver: &'a Resolver,
    max_ref_depth: usize,
}

pub(crate) fn apply(
    node: &SchemaNode,
    instance: &Value,
    resolver: &Resolver,
    config: &EvaluationConfig,
) -> Outcome {
    let ctx = Ctx {
        resolver,
        max_ref_depth: config.max_ref_depth,
    };
    let failures = evaluate_node(node, instance, &ctx, 0);
    if failures.is_empty() {
        Outcome::Ok
    } else {
        Outcome::Invalid(ReasonTree {
            pointer: node.pointer().to_string(),
            message: "one or more keywords did not match".to_string(),
            children: failures,
        })
    }
}

fn evaluate_node(node: &SchemaNode, instance: &Value, ctx: &Ctx, depth: usize) -> Vec<ReasonTree> {
    match node {
        SchemaNode::Boolean { value, pointer } => {
            if *value {
                Vec::new()
            } else {
                vec![ReasonTree::leaf(pointer, "the `false` schema allows nothing")]
            }
        }
        SchemaNode::Keywords { pointer, keywords, .. } => {
            if let Some(reference) = &keywords.ref_ {
                // `$ref` present: every sibling keyword is ignored (draft-04).
                if depth >= ctx.max_ref_depth {
                    // Cyclic or too-deep reference: treat as matched so that
                    // evaluation terminates (spec §4.2/§9).
                    return Vec::new();
                }
                let referent = ctx.resolver.resolve(reference);
                return evaluate_node(&referent, instance, ctx, depth + 1)
                    .into_iter()
                    .map(|child| ReasonTree {
                        pointer: pointer.clone(),
                        message: format!("`$ref: {}` did not match", reference),
                        children: vec![child],
                    })
                    .collect();
            }

            let mut failures = Vec::new();

            if let Some(type_constraint) = &keywords.type_constraint {
                if !type_constraint.matches(instance) {
                    failures.push(ReasonTree::leaf(
                        pointer,
                        format!(
                            "`{}` is not of type {}",
                            instance,
                            type_constraint
                                .tags()
                                .iter()
                                .map(|t| format!("'{}'", t))
                                .collect::<Vec<_>>()
                                .join(" or ")
                        ),
                    ));
                }
            }

            if let Some(options) = &keywords.enum_values {
                if !options.iter().any(|opt| opt == instance) {
                    failures.push(ReasonTree::leaf(
                        pointer,
                        format!("`{}` is not one of the enumerated values", instance),
                    ));
                }
            }

            check_numeric(instance, keywords, pointer, &mut failures);
            check_string(instance, keywords, pointer, &mut failures);
            check_array(instance, keywords, pointer, ctx, depth, &mut failures);
            check_object(instance, keywords, pointer, ctx, depth, &mut failures);

            if let Some(branches) = &keywords.all_of {
                for (i, branch) in branches.iter().enumerate() {
                    let sub = evaluate_node(branch, instance, ctx, depth);
                    if !sub.is_empty() {
                        failures.push(ReasonTree {
                            pointer: format!("{}/allOf/{}", pointer, i),
                            message: "`allOf` branch did not match".to_string(),
                            children: sub,
                        });
                    }
                }
            }
            if let Some(branches) = &keywords.any_of {
                let results: Vec<_> = branches
                    .iter()
                    .map(|branch| evaluate_node(branch, instance, ctx, depth))
                    .collect();
                if results.iter().all(|r| !r.is_empty()) {
                    failures.push(ReasonTree {
                        pointer: pointer.clone(),
                        message: "`anyOf`: no branch matched".to_string(),
                        children: results.into_iter().flatten().collect(),
                    });
                }
            }
            if let Some(branches) = &keywords.one_of {
                let matches = branches
                    .iter()
                    .filter(|branch| evaluate_node(branch, instance, ctx, depth).is_empty())
                    .count();
                if matches != 1 {
                    failures.push(ReasonTree::leaf(
                        pointer,
                        format!("`oneOf`: expected exactly one match, found {}", matches),
                    ));
                }
            }
            if let Some(branch) = &keywords.not {
                if evaluate_node(branch, instance, ctx, depth).is_empty() {
                    failures.push(ReasonTree::leaf(
                        pointer,
                        "`not` schema matched, but must not".to_string(),
                    ));
                }
            }

            failures
        }
    }
}

fn check_numeric(
    instance: &Value,
    keywords: &crate::schema::Keywords,
    pointer: &str,
    failures: &mut Vec<ReasonTree>,
) {
    let n = match instance.as_f64() {
        Some(n) => n,
        None => return,
    };
    if let Some(multiple_of) = keywords.multiple_of {
        let ratio = n / multiple_of;
        if (ratio - ratio.round()).abs() > 1e-9 {
            failures.push(ReasonTree::leaf(
                pointer,
                format!("{} is not a multiple of {}", n, multiple_of),
            ));
        }
    }
    if let Some(max) = keywords.maximum {
        let ok = if keywords.exclusive_maximum { n < max } else { n <= max };
        if !ok {
            failures.push(ReasonTree::leaf(
                pointer,
                format!("{} exceeds the maximum of {}", n, max),
            ));
        }
    }
    if let Some(min) = keywords.minimum {
        let ok = if keywords.exclusive_minimum { n > min } else { n >= min };
        if !ok {
            failures.push(ReasonTree::leaf(
                pointer,
                format!("{} is below the minimum of {}", n, min),
            ));
        }
    }
}

fn check_string(
    instance: &Value,
    keywords: &crate::schema::Keywords,
    pointer: &str,
    failures: &mut Vec<ReasonTree>,
) {
    let len = match instance.code_point_len() {
        Some(len) => len,
        None => return,
    };
    if let Some(max_len) = keywords.max_length {
        if len as u64 > max_len {
            failures.push(ReasonTree::leaf(pointer, "string is longer than `maxLength`"));
        }
    }
    if let Some(min_len) = keywords.min_length {
        if (len as u64) < min_len {
            failures.push(ReasonTree::leaf(pointer, "string is shorter than `minLength`"));
        }
    }
    if let Some(pattern) = &keywords.pattern {
        if let Value::Str(s) = instance {
            if !pattern.regex.is_match(s) {
                failures.push(ReasonTree::leaf(
                    pointer,
                    format!("`{}` does not match pattern `{}`", s, pattern.original),
                ));
            }
        }
    }
}

fn check_array(
    instance: &Value,
    keywords: &crate::schema::Keywords,
    pointer: &str,
    ctx: &Ctx,
    depth: usize,
    failures: &mut Vec<ReasonTree>,
) {
    let items = match instance {
        Value::Array(items) => items,
        _ => return,
    };
    if let Some(max_items) = keywords.max_items {
        if items.len() as u64 > max_items {
            failures.push(ReasonTree::leaf(pointer, "array has more than `maxItems` elements"));
        }
    }
    if let Some(min_items) = keywords.min_items {
        if (items.len() as u64) < min_items {
            failures.push(ReasonTree::leaf(pointer, "array has fewer than `minItems` elements"));
        }
    }
    if keywords.unique_items {
        for i in 0..items.len() {
            for j in (i + 1)..items.len() {
                if items[i] == items[j] {
                    failures.push(ReasonTree::leaf(pointer, "array elements are not unique"));
                    break;
                }
            }
        }
    }
    match &keywords.items {
        Some(ItemsConstraint::Single(schema)) => {
            for (i, item) in items.iter().enumerate() {
                let sub = evaluate_node(schema, item, ctx, depth);
                if !sub.is_empty() {
                    failures.push(ReasonTree {
                        pointer: format!("{}/{}", pointer, i),
                        message: "array element did not match `items`".to_string(),
                        children: sub,
                    });
                }
            }
        }
        Some(ItemsConstraint::Tuple(schemas)) => {
            for (i, schema) in schemas.iter().enumerate() {
                if let Some(item) = items.get(i) {
                    let sub = evaluate_node(schema, item, ctx, depth);
                    if !sub.is_empty() {
                        failures.push(ReasonTree {
                            pointer: format!("{}/{}", pointer, i),
                            message: "array element did not match positional `items` schema"
                                .to_string(),
                            children: sub,
                        });
                    }
                }
            }
            if items.len() > schemas.len() {
                let extra = &items[schemas.len()..];
                match &keywords.additional_items {
                    Some(schema) => {
                        for (offset, item) in extra.iter().enumerate() {
                            let sub = evaluate_node(schema, item, ctx, depth);
                            if !sub.is_empty() {
                                failures.push(ReasonTree {
                                    pointer: format!("{}/{}", pointer, schemas.len() + offset),
                                    message: "array element did not match `additionalItems`"
                                        .to_string(),
                                    children: sub,
                                });
                            }
                        }
                    }
                    None => {}
                }
            }
        }
        None => {}
    }
}

fn check_object(
    instance: &Value,
    keywords: &crate::schema::Keywords,
    pointer: &str,
    ctx: &Ctx,
    depth: usize,
    failures: &mut Vec<ReasonTree>,
) {
    let object = match instance {
        Value::Object(map) => map,
        _ => return,
    };
    if let Some(max_properties) = keywords.max_properties {
        if object.len() as u64 > max_properties {
            failures.push(ReasonTree::leaf(pointer, "object has more than `maxProperties` keys"));
        }
    }
    if let Some(min_properties) = keywords.min_properties {
        if (object.len() as u64) < min_properties {
            failures.push(ReasonTree::leaf(pointer, "object has fewer than `minProperties` keys"));
        }
    }
    if let Some(required) = &keywords.required {
        for name in required {
            if !object.contains_key(name) {
                failures.push(ReasonTree::leaf(
                    pointer,
                    format!("'{}' is a required property", name),
                ));
            }
        }
    }

    let empty_props: Vec<(String, std::rc::Rc<SchemaNode>)> = Vec::new();
    let properties = keywords.properties.as_ref().unwrap_or(&empty_props);
    let empty_pattern: Vec<crate::schema::PatternPropertyEntry> = Vec::new();
    let pattern_properties = keywords.pattern_properties.as_ref().unwrap_or(&empty_pattern);

    for (key, value) in object {
        let mut applicable: Vec<&std::rc::Rc<SchemaNode>> = Vec::new();
        if let Some((_, schema)) = properties.iter().find(|(name, _)| name == key) {
            applicable.push(schema);
        }
        for entry in pattern_properties {
            if entry.pattern.regex.is_match(key) {
                applicable.push(&entry.schema);
            }
        }
        if applicable.is_empty() {
            if let Some(additional) = &keywords.additional_properties {
                let sub = evaluate_node(additional, value, ctx, depth);
                if !sub.is_empty() {
                    failures.push(ReasonTree {
                        pointer: format!("{}/{}", pointer, key),
                        message: "property did not match `additionalProperties`".to_string(),
                        children: sub,
                    });
                }
            }
        } else {
            for schema in applicable {
                let sub = evaluate_node(schema, value, ctx, depth);
                if !sub.is_empty() {
                    failures.push(ReasonTree {
                        pointer: format!("{}/{}", pointer, key),
                        message: "property did not match its schema".to_string(),
                        children: sub,
                    });
                }
            }
        }
    }

    if let Some(dependencies) = &keywords.dependencies {
        for (name, dependency) in dependencies {
            if !object.contains_key(name) {
                continue;
            }
            match dependency {
                Dependency::Names(names) => {
                    for required_name in names {
                        if !object.contains_key(required_name) {
                            failures.push(ReasonTree::leaf(
                                pointer,
                                format!(
                                    "presence of '{}' requires '{}' to also be present",
                                    name, required_name
                                ),
                            ));
                        }
                    }
                }
                Dependency::Schema(schema) => {
                    let sub = evaluate_node(schema, instance, ctx, depth);
                    if !sub.is_empty() {
                        failures.push(ReasonTree {
                            pointer: pointer.to_string(),
                            message: format!("dependency schema for '{}' did not match", name),
                            children: sub,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EvaluationConfig;
    use crate::schema::Schema;
    use crate::value::Value;
    use test_case::test_case;

    fn apply(schema_text: &str, instance_text: &str) -> bool {
        let schema = Schema::load(schema_text).unwrap();
        let instance = Value::from_json_text(instance_text).unwrap();
        schema.apply(&instance).is_ok()
    }

    #[test]
    fn multiple_of_boundary() {
        assert!(apply(r#"{"multipleOf": 5}"#, "0"));
        assert!(apply(r#"{"multipleOf": 5}"#, "5"));
        assert!(apply(r#"{"multipleOf": 5}"#, "10.0"));
        assert!(apply(r#"{"multipleOf": 5}"#, r#""no""#));
        assert!(!apply(r#"{"multipleOf": 5}"#, "1"));
        assert!(!apply(r#"{"multipleOf": 5}"#, "6"));
    }

    #[test]
    fn multiple_of_fractional() {
        assert!(apply(r#"{"multipleOf": 1.1}"#, "0"));
        assert!(apply(r#"{"multipleOf": 1.1}"#, "1.1"));
        assert!(apply(r#"{"multipleOf": 1.1}"#, "2.2"));
        assert!(apply(r#"{"multipleOf": 1.1}"#, "11"));
        assert!(!apply(r#"{"multipleOf": 1.1}"#, "1.2"));
    }

    #[test]
    fn exclusive_maximum() {
        let schema_text = r#"{"maximum": 5, "exclusiveMaximum": true}"#;
        assert!(apply(schema_text, "4"));
        assert!(!apply(schema_text, "5"));
        assert!(!apply(schema_text, "6"));
        assert!(apply(schema_text, r#""no""#));
    }

    #[test]
    fn pattern_is_unanchored() {
        let schema_text = r#"{"pattern": "[a-zA-Z0-9]+"}"#;
        assert!(apply(schema_text, r#""hello""#));
        assert!(apply(schema_text, r#""!hello""#));
        assert!(!apply(schema_text, r#""""#));
        assert!(apply(schema_text, "0"));
    }

    #[test]
    fn enum_equality_across_types() {
        let schema_text = r#"{"enum": [1, "hi", {"a": 0}]}"#;
        assert!(apply(schema_text, "1"));
        assert!(apply(schema_text, r#""hi""#));
        assert!(apply(schema_text, r#"{"a": 0}"#));
        assert!(!apply(schema_text, "null"));
    }

    #[test]
    fn items_tuple_with_additional_items_false() {
        let schema_text = r#"{"items": [{}, {}, {}], "additionalItems": false}"#;
        assert!(apply(schema_text, "[]"));
        assert!(apply(schema_text, "[1,2,3]"));
        assert!(apply(schema_text, "[[1,2,3,4],[5,6,7,8]]"));
        assert!(!apply(schema_text, "[1,2,3,4]"));
    }

    #[test]
    fn all_of_is_a_conjunction() {
        let schema_text = r#"{"allOf": [{"type": "integer"}, {"minimum": 2}]}"#;
        assert!(apply(schema_text, "3"));
        assert!(!apply(schema_text, "1"));
        assert!(!apply(schema_text, "1.5"));
    }

    #[test]
    fn one_of_requires_exactly_one_match() {
        let schema_text = r#"{"oneOf": [{"type": "integer"}, {"minimum": 2}]}"#;
        assert!(apply(schema_text, "1"));
        assert!(!apply(schema_text, "1.1"));
        assert!(!apply(schema_text, "3"));
    }

    #[test]
    fn type_keyword_is_scoped_to_applicable_instances() {
        // maxLength on a non-string is inapplicable and contributes no failure.
        assert!(apply(r#"{"maxLength": 1}"#, "null"));
    }

    #[test_case(r#"{"maxLength": 1}"#, "5")]
    #[test_case(r#"{"minLength": 5}"#, "null")]
    #[test_case(r#"{"pattern": "^a$"}"#, "5")]
    #[test_case(r#"{"multipleOf": 2}"#, r#""no""#)]
    #[test_case(r#"{"maxItems": 0}"#, r#""no""#)]
    #[test_case(r#"{"minProperties": 1}"#, "[]")]
    #[test_case(r#"{"required": ["a"]}"#, "null")]
    fn non_applicable_keyword_never_fails(schema_text: &str, instance_text: &str) {
        assert!(apply(schema_text, instance_text));
    }

    #[test]
    fn ref_depth_is_capped_for_cycles() {
        let schema_text = r#"{
            "definitions": {"node": {"properties": {"next": {"$ref": "#/definitions/node"}}}},
            "$ref": "#/definitions/node"
        }"#;
        let schema = Schema::load(schema_text).unwrap();
        let mut instance_text = String::from("{}");
        for _ in 0..40 {
            instance_text = format!(r#"{{"next": {}}}"#, instance_text);
        }
        let instance = Value::from_json_text(&instance_text).unwrap();
        // Should terminate rather than overflow the stack.
        let _ = schema.apply_with_config(&instance, &EvaluationConfig::default());
    }
}
