//! Parses a JSON document into the schema AST, checking every keyword's
//! payload against the draft-04 invariants listed in spec §3. Fails on the
//! first invariant violation that prevents construction; non-fatal issues
//! (an absolute `$ref` the resolver cannot fetch) are collected as warnings.
use super::node::{
    Dependency, ItemsConstraint, Keywords, PatternConstraint, PatternPropertyEntry, SchemaNode,
    TypeConstraint,
};
use crate::error::{MessageTree, SchemaError};
use crate::value::{TypeTag, Value};
use regex::Regex;
use std::rc::Rc;

pub(crate) struct Loader {
    pub warnings: Vec<MessageTree>,
}

impl Loader {
    pub(crate) fn new() -> Self {
        Loader {
            warnings: Vec::new(),
        }
    }

    fn fail(&self, pointer: &str, message: impl Into<String>) -> SchemaError {
        SchemaError::single(MessageTree::error(pointer, message))
    }

    fn fail_section(
        &self,
        pointer: &str,
        message: impl Into<String>,
        section: &'static str,
    ) -> SchemaError {
        SchemaError::single(MessageTree::error(pointer, message).with_section(section))
    }

    pub(crate) fn load_node(
        &mut self,
        value: &Value,
        pointer: &str,
    ) -> Result<Rc<SchemaNode>, SchemaError> {
        match value {
            Value::Bool(b) => Ok(Rc::new(SchemaNode::Boolean {
                pointer: pointer.to_string(),
                value: *b,
            })),
            Value::Object(map) => {
                // `$ref`, when present, short-circuits every *behavioural*
                // sibling keyword at evaluation time (the evaluator and
                // generator both check `keywords.ref_` first and return
                // before looking at anything else) - but annotation
                // keywords (`title`/`description`/`default`/`id`/`$schema`)
                // are parsed regardless, so `SchemaNode::title()` etc. still
                // work on a `$ref` node.
                let keywords = self.load_keywords(map, pointer)?;
                Ok(Rc::new(SchemaNode::Keywords {
                    pointer: pointer.to_string(),
                    raw: value.clone(),
                    keywords: Box::new(keywords),
                }))
            }
            _ => Err(self.fail(pointer, "a schema must be a JSON object or a boolean")),
        }
    }

    fn load_keywords(
        &mut self,
        map: &indexmap::IndexMap<String, Value>,
        pointer: &str,
    ) -> Result<Keywords, SchemaError> {
        let mut out = Keywords::default();

        if let Some(v) = map.get("id") {
            out.id = v.as_str().map(str::to_string);
        }
        if let Some(v) = map.get("$schema") {
            out.schema_dialect = v.as_str().map(str::to_string);
        }
        if let Some(v) = map.get("title") {
            out.title = v.as_str().map(str::to_string);
        }
        if let Some(v) = map.get("description") {
            out.description = v.as_str().map(str::to_string);
        }
        if let Some(v) = map.get("default") {
            out.default = Some(v.clone());
        }

        if let Some(v) = map.get("$ref") {
            let reference = v
                .as_str()
                .ok_or_else(|| self.fail(pointer, "`$ref` must be a string"))?;
            out.ref_ = Some(reference.to_string());
        }

        if let Some(v) = map.get("type") {
            out.type_constraint = Some(self.load_type(v, pointer)?);
        }

        if let Some(v) = map.get("enum") {
            out.enum_values = Some(self.load_enum(v, pointer)?);
        }

        if let Some(v) = map.get("multipleOf") {
            let n = v
                .as_f64()
                .filter(|n| *n > 0.0)
                .ok_or_else(|| self.fail(pointer, "`multipleOf` must be a number > 0"))?;
            out.multiple_of = Some(n);
        }

        if let Some(v) = map.get("maximum") {
            out.maximum = Some(
                v.as_f64()
                    .ok_or_else(|| self.fail(pointer, "`maximum` must be a number"))?,
            );
        }
        if let Some(v) = map.get("exclusiveMaximum") {
            match v {
                Value::Bool(b) => out.exclusive_maximum = *b,
                _ => return Err(self.fail(pointer, "`exclusiveMaximum` must be a boolean in draft-04")),
            }
        }
        if out.exclusive_maximum && out.maximum.is_none() {
            return Err(self.fail_section(
                pointer,
                "`exclusiveMaximum` requires `maximum` to be present",
                "§5.1.2",
            ));
        }

        if let Some(v) = map.get("minimum") {
            out.minimum = Some(
                v.as_f64()
                    .ok_or_else(|| self.fail(pointer, "`minimum` must be a number"))?,
            );
        }
        if let Some(v) = map.get("exclusiveMinimum") {
            match v {
                Value::Bool(b) => out.exclusive_minimum = *b,
                _ => return Err(self.fail(pointer, "`exclusiveMinimum` must be a boolean in draft-04")),
            }
        }
        if out.exclusive_minimum && out.minimum.is_none() {
            return Err(self.fail_section(
                pointer,
                "`exclusiveMinimum` requires `minimum` to be present",
                "§5.1.3",
            ));
        }

        if let Some(v) = map.get("maxLength") {
            out.max_length = Some(self.load_nonneg_int(v, pointer, "maxLength")?);
        }
        if let Some(v) = map.get("minLength") {
            out.min_length = Some(self.load_nonneg_int(v, pointer, "minLength")?);
        }

        if let Some(v) = map.get("pattern") {
            let text = v
                .as_str()
                .ok_or_else(|| self.fail(pointer, "`pattern` must be a string"))?;
            let regex = Regex::new(text)
                .map_err(|e| self.fail(pointer, format!("`pattern` does not compile: {}", e)))?;
            out.pattern = Some(PatternConstraint {
                original: text.to_string(),
                regex,
            });
        }

        if let Some(v) = map.get("maxItems") {
            out.max_items = Some(self.load_nonneg_int(v, pointer, "maxItems")?);
        }
        if let Some(v) = map.get("minItems") {
            out.min_items = Some(self.load_nonneg_int(v, pointer, "minItems")?);
        }
        if let Some(v) = map.get("uniqueItems") {
            out.unique_items = matches!(v, Value::Bool(true));
        }

        if let Some(v) = map.get("items") {
            let child_pointer = format!("{}/items", pointer);
            out.items = Some(match v {
                Value::Array(items) => {
                    let mut nodes = Vec::with_capacity(items.len());
                    for (i, item) in items.iter().enumerate() {
                        nodes.push(self.load_node(item, &format!("{}/{}", child_pointer, i))?);
                    }
                    ItemsConstraint::Tuple(nodes)
                }
                _ => ItemsConstraint::Single(self.load_node(v, &child_pointer)?),
            });
        }
        if let Some(v) = map.get("additionalItems") {
            out.additional_items =
                Some(self.load_node(v, &format!("{}/additionalItems", pointer))?);
        }

        if let Some(v) = map.get("maxProperties") {
            out.max_properties = Some(self.load_nonneg_int(v, pointer, "maxProperties")?);
        }
        if let Some(v) = map.get("minProperties") {
            out.min_properties = Some(self.load_nonneg_int(v, pointer, "minProperties")?);
        }

        if let Some(v) = map.get("required") {
            out.required = Some(self.load_required(v, pointer)?);
        }

        if let Some(v) = map.get("properties") {
            let child_pointer = format!("{}/properties", pointer);
            let obj = v
                .as_object()
                .ok_or_else(|| self.fail(pointer, "`properties` must be an object"))?;
            let mut props = Vec::with_capacity(obj.len());
            for (name, subschema) in obj {
                props.push((
                    name.clone(),
                    self.load_node(subschema, &format!("{}/{}", child_pointer, name))?,
                ));
            }
            out.properties = Some(props);
        }

        if let Some(v) = map.get("patternProperties") {
            let child_pointer = format!("{}/patternProperties", pointer);
            let obj = v
                .as_object()
                .ok_or_else(|| self.fail(pointer, "`patternProperties` must be an object"))?;
            let mut entries = Vec::with_capacity(obj.len());
            for (pattern, subschema) in obj {
                let regex = Regex::new(pattern).map_err(|e| {
                    self.fail(
                        pointer,
                        format!("`patternProperties` key `{}` does not compile: {}", pattern, e),
                    )
                })?;
                entries.push(PatternPropertyEntry {
                    pattern: PatternConstraint {
                        original: pattern.clone(),
                        regex,
                    },
                    schema: self.load_node(subschema, &format!("{}/{}", child_pointer, pattern))?,
                });
            }
            out.pattern_properties = Some(entries);
        }

        if let Some(v) = map.get("additionalProperties") {
            out.additional_properties =
                Some(self.load_node(v, &format!("{}/additionalProperties", pointer))?);
        }

        if let Some(v) = map.get("dependencies") {
            let child_pointer = format!("{}/dependencies", pointer);
            let obj = v
                .as_object()
                .ok_or_else(|| self.fail(pointer, "`dependencies` must be an object"))?;
            let mut deps = Vec::with_capacity(obj.len());
            for (name, dep) in obj {
                let dependency = match dep {
                    Value::Array(_) => {
                        let names = self.load_required(dep, &child_pointer).map_err(|_| {
                            self.fail(
                                &child_pointer,
                                format!(
                                    "dependency `{}` array must be non-empty unique strings",
                                    name
                                ),
                            )
                        })?;
                        Dependency::Names(names)
                    }
                    _ => Dependency::Schema(
                        self.load_node(dep, &format!("{}/{}", child_pointer, name))?,
                    ),
                };
                deps.push((name.clone(), dependency));
            }
            out.dependencies = Some(deps);
        }

        if let Some(v) = map.get("allOf") {
            out.all_of = Some(self.load_schema_list(v, pointer, "allOf")?);
        }
        if let Some(v) = map.get("anyOf") {
            out.any_of = Some(self.load_schema_list(v, pointer, "anyOf")?);
        }
        if let Some(v) = map.get("oneOf") {
            out.one_of = Some(self.load_schema_list(v, pointer, "oneOf")?);
        }
        if let Some(v) = map.get("not") {
            out.not = Some(self.load_node(v, &format!("{}/not", pointer))?);
        }

        Ok(out)
    }

    fn load_type(&mut self, value: &Value, pointer: &str) -> Result<TypeConstraint, SchemaError> {
        match value {
            Value::Str(name) => {
                let tag = TypeTag::from_name(name)
                    .ok_or_else(|| self.fail(pointer, format!("unknown type name `{}`", name)))?;
                Ok(TypeConstraint::One(tag))
            }
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(self.fail(pointer, "`type` array must not be empty"));
                }
                let mut tags = Vec::with_capacity(items.len());
                for item in items {
                    let name = item
                        .as_str()
                        .ok_or_else(|| self.fail(pointer, "`type` array entries must be strings"))?;
                    let tag = TypeTag::from_name(name).ok_or_else(|| {
                        self.fail(pointer, format!("unknown type name `{}`", name))
                    })?;
                    if tags.contains(&tag) {
                        return Err(self.fail(
                            pointer,
                            format!("`type` array contains duplicate entry `{}`", name),
                        ));
                    }
                    tags.push(tag);
                }
                Ok(TypeConstraint::Any(tags))
            }
            _ => Err(self.fail(pointer, "`type` must be a string or an array of strings")),
        }
    }

    fn load_enum(&mut self, value: &Value, pointer: &str) -> Result<Vec<Value>, SchemaError> {
        let items = value
            .as_array()
            .ok_or_else(|| self.fail(pointer, "`enum` must be an array"))?;
        if items.is_empty() {
            return Err(self.fail(pointer, "`enum` must have at least one element"));
        }
        for i in 0..items.len() {
            for j in (i + 1)..items.len() {
                if items[i] == items[j] {
                    return Err(self.fail(pointer, "`enum` elements must be pairwise distinct"));
                }
            }
        }
        Ok(items.to_vec())
    }

    fn load_required(&mut self, value: &Value, pointer: &str) -> Result<Vec<String>, SchemaError> {
        let items = value
            .as_array()
            .ok_or_else(|| self.fail(pointer, "`required` must be an array"))?;
        if items.is_empty() {
            return Err(self.fail(pointer, "`required` must not be empty"));
        }
        let mut names = Vec::with_capacity(items.len());
        for item in items {
            let name = item
                .as_str()
                .ok_or_else(|| self.fail(pointer, "`required` entries must be strings"))?;
            if names.contains(&name.to_string()) {
                return Err(self.fail(pointer, "`required` entries must be unique"));
            }
            names.push(name.to_string());
        }
        Ok(names)
    }

    fn load_schema_list(
        &mut self,
        value: &Value,
        pointer: &str,
        keyword: &str,
    ) -> Result<Vec<Rc<SchemaNode>>, SchemaError> {
        let items = value
            .as_array()
            .ok_or_else(|| self.fail(pointer, format!("`{}` must be an array", keyword)))?;
        if items.is_empty() {
            return Err(self.fail(pointer, format!("`{}` must not be empty", keyword)));
        }
        let child_pointer = format!("{}/{}", pointer, keyword);
        let mut nodes = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            nodes.push(self.load_node(item, &format!("{}/{}", child_pointer, i))?);
        }
        Ok(nodes)
    }

    fn load_nonneg_int(
        &mut self,
        value: &Value,
        pointer: &str,
        keyword: &str,
    ) -> Result<u64, SchemaError> {
        let n = value
            .as_f64()
            .ok_or_else(|| self.fail(pointer, format!("`{}` must be a number", keyword)))?;
        if n < 0.0 || n.fract() != 0.0 {
            return Err(self.fail(
                pointer,
                format!("`{}` must be a non-negative integer", keyword),
            ));
        }
        Ok(n as u64)
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::Schema;

    fn load(text: &str) -> Result<Schema, crate::error::SchemaError> {
        Schema::load(text)
    }

    #[test]
    fn enum_must_not_be_empty() {
        assert!(load(r#"{"enum": []}"#).is_err());
    }

    #[test]
    fn enum_elements_must_be_pairwise_distinct() {
        assert!(load(r#"{"enum": [null, null]}"#).is_err());
        assert!(load(r#"{"enum": [1, 1.0]}"#).is_err());
    }

    #[test]
    fn unknown_type_name_is_malformed() {
        assert!(load(r#"{"type": "promise"}"#).is_err());
    }

    #[test]
    fn type_array_rejects_duplicates() {
        assert!(load(r#"{"type": ["string", "string"]}"#).is_err());
    }

    #[test]
    fn malformed_regex_is_rejected() {
        assert!(load(r#"{"pattern": "++"}"#).is_err());
        assert!(load(r#"{"patternProperties": {"++": {}}}"#).is_err());
    }

    #[test]
    fn exclusive_maximum_requires_maximum() {
        assert!(load(r#"{"exclusiveMaximum": true}"#).is_err());
        assert!(load(r#"{"maximum": 5, "exclusiveMaximum": true}"#).is_ok());
    }

    #[test]
    fn exclusive_minimum_requires_minimum() {
        assert!(load(r#"{"exclusiveMinimum": true}"#).is_err());
    }

    #[test]
    fn multiple_of_must_be_positive() {
        assert!(load(r#"{"multipleOf": 0}"#).is_err());
        assert!(load(r#"{"multipleOf": -1}"#).is_err());
        assert!(load(r#"{"multipleOf": 1.1}"#).is_ok());
    }

    #[test]
    fn required_must_be_non_empty_and_unique() {
        assert!(load(r#"{"required": []}"#).is_err());
        assert!(load(r#"{"required": ["a", "a"]}"#).is_err());
        assert!(load(r#"{"required": ["a", "b"]}"#).is_ok());
    }

    #[test]
    fn top_level_must_be_object_or_boolean() {
        assert!(load("5").is_err());
        assert!(load("true").is_ok());
        assert!(load("false").is_ok());
    }

    #[test]
    fn dependencies_accepts_both_schema_and_name_list_forms() {
        let schema_text = r#"{
            "dependencies": {
                "credit_card": ["billing_address"],
                "bank_account": {"required": ["routing_number"]}
            }
        }"#;
        assert!(load(schema_text).is_ok());
    }

    #[test]
    fn ref_ignores_sibling_keywords() {
        // A `$ref` sibling alongside `minimum` should compile; the evaluator
        // ignores `minimum` entirely per draft-04 `$ref` semantics.
        let schema = load(r#"{"$ref": "#/definitions/x", "minimum": 5, "definitions": {"x": {"type": "integer"}}}"#);
        assert!(schema.is_ok());
    }

    #[test]
    fn ref_node_keeps_its_own_annotation_keywords() {
        // Annotation keywords aren't "behaviour"; they must survive even on
        // a node whose evaluation is entirely driven by `$ref`.
        let schema = load(
            r#"{"$ref": "#/definitions/x", "title": "a ref", "description": "d", "default": 3,
                "definitions": {"x": {"type": "integer"}}}"#,
        )
        .unwrap();
        let root = schema.root();
        assert_eq!(root.title(), Some("a ref"));
        assert_eq!(root.description(), Some("d"));
        assert_eq!(root.default(), Some(&crate::value::Value::Int(3)));
        assert_eq!(root.ref_target(), Some("#/definitions/x"));
    }
}
