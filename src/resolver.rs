//! Resolves `$ref` targets: local JSON-pointer fragments within the loaded
//! document, and the two bundled meta-schemas. Any other absolute URI is
//! left unresolved — the evaluator treats it as a permissive schema while a
//! warning is recorded, matching how the original tool behaves on `$ref`s it
//! cannot fetch (spec §4.2).
use crate::error::MessageTree;
use crate::schema::SchemaNode;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const META_SCHEMA_URL: &str = "http://json-schema.org/schema";
const HYPER_META_SCHEMA_URL: &str = "http://json-schema.org/hyper-schema";

#[derive(Debug, Clone)]
pub(crate) struct Resolver {
    document: Value,
    root: Rc<SchemaNode>,
    cache: RefCell<HashMap<String, Rc<SchemaNode>>>,
    warnings: RefCell<Vec<MessageTree>>,
}

/// A schema that matches every instance, used when a `$ref` cannot be
/// resolved (spec §4.2: "the evaluator treats it as a permissive schema").
pub(crate) fn permissive() -> Rc<SchemaNode> {
    Rc::new(SchemaNode::Boolean {
        pointer: "#".to_string(),
        value: true,
    })
}

impl Resolver {
    pub(crate) fn new(document: Value, root: Rc<SchemaNode>) -> Self {
        Resolver {
            document,
            root,
            cache: RefCell::new(HashMap::new()),
            warnings: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn warnings(&self) -> Vec<MessageTree> {
        self.warnings.borrow().clone()
    }

    /// Resolve `reference` (the verbatim string from a `$ref` keyword) to a
    /// schema node. Returns the bundled root for `"#"`, a freshly-compiled
    /// node for a local JSON-pointer fragment, a bundled meta-schema's root
    /// for the two recognised absolute URLs, or the permissive schema (with a
    /// recorded warning) for anything else.
    pub(crate) fn resolve(&self, reference: &str) -> Rc<SchemaNode> {
        if let Some(cached) = self.cache.borrow().get(reference) {
            return cached.clone();
        }
        let resolved = self.resolve_uncached(reference);
        self.cache
            .borrow_mut()
            .insert(reference.to_string(), resolved.clone());
        resolved
    }

    fn resolve_uncached(&self, reference: &str) -> Rc<SchemaNode> {
        if reference == "#" || reference.is_empty() {
            return self.root.clone();
        }
        if let Some(pointer) = reference.strip_prefix('#') {
            return match self.resolve_pointer(pointer) {
                Some(node) => node,
                None => {
                    self.warn(format!(
                        "`$ref` pointer `{}` does not resolve within the document",
                        reference
                    ));
                    permissive()
                }
            };
        }
        let base = reference.split('#').next().unwrap_or(reference);
        if base == META_SCHEMA_URL {
            return crate::schema::load_meta_schema(crate::schema::MetaSchemaKind::MetaSchema)
                .root();
        }
        if base == HYPER_META_SCHEMA_URL {
            return crate::schema::load_meta_schema(
                crate::schema::MetaSchemaKind::HyperMetaSchema,
            )
            .root();
        }
        self.warn(format!(
            "`$ref` to `{}` is not a bundled meta-schema and network fetching is out of scope; \
             treating as a permissive schema",
            reference
        ));
        permissive()
    }

    fn warn(&self, message: String) {
        self.warnings
            .borrow_mut()
            .push(MessageTree::warning("", message));
    }

    /// Resolves a JSON-pointer fragment (the part after `#`) against the
    /// original document and compiles the target into a fresh `SchemaNode`.
    fn resolve_pointer(&self, pointer: &str) -> Option<Rc<SchemaNode>> {
        let target = walk_pointer(&self.document, pointer)?;
        crate::schema::compile_fragment(target, &format!("#{}", pointer)).ok()
    }
}

fn walk_pointer<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.is_empty() {
        return Some(root);
    }
    let mut current = root;
    for raw_segment in pointer.trim_start_matches('/').split('/') {
        if raw_segment.is_empty() && pointer == "/" {
            continue;
        }
        let segment = raw_segment.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use crate::schema::Schema;
    use crate::value::Value;

    #[test]
    fn local_pointer_ref_resolves_within_document() {
        let schema = Schema::load(
            r#"{"definitions": {"pos": {"type": "integer", "minimum": 0}}, "properties": {"x": {"$ref": "#/definitions/pos"}}}"#,
        )
        .unwrap();
        assert!(schema.is_valid(&Value::from_json_text(r#"{"x": 5}"#).unwrap()));
        assert!(!schema.is_valid(&Value::from_json_text(r#"{"x": -1}"#).unwrap()));
    }

    #[test]
    fn unresolvable_absolute_ref_is_permissive_with_a_warning() {
        let schema = Schema::load(r#"{"$ref": "https://example.com/nope"}"#).unwrap();
        assert!(schema.is_valid(&Value::from_json_text("42").unwrap()));
        assert!(!schema.messages().is_empty());
    }

    #[test]
    fn unresolvable_local_pointer_is_permissive_with_a_warning() {
        let schema = Schema::load(r#"{"$ref": "#/definitions/missing"}"#).unwrap();
        assert!(schema.is_valid(&Value::from_json_text("42").unwrap()));
        assert!(!schema.messages().is_empty());
    }

    #[test]
    fn bundled_meta_schema_ref_resolves_without_network() {
        let schema = Schema::load(r#"{"$ref": "http://json-schema.org/schema#"}"#).unwrap();
        assert!(schema.is_valid(&Value::from_json_text(r#"{"type": "integer"}"#).unwrap()));
        assert!(!schema.is_valid(&Value::from_json_text(r#"{"type": "promise"}"#).unwrap()));
    }
}
