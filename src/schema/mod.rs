//! Schema AST: loading, invariant-checking, and the `Schema`/`SchemaNode`
//! types that the evaluator and generator both operate on.
mod loader;
mod node;

pub use node::{
    Dependency, ItemsConstraint, Keywords, PatternConstraint, PatternPropertyEntry, SchemaNode,
    TypeConstraint,
};

use crate::config::{EvaluationConfig, GenerateFlags, GenerationConfig};
use crate::error::{MessageTree, SchemaError};
use crate::evaluate::{self, Outcome};
use crate::generate::{self, GeneratedInstance};
use crate::resolver::Resolver;
use crate::telemetry::{Telemetry, TelemetryEntry};
use crate::value::Value;
use std::rc::Rc;

/// A loaded, immutable draft-04 schema, ready for validation and/or
/// test-vector generation.
#[derive(Debug, Clone)]
pub struct Schema {
    root: Rc<SchemaNode>,
    messages: Vec<MessageTree>,
    resolver: Resolver,
    telemetry: Telemetry,
}

impl Schema {
    /// Parses `text` and checks it against the draft-04 invariants in spec
    /// §3. On success, returns the schema plus any non-fatal warnings
    /// collected along the way (e.g. an absolute `$ref` this resolver cannot
    /// fetch).
    pub fn load(text: &str) -> Result<Schema, SchemaError> {
        let parsed: Value = Value::from_json_text(text).map_err(|e| {
            SchemaError::single(MessageTree::error("", format!("invalid JSON: {}", e)))
        })?;
        Schema::from_value(&parsed)
    }

    /// As [`Schema::load`], but starting from an already-parsed [`Value`].
    pub fn from_value(parsed: &Value) -> Result<Schema, SchemaError> {
        if !matches!(parsed, Value::Object(_) | Value::Bool(_)) {
            return Err(SchemaError::single(MessageTree::error(
                "",
                "the top-level schema must be a JSON object or a boolean",
            )));
        }
        let mut loader = loader::Loader::new();
        let root = loader.load_node(parsed, "#")?;
        let resolver = Resolver::new(parsed.clone(), root.clone());
        Ok(Schema {
            root,
            messages: loader.warnings,
            resolver,
            telemetry: Telemetry::new(),
        })
    }

    pub fn root(&self) -> Rc<SchemaNode> {
        self.root.clone()
    }

    /// Non-fatal diagnostics collected while loading (currently: unresolved
    /// absolute `$ref`s, recorded lazily the first time they're hit during
    /// evaluation/generation — see [`Resolver`]).
    pub fn messages(&self) -> Vec<MessageTree> {
        let mut all = self.messages.clone();
        all.extend(self.resolver.warnings());
        all
    }

    /// Applies this schema to `instance`, with default evaluation settings.
    pub fn apply(&self, instance: &Value) -> Outcome {
        self.apply_with_config(instance, &EvaluationConfig::default())
    }

    pub fn apply_with_config(&self, instance: &Value, config: &EvaluationConfig) -> Outcome {
        evaluate::apply(&self.root, instance, &self.resolver, config)
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.apply(instance).is_ok()
    }

    /// Generates the deduplicated, labelled set of test-vector instances for
    /// this schema, per spec §4.4/§4.5.
    pub fn generate(&self, flags: GenerateFlags) -> Vec<GeneratedInstance> {
        self.generate_with_config(flags, &GenerationConfig::default())
    }

    pub fn generate_with_config(
        &self,
        flags: GenerateFlags,
        config: &GenerationConfig,
    ) -> Vec<GeneratedInstance> {
        generate::generate(&self.root, flags, config, &self.resolver, &self.telemetry)
    }

    pub fn telemetry_report(&self) -> Vec<TelemetryEntry> {
        self.telemetry.report()
    }
}

/// The two bundled meta-schemas, used for self-hosting: load either one and
/// validate it (it should successfully load, since it is itself a draft-04
/// schema) or generate test vectors from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaSchemaKind {
    MetaSchema,
    HyperMetaSchema,
}

/// Compiles a single JSON-pointer-addressed fragment of a document into a
/// schema node. Used by the resolver to lazily compile local `$ref` targets
/// (e.g. `#/definitions/x`) that were not themselves reachable from a
/// recognised keyword position during the initial load.
pub(crate) fn compile_fragment(value: &Value, pointer: &str) -> Result<Rc<SchemaNode>, SchemaError> {
    let mut loader = loader::Loader::new();
    loader.load_node(value, pointer)
}

static META_SCHEMA: once_cell::sync::Lazy<Schema> = once_cell::sync::Lazy::new(|| {
    Schema::load(crate::meta_schema::SCHEMA)
        .expect("bundled meta-schema must itself be a well-formed draft-04 schema")
});
static HYPER_META_SCHEMA: once_cell::sync::Lazy<Schema> = once_cell::sync::Lazy::new(|| {
    Schema::load(crate::meta_schema::HYPER_SCHEMA)
        .expect("bundled hyper-meta-schema must itself be a well-formed draft-04 schema")
});

/// Returns one of the two bundled meta-schemas, parsed once on first use and
/// cloned on every subsequent call (spec §5: meta-schema text is embedded at
/// compile time and parsed lazily).
pub fn load_meta_schema(which: MetaSchemaKind) -> Schema {
    match which {
        MetaSchemaKind::MetaSchema => META_SCHEMA.clone(),
        MetaSchemaKind::HyperMetaSchema => HYPER_META_SCHEMA.clone(),
    }
}
