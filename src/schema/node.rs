//! The schema AST: a tree of [`SchemaNode`]s, each carrying the typed payload
//! of every keyword draft-04 recognises, plus the raw JSON object it was
//! parsed from (for `title`/`description`/`default` and round-trip).
use crate::value::{TypeTag, Value};
use regex::Regex;
use std::rc::Rc;

/// `type` may be a single type name or a non-empty, pairwise-distinct list.
#[derive(Debug, Clone)]
pub enum TypeConstraint {
    One(TypeTag),
    Any(Vec<TypeTag>),
}

impl TypeConstraint {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeConstraint::One(tag) => value.matches_type(*tag),
            TypeConstraint::Any(tags) => tags.iter().any(|tag| value.matches_type(*tag)),
        }
    }

    pub fn tags(&self) -> Vec<TypeTag> {
        match self {
            TypeConstraint::One(tag) => vec![*tag],
            TypeConstraint::Any(tags) => tags.clone(),
        }
    }
}

/// `items` is either a single schema applied to every element, or a tuple of
/// schemas applied positionally.
#[derive(Debug, Clone)]
pub enum ItemsConstraint {
    Single(Rc<SchemaNode>),
    Tuple(Vec<Rc<SchemaNode>>),
}

/// A `dependencies` entry: either a schema the whole object must satisfy
/// (schema dependency), or a list of sibling properties that must also be
/// present (property dependency).
#[derive(Debug, Clone)]
pub enum Dependency {
    Schema(Rc<SchemaNode>),
    Names(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct PatternConstraint {
    pub original: String,
    pub regex: Regex,
}

#[derive(Debug, Clone)]
pub struct PatternPropertyEntry {
    pub pattern: PatternConstraint,
    pub schema: Rc<SchemaNode>,
}

/// The parsed, validated payload of an object-valued schema. Unrecognised
/// keywords are preserved verbatim in `raw` but carry no behaviour.
#[derive(Debug, Clone, Default)]
pub struct Keywords {
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub id: Option<String>,
    pub schema_dialect: Option<String>,

    pub ref_: Option<String>,

    pub type_constraint: Option<TypeConstraint>,
    pub enum_values: Option<Vec<Value>>,

    pub multiple_of: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_maximum: bool,
    pub minimum: Option<f64>,
    pub exclusive_minimum: bool,

    pub max_length: Option<u64>,
    pub min_length: Option<u64>,
    pub pattern: Option<PatternConstraint>,

    pub max_items: Option<u64>,
    pub min_items: Option<u64>,
    pub unique_items: bool,
    pub items: Option<ItemsConstraint>,
    pub additional_items: Option<Rc<SchemaNode>>,

    pub max_properties: Option<u64>,
    pub min_properties: Option<u64>,
    pub required: Option<Vec<String>>,
    pub properties: Option<Vec<(String, Rc<SchemaNode>)>>,
    pub pattern_properties: Option<Vec<PatternPropertyEntry>>,
    pub additional_properties: Option<Rc<SchemaNode>>,
    pub dependencies: Option<Vec<(String, Dependency)>>,

    pub all_of: Option<Vec<Rc<SchemaNode>>>,
    pub any_of: Option<Vec<Rc<SchemaNode>>>,
    pub one_of: Option<Vec<Rc<SchemaNode>>>,
    pub not: Option<Rc<SchemaNode>>,
}

/// A node of the schema AST. Boolean schemas (`true`/`false`) are a distinct
/// variant so that `items`, `additionalItems`, `additionalProperties`, etc.
/// can hold a single `Rc<SchemaNode>` regardless of whether the source used a
/// boolean or an object there.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    Boolean {
        pointer: String,
        value: bool,
    },
    Keywords {
        pointer: String,
        raw: Value,
        keywords: Box<Keywords>,
    },
}

impl SchemaNode {
    pub fn pointer(&self) -> &str {
        match self {
            SchemaNode::Boolean { pointer, .. } => pointer,
            SchemaNode::Keywords { pointer, .. } => pointer,
        }
    }

    pub fn raw(&self) -> Value {
        match self {
            SchemaNode::Boolean { value, .. } => Value::Bool(*value),
            SchemaNode::Keywords { raw, .. } => raw.clone(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.keywords().and_then(|k| k.title.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        self.keywords().and_then(|k| k.description.as_deref())
    }

    pub fn default(&self) -> Option<&Value> {
        self.keywords().and_then(|k| k.default.as_ref())
    }

    pub fn keywords(&self) -> Option<&Keywords> {
        match self {
            SchemaNode::Boolean { .. } => None,
            SchemaNode::Keywords { keywords, .. } => Some(keywords),
        }
    }

    pub fn ref_target(&self) -> Option<&str> {
        self.keywords().and_then(|k| k.ref_.as_deref())
    }

    /// `true` for the permissive boolean schema `true` and for an object
    /// schema with no recognised keywords (both match every instance).
    pub fn is_trivially_permissive(&self) -> bool {
        match self {
            SchemaNode::Boolean { value, .. } => *value,
            SchemaNode::Keywords { .. } => false,
        }
    }
}
