//! Walbottle is a test-vector generator and validator for JSON Schema
//! draft-04: given a schema, it can tell you whether an instance conforms to
//! it, and it can generate a labelled corpus of instances - some that should
//! validate, some that shouldn't - for exercising a *different*
//! implementation's conformance.
//!
//! ```
//! use walbottle::Schema;
//!
//! let schema = Schema::load(r#"{"type": "integer", "minimum": 0}"#).unwrap();
//! assert!(schema.is_valid(&walbottle::Value::Int(5)));
//! assert!(!schema.is_valid(&walbottle::Value::Int(-1)));
//! ```
mod config;
mod error;
mod evaluate;
mod generate;
mod meta_schema;
mod resolver;
mod schema;
mod telemetry;
mod value;

pub use config::{EvaluationConfig, GenerateFlags, GenerationConfig};
pub use error::{MessageTree, SchemaError, Severity};
pub use evaluate::{Outcome, ReasonTree};
pub use generate::GeneratedInstance;
pub use schema::{
    load_meta_schema, Dependency, ItemsConstraint, Keywords, MetaSchemaKind, PatternConstraint,
    PatternPropertyEntry, Schema, SchemaNode, TypeConstraint,
};
pub use telemetry::TelemetryEntry;
pub use value::{TypeTag, Value};

/// Loads `schema_text` and checks `instance_text` against it in one call,
/// with default evaluation settings. A convenience wrapper around
/// [`Schema::load`] and [`Schema::is_valid`] for one-shot callers that don't
/// need to reuse the compiled schema.
///
/// # Errors
///
/// Returns [`SchemaError`] if `schema_text` is not a well-formed draft-04
/// schema, or if either input is not well-formed JSON.
#[inline]
pub fn is_valid(schema_text: &str, instance_text: &str) -> Result<bool, SchemaError> {
    let schema = Schema::load(schema_text)?;
    let instance = Value::from_json_text(instance_text).map_err(|e| {
        SchemaError::single(MessageTree::error("", format!("invalid JSON: {}", e)))
    })?;
    Ok(schema.is_valid(&instance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_is_valid() {
        assert!(is_valid(r#"{"type": "integer"}"#, "5").unwrap());
        assert!(!is_valid(r#"{"type": "integer"}"#, r#""five""#).unwrap());
    }

    #[test]
    fn one_shot_reports_malformed_schema() {
        assert!(is_valid(r#"{"minimum": "not a number"}"#, "5").is_err());
    }
}
