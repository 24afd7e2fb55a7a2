//! The canonical in-memory JSON value model.
//!
//! This is deliberately a separate type from `serde_json::Value`: draft-04
//! semantics (and the generator's dedup logic) need to distinguish integer-typed
//! numbers from real-typed ones, and need a byte-stable canonical serialisation
//! that is independent from whatever `serde_json`'s own `Value` happens to do.
use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// A JSON value, keeping integers and floating-point numbers distinct and
/// remembering object key insertion order.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Num(f64),
    Str(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

/// The draft-04 primitive type names, used by `type` and by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    String,
    Integer,
}

impl TypeTag {
    pub fn from_name(name: &str) -> Option<TypeTag> {
        Some(match name {
            "null" => TypeTag::Null,
            "boolean" => TypeTag::Boolean,
            "object" => TypeTag::Object,
            "array" => TypeTag::Array,
            "number" => TypeTag::Number,
            "string" => TypeTag::String,
            "integer" => TypeTag::Integer,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Object => "object",
            TypeTag::Array => "array",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// The type of this value considering the `integer`/`number` split used by
    /// draft-04's `type` keyword: a `Num` is also `Integer` when it is finite
    /// and mathematically whole.
    pub fn draft4_types(&self) -> Vec<TypeTag> {
        match self {
            Value::Null => vec![TypeTag::Null],
            Value::Bool(_) => vec![TypeTag::Boolean],
            Value::Int(_) => vec![TypeTag::Integer, TypeTag::Number],
            Value::Num(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    vec![TypeTag::Integer, TypeTag::Number]
                } else {
                    vec![TypeTag::Number]
                }
            }
            Value::Str(_) => vec![TypeTag::String],
            Value::Array(_) => vec![TypeTag::Array],
            Value::Object(_) => vec![TypeTag::Object],
        }
    }

    pub fn matches_type(&self, tag: TypeTag) -> bool {
        self.draft4_types().contains(&tag)
    }

    /// Unicode scalar value count, used by `maxLength`/`minLength`.
    pub fn code_point_len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// A byte-stable canonical form, used as the dedup key for generated
    /// instances and for schema round-trip comparisons.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("null"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Int(i) => out.push_str(&i.to_string()),
            Value::Num(n) => out.push_str(&format_canonical_float(*n)),
            Value::Str(s) => write_canonical_string(s, out),
            Value::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_canonical(out);
                }
                out.push(']');
            }
            Value::Object(map) => {
                out.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_canonical_string(key, out);
                    out.push(':');
                    value.write_canonical(out);
                }
                out.push('}');
            }
        }
    }

    pub fn from_json_text(text: &str) -> Result<Value, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Integers print as plain decimal digits; floats use Rust's shortest
/// round-trippable representation, always carrying a decimal point so that
/// `0.0` and `0` remain distinct canonical strings (both satisfy numeric
/// predicates, deliberately, per the generator's `multipleOf` probes).
fn format_canonical_float(n: f64) -> String {
    if n.is_nan() {
        return "null".to_string();
    }
    let mut s = format!("{:?}", n);
    if !s.contains('.') && !s.contains('e') && !s.contains("inf") {
        s.push_str(".0");
    }
    s
}

fn write_canonical_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            // Numbers compare by mathematical value, across Int/Num.
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Int(a), Value::Num(b)) | (Value::Num(b), Value::Int(a)) => *a as f64 == *b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Num(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a valid JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }
    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }
    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        if let Ok(i) = i64::try_from(v) {
            Ok(Value::Int(i))
        } else {
            Ok(Value::Num(v as f64))
        }
    }
    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Num(v))
    }
    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Str(v.to_string()))
    }
    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::Str(v))
    }
    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }
    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }
    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut out = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            out.insert(key, value);
        }
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_and_num_equal_by_value() {
        assert_eq!(Value::Int(1), Value::Num(1.0));
        assert_ne!(Value::Int(1), Value::Num(1.5));
    }

    #[test]
    fn canonical_distinguishes_int_and_float_lexically() {
        assert_ne!(Value::Int(0).canonical(), Value::Num(0.0).canonical());
        assert_eq!(Value::Int(0).canonical(), "0");
        assert_eq!(Value::Num(0.0).canonical(), "0.0");
    }

    #[test]
    fn object_equality_ignores_order() {
        let a = Value::from_json_text(r#"{"a": 1, "b": 2}"#).unwrap();
        let b = Value::from_json_text(r#"{"b": 2, "a": 1}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn object_preserves_insertion_order_in_canonical_form() {
        let a = Value::from_json_text(r#"{"b": 1, "a": 2}"#).unwrap();
        assert_eq!(a.canonical(), r#"{"b":1,"a":2}"#);
    }

    #[test]
    fn multi_byte_code_point_length() {
        let v = Value::Str("a\u{1F600}b".to_string());
        assert_eq!(v.code_point_len(), Some(3));
    }
}
