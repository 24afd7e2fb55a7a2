//! Per-keyword candidate values (spec §4.4): for each keyword a node
//! carries, a small set of instances chosen to probe the boundary of that
//! keyword in isolation (a value just inside the limit, one just outside,
//! the degenerate empty/zero case). These feed the composition engine in
//! `compose.rs`, which is responsible for combining them across keywords and
//! across nested subschemas.
use crate::schema::{Keywords, PatternConstraint, TypeConstraint};
use crate::value::{TypeTag, Value};

/// A representative instance of each draft-04 primitive type, used as a
/// generic fallback when a node carries no keyword that narrows things
/// further (spec §4.4's "generic fallback" row: `0, 0.1, null, ""`, extended
/// here with one representative per type tag so `type`-only schemas still
/// get type-appropriate probes).
pub(super) fn generic_fallback() -> Vec<Value> {
    vec![
        Value::Int(0),
        Value::Num(0.1),
        Value::Null,
        Value::Str(String::new()),
    ]
}

fn representative(tag: TypeTag) -> Value {
    match tag {
        TypeTag::Null => Value::Null,
        TypeTag::Boolean => Value::Bool(true),
        TypeTag::Integer => Value::Int(0),
        TypeTag::Number => Value::Num(0.5),
        TypeTag::String => Value::Str(String::new()),
        TypeTag::Array => Value::Array(Vec::new()),
        TypeTag::Object => Value::Object(Default::default()),
    }
}

/// Candidates driven only by `type`/`enum`, with no regard for any other
/// keyword on the node. Used both as a baseline and as the probe set for a
/// node that carries nothing else.
pub(super) fn type_and_enum_candidates(keywords: &Keywords) -> Vec<Value> {
    let mut out = Vec::new();
    if let Some(values) = &keywords.enum_values {
        out.extend(values.iter().cloned());
        // One value certain not to be a member, to probe the negative case.
        out.push(Value::Str("walbottle-enum-test-unique".to_string()));
        return out;
    }
    match &keywords.type_constraint {
        Some(TypeConstraint::One(tag)) => out.push(representative(*tag)),
        Some(TypeConstraint::Any(tags)) => out.extend(tags.iter().map(|t| representative(*t))),
        None => out.extend(generic_fallback()),
    }
    out
}

/// A numeric probe, emitted in whichever JSON form the value itself calls
/// for: whole numbers print as a plain integer literal (`5`, matching spec
/// example 1's expectation that `multipleOf: 5` generates the vector `"5"`,
/// not `"5.0"`), anything else as a float.
fn number(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Int(n as i64)
    } else {
        Value::Num(n)
    }
}

/// A value near `n` that is not itself a multiple of `n` (spec §4.4: "`n` +
/// small_non_multiple"). For `n > 1` the next integer past `n` is never a
/// multiple of `n` (e.g. `5` -> `6`); for `n <= 1` every integer is a
/// candidate multiple, so a fractional nudge is used instead.
fn non_multiple_probe(n: f64) -> Value {
    let candidate = if n > 1.0 { n.floor() + 1.0 } else { n * 1.5 + 0.1 };
    number(candidate)
}

/// `multipleOf`: `0`, the limit itself, a clean multiple, and an
/// off-multiple, plus the float form `0.0` (spec §9: the generator emits
/// both `0` and `0.0` deliberately, as distinct canonical forms that both
/// satisfy the predicate).
pub(super) fn multiple_of_candidates(multiple_of: f64) -> Vec<Value> {
    vec![
        Value::Int(0),
        Value::Num(0.0),
        number(multiple_of),
        number(multiple_of * 2.0),
        non_multiple_probe(multiple_of),
    ]
}

/// `maximum`/`minimum`, respecting whichever exclusivity flags are set: the
/// bound itself (both as an integer literal and as a float, per spec §4.4's
/// indicative table), one below, and one above.
pub(super) fn numeric_bound_candidates(keywords: &Keywords) -> Vec<Value> {
    let mut out = Vec::new();
    if let Some(max) = keywords.maximum {
        out.push(number(max));
        out.push(Value::Num(max));
        out.push(number(max - 1.0));
        out.push(number(max + 1.0));
    }
    if let Some(min) = keywords.minimum {
        out.push(number(min));
        out.push(Value::Num(min));
        out.push(number(min - 1.0));
        out.push(number(min + 1.0));
    }
    out
}

/// `maxLength`/`minLength`: boundary lengths, counted in Unicode code points
/// so a multi-byte probe (an emoji) exercises the code-point-count rule
/// rather than a byte-count one.
pub(super) fn string_length_candidates(keywords: &Keywords) -> Vec<Value> {
    let mut out = Vec::new();
    if let Some(max_len) = keywords.max_length {
        out.push(Value::Str("a".repeat(max_len as usize)));
        out.push(Value::Str("a".repeat(max_len as usize + 1)));
        out.push(Value::Str("\u{1F600}".repeat(max_len as usize)));
    }
    if let Some(min_len) = keywords.min_length {
        if min_len > 0 {
            out.push(Value::Str("a".repeat(min_len as usize - 1)));
        }
        out.push(Value::Str("a".repeat(min_len as usize)));
    }
    out
}

/// A literal accepted by `pattern`'s regex, if a simple derivation finds one.
/// A short string drawn from the pattern's own alphanumeric characters is
/// usually enough to satisfy a simple character-class pattern; draft-04
/// patterns are unanchored so this is frequently (not always) a match. Falls
/// back to the empty string when the pattern accepts it, or `None` when
/// neither heuristic lands inside the pattern's language - the caller is
/// then responsible for its own fallback.
pub(super) fn matching_literal(pattern: &PatternConstraint) -> Option<String> {
    let candidate: String = pattern
        .original
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    if pattern.regex.is_match(&candidate) {
        Some(candidate)
    } else if pattern.regex.is_match("") {
        Some(String::new())
    } else {
        None
    }
}

/// `pattern`: one matching literal and one that cannot match (structural
/// mismatch rather than attempting to invert the regex).
pub(super) fn pattern_candidates(pattern: &PatternConstraint) -> Vec<Value> {
    let mut out = Vec::new();
    if let Some(candidate) = matching_literal(pattern) {
        out.push(Value::Str(candidate));
    }
    out.push(Value::Str("walbottle-pattern-test-unique-\u{2603}".to_string()));
    out
}

/// `additionalProperties: false` needs at least one candidate object with an
/// extra key that is neither declared in `properties` nor matched by
/// `patternProperties`, to probe rejection of unexpected keys.
pub const ADDITIONAL_PROPERTIES_SENTINEL: &str = "additionalProperties-test-unique";
