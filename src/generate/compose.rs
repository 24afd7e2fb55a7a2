//! The composition engine (spec §4.5): combines the per-keyword probes from
//! `probes.rs` into whole instances, recursing into `properties`/`items`/
//! `allOf`/`anyOf`/`oneOf`/`not`/`$ref`. Candidates are deduplicated by
//! their canonical form and capped per slot and per node so that a deeply
//! nested schema cannot make generation blow up combinatorially.
use super::probes;
use crate::config::GenerationConfig;
use crate::resolver::Resolver;
use crate::schema::{ItemsConstraint, SchemaNode};
use crate::telemetry::Telemetry;
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Instant;

/// Shared state for one `generate()` call: the explosion-control knobs, the
/// `$ref` resolver, the telemetry sink, and a memoization cache.
///
/// The cache exists because draft-04's own meta-schema (and any schema that
/// `$ref`s back to an ancestor through `allOf`/`anyOf`/`not`/
/// `additionalProperties`, as the bundled meta-schema does in half a dozen
/// places) would otherwise have its *entire* candidate set recomputed once
/// per sibling `$ref` hop, at every depth up to `max_ref_depth` — an
/// exponential blow-up in the number of self-references, not merely in
/// schema size. Keying the cache by (node identity, remaining ref depth)
/// means each distinct node is composed at most once per depth level,
/// however many distinct paths lead to it.
pub(super) struct ComposeCtx<'a> {
    config: &'a GenerationConfig,
    resolver: &'a Resolver,
    telemetry: &'a Telemetry,
    cache: RefCell<HashMap<(usize, usize), Vec<Value>>>,
}

impl<'a> ComposeCtx<'a> {
    pub(super) fn new(config: &'a GenerationConfig, resolver: &'a Resolver, telemetry: &'a Telemetry) -> Self {
        ComposeCtx {
            config,
            resolver,
            telemetry,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

fn node_key(node: &SchemaNode, depth: usize) -> (usize, usize) {
    (node as *const SchemaNode as usize, depth)
}

/// Generates the candidate instance set for `node`, recursively. `depth`
/// counts `$ref` hops so that a cyclic reference terminates rather than
/// recursing forever (spec §4.2/§4.5), matching the evaluator's own
/// `max_ref_depth` cap.
pub(super) fn candidates(node: &SchemaNode, ctx: &ComposeCtx, depth: usize) -> Vec<Value> {
    let key = node_key(node, depth);
    if let Some(cached) = ctx.cache.borrow().get(&key) {
        if ctx.config.collect_telemetry {
            ctx.telemetry.record(node.pointer(), cached.len(), std::time::Duration::ZERO);
        }
        return cached.clone();
    }

    let started = Instant::now();
    let result = candidates_uncounted(node, ctx, depth);
    if ctx.config.collect_telemetry {
        ctx.telemetry.record(node.pointer(), result.len(), started.elapsed());
    }
    ctx.cache.borrow_mut().insert(key, result.clone());
    result
}

fn candidates_uncounted(node: &SchemaNode, ctx: &ComposeCtx, depth: usize) -> Vec<Value> {
    let keywords = match node {
        SchemaNode::Boolean { value: true, .. } => return probes::generic_fallback(),
        SchemaNode::Boolean { value: false, .. } => return vec![Value::Null],
        SchemaNode::Keywords { keywords, .. } => keywords,
    };

    if let Some(reference) = &keywords.ref_ {
        if depth >= ctx.config.max_ref_depth {
            return probes::generic_fallback();
        }
        let referent = ctx.resolver.resolve(reference);
        return candidates(&referent, ctx, depth + 1);
    }

    let mut out = probes::type_and_enum_candidates(keywords);

    if let Some(multiple_of) = keywords.multiple_of {
        out.extend(probes::multiple_of_candidates(multiple_of));
    }
    out.extend(probes::numeric_bound_candidates(keywords));
    out.extend(probes::string_length_candidates(keywords));
    if let Some(pattern) = &keywords.pattern {
        out.extend(probes::pattern_candidates(pattern));
    }

    if keywords.properties.is_some()
        || keywords.pattern_properties.is_some()
        || keywords.required.is_some()
        || keywords.additional_properties.is_some()
    {
        out.extend(object_candidates(keywords, ctx, depth));
    }

    if let Some(items) = &keywords.items {
        out.extend(array_candidates(keywords, items, ctx, depth));
    }

    for branch_list in [&keywords.all_of, &keywords.any_of, &keywords.one_of] {
        if let Some(branches) = branch_list {
            for branch in branches {
                out.extend(candidates(branch, ctx, depth));
            }
        }
    }
    if let Some(branch) = &keywords.not {
        // A value that fails the negated branch is a candidate for this
        // node; we don't attempt to synthesize the complement, just reuse
        // whatever the branch itself would generate (spec §9: no
        // intersection/complement synthesis for combinators).
        out.extend(candidates(branch, ctx, depth));
    }

    dedup_and_cap(out, ctx.config.node_candidate_ceiling)
}

fn object_candidates(keywords: &crate::schema::Keywords, ctx: &ComposeCtx, depth: usize) -> Vec<Value> {
    let mut out = Vec::new();
    let empty_props: Vec<(String, std::rc::Rc<SchemaNode>)> = Vec::new();
    let properties = keywords.properties.as_ref().unwrap_or(&empty_props);
    let required: Vec<&str> = keywords
        .required
        .as_ref()
        .map(|names| names.iter().map(String::as_str).collect())
        .unwrap_or_default();

    // Baseline object: every declared property present with one of its own
    // candidates, each property slot capped before the cross product.
    let mut base = IndexMap::new();
    for (name, schema) in properties {
        let mut slot = candidates(schema, ctx, depth);
        slot.truncate(ctx.config.candidate_cap_per_slot.max(1));
        if let Some(first) = slot.into_iter().next() {
            base.insert(name.clone(), first);
        }
    }
    out.push(Value::Object(base.clone()));

    // One variant per property omitted, to probe `required`.
    for name in properties.iter().map(|(n, _)| n.clone()) {
        let mut variant = base.clone();
        variant.shift_remove(&name);
        out.push(Value::Object(variant));
    }
    // An empty object, to probe `required` directly when nothing else would.
    if !required.is_empty() {
        out.push(Value::Object(IndexMap::new()));
    }

    // A narrow cross product across each property's own candidate set,
    // capped per slot and bounded overall by `node_candidate_ceiling`.
    let mut product = vec![base.clone()];
    for (name, schema) in properties {
        let slot = {
            let mut c = candidates(schema, ctx, depth);
            c.truncate(ctx.config.candidate_cap_per_slot.max(1));
            c
        };
        let mut next = Vec::new();
        for partial in &product {
            for value in &slot {
                if next.len() >= ctx.config.node_candidate_ceiling {
                    break;
                }
                let mut variant = partial.clone();
                variant.insert(name.clone(), value.clone());
                next.push(variant);
            }
        }
        if !next.is_empty() {
            product = next;
        }
    }
    out.extend(product.into_iter().map(Value::Object));

    // `additionalProperties: false` sentinel: an object carrying a key no
    // declared property or pattern covers.
    if matches!(keywords.additional_properties.as_deref(), Some(SchemaNode::Boolean { value: false, .. }))
    {
        let mut variant = base.clone();
        variant.insert(
            probes::ADDITIONAL_PROPERTIES_SENTINEL.to_string(),
            Value::Null,
        );
        out.push(Value::Object(variant));
    }

    // `patternProperties`: one variant per pattern with a key that matches
    // it, so the sub-schema it governs is actually exercised (spec §4.5
    // point 2).
    if let Some(pattern_properties) = &keywords.pattern_properties {
        for (index, entry) in pattern_properties.iter().enumerate() {
            let key = probes::matching_literal(&entry.pattern)
                .filter(|candidate| !candidate.is_empty())
                .unwrap_or_else(|| format!("walbottle-pattern-property-{}", index));
            let mut slot = candidates(&entry.schema, ctx, depth);
            slot.truncate(ctx.config.candidate_cap_per_slot.max(1));
            if let Some(value) = slot.into_iter().next() {
                let mut variant = base.clone();
                variant.insert(key, value);
                out.push(Value::Object(variant));
            }
        }
    }

    out
}

fn array_candidates(
    keywords: &crate::schema::Keywords,
    items: &ItemsConstraint,
    ctx: &ComposeCtx,
    depth: usize,
) -> Vec<Value> {
    let mut out = vec![Value::Array(Vec::new())];
    match items {
        ItemsConstraint::Single(schema) => {
            let mut slot = candidates(schema, ctx, depth);
            slot.truncate(ctx.config.candidate_cap_per_slot.max(1));
            for value in &slot {
                out.push(Value::Array(vec![value.clone()]));
            }
            if slot.len() >= 2 {
                out.push(Value::Array(vec![slot[0].clone(), slot[1].clone()]));
            }
        }
        ItemsConstraint::Tuple(schemas) => {
            let mut tuple = Vec::with_capacity(schemas.len());
            for schema in schemas {
                let mut slot = candidates(schema, ctx, depth);
                slot.truncate(ctx.config.candidate_cap_per_slot.max(1));
                tuple.push(slot.into_iter().next().unwrap_or(Value::Null));
            }
            out.push(Value::Array(tuple.clone()));
            if let Some(additional) = &keywords.additional_items {
                let mut slot = candidates(additional, ctx, depth);
                slot.truncate(1);
                let mut extended = tuple;
                extended.extend(slot);
                out.push(Value::Array(extended));
            }
        }
    }
    if keywords.unique_items {
        out.push(Value::Array(vec![Value::Int(0), Value::Int(0)]));
    }
    out
}

fn dedup_and_cap(values: Vec<Value>, ceiling: usize) -> Vec<Value> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for value in values {
        let key = value.canonical();
        if seen.insert(key) {
            out.push(value);
            if out.len() >= ceiling {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::config::{GenerateFlags, GenerationConfig};
    use crate::schema::{load_meta_schema, MetaSchemaKind};

    /// A self-referencing schema (`$ref` back to the root through several
    /// sibling keywords, the way the bundled meta-schema does) must generate
    /// in bounded time and produce a bounded, non-empty candidate set rather
    /// than recomputing the whole root expansion once per reference hop.
    #[test]
    fn self_referencing_schema_terminates_and_stays_bounded() {
        let schema = load_meta_schema(MetaSchemaKind::MetaSchema);
        let config = GenerationConfig {
            node_candidate_ceiling: 50,
            candidate_cap_per_slot: 4,
            max_ref_depth: 6,
            collect_telemetry: false,
        };
        let instances = schema.generate_with_config(GenerateFlags::all(), &config);
        assert!(!instances.is_empty());
    }
}
