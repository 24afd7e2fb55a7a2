//! The bundled meta-schemas are themselves draft-04 schema documents, so they
//! should validate against themselves (and the hyper-meta-schema against the
//! plain one), and generating test vectors from either should complete and
//! produce a non-empty, deduplicated corpus without hanging — the two
//! schemas `$ref` back to their own root from half a dozen keyword
//! positions, which is exactly the shape that would blow up a composition
//! engine with no memoization across reference hops.
use walbottle::{load_meta_schema, GenerateFlags, GenerationConfig, MetaSchemaKind};

#[test]
fn meta_schema_validates_against_itself() {
    let meta = load_meta_schema(MetaSchemaKind::MetaSchema);
    let raw = meta.root().raw();
    match meta.apply(&raw) {
        walbottle::Outcome::Ok => {}
        walbottle::Outcome::Invalid(reasons) => {
            panic!("meta-schema failed to validate itself: {:#?}", reasons.messages());
        }
    }
}

#[test]
fn hyper_meta_schema_conforms_to_the_plain_meta_schema() {
    let plain = load_meta_schema(MetaSchemaKind::MetaSchema);
    let hyper = load_meta_schema(MetaSchemaKind::HyperMetaSchema);
    let raw = hyper.root().raw();
    assert!(plain.is_valid(&raw));
}

#[test]
fn hyper_meta_schema_validates_against_itself() {
    let hyper = load_meta_schema(MetaSchemaKind::HyperMetaSchema);
    let raw = hyper.root().raw();
    assert!(hyper.is_valid(&raw));
}

/// Generating vectors for a schema this self-referential must terminate in
/// bounded time/memory and produce a non-empty corpus. Every instance this
/// emits is labelled by running it back through the same evaluator that
/// would check any other instance, so labelling is trivially consistent with
/// `apply`; what this test actually exercises is that the `$ref`-heavy
/// cross-product terminates instead of recomputing the whole root expansion
/// once per self-reference.
#[test]
fn generating_the_meta_schema_terminates_with_a_bounded_corpus() {
    let meta = load_meta_schema(MetaSchemaKind::MetaSchema);
    let config = GenerationConfig {
        node_candidate_ceiling: 80,
        candidate_cap_per_slot: 5,
        max_ref_depth: 8,
        collect_telemetry: false,
    };
    let instances = meta.generate_with_config(GenerateFlags::all(), &config);
    assert!(!instances.is_empty());

    let mut seen = std::collections::HashSet::new();
    for instance in &instances {
        assert!(seen.insert(&instance.json_text), "duplicate vector: {}", instance.json_text);
    }

    // A document this combinatorial won't necessarily land a fully
    // self-consistent "valid" combination within a small candidate cap (the
    // composition engine fixes each property's first candidate as a
    // baseline rather than searching for one that satisfies every sibling
    // keyword at once — see the composition engine's own module docs).
    // Whichever candidates do come out labelled valid must still be
    // reparseable as a schema document in their own right.
    for instance in instances.iter().filter(|i| i.is_valid) {
        let reparsed = walbottle::Schema::load(&instance.json_text);
        assert!(
            reparsed.is_ok(),
            "a meta-schema-valid instance failed to reparse as a schema: {}",
            instance.json_text
        );
    }
}
