//! Options that govern evaluation and generation. Grounded in the teacher's
//! `compilation::CompilationConfig`/`CompilationContext` split between
//! "how do we compile" and "what scope are we in" — generalized here to also
//! carry the composition engine's explosion-control knobs (spec §4.5) and the
//! `GenerateFlags` recognised by the generator CLI (spec §6).

/// Recognised generation options (spec §6). A plain struct of flags reads
/// more plainly at three booleans than reaching for a bitflags crate would.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateFlags {
    /// Omit instances labelled valid.
    pub ignore_valid: bool,
    /// Omit instances labelled invalid.
    pub ignore_invalid: bool,
    /// Additionally include a small fixed set of malformed-JSON byte
    /// sequences as invalid vectors.
    pub invalid_json: bool,
}

impl GenerateFlags {
    pub fn all() -> Self {
        GenerateFlags {
            ignore_valid: false,
            ignore_invalid: false,
            invalid_json: true,
        }
    }
}

/// Explosion-control knobs for the composition engine (spec §4.5).
#[derive(Debug, Clone, Copy)]
pub struct GenerationConfig {
    /// Per-property/per-item candidate cap before cross-product.
    pub candidate_cap_per_slot: usize,
    /// Ceiling on a single schema node's candidate set; once hit, the
    /// composition engine stops adding further candidates for that node.
    pub node_candidate_ceiling: usize,
    /// Maximum `$ref`/recursion depth before a cyclic reference is treated as
    /// resolved-but-not-expanded (spec §4.2/§4.5).
    pub max_ref_depth: usize,
    /// Whether to record per-subschema telemetry while generating (spec
    /// §4.6). Purely additive; never changes the emitted instance set.
    pub collect_telemetry: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            candidate_cap_per_slot: 6,
            node_candidate_ceiling: 200,
            max_ref_depth: 16,
            collect_telemetry: false,
        }
    }
}

/// Options for the evaluator. Draft-04 has no meaningful per-call knobs of
/// its own; this exists so the evaluator's signature matches the
/// generator's (both take a config) and so `max_ref_depth` is shared.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationConfig {
    pub max_ref_depth: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig { max_ref_depth: 16 }
    }
}
