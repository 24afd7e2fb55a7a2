//! The two bundled draft-04 meta-schemas, embedded at compile time so that
//! `$ref`s to `http://json-schema.org/schema` or `.../hyper-schema` resolve
//! without a network fetch (spec §4.2), and so the library can validate or
//! generate test vectors for the meta-schemas themselves (spec §8's
//! self-hosting property).
pub(crate) const SCHEMA: &str = include_str!("schema.json");
pub(crate) const HYPER_SCHEMA: &str = include_str!("hyper_schema.json");
