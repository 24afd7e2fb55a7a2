//! Error types for the library surface: `SchemaError` for malformed schemas.
//!
//! Validation failures are not modelled as Rust errors — the evaluator always
//! returns a value (`crate::evaluate::Outcome`), never a thrown error, per the
//! invariant that applying a well-formed schema to arbitrary JSON never panics
//! or aborts.
use std::fmt;
use thiserror::Error;

/// Severity of a single message in a [`MessageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Prevented the schema from being constructed.
    Error,
    /// Collected but non-fatal (e.g. an unresolvable absolute `$ref`).
    Warning,
}

/// A single node in the structured diagnostics produced while loading a
/// schema. Carries a JSON-pointer path into the schema document, a severity, a
/// human-readable message, an optional link to the relevant draft-04 section,
/// and nested sub-messages.
#[derive(Debug, Clone)]
pub struct MessageTree {
    pub pointer: String,
    pub severity: Severity,
    pub message: String,
    pub spec_section: Option<&'static str>,
    pub children: Vec<MessageTree>,
}

impl MessageTree {
    pub fn error(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        MessageTree {
            pointer: pointer.into(),
            severity: Severity::Error,
            message: message.into(),
            spec_section: None,
            children: Vec::new(),
        }
    }

    pub fn warning(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        MessageTree {
            pointer: pointer.into(),
            severity: Severity::Warning,
            message: message.into(),
            spec_section: None,
            children: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: &'static str) -> Self {
        self.spec_section = Some(section);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
            || self.children.iter().any(MessageTree::is_error)
    }

    /// Flatten this tree (and its descendants) into a single-level list,
    /// depth-first, for easy iteration by CLI front-ends.
    pub fn flatten(&self) -> Vec<&MessageTree> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }
}

impl fmt::Display for MessageTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}] at {}: {}", sev, self.pointer, self.message)?;
        if let Some(section) = self.spec_section {
            write!(f, " (see draft-04 {})", section)?;
        }
        Ok(())
    }
}

/// The input is not a well-formed draft-04 schema.
#[derive(Debug, Error)]
#[error("schema is malformed: {}", .messages.first().map(MessageTree::to_string).unwrap_or_default())]
pub struct SchemaError {
    /// At least one message with `Severity::Error`; may also carry warnings.
    pub messages: Vec<MessageTree>,
}

impl SchemaError {
    pub fn single(message: MessageTree) -> Self {
        SchemaError {
            messages: vec![message],
        }
    }
}
