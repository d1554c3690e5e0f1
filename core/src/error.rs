//! Two-track validation errors.
//!
//! A [`SchemaError`] accumulates context as a failure bubbles out of a
//! nested validation: every recursion level prepends exactly one entry to
//! each of its two message tracks, so the final error reads outermost to
//! innermost. Rendering prefers caller-supplied override messages over
//! generated diagnostics.

use std::collections::HashSet;

use thiserror::Error;

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Error raised when data does not satisfy a schema.
///
/// Carries two parallel message tracks:
///
/// - *autos* — generated diagnostics, one entry per nesting level, with
///   `None` holes where a level had nothing to describe
/// - *overrides* — caller-supplied messages (from
///   [`Schema::with_error`](crate::Schema::with_error) and the combinator
///   `with_error` builders), parallel to the autos
///
/// The rendered message deduplicates each track in first-seen order and
/// drops holes. If any override survives, the joined overrides are the
/// message; otherwise the joined autos are. A single override anywhere in
/// the chain therefore replaces every generated diagnostic in the output.
///
/// # Examples
///
/// ```
/// use argschema_core::{Schema, ValueType};
/// use serde_json::json;
///
/// let err = Schema::with_error(ValueType::Int, "count must be a number")
///     .validate(&json!("several"))
///     .unwrap_err();
/// assert_eq!(err.to_string(), "count must be a number");
///
/// let err = Schema::new(ValueType::Int).validate(&json!("several")).unwrap_err();
/// assert_eq!(err.to_string(), "\"several\" should be instance of int");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.autos, .overrides))]
pub struct SchemaError {
    autos: Vec<Option<String>>,
    overrides: Vec<Option<String>>,
}

impl SchemaError {
    /// Creates an error with one generated diagnostic and an optional
    /// caller override.
    pub fn new(auto: impl Into<String>, error: Option<&str>) -> Self {
        Self {
            autos: vec![Some(auto.into())],
            overrides: vec![error.map(String::from)],
        }
    }

    /// Creates an error with empty tracks.
    ///
    /// Used as the fold seed where a combinator may have nothing to chain
    /// onto (an empty `Or` has no sub-error to report).
    pub fn empty() -> Self {
        Self {
            autos: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Prepends one entry to both tracks, returning the extended error.
    ///
    /// Either entry may be `None` to record a hole at this nesting level.
    #[must_use]
    pub fn prepend(mut self, auto: Option<String>, error: Option<String>) -> Self {
        self.autos.insert(0, auto);
        self.overrides.insert(0, error);
        self
    }

    /// The rendered message (same text as the `Display` impl).
    pub fn message(&self) -> String {
        render(&self.autos, &self.overrides)
    }

    /// The generated-diagnostic track, outermost first.
    pub fn autos(&self) -> &[Option<String>] {
        &self.autos
    }

    /// The caller-override track, outermost first.
    pub fn overrides(&self) -> &[Option<String>] {
        &self.overrides
    }
}

fn render(autos: &[Option<String>], overrides: &[Option<String>]) -> String {
    let picked = dedup_present(overrides);
    if !picked.is_empty() {
        return picked.join("\n");
    }
    dedup_present(autos).join("\n")
}

/// Drops holes and repeats, keeping first-seen order.
fn dedup_present(track: &[Option<String>]) -> Vec<&str> {
    let mut seen = HashSet::new();
    track
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|message| seen.insert(*message))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_auto_renders() {
        let err = SchemaError::new("5 should be instance of int", None);
        assert_eq!(err.message(), "5 should be instance of int");
    }

    #[test]
    fn test_override_suppresses_autos() {
        let err = SchemaError::new("generated detail", Some("user-facing text"));
        assert_eq!(err.message(), "user-facing text");
    }

    #[test]
    fn test_prepend_builds_outermost_first_trail() {
        let err = SchemaError::new("inner", None)
            .prepend(Some("middle".into()), None)
            .prepend(Some("outer".into()), None);
        assert_eq!(err.message(), "outer\nmiddle\ninner");
        assert_eq!(err.autos().len(), 3);
    }

    #[test]
    fn test_holes_are_dropped() {
        let err = SchemaError::new("inner", None).prepend(None, None);
        assert_eq!(err.message(), "inner");
    }

    #[test]
    fn test_duplicates_keep_first_seen_order() {
        let err = SchemaError::new("same", None)
            .prepend(Some("other".into()), None)
            .prepend(Some("same".into()), None);
        assert_eq!(err.message(), "same\nother");
    }

    #[test]
    fn test_override_anywhere_in_chain_wins() {
        let err = SchemaError::new("inner detail", None)
            .prepend(None, Some("override".into()))
            .prepend(Some("outer detail".into()), None);
        assert_eq!(err.message(), "override");
    }

    #[test]
    fn test_display_matches_message() {
        let err = SchemaError::new("a", None).prepend(Some("b".into()), None);
        assert_eq!(err.to_string(), err.message());
    }
}
