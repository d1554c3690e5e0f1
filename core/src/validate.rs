//! Recursive schema validation.
//!
//! [`Schema::validate`] dispatches on the spec's shape and descends
//! depth-first, rebuilding the validated value as it returns. Failures
//! propagate as [`SchemaError`]s that gain one context entry per level on
//! the way out.
//!
//! # Examples
//!
//! ```
//! use argschema_core::{MapEntry, Optional, Schema, Spec, Use, ValueType};
//! use serde_json::json;
//!
//! let schema = Schema::new(Spec::map([
//!     MapEntry::required("name", ValueType::String),
//!     MapEntry::optional(Optional::new("count").with_default(0)?, Use::to_int()),
//! ]));
//!
//! let cleaned = schema.validate(&json!({"name": "demo", "count": "3"}))?;
//! assert_eq!(cleaned, json!({"name": "demo", "count": 3}));
//!
//! let defaulted = schema.validate(&json!({"name": "demo"}))?;
//! assert_eq!(defaulted, json!({"name": "demo", "count": 0}));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::combinators::{Use, Validate, any_of};
use crate::error::{Result, SchemaError};
use crate::types::{MapEntry, Spec, ValueType, key_string};

/// Validation schema: a spec plus an optional override message.
///
/// Stateless and reusable; `validate` borrows the schema and the data and
/// returns a new cleaned value, so one schema may serve many calls (and
/// many threads). Schemas also implement [`Validate`], so they nest as
/// sub-specs, which is how per-level override messages compose.
#[derive(Debug, Clone)]
pub struct Schema {
    spec: Spec,
    error: Option<String>,
}

impl Schema {
    /// Creates a schema from any spec-convertible value.
    pub fn new(spec: impl Into<Spec>) -> Self {
        Self {
            spec: spec.into(),
            error: None,
        }
    }

    /// Creates a schema whose failures render `error` instead of the
    /// generated diagnostics.
    pub fn with_error(spec: impl Into<Spec>, error: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            error: Some(error.into()),
        }
    }

    /// The wrapped spec.
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Validates `data`, returning the cleaned (possibly coerced and
    /// defaulted) value.
    pub fn validate(&self, data: &Value) -> Result<Value> {
        validate_spec(&self.spec, self.error.as_deref(), data)
    }

    /// Names of the literal keys declared by a mapping spec.
    ///
    /// Optional keys with literal names are included. Non-literal keys
    /// (types, predicates, nested validators) have no name and are
    /// skipped; non-mapping specs declare nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use argschema_core::{MapEntry, Optional, Schema, Spec, ValueType};
    ///
    /// let schema = Schema::new(Spec::map([
    ///     MapEntry::required("name", ValueType::String),
    ///     MapEntry::optional(Optional::new("count"), ValueType::Int),
    ///     MapEntry::required(ValueType::String, ValueType::Bool),
    /// ]));
    /// assert_eq!(schema.declared_keys(), vec!["name", "count"]);
    /// ```
    pub fn declared_keys(&self) -> Vec<String> {
        let Spec::Map(entries) = &self.spec else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| match &entry.key.spec {
                Spec::Literal(value) => Some(key_string(value)),
                _ => None,
            })
            .collect()
    }

    /// Returns a schema extended with a permissive entry for `key`.
    ///
    /// The added entry accepts any value and coerces it to its string
    /// form, letting a mapping pass coverage checks for keys the schema
    /// author did not declare. Only meaningful on mapping specs; any
    /// other shape is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use argschema_core::{MapEntry, Schema, Spec, ValueType};
    /// use serde_json::json;
    ///
    /// let schema = Schema::new(Spec::map([MapEntry::required("a", ValueType::Int)]));
    /// assert!(schema.validate(&json!({"a": 1, "b": true})).is_err());
    ///
    /// let tolerant = schema.with_void_key("b");
    /// let cleaned = tolerant.validate(&json!({"a": 1, "b": true})).unwrap();
    /// assert_eq!(cleaned, json!({"a": 1, "b": "true"}));
    /// ```
    #[must_use]
    pub fn with_void_key(mut self, key: impl Into<String>) -> Self {
        if let Spec::Map(entries) = &mut self.spec {
            entries.push(MapEntry::required(
                Spec::literal(key.into()),
                Use::to_string(),
            ));
        }
        self
    }
}

impl Validate for Schema {
    fn validate(&self, data: &Value) -> Result<Value> {
        Schema::validate(self, data)
    }
}

impl From<Schema> for Spec {
    fn from(schema: Schema) -> Self {
        Spec::Validator(Arc::new(schema))
    }
}

/// Shape-dispatched validation of `data` against `spec`.
///
/// `error` is the override message attached at this nesting level; it is
/// threaded into sub-validations the same way the [`Schema`] wrapper
/// would thread it.
pub(crate) fn validate_spec(spec: &Spec, error: Option<&str>, data: &Value) -> Result<Value> {
    match spec {
        Spec::Seq(alternatives) => match data {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(any_of(alternatives, error, item)?);
                }
                Ok(Value::Array(out))
            }
            other => Err(type_mismatch(ValueType::Array, other, error)),
        },
        Spec::Map(entries) => validate_map(entries, error, data),
        Spec::Type(value_type) => {
            if value_type.matches(data) {
                Ok(data.clone())
            } else {
                Err(type_mismatch(*value_type, data, error))
            }
        }
        Spec::Validator(delegate) => delegate
            .validate(data)
            .map_err(|e| e.prepend(None, error.map(String::from))),
        Spec::Predicate(predicate) => {
            if predicate.check(data) {
                Ok(data.clone())
            } else {
                Err(SchemaError::new(
                    format!("{}({data}) should evaluate to true", predicate.name()),
                    error,
                ))
            }
        }
        Spec::Literal(expected) => {
            if expected == data {
                Ok(data.clone())
            } else {
                Err(SchemaError::new(
                    format!("{expected} does not match {data}"),
                    error,
                ))
            }
        }
    }
}

fn type_mismatch(expected: ValueType, data: &Value, error: Option<&str>) -> SchemaError {
    SchemaError::new(format!("{data} should be instance of {expected}"), error)
}

/// Mapping validation: candidate matching, coverage, defaults.
///
/// For every data entry, candidate spec keys are tried in shape-priority
/// order. A candidate whose key spec rejects the data key is skipped; a
/// candidate whose key matches but whose value spec rejects the data
/// value fails the whole pass immediately. Data keys no candidate claims
/// are caught by the wrong-keys check after the pass.
fn validate_map(entries: &[MapEntry], error: Option<&str>, data: &Value) -> Result<Value> {
    let input = match data {
        Value::Object(map) => map,
        other => return Err(type_mismatch(ValueType::Object, other, error)),
    };

    // Literal keys first, generic matchers last; declaration order breaks
    // ties (the sort is stable).
    let mut candidates: Vec<(usize, &MapEntry)> = entries.iter().enumerate().collect();
    candidates.sort_by_key(|(_, entry)| entry.key.spec.shape());

    let mut out = Map::new();
    let mut covered: HashSet<usize> = HashSet::new();

    for (key, value) in input {
        let key_value = Value::String(key.clone());
        for (index, entry) in &candidates {
            let key_error = entry.key.error.as_deref().or(error);
            let Ok(new_key) = validate_spec(&entry.key.spec, key_error, &key_value) else {
                // Key mismatch: try the next candidate.
                continue;
            };
            let new_value = validate_spec(&entry.value, error, value).map_err(|e| {
                e.prepend(
                    Some(format!("invalid value for key '{key}'")),
                    error.map(String::from),
                )
            })?;
            covered.insert(*index);
            out.insert(key_string(&new_key), new_value);
            break;
        }
        // A key matching no candidate is reported by the wrong-keys check.
    }

    let missed: Vec<String> = entries
        .iter()
        .enumerate()
        .filter(|(index, entry)| entry.key.required && !covered.contains(index))
        .map(|(_, entry)| describe_key(&entry.key.spec))
        .collect();
    if !missed.is_empty() {
        return Err(SchemaError::new(
            format!("missed keys {}", missed.join(", ")),
            error,
        ));
    }

    if out.len() != input.len() {
        let mut wrong: Vec<String> = input
            .keys()
            .filter(|key| !out.contains_key(*key))
            .map(|key| format!("'{key}'"))
            .collect();
        wrong.sort();
        return Err(SchemaError::new(
            format!("wrong keys {} in {data}", wrong.join(", ")),
            error,
        ));
    }

    // Inject defaults for optional keys the input never supplied.
    for (index, entry) in entries.iter().enumerate() {
        if entry.key.required || covered.contains(&index) {
            continue;
        }
        if let (Some(default), Spec::Literal(key)) = (&entry.key.default, &entry.key.spec) {
            out.insert(key_string(key), default.clone());
        }
    }

    Ok(Value::Object(out))
}

fn describe_key(spec: &Spec) -> String {
    match spec {
        Spec::Literal(Value::String(name)) => format!("'{name}'"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::combinators::{And, Or};
    use crate::types::Optional;

    use super::*;

    #[test]
    fn test_literal_identity() {
        for data in [json!("a"), json!(5), json!(true), json!(null)] {
            assert_eq!(Schema::new(data.clone()).validate(&data).unwrap(), data);
        }
    }

    #[test]
    fn test_literal_mismatch_message() {
        let err = Schema::new(Spec::literal("a")).validate(&json!("b")).unwrap_err();
        assert_eq!(err.to_string(), "\"a\" does not match \"b\"");
    }

    #[test]
    fn test_type_check() {
        assert_eq!(
            Schema::new(ValueType::Int).validate(&json!(5)).unwrap(),
            json!(5)
        );
        let err = Schema::new(ValueType::Int).validate(&json!("5")).unwrap_err();
        assert_eq!(err.to_string(), "\"5\" should be instance of int");
    }

    #[test]
    fn test_seq_elements_validate_against_disjunction() {
        let schema = Schema::new(Spec::seq([
            Spec::from(ValueType::Int),
            Spec::literal("skip"),
        ]));
        let data = json!([1, "skip", 2]);
        assert_eq!(schema.validate(&data).unwrap(), data);

        let err = schema.validate(&json!([1, "other"])).unwrap_err();
        assert!(err.to_string().contains("did not validate \"other\""));
    }

    #[test]
    fn test_seq_rejects_non_array() {
        let err = Schema::new(Spec::seq([Spec::from(ValueType::Int)]))
            .validate(&json!(5))
            .unwrap_err();
        assert_eq!(err.to_string(), "5 should be instance of array");
    }

    #[test]
    fn test_map_posargs_scenario() {
        let schema = Schema::new(Spec::map([
            MapEntry::required("posarg1", Or::new([Spec::from(ValueType::String)])),
            MapEntry::required("posarg2", Or::new([Spec::from(ValueType::String)])),
        ]));
        let data = json!({"posarg1": "a", "posarg2": "b"});
        assert_eq!(schema.validate(&data).unwrap(), data);
    }

    #[test]
    fn test_map_rejects_non_object() {
        let err = Schema::new(Spec::map([])).validate(&json!([1])).unwrap_err();
        assert_eq!(err.to_string(), "[1] should be instance of object");
    }

    #[test]
    fn test_missed_keys_names_the_missing_key() {
        let schema = Schema::new(Spec::map([
            MapEntry::required("a", ValueType::Int),
            MapEntry::required("b", ValueType::Int),
        ]));
        let err = schema.validate(&json!({"a": 1})).unwrap_err();
        assert_eq!(err.to_string(), "missed keys 'b'");
    }

    #[test]
    fn test_wrong_keys_names_the_extras() {
        let schema = Schema::new(Spec::map([MapEntry::required("a", ValueType::Int)]));
        let err = schema.validate(&json!({"a": 1, "b": 2})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "wrong keys 'b' in {\"a\":1,\"b\":2}"
        );
    }

    #[test]
    fn test_optional_default_injection() {
        let schema = Schema::new(Spec::map([MapEntry::optional(
            Optional::new("count").with_default(0).unwrap(),
            ValueType::Int,
        )]));
        assert_eq!(schema.validate(&json!({})).unwrap(), json!({"count": 0}));
        // An explicit value is never overridden by the default.
        assert_eq!(
            schema.validate(&json!({"count": 5})).unwrap(),
            json!({"count": 5})
        );
    }

    #[test]
    fn test_optional_without_default_injects_nothing() {
        let schema = Schema::new(Spec::map([MapEntry::optional(
            Optional::new("count"),
            ValueType::Int,
        )]));
        assert_eq!(schema.validate(&json!({})).unwrap(), json!({}));
    }

    #[test]
    fn test_literal_key_wins_over_type_key() {
        // The generic string-key matcher would accept "mode" too; the
        // literal candidate must be tried first.
        let schema = Schema::new(Spec::map([
            MapEntry::required(ValueType::String, ValueType::Int),
            MapEntry::required("mode", Spec::literal("fast")),
        ]));
        let data = json!({"mode": "fast", "retries": 3});
        assert_eq!(schema.validate(&data).unwrap(), data);
    }

    #[test]
    fn test_value_mismatch_fails_immediately() {
        // "mode" matches the literal candidate; its value failing must
        // abort the pass rather than fall through to the type candidate,
        // which would have accepted the pair.
        let schema = Schema::new(Spec::map([
            MapEntry::required("mode", Spec::literal("fast")),
            MapEntry::required(ValueType::String, ValueType::String),
        ]));
        let err = schema.validate(&json!({"mode": "slow"})).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("invalid value for key 'mode'"));
        assert!(message.contains("\"fast\" does not match \"slow\""));
    }

    #[test]
    fn test_nested_map_error_carries_context() {
        let schema = Schema::new(Spec::map([MapEntry::required(
            "server",
            Spec::map([MapEntry::required("port", ValueType::Int)]),
        )]));
        let err = schema
            .validate(&json!({"server": {"port": "eighty"}}))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("invalid value for key 'server'"));
        assert!(message.contains("invalid value for key 'port'"));
        assert!(message.contains("\"eighty\" should be instance of int"));
    }

    #[test]
    fn test_key_transform_renames_output_entry() {
        let schema = Schema::new(Spec::map([MapEntry::required(
            Use::new("lower", |v: &Value| {
                Ok(Value::String(
                    v.as_str().unwrap_or_default().to_lowercase(),
                ))
            }),
            ValueType::Int,
        )]));
        assert_eq!(
            schema.validate(&json!({"PORT": 80})).unwrap(),
            json!({"port": 80})
        );
    }

    #[test]
    fn test_void_key_is_pure_extension() {
        let schema = Schema::new(Spec::map([MapEntry::required("a", ValueType::Int)]));
        let tolerant = schema.clone().with_void_key("extra");

        // The original schema still rejects the extra key.
        assert!(schema.validate(&json!({"a": 1, "extra": 2})).is_err());
        assert_eq!(
            tolerant.validate(&json!({"a": 1, "extra": 2})).unwrap(),
            json!({"a": 1, "extra": "2"})
        );
    }

    #[test]
    fn test_nested_schema_override_message() {
        let schema = Schema::new(Spec::map([MapEntry::required(
            "port",
            Schema::with_error(ValueType::Int, "port must be an integer"),
        )]));
        let err = schema.validate(&json!({"port": "eighty"})).unwrap_err();
        assert_eq!(err.to_string(), "port must be an integer");
    }

    #[test]
    fn test_validation_is_idempotent() {
        let schema = Schema::new(Spec::map([
            MapEntry::required("name", ValueType::String),
            MapEntry::optional(Optional::new("count").with_default(0).unwrap(), ValueType::Int),
            MapEntry::required("tags", Spec::seq([Spec::from(ValueType::String)])),
        ]));
        let once = schema
            .validate(&json!({"name": "n", "tags": ["a", "b"]}))
            .unwrap();
        let twice = schema.validate(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_and_inside_map_coerces_value() {
        let schema = Schema::new(Spec::map([MapEntry::required(
            "parameter",
            And::new([Spec::from(Use::to_int()), Spec::from(ValueType::Int)]),
        )]));
        assert_eq!(
            schema.validate(&json!({"parameter": "77"})).unwrap(),
            json!({"parameter": 77})
        );
    }

    #[test]
    fn test_declared_keys_skips_generic_matchers() {
        let schema = Schema::new(Spec::map([
            MapEntry::required("a", ValueType::Int),
            MapEntry::optional(Optional::new("b"), ValueType::Int),
            MapEntry::required(ValueType::String, ValueType::Int),
        ]));
        assert_eq!(schema.declared_keys(), vec!["a", "b"]);
        assert!(Schema::new(ValueType::Int).declared_keys().is_empty());
    }
}
