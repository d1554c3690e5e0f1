//! Spec types: the tagged classification of schema values.
//!
//! A [`Spec`] is decided into one of six shapes once, at construction,
//! rather than re-inspected on every validation call. The [`Shape`] order
//! doubles as the candidate priority when mapping keys are matched, so
//! literal keys always win over predicates, types, and other generic
//! matchers.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::combinators::Validate;

/// Dispatch category of a spec, in mapping-key candidate order.
///
/// When a mapping is validated, candidate spec keys are tried in ascending
/// `Shape` order; declaration order breaks ties.
///
/// # Examples
///
/// ```
/// use argschema_core::{Shape, Spec, ValueType};
///
/// assert_eq!(Spec::literal("x").shape(), Shape::Comparable);
/// assert_eq!(Spec::from(ValueType::Int).shape(), Shape::Type);
/// assert!(Shape::Comparable < Shape::Type);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shape {
    /// Literal value compared for equality (the fallback shape).
    Comparable,
    /// Predicate invoked on the data.
    Callable,
    /// Delegating validator (combinators, nested schemas).
    Validator,
    /// Value-type check.
    Type,
    /// Key/value mapping.
    Mapping,
    /// Sequence whose elements match a disjunction of element specs.
    Iterable,
}

/// Value type accepted by a [`Spec::Type`] spec.
///
/// Matches the corresponding [`serde_json::Value`] classification: `Int`
/// means representable as `i64`/`u64`, `Float` means `f64`-backed, and
/// `Number` accepts either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// JSON null.
    Null,
    /// Boolean.
    Bool,
    /// Integer-representable number.
    Int,
    /// Float-backed number.
    Float,
    /// Any number.
    Number,
    /// String.
    String,
    /// Array.
    Array,
    /// Object.
    Object,
}

impl ValueType {
    /// Whether `data` is an instance of this type.
    ///
    /// # Examples
    ///
    /// ```
    /// use argschema_core::ValueType;
    /// use serde_json::json;
    ///
    /// assert!(ValueType::Int.matches(&json!(5)));
    /// assert!(!ValueType::Int.matches(&json!("5")));
    /// assert!(ValueType::Number.matches(&json!(5.5)));
    /// ```
    pub fn matches(&self, data: &Value) -> bool {
        match self {
            ValueType::Null => data.is_null(),
            ValueType::Bool => data.is_boolean(),
            ValueType::Int => data.is_i64() || data.is_u64(),
            ValueType::Float => data.is_f64(),
            ValueType::Number => data.is_number(),
            ValueType::String => data.is_string(),
            ValueType::Array => data.is_array(),
            ValueType::Object => data.is_object(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        };
        f.write_str(name)
    }
}

/// Named predicate over a candidate value.
///
/// The name appears in diagnostics (`even(5) should evaluate to true`), so
/// pick one that reads like a function.
#[derive(Clone)]
pub struct Predicate {
    name: String,
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Predicate {
    /// Creates a named predicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use argschema_core::{Predicate, Schema};
    /// use serde_json::json;
    ///
    /// let even = Predicate::new("even", |v| v.as_i64().is_some_and(|n| n % 2 == 0));
    /// assert!(Schema::new(even.clone()).validate(&json!(4)).is_ok());
    ///
    /// let err = Schema::new(even).validate(&json!(5)).unwrap_err();
    /// assert_eq!(err.to_string(), "even(5) should evaluate to true");
    /// ```
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// The diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the predicate.
    pub fn check(&self, data: &Value) -> bool {
        (self.check)(data)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self.name)
    }
}

/// A schema specification value.
///
/// The variant fixes the validation behavior (see [`Shape`]):
///
/// | Variant | Data is valid when |
/// |---|---|
/// | `Seq` | data is an array and every element matches the disjunction of the element specs |
/// | `Map` | data is an object and each entry matches exactly one [`MapEntry`] |
/// | `Type` | data is an instance of the [`ValueType`] |
/// | `Validator` | the delegate's `validate` succeeds |
/// | `Predicate` | the predicate returns `true` |
/// | `Literal` | data equals the literal |
///
/// Most code builds specs through `From` conversions and the constructor
/// helpers rather than naming variants directly.
#[derive(Debug, Clone)]
pub enum Spec {
    /// Sequence of alternatives for array elements.
    Seq(Vec<Spec>),
    /// Mapping entries, matched per data key in priority order.
    Map(Vec<MapEntry>),
    /// Value-type check.
    Type(ValueType),
    /// Delegation to a [`Validate`] implementor.
    Validator(Arc<dyn Validate>),
    /// Truthy predicate.
    Predicate(Predicate),
    /// Literal equality (fallback shape).
    Literal(Value),
}

impl Spec {
    /// The dispatch shape of this spec.
    pub fn shape(&self) -> Shape {
        match self {
            Spec::Seq(_) => Shape::Iterable,
            Spec::Map(_) => Shape::Mapping,
            Spec::Type(_) => Shape::Type,
            Spec::Validator(_) => Shape::Validator,
            Spec::Predicate(_) => Shape::Callable,
            Spec::Literal(_) => Shape::Comparable,
        }
    }

    /// A literal spec matched by equality.
    pub fn literal(value: impl Into<Value>) -> Self {
        Spec::Literal(value.into())
    }

    /// A sequence spec: data must be an array whose every element matches
    /// one of `alternatives`.
    pub fn seq(alternatives: impl IntoIterator<Item = Spec>) -> Self {
        Spec::Seq(alternatives.into_iter().collect())
    }

    /// A mapping spec built from entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use argschema_core::{MapEntry, Schema, Spec, ValueType};
    /// use serde_json::json;
    ///
    /// let schema = Schema::new(Spec::map([
    ///     MapEntry::required("name", ValueType::String),
    ///     MapEntry::required("retries", ValueType::Int),
    /// ]));
    /// let data = json!({"name": "sync", "retries": 3});
    /// assert_eq!(schema.validate(&data).unwrap(), data);
    /// ```
    pub fn map(entries: impl IntoIterator<Item = MapEntry>) -> Self {
        Spec::Map(entries.into_iter().collect())
    }

    /// A named predicate spec.
    pub fn predicate(
        name: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Spec::Predicate(Predicate::new(name, check))
    }

    /// A delegating validator spec.
    pub fn validator(delegate: impl Validate + 'static) -> Self {
        Spec::Validator(Arc::new(delegate))
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spec::Seq(elems) => write!(f, "[{}]", join_display(elems)),
            Spec::Map(entries) => {
                let rendered: Vec<String> = entries.iter().map(MapEntry::to_string).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Spec::Type(value_type) => value_type.fmt(f),
            Spec::Validator(delegate) => write!(f, "{delegate:?}"),
            Spec::Predicate(predicate) => f.write_str(predicate.name()),
            Spec::Literal(value) => value.fmt(f),
        }
    }
}

pub(crate) fn join_display(specs: &[Spec]) -> String {
    specs
        .iter()
        .map(Spec::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders a validated key value as an object key.
///
/// Object keys are strings; a key transform yielding anything else is
/// rendered to its compact JSON form.
pub(crate) fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<Value> for Spec {
    fn from(value: Value) -> Self {
        Spec::Literal(value)
    }
}

impl From<&str> for Spec {
    fn from(value: &str) -> Self {
        Spec::Literal(Value::from(value))
    }
}

impl From<String> for Spec {
    fn from(value: String) -> Self {
        Spec::Literal(Value::from(value))
    }
}

impl From<i64> for Spec {
    fn from(value: i64) -> Self {
        Spec::Literal(Value::from(value))
    }
}

impl From<f64> for Spec {
    fn from(value: f64) -> Self {
        Spec::Literal(Value::from(value))
    }
}

impl From<bool> for Spec {
    fn from(value: bool) -> Self {
        Spec::Literal(Value::from(value))
    }
}

impl From<ValueType> for Spec {
    fn from(value_type: ValueType) -> Self {
        Spec::Type(value_type)
    }
}

impl From<Predicate> for Spec {
    fn from(predicate: Predicate) -> Self {
        Spec::Predicate(predicate)
    }
}

/// Error from attaching a default to a non-literal optional key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("optional key defaults require a literal key, {spec} is too generic")]
pub struct InvalidDefaultError {
    spec: String,
}

/// Marker for a non-required mapping key, optionally carrying a default.
///
/// Wraps the key spec of a [`MapEntry`] so the coverage check does not
/// demand it. A default is only accepted for literal keys: a default tied
/// to a pattern or type key would be ambiguous as to which concrete key to
/// inject.
///
/// # Examples
///
/// ```
/// use argschema_core::{MapEntry, Optional, Schema, Spec, ValueType};
/// use serde_json::json;
///
/// let schema = Schema::new(Spec::map([MapEntry::optional(
///     Optional::new("count").with_default(0)?,
///     ValueType::Int,
/// )]));
///
/// assert_eq!(schema.validate(&json!({}))?, json!({"count": 0}));
/// assert_eq!(schema.validate(&json!({"count": 5}))?, json!({"count": 5}));
///
/// // Non-literal keys cannot carry a default.
/// assert!(Optional::new(ValueType::String).with_default(0).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Optional {
    spec: Spec,
    error: Option<String>,
    default: Option<Value>,
}

impl Optional {
    /// Marks `key` as a non-required mapping key.
    pub fn new(key: impl Into<Spec>) -> Self {
        Self {
            spec: key.into(),
            error: None,
            default: None,
        }
    }

    /// Attaches an override message used when the key itself fails to
    /// validate.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Attaches a default injected when the key is absent from the input.
    ///
    /// Fails unless the key spec is a literal.
    pub fn with_default(
        mut self,
        default: impl Into<Value>,
    ) -> std::result::Result<Self, InvalidDefaultError> {
        if self.spec.shape() != Shape::Comparable {
            return Err(InvalidDefaultError {
                spec: self.spec.to_string(),
            });
        }
        self.default = Some(default.into());
        Ok(self)
    }
}

/// One key/value pair of a mapping spec.
///
/// Build with [`required`](MapEntry::required) or
/// [`optional`](MapEntry::optional); the key side may itself be any spec
/// (a literal name, a type, a predicate over key strings).
#[derive(Debug, Clone)]
pub struct MapEntry {
    pub(crate) key: KeySpec,
    pub(crate) value: Spec,
}

impl MapEntry {
    /// An entry whose key must be matched by some input key.
    pub fn required(key: impl Into<Spec>, value: impl Into<Spec>) -> Self {
        Self {
            key: KeySpec {
                spec: key.into(),
                error: None,
                required: true,
                default: None,
            },
            value: value.into(),
        }
    }

    /// An entry whose key is not demanded by the coverage check.
    pub fn optional(marker: Optional, value: impl Into<Spec>) -> Self {
        Self {
            key: KeySpec {
                spec: marker.spec,
                error: marker.error,
                required: false,
                default: marker.default,
            },
            value: value.into(),
        }
    }
}

impl fmt::Display for MapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.required {
            write!(f, "{}: {}", self.key.spec, self.value)
        } else {
            write!(f, "Optional({}): {}", self.key.spec, self.value)
        }
    }
}

/// Key side of a [`MapEntry`]: the key spec plus coverage and default
/// metadata.
#[derive(Debug, Clone)]
pub(crate) struct KeySpec {
    pub(crate) spec: Spec,
    pub(crate) error: Option<String>,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
}
