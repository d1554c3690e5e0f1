//! `And`, `Or`, and `Use`: composition over specs.
//!
//! Combinators implement [`Validate`] and therefore stand anywhere a spec
//! can, including as mapping keys. `And` and `Or` compose checks; [`Use`]
//! is the coercion primitive that turns raw token strings into typed
//! values.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::types::{Spec, join_display};
use crate::validate::validate_spec;

/// A validator that can stand anywhere a spec can.
///
/// Implementors receive the candidate value and return the validated
/// (possibly transformed) value, or a [`SchemaError`] describing the
/// failure.
pub trait Validate: fmt::Debug + Send + Sync {
    /// Validates `data`, returning the cleaned value.
    fn validate(&self, data: &Value) -> Result<Value>;
}

/// Conjunction: data must pass every sub-spec, in order.
///
/// Each sub-spec validates the output of the previous one, so transforms
/// thread through the chain: `And(Use::to_int(), positive)` first coerces,
/// then checks the coerced value.
///
/// # Examples
///
/// ```
/// use argschema_core::{And, Schema, Spec, Use};
/// use serde_json::json;
///
/// let schema = Schema::new(And::new([
///     Spec::from(Use::to_int()),
///     Spec::predicate("positive", |v| v.as_i64().is_some_and(|n| n > 0)),
/// ]));
///
/// assert_eq!(schema.validate(&json!("7")).unwrap(), json!(7));
/// assert!(schema.validate(&json!("-7")).is_err());
/// ```
#[derive(Clone)]
pub struct And {
    specs: Vec<Spec>,
    error: Option<String>,
}

impl And {
    /// Creates a conjunction over `specs`, applied in order.
    pub fn new(specs: impl IntoIterator<Item = Spec>) -> Self {
        Self {
            specs: specs.into_iter().collect(),
            error: None,
        }
    }

    /// Attaches an override message applied at every step.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

impl fmt::Debug for And {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "And({})", join_display(&self.specs))
    }
}

impl Validate for And {
    fn validate(&self, data: &Value) -> Result<Value> {
        let mut current = data.clone();
        for spec in &self.specs {
            current = validate_spec(spec, self.error.as_deref(), &current)?;
        }
        Ok(current)
    }
}

impl From<And> for Spec {
    fn from(and: And) -> Self {
        Spec::Validator(Arc::new(and))
    }
}

/// Disjunction: the first sub-spec to validate wins.
///
/// Order matters for error reporting and for side-effecting transforms;
/// semantically any one success is accepted. When every alternative fails,
/// the raised error chains a combined description onto the last
/// alternative's error.
///
/// # Examples
///
/// ```
/// use argschema_core::{Or, Schema, Spec, ValueType};
/// use serde_json::json;
///
/// let schema = Schema::new(Or::new([
///     Spec::from(ValueType::Int),
///     Spec::literal("auto"),
/// ]));
///
/// assert!(schema.validate(&json!(5)).is_ok());
/// assert!(schema.validate(&json!("auto")).is_ok());
///
/// let err = schema.validate(&json!("manual")).unwrap_err();
/// assert!(err.to_string().contains("did not validate"));
/// ```
#[derive(Clone)]
pub struct Or {
    specs: Vec<Spec>,
    error: Option<String>,
}

impl Or {
    /// Creates a disjunction over `specs`, tried in order.
    pub fn new(specs: impl IntoIterator<Item = Spec>) -> Self {
        Self {
            specs: specs.into_iter().collect(),
            error: None,
        }
    }

    /// Attaches an override message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

impl fmt::Debug for Or {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Or({})", join_display(&self.specs))
    }
}

impl Validate for Or {
    fn validate(&self, data: &Value) -> Result<Value> {
        any_of(&self.specs, self.error.as_deref(), data)
    }
}

impl From<Or> for Spec {
    fn from(or: Or) -> Self {
        Spec::Validator(Arc::new(or))
    }
}

/// Validates `data` against the first matching alternative.
///
/// Shared by [`Or`] and sequence validation, which treats the element
/// specs of a sequence as a disjunction.
pub(crate) fn any_of(specs: &[Spec], error: Option<&str>, data: &Value) -> Result<Value> {
    let mut last = SchemaError::empty();
    for spec in specs {
        match validate_spec(spec, error, data) {
            Ok(value) => return Ok(value),
            Err(e) => last = e,
        }
    }
    Err(last.prepend(
        Some(format!("Or({}) did not validate {data}", join_display(specs))),
        error.map(String::from),
    ))
}

/// Foreign faults a [`Use`] transform may raise.
pub type TransformError = Box<dyn std::error::Error + Send + Sync + 'static>;

type TransformFn = dyn Fn(&Value) -> std::result::Result<Value, TransformError> + Send + Sync;

/// Transform-then-validate: applies a named fallible conversion.
///
/// A successful call's return value becomes the validated data, which
/// makes `Use` the coercion mechanism (casting numeric strings, rendering
/// values back to strings) as opposed to the pure checks every other
/// shape performs.
///
/// A [`SchemaError`] raised by the transform is re-raised with this
/// level's context prepended; any other fault is wrapped into a
/// [`SchemaError`] naming the transform and the offending input.
///
/// # Examples
///
/// ```
/// use argschema_core::{Schema, Use};
/// use serde_json::json;
///
/// let schema = Schema::new(Use::to_int());
/// assert_eq!(schema.validate(&json!("42")).unwrap(), json!(42));
///
/// let err = schema.validate(&json!("forty-two")).unwrap_err();
/// assert!(err.to_string().starts_with("int(\"forty-two\") raised"));
/// ```
#[derive(Clone)]
pub struct Use {
    name: String,
    transform: Arc<TransformFn>,
    error: Option<String>,
}

impl Use {
    /// Creates a named transform.
    pub fn new<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, TransformError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            transform: Arc::new(transform),
            error: None,
        }
    }

    /// Attaches an override message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Coerces numbers, booleans, and numeric strings to an integer.
    pub fn to_int() -> Self {
        Use::new("int", parse_int)
    }

    /// Coerces numbers, booleans, and numeric strings to a float.
    pub fn to_float() -> Self {
        Use::new("float", parse_float)
    }

    /// Coerces flag-style strings (`true`/`yes`/`1`, `false`/`no`/`0`)
    /// and numbers to a boolean.
    pub fn to_bool() -> Self {
        Use::new("bool", parse_bool)
    }

    /// Renders any value to its string form (strings pass through, other
    /// values render as compact JSON).
    pub fn to_string() -> Self {
        Use::new("str", render_string)
    }
}

impl fmt::Debug for Use {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Use({})", self.name)
    }
}

impl Validate for Use {
    fn validate(&self, data: &Value) -> Result<Value> {
        match (self.transform)(data) {
            Ok(value) => Ok(value),
            Err(fault) => match fault.downcast::<SchemaError>() {
                Ok(inner) => Err(inner.prepend(None, self.error.clone())),
                Err(other) => Err(SchemaError::new(
                    format!("{}({data}) raised {other}", self.name),
                    self.error.as_deref(),
                )),
            },
        }
    }
}

impl From<Use> for Spec {
    fn from(transform: Use) -> Self {
        Spec::Validator(Arc::new(transform))
    }
}

fn parse_int(data: &Value) -> std::result::Result<Value, TransformError> {
    match data {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(data.clone()),
        Value::Number(n) => {
            let truncated = n.as_f64().unwrap_or(0.0) as i64;
            Ok(Value::from(truncated))
        }
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => Ok(Value::from(s.trim().parse::<i64>()?)),
        other => Err(format!("cannot convert {other} to int").into()),
    }
}

fn parse_float(data: &Value) -> std::result::Result<Value, TransformError> {
    match data {
        Value::Number(n) => {
            let f = n.as_f64().unwrap_or(0.0);
            Ok(Value::from(f))
        }
        Value::Bool(b) => Ok(Value::from(f64::from(u8::from(*b)))),
        Value::String(s) => {
            let f = s.trim().parse::<f64>()?;
            if f.is_finite() {
                Ok(Value::from(f))
            } else {
                Err(format!("non-finite value {s}").into())
            }
        }
        other => Err(format!("cannot convert {other} to float").into()),
    }
}

fn parse_bool(data: &Value) -> std::result::Result<Value, TransformError> {
    match data {
        Value::Bool(_) => Ok(data.clone()),
        Value::Number(n) => Ok(Value::Bool(n.as_f64() != Some(0.0))),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "0" | "" => Ok(Value::Bool(false)),
            other => Err(format!("cannot interpret {other:?} as bool").into()),
        },
        other => Err(format!("cannot convert {other} to bool").into()),
    }
}

fn render_string(data: &Value) -> std::result::Result<Value, TransformError> {
    Ok(Value::String(match data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }))
}
