//! Composable validation schemas for parsed command-line arguments.
//!
//! This crate is the validation half of the argschema workspace: it takes
//! the flat token mapping an external usage parser produces and checks it
//! against a [`Schema`], coercing and defaulting values along the way.
//! The data model is [`serde_json::Value`], so anything JSON-shaped can be
//! validated, not just argument mappings.
//!
//! A schema wraps a [`Spec`], which classifies into one of six shapes at
//! construction time:
//!
//! - a **literal** matches by equality,
//! - a **type** ([`ValueType`]) matches by instance check,
//! - a **predicate** matches when it returns `true`,
//! - a **validator** ([`And`], [`Or`], [`Use`], a nested [`Schema`], or
//!   any [`Validate`] implementor) delegates,
//! - a **sequence** matches arrays element-wise against a disjunction,
//! - a **mapping** matches objects entry-wise with coverage checks,
//!   optional keys, and default injection.
//!
//! Failures carry a two-track [`SchemaError`] that accumulates one context
//! entry per nesting level and lets caller-supplied messages override the
//! generated diagnostics.
//!
//! # Example
//!
//! ```
//! use argschema_core::{MapEntry, Optional, Or, Schema, Spec, Use, ValueType};
//! use serde_json::json;
//!
//! // The kind of mapping a docopt-style parser hands back, after key
//! // normalization: option and positional names to raw string values.
//! let schema = Schema::new(Spec::map([
//!     MapEntry::required("posarg1", Or::new([Spec::from(ValueType::String)])),
//!     MapEntry::required("posarg2", Or::new([Spec::from(ValueType::String)])),
//!     MapEntry::required("parameter", Use::to_int()),
//!     MapEntry::optional(Optional::new("opt2").with_default("hello")?, ValueType::String),
//! ]));
//!
//! let cleaned = schema.validate(&json!({
//!     "posarg1": "a",
//!     "posarg2": "b",
//!     "parameter": "77",
//! }))?;
//! assert_eq!(cleaned, json!({
//!     "posarg1": "a",
//!     "posarg2": "b",
//!     "parameter": 77,
//!     "opt2": "hello",
//! }));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod combinators;
mod error;
mod types;
mod validate;

pub use combinators::{And, Or, TransformError, Use, Validate};
pub use error::{Result, SchemaError};
pub use types::{InvalidDefaultError, MapEntry, Optional, Predicate, Shape, Spec, ValueType};
pub use validate::Schema;
