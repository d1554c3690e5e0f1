//! Argument binding over [`argschema_core`] schemas.
//!
//! An external docopt-style usage parser turns argv into a flat mapping
//! of recognized tokens to raw values: `<posarg1>` entries for
//! positionals, `--option` entries for flags and options, bare words for
//! commands. This crate takes that mapping the rest of the way:
//!
//! 1. drops the literal `--` separator entry,
//! 2. expands `~` and `.` in path-like values,
//! 3. normalizes token keys to plain identifiers,
//! 4. validates against a [`Schema`](argschema_core::Schema), extending
//!    it with permissive catch-all entries for undeclared keys,
//! 5. sorts the validated output into options and positionals with
//!    numeric coercion applied,
//! 6. binds the result as an [`Arguments`] value with typed accessors
//!    and [`into_typed`](Arguments::into_typed) deserialization.
//!
//! # Example
//!
//! ```
//! use argschema_bind::Arguments;
//! use argschema_core::{MapEntry, Schema, Spec, Use, ValueType};
//! use serde_json::json;
//!
//! let schema = Schema::new(Spec::map([
//!     MapEntry::required("posarg1", ValueType::String),
//!     MapEntry::required("parameter", Use::to_int()),
//! ]));
//!
//! let args = Arguments::from_tokens(
//!     [
//!         ("<posarg1>".to_string(), json!("aa")),
//!         ("--parameter".to_string(), json!("77")),
//!         ("--verbose".to_string(), json!(false)),
//!     ],
//!     Some(&schema),
//! )?;
//!
//! assert_eq!(args.get_str("posarg1"), Some("aa"));
//! assert_eq!(args.get_i64("parameter"), Some(77));
//! # Ok::<(), argschema_bind::BindError>(())
//! ```

mod arguments;
mod normalize;

pub use arguments::{Arguments, BindError, Result};
pub use normalize::normalize_key;
