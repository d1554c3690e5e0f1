//! Binding validated tokens onto addressable argument sets.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use argschema_core::{Schema, SchemaError};

use crate::normalize::{
    SEPARATOR_TOKEN, TokenKind, current_dir, expand_path_value, home_dir, is_path_like,
    normalize_key,
};

/// Errors from binding parsed tokens.
#[derive(Debug, Error)]
pub enum BindError {
    /// Schema validation rejected the normalized token mapping.
    #[error("argument validation failed: {0}")]
    Validation(#[from] SchemaError),
    /// The validated mapping could not deserialize into the target type.
    #[error("binding error: {0}")]
    Binding(#[from] serde_json::Error),
}

/// Convenience alias for results with [`BindError`].
pub type Result<T> = std::result::Result<T, BindError>;

/// One surviving input token: normalized key, side, prepared value.
#[derive(Debug)]
struct RawToken {
    key: String,
    kind: TokenKind,
    value: Value,
}

/// Parsed, validated, and sorted command-line arguments.
///
/// Built with [`from_tokens`](Arguments::from_tokens) from the flat
/// `(token, value)` mapping an external usage parser produces. Options
/// and positionals are kept apart, keyed by normalized name, and values
/// arrive coerced: quoted strings unquoted, numeric strings parsed, any
/// schema transforms and defaults applied.
///
/// # Examples
///
/// ```
/// use argschema_bind::Arguments;
/// use serde_json::json;
///
/// let args = Arguments::from_tokens(
///     [
///         ("<posarg1>".to_string(), json!("aa")),
///         ("--option".to_string(), json!("4")),
///     ],
///     None,
/// )?;
///
/// assert_eq!(args.positional("posarg1"), Some(&json!("aa")));
/// assert_eq!(args.option("option"), Some(&json!(4)));
/// # Ok::<(), argschema_bind::BindError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arguments {
    /// Option values keyed by normalized option name.
    pub options: BTreeMap<String, Value>,
    /// Positional and command values keyed by normalized name.
    pub positional: BTreeMap<String, Value>,
}

impl Arguments {
    /// Binds a flat token mapping, optionally validating it first.
    ///
    /// Tokens keep their surface form (`<posarg>`, `--option`, bare
    /// command words); the literal `--` separator entry is dropped.
    /// Path-like values (keys containing `folder` or `path`) get `~` and
    /// `.` expansion before validation.
    ///
    /// When a schema is given it is first extended with a permissive
    /// catch-all entry per undeclared key, so usage tokens the schema
    /// author did not mention validate as plain strings instead of
    /// failing the coverage check. The validated output — with coercions
    /// applied and optional defaults injected — is what gets bound.
    pub fn from_tokens<I, K, V>(tokens: I, schema: Option<&Schema>) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let home = home_dir();
        let cwd = current_dir();

        let mut raw: Vec<RawToken> = Vec::new();
        let mut normalized: Map<String, Value> = Map::new();

        for (token, value) in tokens {
            let token = token.into();
            if token == SEPARATOR_TOKEN {
                debug!("dropped separator token");
                continue;
            }
            let key = normalize_key(&token);
            let mut value = value.into();
            if is_path_like(&key) {
                if let Value::String(text) = &value {
                    value = Value::String(expand_path_value(text, home.as_deref(), &cwd));
                }
            }
            normalized.insert(key.clone(), value.clone());
            raw.push(RawToken {
                key,
                kind: TokenKind::of(&token),
                value,
            });
        }

        let cleaned = match schema {
            Some(schema) => validate_tokens(schema, normalized)?,
            None => normalized,
        };

        let mut counts: HashMap<String, usize> = HashMap::new();
        for token in &raw {
            *counts.entry(token.key.clone()).or_insert(0) += 1;
        }

        let mut options = BTreeMap::new();
        let mut positional = BTreeMap::new();
        for RawToken { key, kind, value } in raw {
            // When an option and a positional normalize to the same key,
            // the validated mapping holds only one of them; each side
            // keeps its own token value in that case.
            let value = if counts.get(&key).copied() == Some(1) {
                cleaned.get(&key).cloned().unwrap_or(value)
            } else {
                value
            };
            let value = coerce_scalar(value);
            match kind {
                TokenKind::Option => options.insert(key, value),
                TokenKind::Positional => positional.insert(key, value),
            };
        }

        // Defaults injected by the schema have no originating token and
        // land on the options side.
        for (key, value) in cleaned {
            if options.contains_key(&key) || positional.contains_key(&key) {
                continue;
            }
            options.insert(key, coerce_scalar(value));
        }

        Ok(Self {
            options,
            positional,
        })
    }

    /// Looks up an option by normalized name.
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Looks up a positional or command by normalized name.
    pub fn positional(&self, name: &str) -> Option<&Value> {
        self.positional.get(name)
    }

    /// Looks up either side; options shadow positionals on name clashes.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options.get(name).or_else(|| self.positional.get(name))
    }

    /// String view of an argument, if it is a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Integer view of an argument, if it is an integer.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Float view of an argument, if it is a number.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Boolean view of an argument, if it is a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// The merged mapping as one JSON object; options shadow positionals
    /// on name clashes.
    pub fn to_value(&self) -> Value {
        let mut merged = Map::new();
        for (key, value) in &self.positional {
            merged.insert(key.clone(), value.clone());
        }
        for (key, value) in &self.options {
            merged.insert(key.clone(), value.clone());
        }
        Value::Object(merged)
    }

    /// Deserializes the merged mapping into a caller-defined type.
    ///
    /// Unknown fields are ignored by default, so the target struct only
    /// needs the arguments it cares about.
    ///
    /// # Examples
    ///
    /// ```
    /// use argschema_bind::Arguments;
    /// use serde::Deserialize;
    /// use serde_json::json;
    ///
    /// #[derive(Deserialize)]
    /// struct Invocation {
    ///     script: String,
    ///     verbose: bool,
    /// }
    ///
    /// let args = Arguments::from_tokens(
    ///     [
    ///         ("<script>".to_string(), json!("deploy.sh")),
    ///         ("--verbose".to_string(), json!(true)),
    ///     ],
    ///     None,
    /// )?;
    /// let invocation: Invocation = args.into_typed()?;
    /// assert_eq!(invocation.script, "deploy.sh");
    /// assert!(invocation.verbose);
    /// # Ok::<(), argschema_bind::BindError>(())
    /// ```
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if !self.positional.is_empty() {
            write_section(f, "Positional arguments:", &self.positional)?;
            first = false;
        }
        if !self.options.is_empty() {
            if !first {
                writeln!(f)?;
            }
            write_section(f, "Options:", &self.options)?;
        }
        Ok(())
    }
}

fn write_section(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    entries: &BTreeMap<String, Value>,
) -> fmt::Result {
    let width = entries.keys().map(String::len).max().unwrap_or(0);
    writeln!(f, "{title}")?;
    for (key, value) in entries {
        writeln!(f, "  {key:<width$}  {}", display_value(value))?;
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extends `schema` with catch-all entries for undeclared keys, then
/// validates, keeping the cleaned output.
fn validate_tokens(schema: &Schema, normalized: Map<String, Value>) -> Result<Map<String, Value>> {
    let declared = schema.declared_keys();
    let mut working = schema.clone();
    for key in normalized.keys() {
        if !declared.iter().any(|declared_key| declared_key == key) {
            debug!(key = %key, "adding catch-all entry for undeclared key");
            working = working.with_void_key(key.clone());
        }
    }
    match working.validate(&Value::Object(normalized))? {
        Value::Object(cleaned) => Ok(cleaned),
        // A non-mapping schema validated successfully but produced
        // nothing bindable; there is nothing to sort.
        other => {
            debug!(output = %other, "schema produced a non-mapping result");
            Ok(Map::new())
        }
    }
}

/// Post-validation scalar coercion for raw token strings.
///
/// Quote characters are ignored while probing for a number; strings with
/// a dot parse as floats, others as integers, and anything non-numeric
/// keeps its original form minus surrounding quotes. Non-strings pass
/// through untouched.
fn coerce_scalar(value: Value) -> Value {
    let Value::String(s) = &value else {
        return value;
    };
    let unquoted: String = s.chars().filter(|c| *c != '\'' && *c != '"').collect();
    if unquoted.contains('.') {
        if let Ok(f) = unquoted.parse::<f64>() {
            if f.is_finite() {
                return Value::from(f);
            }
        }
    } else if let Ok(i) = unquoted.parse::<i64>() {
        return Value::from(i);
    }
    Value::String(s.trim_matches(|c| c == '\'' || c == '"').to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_separator_token_dropped() {
        let args = Arguments::from_tokens(
            [
                ("--".to_string(), json!("")),
                ("<a>".to_string(), json!("x")),
            ],
            None,
        )
        .unwrap();
        assert_eq!(args.positional.len(), 1);
        assert!(args.options.is_empty());
    }

    #[test]
    fn test_sorting_by_token_kind() {
        let args = Arguments::from_tokens(
            [
                ("<posarg1>".to_string(), json!("aa")),
                ("--verbose".to_string(), json!(false)),
                ("command".to_string(), json!(true)),
            ],
            None,
        )
        .unwrap();
        assert_eq!(args.positional("posarg1"), Some(&json!("aa")));
        assert_eq!(args.positional("command"), Some(&json!(true)));
        assert_eq!(args.option("verbose"), Some(&json!(false)));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce_scalar(json!("77")), json!(77));
        assert_eq!(coerce_scalar(json!("7.5")), json!(7.5));
        assert_eq!(coerce_scalar(json!("'4'")), json!(4));
        assert_eq!(coerce_scalar(json!("1e5")), json!("1e5"));
        assert_eq!(coerce_scalar(json!(true)), json!(true));
    }

    #[test]
    fn test_quote_stripping() {
        assert_eq!(coerce_scalar(json!("'foobar'")), json!("foobar"));
        assert_eq!(coerce_scalar(json!("\"quoted\"")), json!("quoted"));
        assert_eq!(coerce_scalar(json!("plain")), json!("plain"));
    }

    #[test]
    fn test_get_prefers_options() {
        let args = Arguments::from_tokens(
            [
                ("<name>".to_string(), json!("pos")),
                ("--name".to_string(), json!("opt")),
            ],
            None,
        )
        .unwrap();
        assert_eq!(args.get("name"), Some(&json!("opt")));
        assert_eq!(args.positional("name"), Some(&json!("pos")));
    }

    #[test]
    fn test_display_sections() {
        let args = Arguments::from_tokens(
            [
                ("<posarg1>".to_string(), json!("aa")),
                ("--opt2".to_string(), json!("hello")),
            ],
            None,
        )
        .unwrap();
        let rendered = args.to_string();
        assert!(rendered.contains("Positional arguments:\n  posarg1  aa\n"));
        assert!(rendered.contains("Options:\n  opt2  hello\n"));
    }

    #[test]
    fn test_to_value_merges_options_over_positionals() {
        let args = Arguments::from_tokens(
            [
                ("<name>".to_string(), json!("pos")),
                ("--name".to_string(), json!("opt")),
            ],
            None,
        )
        .unwrap();
        assert_eq!(args.to_value(), json!({"name": "opt"}));
    }
}
