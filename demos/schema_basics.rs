//! Walkthrough of the validation engine on its own: shapes, combinators,
//! optional keys, and error rendering.
//!
//! Run with: `cargo run --example schema_basics`

use argschema_core::{And, MapEntry, Optional, Or, Schema, Spec, Use, ValueType};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A configuration-style mapping: literal keys, typed values, a
    // coerced port, and an optional log level with a default.
    let schema = Schema::new(Spec::map([
        MapEntry::required("host", ValueType::String),
        MapEntry::required(
            "port",
            And::new([
                Spec::from(Use::to_int()),
                Spec::predicate("in_port_range", |v| {
                    v.as_i64().is_some_and(|p| (1..=65535).contains(&p))
                }),
            ]),
        ),
        MapEntry::optional(
            Optional::new("log_level").with_default("info")?,
            Or::new([
                Spec::literal("debug"),
                Spec::literal("info"),
                Spec::literal("warn"),
                Spec::literal("error"),
            ]),
        ),
        MapEntry::required("tags", Spec::seq([Spec::from(ValueType::String)])),
    ]));

    let cleaned = schema.validate(&json!({
        "host": "localhost",
        "port": "8080",
        "tags": ["a", "b"],
    }))?;
    println!("validated: {cleaned}");

    // A failing value shows the accumulated context trail.
    let err = schema
        .validate(&json!({
            "host": "localhost",
            "port": "70000",
            "tags": [],
        }))
        .unwrap_err();
    println!("rejected:\n{err}");

    // Caller overrides replace generated diagnostics wholesale.
    let friendly = Schema::with_error(schema.spec().clone(), "invalid server configuration");
    let err = friendly.validate(&json!({"host": "localhost"})).unwrap_err();
    println!("override: {err}");

    Ok(())
}
