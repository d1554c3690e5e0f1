//! End-to-end binder run over docopt-style tokens.
//!
//! Mirrors a usage text like:
//!
//! ```text
//! Usage:
//!   prog [options] <posarg1> <posarg2>
//!
//! Options:
//!   -h --help                  Show this screen.
//!   -o --option=<option1>      An option.
//!   --opt2=<option2>           An option [default: hello].
//!   -p --parameter=<param>     Retry parameter [default: 77].
//!   -v --verbose               Verbose mode.
//! ```
//!
//! The usage parser itself is out of scope; its output — the flat token
//! mapping — is written out by hand here.
//!
//! Run with: `cargo run --example bind_usage`

use argschema_bind::Arguments;
use argschema_core::{MapEntry, Optional, Or, Schema, Spec, Use, ValueType};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct ProgramArgs {
    posarg1: String,
    posarg2: String,
    parameter: i64,
    opt2: String,
    verbose: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::new(Spec::map([
        MapEntry::required("posarg1", Or::new([Spec::from(ValueType::String)])),
        MapEntry::required("posarg2", Or::new([Spec::from(ValueType::String)])),
        MapEntry::required("parameter", Use::to_int()),
        MapEntry::optional(
            Optional::new("opt2").with_default("hello")?,
            ValueType::String,
        ),
    ]));

    // What a docopt-style parser reports for:
    //   prog aa bb --option=4 --parameter=77 -v
    let tokens = [
        ("<posarg1>".to_string(), json!("aa")),
        ("<posarg2>".to_string(), json!("bb")),
        ("--help".to_string(), json!(false)),
        ("--option".to_string(), json!("4")),
        ("--parameter".to_string(), json!("77")),
        ("--verbose".to_string(), json!(true)),
    ];

    let args = Arguments::from_tokens(tokens, Some(&schema))?;
    println!("{args}");

    let typed: ProgramArgs = args.into_typed()?;
    println!("typed: {typed:?}");

    Ok(())
}
