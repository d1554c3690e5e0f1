//! Token-key normalization and path-value expansion.
//!
//! A docopt-style usage parser reports tokens in their surface form:
//! `<posarg1>` for positionals, `--dry-run`/`-v` for options, bare words
//! for commands, plus a literal `--` entry when the separator appears in
//! argv. Validation wants plain identifier keys, so the surface form is
//! normalized here and the token kind remembered separately.

use std::path::{Path, PathBuf};

/// The bare separator token usage parsers report when `--` appears in
/// argv. Dropped before binding.
pub(crate) const SEPARATOR_TOKEN: &str = "--";

/// Which side of the binder a token lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// `<name>` positionals and bare command words.
    Positional,
    /// `-n` / `--name` options.
    Option,
}

impl TokenKind {
    pub(crate) fn of(token: &str) -> Self {
        if token.starts_with('-') {
            TokenKind::Option
        } else {
            TokenKind::Positional
        }
    }
}

/// Normalizes a raw usage token to a validation key.
///
/// Angle brackets are dropped, `--` prefixes are stripped, and remaining
/// dashes become underscores, in that order: `<posarg1>` → `posarg1`,
/// `--dry-run` → `dry_run`, `-v` → `_v`.
///
/// # Examples
///
/// ```
/// use argschema_bind::normalize_key;
///
/// assert_eq!(normalize_key("<posarg1>"), "posarg1");
/// assert_eq!(normalize_key("--opt-name"), "opt_name");
/// assert_eq!(normalize_key("-v"), "_v");
/// assert_eq!(normalize_key("command"), "command");
/// ```
pub fn normalize_key(token: &str) -> String {
    token
        .replace('<', "")
        .replace('>', "")
        .replace("--", "")
        .replace('-', "_")
}

/// True when a normalized key names a path-like argument whose value
/// should get `~`/`.` expansion.
pub(crate) fn is_path_like(key: &str) -> bool {
    key.contains("folder") || key.contains("path")
}

/// Expands `~`, a bare `.`, and `./` prefixes in a path-like value.
///
/// Trailing slashes and surrounding whitespace are trimmed from the
/// result. `home` is `None` when the platform offers no home directory,
/// in which case `~` is left alone.
pub(crate) fn expand_path_value(raw: &str, home: Option<&Path>, cwd: &Path) -> String {
    let mut value = raw.to_string();
    if let Some(home) = home {
        value = value.replace('~', &home.to_string_lossy());
    }
    if value.trim() == "." {
        value = cwd.to_string_lossy().into_owned();
    }
    if value.contains("./") {
        value = value.replace("./", &format!("{}/", cwd.to_string_lossy()));
    }
    value.trim_end_matches('/').trim().to_string()
}

/// The user's home directory, if the platform knows one.
pub(crate) fn home_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// The current directory, falling back to `.` when unreadable.
pub(crate) fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
