//! Compile annotated `Usage:` lines into a command grammar and match argv
//! against it.
//!
//! The engine runs in two stages:
//!
//! - [`compile`] turns usage lines into an immutable [`Specification`]: one
//!   [`Command`] per line, each a sequence of required or optional [`Slot`]s
//!   holding [`ValueType`]s (literals, boolean options, typed value options
//!   and positionals).
//! - [`select`] picks the command for an argv and [`match_args`] consumes the
//!   argv in a single pass, producing a [`MatchResult`] of validated strings.
//!
//! [`Parser`] bundles both stages around a shared specification, and
//! [`help`] renders usage and documentation text from it. Problems the
//! compiler accepts lazily, such as mistyped defaults, can be reported ahead
//! of time with [`validate_specification`].
//!
//! # Grammar
//!
//! | Token | Meaning |
//! |---|---|
//! | `serve` | literal; the first required one names the command |
//! | `--tls`, `-v` | boolean option |
//! | `--port=INT:8080` | value option of type `INT` with default `8080` |
//! | `--include=PATH+` | value option declared repeatable |
//! | `<dir:PATH>`, `<n:INT:1>` | positional, optionally with a default |
//! | `[a\|b]` | optional slot with alternatives |
//!
//! Types are `INT`, `BOOL`, `STR` and `PATH`.
//!
//! # Example
//!
//! ```
//! use clide_core::Parser;
//!
//! let parser = Parser::from_usage_lines(&[
//!     "Usage: mytool [-v|--verbose] serve [--port=INT:8080] [--tls] [--root=PATH] <dir:PATH>",
//!     "Usage: mytool init <path:PATH>",
//! ])
//! .unwrap();
//!
//! let result = parser.parse(&["serve", "--port", "9090", "-v", "/app"]).unwrap();
//! assert_eq!(result.command(), "serve");
//! assert_eq!(result.option("--port").unwrap(), ["9090"]);
//! assert!(result.flag("--verbose"));
//! assert!(!result.flag("--tls"));
//! assert_eq!(result.positional("dir"), Some("/app"));
//! ```

mod compile;
mod error;
pub mod help;
mod matcher;
mod select;
mod types;
mod validate;

use std::sync::Arc;

pub use compile::compile;
pub use error::{ArgError, Error, GrammarError};
pub use matcher::{MatchResult, match_args};
pub use select::select;
pub use types::*;
pub use validate::{ValidationError, validate_specification};

/// A compiled specification ready to match argv.
///
/// Cloning is cheap: clones share one immutable [`Specification`].
#[derive(Debug, Clone)]
pub struct Parser {
    spec: Arc<Specification>,
}

impl Parser {
    /// Compiles `lines` into a parser.
    ///
    /// # Errors
    ///
    /// Returns the [`GrammarError`] raised by [`compile`].
    pub fn from_usage_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, GrammarError> {
        compile(lines).map(Self::from)
    }

    /// Selects a command for `argv` and matches it.
    ///
    /// # Errors
    ///
    /// Returns the [`ArgError`] raised by [`match_args`].
    pub fn parse<S: AsRef<str>>(&self, argv: &[S]) -> Result<MatchResult, ArgError> {
        match_args(select(&self.spec, argv), argv)
    }

    /// The shared specification.
    pub fn specification(&self) -> &Arc<Specification> {
        &self.spec
    }

    /// Usage block for every command.
    pub fn help(&self) -> String {
        help::render(&self.spec)
    }

    /// Usage block plus the documentation table, with `docs` overriding the
    /// synthesized descriptions.
    pub fn help_with_docs(&self, docs: &[(String, String)]) -> String {
        help::render_with_docs(&self.spec, docs)
    }
}

impl From<Specification> for Parser {
    fn from(spec: Specification) -> Self {
        Self {
            spec: Arc::new(spec),
        }
    }
}

impl From<Arc<Specification>> for Parser {
    fn from(spec: Arc<Specification>) -> Self {
        Self { spec }
    }
}

/// Compiles `usage` and matches `argv` in one call.
///
/// # Errors
///
/// Returns [`Error::Grammar`] for malformed usage lines and [`Error::Arg`]
/// when `argv` does not match.
pub fn parse_once<U: AsRef<str>, S: AsRef<str>>(
    usage: &[U],
    argv: &[S],
) -> Result<MatchResult, Error> {
    let parser = Parser::from_usage_lines(usage)?;
    Ok(parser.parse(argv)?)
}
