//! Error types for usage compilation and argv matching.
//!
//! The two stages fail independently: [`GrammarError`] for malformed usage
//! text, [`ArgError`] for an argv that does not fit the selected command.
//! [`Error`] wraps both for callers that run the stages back to back.

use thiserror::Error;

use crate::types::ScalarType;

/// Errors raised while compiling usage lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The compiler was given no lines.
    #[error("no usage lines")]
    NoUsageLines,
    /// A line does not start with `Usage:`.
    #[error("line must start with 'Usage:': {0}")]
    MissingUsagePrefix(String),
    /// A line has `Usage:` but no program token.
    #[error("missing program name after 'Usage:': {0}")]
    MissingProgram(String),
    /// A `[` with no closing `]`.
    #[error("unterminated optional group: {0}")]
    UnterminatedBracket(String),
    /// A `<` with no closing `>`.
    #[error("unterminated positional: {0}")]
    UnterminatedPositional(String),
    /// A positional that is not `<name:TYPE>` or `<name:TYPE:default>`.
    #[error("bad positional: {0}")]
    BadPositional(String),
    /// The left side of `=` is not an option name.
    #[error("bad option: {0}")]
    BadOption(String),
    /// A type keyword outside `INT`, `BOOL`, `STR`, `PATH`.
    #[error("unknown type '{name}' in {token}")]
    UnknownType { name: String, token: String },
    /// An empty alternative inside `[...]`.
    #[error("empty alternative in {0}")]
    EmptyAlternative(String),
    /// Any of the above, located at a 1-based line number.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<GrammarError>,
    },
}

impl GrammarError {
    /// The underlying error with any line location stripped.
    pub fn root(&self) -> &GrammarError {
        match self {
            Self::AtLine { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn at_line(self, line: usize) -> Self {
        Self::AtLine {
            line,
            source: Box::new(self),
        }
    }
}

/// Errors raised while matching argv against a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    /// An option name the command does not declare.
    #[error("unknown option: {0}")]
    UnknownOption(String),
    /// A value option at the end of argv with no value.
    #[error("missing value for {0}")]
    MissingValue(String),
    /// A positional with no token and no default.
    #[error("missing positional: {0}")]
    MissingPositional(String),
    /// A token left over once every positional is filled.
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
    /// A token or default that fails its scalar type.
    #[error("expected {expected}, got: {got}")]
    InvalidValue { expected: ScalarType, got: String },
}

/// Either stage's error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Arg(#[from] ArgError),
}
