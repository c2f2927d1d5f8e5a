//! Argument matching.
//!
//! [`match_args`] walks argv once, left to right, with a single cursor:
//!
//! 1. `--` fills the remaining positionals from the tokens after it (falling
//!    back to defaults) and keeps the rest as leftovers;
//! 2. a token starting with `-` is an option, `--name=value` or
//!    `--name value`;
//! 3. any other token is swallowed when it is one of the command's literals,
//!    and otherwise fills the next positional.
//!
//! Unseen options and positionals then receive their defaults.

use std::collections::HashMap;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::error::ArgError;
use crate::types::{Command, ScalarType, ValueType};

const TERMINATOR: &str = "--";

/// Validated outcome of matching argv against a command.
///
/// Every value is kept in its validated string form; converting to numbers or
/// booleans is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    command: String,
    options: Vec<(String, Vec<String>)>,
    positionals: Vec<(String, String)>,
    leftovers: Vec<String>,
}

impl MatchResult {
    /// Name of the matched command.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Option values keyed by canonical name, in first-insertion order.
    pub fn options(&self) -> &[(String, Vec<String>)] {
        &self.options
    }

    /// Positional values in declaration order.
    pub fn positionals(&self) -> &[(String, String)] {
        &self.positionals
    }

    /// Tokens after `--` that no positional consumed.
    pub fn leftovers(&self) -> &[String] {
        &self.leftovers
    }

    /// Values recorded for an option key such as `--port`.
    pub fn option(&self, key: &str) -> Option<&[String]> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Value of a positional by name.
    pub fn positional(&self, name: &str) -> Option<&str> {
        self.positionals
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if the option under `key` recorded `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        self.option(key)
            .is_some_and(|values| values.iter().any(|v| v == "true"))
    }
}

/// Serializes ordered pairs as a map without reordering them.
struct OrderedPairs<'a, V>(&'a [(String, V)]);

impl<V: Serialize> Serialize for OrderedPairs<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for MatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MatchResult", 4)?;
        state.serialize_field("command", &self.command)?;
        state.serialize_field("options", &OrderedPairs(&self.options))?;
        state.serialize_field("positionals", &OrderedPairs(&self.positionals))?;
        state.serialize_field("leftovers", &self.leftovers)?;
        state.end()
    }
}

/// Matches `argv` against `cmd`.
///
/// Repeated value options accumulate whether or not the grammar marked them
/// repeatable, and an inline value on a boolean option (`--tls=no`) is
/// ignored.
///
/// # Errors
///
/// Returns an [`ArgError`] for an unknown option, a value option without a
/// value, a token or default that fails its type, an extra token once all
/// positionals are filled, or a positional with neither a token nor a
/// default.
///
/// # Examples
///
/// ```
/// use clide_core::{compile, match_args};
///
/// let spec = compile(&["Usage: build [--include=PATH+] <dir:PATH>"]).unwrap();
/// let result = match_args(
///     spec.default_command(),
///     &["--include", "src", "--include", "lib", "project"],
/// )
/// .unwrap();
///
/// assert_eq!(result.command(), "_");
/// assert_eq!(result.option("--include").unwrap(), ["src", "lib"]);
/// assert_eq!(result.positional("dir"), Some("project"));
/// ```
pub fn match_args<S: AsRef<str>>(cmd: &Command, argv: &[S]) -> Result<MatchResult, ArgError> {
    let argv: Vec<&str> = argv.iter().map(|arg| arg.as_ref()).collect();
    Matcher::new(cmd).run(&argv)
}

#[derive(Debug, Clone, Copy)]
enum OptionDecl<'c> {
    Flag { key: &'c str },
    Value { key: &'c str, ty: ScalarType },
}

#[derive(Debug)]
struct PositionalDecl<'c> {
    name: &'c str,
    ty: ScalarType,
    default: Option<&'c str>,
}

impl PositionalDecl<'_> {
    fn default_value(&self) -> Result<String, ArgError> {
        match self.default {
            Some(default) => self.ty.validate(default),
            None => Err(ArgError::MissingPositional(self.name.to_string())),
        }
    }
}

#[derive(Debug)]
struct LiteralDecl<'c> {
    text: &'c str,
    required: bool,
    consumed: bool,
}

struct Matcher<'c> {
    command: &'c Command,
    options: HashMap<&'c str, OptionDecl<'c>>,
    positionals: Vec<PositionalDecl<'c>>,
    literals: Vec<LiteralDecl<'c>>,
    recorded: Vec<(String, Vec<String>)>,
    filled: Vec<(String, String)>,
    /// Index of the next positional declaration a token fills.
    next_positional: usize,
}

impl<'c> Matcher<'c> {
    fn new(command: &'c Command) -> Self {
        let mut options = HashMap::new();
        let mut positionals = Vec::new();
        let mut literals = Vec::new();

        for slot in command.slots() {
            for vt in slot.value_types() {
                let decl = match vt {
                    ValueType::Literal(text) => {
                        literals.push(LiteralDecl {
                            text,
                            required: slot.is_required(),
                            consumed: false,
                        });
                        continue;
                    }
                    ValueType::Positional { name, ty, default } => {
                        positionals.push(PositionalDecl {
                            name,
                            ty: *ty,
                            default: default.as_deref(),
                        });
                        continue;
                    }
                    ValueType::BooleanOption { .. } => match vt.canonical_key() {
                        Some(key) => OptionDecl::Flag { key },
                        None => continue,
                    },
                    ValueType::ValueOption { ty, .. } => match vt.canonical_key() {
                        Some(key) => OptionDecl::Value { key, ty: *ty },
                        None => continue,
                    },
                };
                // The first declaration of a name wins.
                for name in vt.names() {
                    options.entry(name).or_insert(decl);
                }
            }
        }

        Self {
            command,
            options,
            positionals,
            literals,
            recorded: Vec::new(),
            filled: Vec::new(),
            next_positional: 0,
        }
    }

    fn run(mut self, argv: &[&str]) -> Result<MatchResult, ArgError> {
        let mut leftovers = Vec::new();
        let mut cursor = 0;

        while let Some(&token) = argv.get(cursor) {
            if token == TERMINATOR {
                leftovers = self.fill_after_terminator(&argv[cursor + 1..])?;
                break;
            }
            if token.starts_with('-') {
                cursor += self.take_option(token, argv.get(cursor + 1).copied())?;
            } else {
                self.take_word(token)?;
                cursor += 1;
            }
        }

        self.apply_option_defaults()?;
        self.apply_positional_defaults()?;

        debug!(
            command = self.command.name(),
            options = self.recorded.len(),
            positionals = self.filled.len(),
            leftovers = leftovers.len(),
            "Matched argv"
        );

        Ok(MatchResult {
            command: self.command.name().to_string(),
            options: self.recorded,
            positionals: self.filled,
            leftovers,
        })
    }

    /// Handles an option token and returns how many tokens it used.
    fn take_option(&mut self, token: &str, next: Option<&str>) -> Result<usize, ArgError> {
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        let decl = *self
            .options
            .get(name)
            .ok_or_else(|| ArgError::UnknownOption(name.to_string()))?;

        match decl {
            OptionDecl::Flag { key } => {
                if let Some(value) = inline {
                    trace!(option = name, value, "Ignoring inline value on boolean option");
                }
                self.record(key, "true".to_string());
                Ok(1)
            }
            OptionDecl::Value { key, ty } => {
                let (raw, used) = match inline {
                    Some(value) => (value, 1),
                    None => {
                        let value =
                            next.ok_or_else(|| ArgError::MissingValue(name.to_string()))?;
                        (value, 2)
                    }
                };
                let value = ty.validate(raw)?;
                self.record(key, value);
                Ok(used)
            }
        }
    }

    /// Handles a token that is neither `--` nor an option.
    fn take_word(&mut self, token: &str) -> Result<(), ArgError> {
        if let Some(literal) = self
            .literals
            .iter_mut()
            .find(|lit| lit.text == token && !(lit.required && lit.consumed))
        {
            literal.consumed = true;
            trace!(literal = token, required = literal.required, "Consumed literal");
            return Ok(());
        }

        let Some(decl) = self.positionals.get(self.next_positional) else {
            return Err(ArgError::UnexpectedArgument(token.to_string()));
        };
        let (name, value) = (decl.name, decl.ty.validate(token)?);
        self.next_positional += 1;
        self.fill(name, value);
        Ok(())
    }

    /// Fills the remaining positionals from `rest` and returns the unconsumed
    /// tail. Positionals left over receive defaults afterwards.
    fn fill_after_terminator(&mut self, rest: &[&str]) -> Result<Vec<String>, ArgError> {
        let mut raw = rest.iter();

        while let Some(decl) = self.positionals.get(self.next_positional) {
            let Some(token) = raw.next() else {
                break;
            };
            let (name, value) = (decl.name, decl.ty.validate(token)?);
            self.next_positional += 1;
            self.fill(name, value);
        }

        Ok(raw.map(|token| token.to_string()).collect())
    }

    fn apply_option_defaults(&mut self) -> Result<(), ArgError> {
        for vt in self.command.value_types() {
            let Some(key) = vt.canonical_key() else {
                continue;
            };
            if self.recorded.iter().any(|(k, _)| k == key) {
                continue;
            }
            let value = match vt {
                ValueType::BooleanOption { .. } => "false".to_string(),
                ValueType::ValueOption {
                    ty,
                    default: Some(default),
                    ..
                } => ty.validate(default)?,
                ValueType::ValueOption { default: None, .. }
                | ValueType::Literal(_)
                | ValueType::Positional { .. } => continue,
            };
            self.recorded.push((key.to_string(), vec![value]));
        }
        Ok(())
    }

    /// Gives every positional name still unrecorded its default.
    fn apply_positional_defaults(&mut self) -> Result<(), ArgError> {
        for decl in &self.positionals[self.next_positional..] {
            if self.filled.iter().any(|(name, _)| name == decl.name) {
                continue;
            }
            let value = decl.default_value()?;
            self.filled.push((decl.name.to_string(), value));
        }
        Ok(())
    }

    /// Records a positional value; a repeated name keeps its first slot and
    /// takes the newer value.
    fn fill(&mut self, name: &str, value: String) {
        match self.filled.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value,
            None => self.filled.push((name.to_string(), value)),
        }
    }

    fn record(&mut self, key: &str, value: String) {
        match self.recorded.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.recorded.push((key.to_string(), vec![value])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    fn run(line: &str, argv: &[&str]) -> Result<MatchResult, ArgError> {
        let spec = compile(&[line]).unwrap();
        match_args(spec.default_command(), argv)
    }

    #[test]
    fn test_inline_and_separate_values() {
        let line = "Usage: t [--port=INT] [-n=STR]";
        let result = run(line, &["--port=9090", "-n", "x"]).unwrap();
        assert_eq!(result.option("--port").unwrap(), ["9090"]);
        assert_eq!(result.option("-n").unwrap(), ["x"]);
    }

    #[test]
    fn test_inline_value_splits_at_first_equals() {
        let result = run("Usage: t [--define=STR]", &["--define=a=b"]).unwrap();
        assert_eq!(result.option("--define").unwrap(), ["a=b"]);
    }

    #[test]
    fn test_short_name_records_under_long_key() {
        let line = "Usage: t [-v|--verbose] [-j=INT|--jobs=INT]";
        let result = run(line, &["-v", "-j", "3"]).unwrap();
        assert_eq!(result.option("--verbose").unwrap(), ["true"]);
        assert_eq!(result.option("--jobs").unwrap(), ["3"]);
        assert_eq!(result.option("-v"), None);
    }

    #[test]
    fn test_missing_value_at_end() {
        assert_eq!(
            run("Usage: t [--port=INT]", &["--port"]),
            Err(ArgError::MissingValue("--port".to_string()))
        );
    }

    #[test]
    fn test_value_option_takes_next_token_even_if_dashed() {
        let result = run("Usage: t [--pattern=STR] [--tls]", &["--pattern", "--tls"]).unwrap();
        assert_eq!(result.option("--pattern").unwrap(), ["--tls"]);
        assert_eq!(result.option("--tls").unwrap(), ["false"]);
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(
            run("Usage: t [--port=INT]", &["--port", "http"]),
            Err(ArgError::InvalidValue {
                expected: ScalarType::Int,
                got: "http".to_string(),
            })
        );
        assert!(matches!(
            run("Usage: t <count:INT>", &["many"]),
            Err(ArgError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_bool_values_are_normalized() {
        let line = "Usage: t [--cache=BOOL] <force:BOOL>";
        let result = run(line, &["--cache", "TRUE", "False"]).unwrap();
        assert_eq!(result.option("--cache").unwrap(), ["true"]);
        assert_eq!(result.positional("force"), Some("false"));
    }

    #[test]
    fn test_inline_value_on_boolean_option_is_ignored() {
        let result = run("Usage: t [--tls]", &["--tls=nonsense"]).unwrap();
        assert_eq!(result.option("--tls").unwrap(), ["true"]);
    }

    #[test]
    fn test_repeats_accumulate_without_repeat_marker() {
        // The repeat marker is declarative only; repeats are always accepted.
        let result = run("Usage: t [--tag=STR]", &["--tag", "a", "--tag=b"]).unwrap();
        assert_eq!(result.option("--tag").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_repeated_flag_records_each_occurrence() {
        let result = run("Usage: t [-v]", &["-v", "-v"]).unwrap();
        assert_eq!(result.option("-v").unwrap(), ["true", "true"]);
        assert!(result.flag("-v"));
    }

    #[test]
    fn test_optional_literal_is_swallowed_every_time() {
        let result = run("Usage: t [now] <a:STR>", &["now", "x", "now"]).unwrap();
        assert_eq!(result.positionals(), [("a".to_string(), "x".to_string())]);
        assert!(result.options().is_empty());
    }

    #[test]
    fn test_alternative_literals_are_swallowed() {
        let result = run("Usage: t [fast|slow] <a:STR>", &["slow", "x"]).unwrap();
        assert_eq!(result.positional("a"), Some("x"));
    }

    #[test]
    fn test_required_literal_is_consumed_once() {
        let result = run("Usage: t run <name:STR>", &["run", "run"]).unwrap();
        assert_eq!(result.command(), "run");
        assert_eq!(result.positional("name"), Some("run"));
    }

    #[test]
    fn test_unexpected_argument() {
        assert_eq!(
            run("Usage: t <a:STR>", &["x", "y"]),
            Err(ArgError::UnexpectedArgument("y".to_string()))
        );
    }

    #[test]
    fn test_unknown_option_uses_name_part() {
        assert_eq!(
            run("Usage: t [--tls]", &["--bogus=1"]),
            Err(ArgError::UnknownOption("--bogus".to_string()))
        );
        assert_eq!(
            run("Usage: t <n:INT>", &["-5"]),
            Err(ArgError::UnknownOption("-5".to_string()))
        );
    }

    #[test]
    fn test_defaults_follow_seen_options() {
        let line = "Usage: t [--a=INT:1] [--b] [--c=STR] [--d=STR:x]";
        let result = run(line, &["--d", "y"]).unwrap();
        let keys: Vec<&str> = result.options().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["--d", "--a", "--b"]);
        assert_eq!(result.option("--d").unwrap(), ["y"]);
        assert_eq!(result.option("--c"), None);
    }

    #[test]
    fn test_invalid_default_fails_only_when_used() {
        let line = "Usage: t [--port=INT:http]";
        assert!(run(line, &["--port", "80"]).is_ok());
        assert_eq!(
            run(line, &[]),
            Err(ArgError::InvalidValue {
                expected: ScalarType::Int,
                got: "http".to_string(),
            })
        );
    }

    #[test]
    fn test_positional_defaults() {
        let line = "Usage: t <src:PATH> <dst:PATH:out>";
        let result = run(line, &["in"]).unwrap();
        assert_eq!(result.positional("dst"), Some("out"));
        assert_eq!(
            run(line, &[]),
            Err(ArgError::MissingPositional("src".to_string()))
        );
    }

    #[test]
    fn test_terminator_prefers_tokens_over_defaults() {
        let line = "Usage: t <a:STR> <b:STR:dflt>";
        let result = run(line, &["--", "-x", "-y", "z"]).unwrap();
        assert_eq!(result.positional("a"), Some("-x"));
        assert_eq!(result.positional("b"), Some("-y"));
        assert_eq!(result.leftovers(), ["z"]);
    }

    #[test]
    fn test_terminator_falls_back_to_defaults() {
        let line = "Usage: t <a:STR> <b:STR:dflt>";
        let result = run(line, &["one", "--"]).unwrap();
        assert_eq!(result.positional("b"), Some("dflt"));
        assert!(result.leftovers().is_empty());

        assert_eq!(
            run(line, &["--"]),
            Err(ArgError::MissingPositional("a".to_string()))
        );
    }

    #[test]
    fn test_terminator_stops_option_processing() {
        let result = run("Usage: t [--tls]", &["--", "--tls", "--"]).unwrap();
        assert_eq!(result.option("--tls").unwrap(), ["false"]);
        assert_eq!(result.leftovers(), ["--tls", "--"]);
    }

    #[test]
    fn test_repeated_positional_name_is_recorded_once() {
        let line = "Usage: t [--n=INT] <a:STR> <a:STR:x>";
        let result = run(line, &["v"]).unwrap();
        assert_eq!(result.positionals(), [("a".to_string(), "v".to_string())]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["positionals"], serde_json::json!({ "a": "v" }));

        let result = run(line, &["v", "w"]).unwrap();
        assert_eq!(result.positionals(), [("a".to_string(), "w".to_string())]);
    }

    #[test]
    fn test_serialize_keeps_insertion_order() {
        let result = run("Usage: t [--z] [--a=INT:1] <p:STR>", &["--a", "2", "v"]).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"command":"_","options":{"--a":["2"],"--z":["false"]},"positionals":{"p":"v"},"leftovers":[]}"#
        );
    }
}
