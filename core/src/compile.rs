//! Usage-line compiler.
//!
//! Turns `Usage: <prog> <token>...` lines into a [`Specification`]. Tokens are
//! whitespace-separated and classified one at a time:
//!
//! - `[a|b|...]` is an optional slot whose alternatives are classified
//!   individually (one level deep);
//! - `<name:TYPE>` / `<name:TYPE:default>` is a positional;
//! - `--long`, `-s`, or anything containing `=` is an option, where the part
//!   after `=` is `TYPE[:default][+]`;
//! - every other word is a literal.

use tracing::{debug, warn};

use crate::error::GrammarError;
use crate::types::{AltGroup, Command, ScalarType, Slot, Specification, ValueType};

const USAGE_KEYWORD: &str = "Usage:";

/// Compiles usage lines into a specification, one command per line.
///
/// # Errors
///
/// Returns [`GrammarError::NoUsageLines`] for an empty input. Any problem in
/// a line is reported as [`GrammarError::AtLine`] wrapping the token-level
/// error; use [`GrammarError::root`] to inspect it.
///
/// # Examples
///
/// ```
/// use clide_core::compile;
///
/// let spec = compile(&[
///     "Usage: mytool [-v|--verbose] serve [--port=INT:8080] [--tls] [--root=PATH] <dir:PATH>",
///     "Usage: mytool init <path:PATH>",
/// ])
/// .unwrap();
///
/// assert_eq!(spec.program(), "mytool");
/// let names: Vec<&str> = spec.commands().iter().map(|c| c.name()).collect();
/// assert_eq!(names, vec!["serve", "init"]);
///
/// assert!(compile(&["Usage: tool <unterminated"]).is_err());
/// ```
pub fn compile<S: AsRef<str>>(lines: &[S]) -> Result<Specification, GrammarError> {
    let mut program: Option<String> = None;
    let mut commands = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let (line_program, slots) =
            compile_line(line.as_ref()).map_err(|err| err.at_line(line_no))?;

        let first = program.get_or_insert_with(|| line_program.to_string());
        if first.as_str() != line_program {
            warn!(
                line = line_no,
                expected = %first,
                found = line_program,
                "Usage line names a different program; keeping the first"
            );
        }

        let command = Command::from_slots(slots);
        debug!(
            line = line_no,
            command = command.name(),
            slots = command.slots().len(),
            "Compiled usage line"
        );
        commands.push(command);
    }

    let Some(program) = program else {
        return Err(GrammarError::NoUsageLines);
    };
    Ok(Specification::new(program, commands))
}

/// Compiles one line into its program token and slot sequence.
fn compile_line(line: &str) -> Result<(&str, Vec<Slot>), GrammarError> {
    let mut words = line.split_whitespace();

    if words.next() != Some(USAGE_KEYWORD) {
        return Err(GrammarError::MissingUsagePrefix(line.trim().to_string()));
    }
    let program = words
        .next()
        .ok_or_else(|| GrammarError::MissingProgram(line.trim().to_string()))?;

    let slots = words.map(compile_slot).collect::<Result<Vec<_>, _>>()?;
    Ok((program, slots))
}

fn compile_slot(token: &str) -> Result<Slot, GrammarError> {
    let Some(rest) = token.strip_prefix('[') else {
        return classify(token).map(Slot::required);
    };
    let inner = rest
        .strip_suffix(']')
        .ok_or_else(|| GrammarError::UnterminatedBracket(token.to_string()))?;

    let members = inner
        .split('|')
        .map(|alt| {
            if alt.is_empty() {
                Err(GrammarError::EmptyAlternative(token.to_string()))
            } else {
                classify(alt)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let group = match collapse(&members) {
        Some(merged) => AltGroup::single(merged),
        None => AltGroup::new(members)
            .ok_or_else(|| GrammarError::EmptyAlternative(token.to_string()))?,
    };
    Ok(Slot::optional(group))
}

/// Classifies a single non-bracketed token.
fn classify(token: &str) -> Result<ValueType, GrammarError> {
    if token.starts_with('<') {
        parse_positional(token)
    } else if is_long(token) || is_short(token) || token.contains('=') {
        parse_option(token)
    } else {
        Ok(ValueType::Literal(token.to_string()))
    }
}

fn parse_positional(token: &str) -> Result<ValueType, GrammarError> {
    let inner = token
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(|| GrammarError::UnterminatedPositional(token.to_string()))?;

    let parts: Vec<&str> = inner.split(':').collect();
    let (name, keyword, default) = match parts.as_slice() {
        [name, keyword] => (*name, *keyword, None),
        [name, keyword, default] => (*name, *keyword, Some(*default)),
        _ => return Err(GrammarError::BadPositional(token.to_string())),
    };
    if name.is_empty() {
        return Err(GrammarError::BadPositional(token.to_string()));
    }

    Ok(ValueType::Positional {
        name: name.to_string(),
        ty: scalar_type(keyword, token)?,
        default: default.map(String::from),
    })
}

fn parse_option(token: &str) -> Result<ValueType, GrammarError> {
    let (name, descriptor) = match token.split_once('=') {
        Some((name, descriptor)) => (name, Some(descriptor)),
        None => (token, None),
    };

    let (long, short) = if is_long(name) {
        (Some(name.to_string()), None)
    } else if is_short(name) {
        (None, Some(name.to_string()))
    } else {
        return Err(GrammarError::BadOption(token.to_string()));
    };

    let Some(descriptor) = descriptor else {
        return Ok(ValueType::BooleanOption { long, short });
    };

    let (core, allow_repeat) = match descriptor.strip_suffix('+') {
        Some(core) => (core, true),
        None => (descriptor, false),
    };
    let (keyword, default) = match core.split_once(':') {
        Some((keyword, default)) => (keyword, Some(default.to_string())),
        None => (core, None),
    };

    Ok(ValueType::ValueOption {
        long,
        short,
        ty: scalar_type(keyword, token)?,
        default,
        allow_repeat,
    })
}

fn scalar_type(keyword: &str, token: &str) -> Result<ScalarType, GrammarError> {
    ScalarType::from_keyword(keyword).ok_or_else(|| GrammarError::UnknownType {
        name: keyword.to_string(),
        token: token.to_string(),
    })
}

/// `-x`: one dash and exactly one non-dash character.
fn is_short(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('-')
        && matches!(chars.next(), Some(c) if c != '-')
        && chars.next().is_none()
}

/// `--name`: two dashes and at least one more character.
fn is_long(s: &str) -> bool {
    s.len() > 2 && s.starts_with("--")
}

/// Merges `[-v|--verbose]`-style pairs into one value type with both names.
///
/// Applies only to exactly two options of the same kind where one is
/// short-only and the other long-only; value options must also agree on type,
/// default and repeat flag.
fn collapse(members: &[ValueType]) -> Option<ValueType> {
    let [first, second] = members else {
        return None;
    };
    let (long, short) = long_short_pair(first, second)?;

    match (first, second) {
        (ValueType::BooleanOption { .. }, ValueType::BooleanOption { .. }) => {
            Some(ValueType::BooleanOption {
                long: Some(long),
                short: Some(short),
            })
        }
        (
            ValueType::ValueOption {
                ty,
                default,
                allow_repeat,
                ..
            },
            ValueType::ValueOption {
                ty: other_ty,
                default: other_default,
                allow_repeat: other_repeat,
                ..
            },
        ) if ty == other_ty && default == other_default && allow_repeat == other_repeat => {
            Some(ValueType::ValueOption {
                long: Some(long),
                short: Some(short),
                ty: *ty,
                default: default.clone(),
                allow_repeat: *allow_repeat,
            })
        }
        _ => None,
    }
}

fn long_short_pair(a: &ValueType, b: &ValueType) -> Option<(String, String)> {
    match ((a.long(), a.short()), (b.long(), b.short())) {
        ((None, Some(short)), (Some(long), None)) | ((Some(long), None), (None, Some(short))) => {
            Some((long.to_string(), short.to_string()))
        }
        _ => None,
    }
}
