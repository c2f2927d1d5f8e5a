//! Specification lint.
//!
//! The compiler accepts some grammars that can only fail, or silently shadow
//! each other, once argv is matched: defaults are type-checked lazily, and a
//! name declared twice resolves to its first declaration. This module reports
//! those cases up front without changing compile or match behavior.
//!
//! # Examples
//!
//! ```
//! use clide_core::{compile, validate_specification, ValidationError};
//!
//! let spec = compile(&["Usage: t [--port=INT:8080] <dir:PATH>"]).unwrap();
//! assert!(validate_specification(&spec).is_empty());
//!
//! let spec = compile(&["Usage: t [--port=INT:http]"]).unwrap();
//! let errors = validate_specification(&spec);
//! assert!(matches!(errors[0], ValidationError::InvalidDefault { .. }));
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{Command, ScalarType, Specification, ValueType};

/// Problems found by [`validate_specification`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A default literal that fails its declared type.
    #[error("default '{default}' of {key} is not a valid {expected}")]
    InvalidDefault {
        key: String,
        expected: ScalarType,
        default: String,
    },
    /// One option name declared twice in a command.
    #[error("duplicate option {name} in command {command}")]
    DuplicateOption { command: String, name: String },
    /// One positional name declared twice in a command.
    #[error("duplicate positional {name} in command {command}")]
    DuplicatePositional { command: String, name: String },
    /// A command whose literal an earlier command already claims.
    #[error("command {0} is shadowed by an earlier command with the same literal")]
    ShadowedCommand(String),
}

/// Lints a compiled specification, returning every problem found in
/// declaration order.
pub fn validate_specification(spec: &Specification) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut literals: HashSet<&str> = HashSet::new();

    for cmd in spec.commands() {
        if let Some(literal) = cmd.literal() {
            if !literals.insert(literal) {
                errors.push(ValidationError::ShadowedCommand(literal.to_string()));
            }
        }
        errors.extend(validate_command(cmd));
    }

    errors
}

fn validate_command(cmd: &Command) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut option_names: HashSet<&str> = HashSet::new();
    let mut positional_names: HashSet<&str> = HashSet::new();

    for vt in cmd.value_types() {
        for name in vt.names() {
            if !option_names.insert(name) {
                errors.push(ValidationError::DuplicateOption {
                    command: cmd.name().to_string(),
                    name: name.to_string(),
                });
            }
        }

        if let ValueType::Positional { name, .. } = vt {
            if !positional_names.insert(name) {
                errors.push(ValidationError::DuplicatePositional {
                    command: cmd.name().to_string(),
                    name: name.clone(),
                });
            }
        }

        if let (Some(ty), Some(default)) = (vt.scalar_type(), vt.default_literal()) {
            if ty.validate(default).is_err() {
                errors.push(ValidationError::InvalidDefault {
                    key: vt.canonical_key().map_or_else(|| vt.to_string(), String::from),
                    expected: ty,
                    default: default.to_string(),
                });
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    #[test]
    fn test_accepts_valid_specification() {
        let spec = compile(&[
            "Usage: mytool [-v|--verbose] serve [--port=INT:8080] [--tls] [--root=PATH] <dir:PATH>",
            "Usage: mytool init <path:PATH>",
        ])
        .unwrap();
        assert!(validate_specification(&spec).is_empty());
    }

    #[test]
    fn test_rejects_bad_positional_default() {
        let spec = compile(&["Usage: t <n:INT:many> [--dry=BOOL:yes]"]).unwrap();
        assert_eq!(
            validate_specification(&spec),
            vec![
                ValidationError::InvalidDefault {
                    key: "<n:INT:many>".to_string(),
                    expected: ScalarType::Int,
                    default: "many".to_string(),
                },
                ValidationError::InvalidDefault {
                    key: "--dry".to_string(),
                    expected: ScalarType::Bool,
                    default: "yes".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_rejects_duplicate_names_within_a_command() {
        let spec = compile(&["Usage: t [--out=PATH] [-o|--out] <a:STR> <a:STR>"]).unwrap();
        assert_eq!(
            validate_specification(&spec),
            vec![
                ValidationError::DuplicateOption {
                    command: "_".to_string(),
                    name: "--out".to_string(),
                },
                ValidationError::DuplicatePositional {
                    command: "_".to_string(),
                    name: "a".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_same_option_in_different_commands_is_fine() {
        let spec = compile(&["Usage: t a [--x]", "Usage: t b [--x]"]).unwrap();
        assert!(validate_specification(&spec).is_empty());
    }

    #[test]
    fn test_reports_shadowed_command() {
        let spec = compile(&["Usage: t run <a:STR>", "Usage: t run"]).unwrap();
        assert_eq!(
            validate_specification(&spec),
            vec![ValidationError::ShadowedCommand("run".to_string())]
        );
    }
}
