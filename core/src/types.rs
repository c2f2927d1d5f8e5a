//! Grammar model for compiled usage lines.
//!
//! A [`Specification`] is the compiled form of one or more `Usage:` lines. It
//! holds one [`Command`] per line; each command is an ordered sequence of
//! [`Slot`]s, and each slot wraps an [`AltGroup`] of one or more
//! [`ValueType`]s. Values of these types are built once by
//! [`compile`](crate::compile) and only read afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ArgError;

/// Name given to a command whose usage line has no required literal.
pub const UNNAMED_COMMAND: &str = "_";

/// Scalar type declared for a value option or a positional.
///
/// `Str` and `Path` accept any token unchanged; they differ only in how they
/// are documented.
///
/// # Examples
///
/// ```
/// use clide_core::ScalarType;
///
/// assert_eq!(ScalarType::from_keyword("INT"), Some(ScalarType::Int));
/// assert_eq!(ScalarType::from_keyword("int"), None);
/// assert_eq!(ScalarType::Bool.validate("TRUE").unwrap(), "true");
/// assert!(ScalarType::Int.validate("twelve").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// Base-10 signed integer (`INT`).
    Int,
    /// `true` or `false`, case-insensitive (`BOOL`).
    Bool,
    /// Free-form string (`STR`).
    Str,
    /// Filesystem path, not checked against the filesystem (`PATH`).
    Path,
}

impl ScalarType {
    /// Parses a type keyword as written in a usage line. Matching is exact and
    /// case-sensitive.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "INT" => Some(Self::Int),
            "BOOL" => Some(Self::Bool),
            "STR" => Some(Self::Str),
            "PATH" => Some(Self::Path),
            _ => None,
        }
    }

    /// The keyword form used in usage lines.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Bool => "BOOL",
            Self::Str => "STR",
            Self::Path => "PATH",
        }
    }

    /// Checks `raw` against this type and returns the string form to store.
    ///
    /// Integers are an optional sign followed by ASCII digits, of any length,
    /// and are kept exactly as written. Booleans are normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ArgError::InvalidValue`] when `raw` does not conform.
    pub fn validate(self, raw: &str) -> Result<String, ArgError> {
        match self {
            Self::Int if is_integer_literal(raw) => Ok(raw.to_string()),
            Self::Int => Err(ArgError::InvalidValue {
                expected: self,
                got: raw.to_string(),
            }),
            Self::Bool => {
                let lower = raw.to_ascii_lowercase();
                match lower.as_str() {
                    "true" | "false" => Ok(lower),
                    _ => Err(ArgError::InvalidValue {
                        expected: self,
                        got: raw.to_string(),
                    }),
                }
            }
            Self::Str | Self::Path => Ok(raw.to_string()),
        }
    }
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The smallest classified unit of a usage line.
///
/// Options carry an optional long name (`--verbose`) and an optional short
/// name (`-v`); at least one of the two is always present in values produced
/// by the compiler.
///
/// # Examples
///
/// ```
/// use clide_core::{ScalarType, ValueType};
///
/// let verbose = ValueType::boolean(Some("-v"), Some("--verbose"));
/// assert_eq!(verbose.canonical_key(), Some("--verbose"));
/// assert!(verbose.matches_name("-v"));
/// assert_eq!(verbose.to_string(), "-v|--verbose");
///
/// let port = ValueType::value(None, Some("--port"), ScalarType::Int).with_default("8080");
/// assert_eq!(port.to_string(), "--port=INT:8080");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// Exact-match word, such as a subcommand name.
    Literal(String),
    /// Flag without a value.
    BooleanOption {
        long: Option<String>,
        short: Option<String>,
    },
    /// Option followed by a typed value.
    ValueOption {
        long: Option<String>,
        short: Option<String>,
        ty: ScalarType,
        /// Default literal, type-checked only when it is used.
        default: Option<String>,
        /// Declared repeatability. The matcher accumulates repeats either way.
        allow_repeat: bool,
    },
    /// Named positional argument.
    Positional {
        name: String,
        ty: ScalarType,
        default: Option<String>,
    },
}

impl ValueType {
    /// Creates a literal.
    pub fn literal(text: &str) -> Self {
        Self::Literal(text.to_string())
    }

    /// Creates a boolean option.
    pub fn boolean(short: Option<&str>, long: Option<&str>) -> Self {
        Self::BooleanOption {
            long: long.map(String::from),
            short: short.map(String::from),
        }
    }

    /// Creates a value option with no default that does not declare repeats.
    pub fn value(short: Option<&str>, long: Option<&str>, ty: ScalarType) -> Self {
        Self::ValueOption {
            long: long.map(String::from),
            short: short.map(String::from),
            ty,
            default: None,
            allow_repeat: false,
        }
    }

    /// Creates a positional with no default.
    pub fn positional(name: &str, ty: ScalarType) -> Self {
        Self::Positional {
            name: name.to_string(),
            ty,
            default: None,
        }
    }

    /// Sets the default literal of a value option or positional. Other
    /// variants are returned unchanged.
    pub fn with_default(mut self, literal: &str) -> Self {
        if let Self::ValueOption { default, .. } | Self::Positional { default, .. } = &mut self {
            *default = Some(literal.to_string());
        }
        self
    }

    /// Marks a value option as repeatable. Other variants are returned
    /// unchanged.
    pub fn repeatable(mut self) -> Self {
        if let Self::ValueOption { allow_repeat, .. } = &mut self {
            *allow_repeat = true;
        }
        self
    }

    /// Long option name, if any.
    pub fn long(&self) -> Option<&str> {
        match self {
            Self::BooleanOption { long, .. } | Self::ValueOption { long, .. } => long.as_deref(),
            Self::Literal(_) | Self::Positional { .. } => None,
        }
    }

    /// Short option name, if any.
    pub fn short(&self) -> Option<&str> {
        match self {
            Self::BooleanOption { short, .. } | Self::ValueOption { short, .. } => {
                short.as_deref()
            }
            Self::Literal(_) | Self::Positional { .. } => None,
        }
    }

    /// Every option name of this value type, long name first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.long().into_iter().chain(self.short())
    }

    /// Key under which an option is recorded: the long name when present,
    /// otherwise the short name. `None` for literals and positionals.
    pub fn canonical_key(&self) -> Option<&str> {
        self.long().or_else(|| self.short())
    }

    /// Returns `true` if `name` is the long or short name of this option.
    pub fn matches_name(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// Declared scalar type of a value option or positional.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::ValueOption { ty, .. } | Self::Positional { ty, .. } => Some(*ty),
            Self::Literal(_) | Self::BooleanOption { .. } => None,
        }
    }

    /// Declared default literal of a value option or positional.
    pub fn default_literal(&self) -> Option<&str> {
        match self {
            Self::ValueOption { default, .. } | Self::Positional { default, .. } => {
                default.as_deref()
            }
            Self::Literal(_) | Self::BooleanOption { .. } => None,
        }
    }
}

/// Writes `TYPE[:default][+]`, the value descriptor after `=`.
fn write_descriptor(
    f: &mut fmt::Formatter<'_>,
    ty: ScalarType,
    default: Option<&str>,
    allow_repeat: bool,
) -> fmt::Result {
    write!(f, "{ty}")?;
    if let Some(default) = default {
        write!(f, ":{default}")?;
    }
    if allow_repeat {
        f.write_str("+")?;
    }
    Ok(())
}

impl fmt::Display for ValueType {
    /// Renders the grammar token this value type compiles from.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::BooleanOption { long, short } => {
                let names: Vec<&str> = short.iter().chain(long).map(String::as_str).collect();
                f.write_str(&names.join("|"))
            }
            Self::ValueOption {
                long,
                short,
                ty,
                default,
                allow_repeat,
            } => {
                for (idx, name) in short.iter().chain(long).enumerate() {
                    if idx > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{name}=")?;
                    write_descriptor(f, *ty, default.as_deref(), *allow_repeat)?;
                }
                Ok(())
            }
            Self::Positional { name, ty, default } => {
                write!(f, "<{name}:{ty}")?;
                if let Some(default) = default {
                    write!(f, ":{default}")?;
                }
                f.write_str(">")
            }
        }
    }
}

/// Ordered, non-empty list of mutually exclusive value types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AltGroup(Vec<ValueType>);

impl AltGroup {
    /// Creates a group; returns `None` for an empty member list.
    pub fn new(members: Vec<ValueType>) -> Option<Self> {
        if members.is_empty() {
            None
        } else {
            Some(Self(members))
        }
    }

    /// Creates a singleton group.
    pub fn single(member: ValueType) -> Self {
        Self(vec![member])
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[ValueType] {
        &self.0
    }

    pub fn is_singleton(&self) -> bool {
        self.0.len() == 1
    }
}

impl fmt::Display for AltGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, member) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("|")?;
            }
            write!(f, "{member}")?;
        }
        Ok(())
    }
}

/// Whether a slot must be present in a usage line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    Required,
    Optional,
}

/// One position in a command's grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    presence: Presence,
    group: AltGroup,
}

impl Slot {
    /// A required slot holding a single value type.
    pub fn required(member: ValueType) -> Self {
        Self {
            presence: Presence::Required,
            group: AltGroup::single(member),
        }
    }

    /// An optional slot holding `group`.
    pub fn optional(group: AltGroup) -> Self {
        Self {
            presence: Presence::Optional,
            group,
        }
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }

    pub fn group(&self) -> &AltGroup {
        &self.group
    }

    /// Value types in this slot, in declaration order.
    pub fn value_types(&self) -> impl Iterator<Item = &ValueType> {
        self.group.members().iter()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.presence {
            Presence::Required => write!(f, "{}", self.group),
            Presence::Optional => write!(f, "[{}]", self.group),
        }
    }
}

/// One compiled usage line.
///
/// # Examples
///
/// ```
/// use clide_core::{AltGroup, Command, ScalarType, Slot, ValueType};
///
/// let cmd = Command::from_slots(vec![
///     Slot::optional(AltGroup::single(ValueType::boolean(Some("-v"), None))),
///     Slot::required(ValueType::literal("init")),
///     Slot::required(ValueType::positional("path", ScalarType::Path)),
/// ]);
/// assert_eq!(cmd.name(), "init");
/// assert_eq!(cmd.value_types().count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    name: String,
    slots: Vec<Slot>,
}

impl Command {
    /// Builds a command, naming it after its first required literal or
    /// [`UNNAMED_COMMAND`] when there is none.
    pub fn from_slots(slots: Vec<Slot>) -> Self {
        let name = naming_literal(&slots)
            .unwrap_or(UNNAMED_COMMAND)
            .to_string();
        Self { name, slots }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` when no required literal names this command.
    pub fn is_unnamed(&self) -> bool {
        self.literal().is_none()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// The literal that names this command, if any.
    pub fn literal(&self) -> Option<&str> {
        naming_literal(&self.slots)
    }

    /// Every value type of every slot, in declaration order, without
    /// deduplication.
    pub fn value_types(&self) -> impl Iterator<Item = &ValueType> {
        self.slots.iter().flat_map(Slot::value_types)
    }
}

fn naming_literal(slots: &[Slot]) -> Option<&str> {
    slots
        .iter()
        .filter(|slot| slot.is_required())
        .find_map(|slot| {
            slot.value_types().find_map(|vt| match vt {
                ValueType::Literal(text) => Some(text.as_str()),
                _ => None,
            })
        })
}

/// The full compiled set of commands for one program.
///
/// Only [`compile`](crate::compile) creates specifications, so a
/// specification always holds at least one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Specification {
    program: String,
    commands: Vec<Command>,
}

impl Specification {
    pub(crate) fn new(program: String, commands: Vec<Command>) -> Self {
        debug_assert!(!commands.is_empty(), "specification without commands");
        Self { program, commands }
    }

    /// Program name taken from the first usage line.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Commands in usage-line order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The first declared command.
    pub fn default_command(&self) -> &Command {
        &self.commands[0]
    }

    /// Finds the first command with the given name.
    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|cmd| cmd.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_prefers_long_name() {
        let both = ValueType::boolean(Some("-v"), Some("--verbose"));
        assert_eq!(both.canonical_key(), Some("--verbose"));

        let short_only = ValueType::value(Some("-j"), None, ScalarType::Int);
        assert_eq!(short_only.canonical_key(), Some("-j"));

        assert_eq!(ValueType::literal("serve").canonical_key(), None);
    }

    #[test]
    fn test_names_lists_long_then_short() {
        let flag = ValueType::boolean(Some("-v"), Some("--verbose"));
        assert_eq!(flag.names().collect::<Vec<_>>(), vec!["--verbose", "-v"]);
        assert!(ValueType::positional("dir", ScalarType::Path).names().next().is_none());
    }

    #[test]
    fn test_display_renders_grammar_tokens() {
        let include = ValueType::value(None, Some("--include"), ScalarType::Path).repeatable();
        assert_eq!(include.to_string(), "--include=PATH+");

        let jobs = ValueType::value(Some("-j"), Some("--jobs"), ScalarType::Int).with_default("4");
        assert_eq!(jobs.to_string(), "-j=INT:4|--jobs=INT:4");

        let dir = ValueType::positional("dir", ScalarType::Path).with_default(".");
        assert_eq!(dir.to_string(), "<dir:PATH:.>");

        let slot = Slot::optional(AltGroup::single(ValueType::boolean(None, Some("--tls"))));
        assert_eq!(slot.to_string(), "[--tls]");
    }

    #[test]
    fn test_with_default_ignores_literals() {
        assert_eq!(
            ValueType::literal("init").with_default("x"),
            ValueType::literal("init")
        );
    }

    #[test]
    fn test_command_naming_skips_optional_literals() {
        let cmd = Command::from_slots(vec![
            Slot::optional(AltGroup::single(ValueType::literal("quietly"))),
            Slot::required(ValueType::positional("dir", ScalarType::Path)),
        ]);
        assert_eq!(cmd.name(), UNNAMED_COMMAND);
        assert!(cmd.is_unnamed());
        assert_eq!(cmd.literal(), None);
    }

    #[test]
    fn test_bool_validation_normalizes_case() {
        assert_eq!(ScalarType::Bool.validate("False").unwrap(), "false");
        assert!(matches!(
            ScalarType::Bool.validate("yes"),
            Err(ArgError::InvalidValue {
                expected: ScalarType::Bool,
                ..
            })
        ));
    }

    #[test]
    fn test_int_validation_keeps_original_text() {
        assert_eq!(ScalarType::Int.validate("+42").unwrap(), "+42");
        assert_eq!(ScalarType::Int.validate("-7").unwrap(), "-7");
        assert!(ScalarType::Int.validate("4.2").is_err());
        assert!(ScalarType::Int.validate("").is_err());
        assert!(ScalarType::Int.validate("-").is_err());
        assert!(ScalarType::Int.validate("+-1").is_err());
        assert!(ScalarType::Int.validate("٣").is_err());
    }

    #[test]
    fn test_int_validation_has_no_width_limit() {
        let huge = "99999999999999999999";
        assert_eq!(ScalarType::Int.validate(huge).unwrap(), huge);
        assert_eq!(ScalarType::Int.validate("-0099").unwrap(), "-0099");
    }
}
