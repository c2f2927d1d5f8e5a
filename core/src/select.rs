//! Command selection.

use tracing::debug;

use crate::types::{Command, Specification};

/// Picks the command that applies to `argv`.
///
/// An empty argv selects the first command. Otherwise the first command whose
/// naming literal equals `argv[0]` wins, and when none does the first command
/// is returned anyway. Selection never fails; a wrong pick surfaces as an
/// [`ArgError`](crate::ArgError) from [`match_args`](crate::match_args).
///
/// # Examples
///
/// ```
/// use clide_core::{compile, select};
///
/// let spec = compile(&["Usage: t build <dir:PATH>", "Usage: t clean"]).unwrap();
/// assert_eq!(select(&spec, &["clean"]).name(), "clean");
/// assert_eq!(select(&spec, &["deploy"]).name(), "build");
/// assert_eq!(select::<&str>(&spec, &[]).name(), "build");
/// ```
pub fn select<'a, S: AsRef<str>>(spec: &'a Specification, argv: &[S]) -> &'a Command {
    let Some(first_arg) = argv.first().map(|arg| arg.as_ref()) else {
        debug!(
            command = spec.default_command().name(),
            "Empty argv, using default command"
        );
        return spec.default_command();
    };

    match spec
        .commands()
        .iter()
        .find(|cmd| cmd.literal() == Some(first_arg))
    {
        Some(cmd) => {
            debug!(command = cmd.name(), "Selected command by literal");
            cmd
        }
        None => {
            debug!(
                token = first_arg,
                command = spec.default_command().name(),
                "No command literal matched, falling back to default command"
            );
            spec.default_command()
        }
    }
}
