//! Help text rendering.
//!
//! Renders a specification back into a `Usage:` block and an aligned
//! `Options & Arguments:` table. Every option, positional and literal gets a
//! synthesized description; caller-supplied descriptions replace them key by
//! key. Keys are the strings returned by [`doc_key`].

use crate::types::{Specification, ValueType};

/// Renders one usage line per command.
///
/// # Examples
///
/// ```
/// use clide_core::{compile, help};
///
/// let spec = compile(&["Usage: mytool init <path:PATH>"]).unwrap();
/// assert_eq!(help::render(&spec), "Usage:\n  mytool init <path:PATH>\n");
/// ```
pub fn render(spec: &Specification) -> String {
    let mut out = String::from("Usage:\n");
    for cmd in spec.commands() {
        out.push_str("  ");
        out.push_str(spec.program());
        for slot in cmd.slots() {
            out.push(' ');
            out.push_str(&slot.to_string());
        }
        out.push('\n');
    }
    out
}

/// Documentation key for a value type.
///
/// Options list their names as `-v, --verbose`; value options append
/// `=TYPE[:default][+]`; positionals keep their `<name:TYPE[:default]>` form.
pub fn doc_key(vt: &ValueType) -> String {
    match vt {
        ValueType::Literal(text) => text.clone(),
        ValueType::BooleanOption { .. } => option_names(vt),
        ValueType::ValueOption {
            ty,
            default,
            allow_repeat,
            ..
        } => {
            let mut key = format!("{}={ty}", option_names(vt));
            if let Some(default) = default {
                key.push(':');
                key.push_str(default);
            }
            if *allow_repeat {
                key.push('+');
            }
            key
        }
        ValueType::Positional { .. } => vt.to_string(),
    }
}

fn option_names(vt: &ValueType) -> String {
    vt.short()
        .into_iter()
        .chain(vt.long())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe(vt: &ValueType) -> String {
    match vt {
        ValueType::Literal(_) => "command".to_string(),
        ValueType::BooleanOption { .. } => "boolean flag".to_string(),
        ValueType::ValueOption {
            ty,
            default,
            allow_repeat,
            ..
        } => {
            let mut desc = format!("value option {ty}");
            if let Some(default) = default {
                desc.push_str(&format!(" (default {default})"));
            }
            if *allow_repeat {
                desc.push_str(" (repeatable)");
            }
            desc
        }
        ValueType::Positional { ty, default, .. } => match default {
            Some(default) => format!("positional {ty} (default {default})"),
            None => format!("positional {ty}"),
        },
    }
}

/// One `(key, description)` pair per distinct key, in declaration order
/// across all commands.
pub fn synthesized_docs(spec: &Specification) -> Vec<(String, String)> {
    let mut docs: Vec<(String, String)> = Vec::new();
    for vt in spec.commands().iter().flat_map(|cmd| cmd.value_types()) {
        let key = doc_key(vt);
        if !docs.iter().any(|(k, _)| *k == key) {
            docs.push((key, describe(vt)));
        }
    }
    docs
}

/// Renders the usage block followed by the documentation table.
///
/// Entries in `docs` override the synthesized description for the same key;
/// keys the specification does not produce are ignored.
///
/// # Examples
///
/// ```
/// use clide_core::{compile, help};
///
/// let spec = compile(&["Usage: mytool serve [--tls] <dir:PATH>"]).unwrap();
/// let docs = vec![("--tls".to_string(), "Enable TLS".to_string())];
/// let text = help::render_with_docs(&spec, &docs);
///
/// assert!(text.contains("  --tls       -  Enable TLS\n"));
/// assert!(text.contains("  <dir:PATH>  -  positional PATH\n"));
/// ```
pub fn render_with_docs(spec: &Specification, docs: &[(String, String)]) -> String {
    let merged: Vec<(String, String)> = synthesized_docs(spec)
        .into_iter()
        .map(|(key, synthesized)| {
            let desc = docs
                .iter()
                .find(|(k, _)| *k == key)
                .map_or(synthesized, |(_, desc)| desc.clone());
            (key, desc)
        })
        .collect();

    format!("{}\n{}", render(spec), render_table(&merged))
}

fn render_table(pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }

    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut out = String::from("Options & Arguments:\n");
    for (key, desc) in pairs {
        out.push_str(&format!("  {key:<width$}  -  {desc}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    fn mytool() -> Specification {
        compile(&[
            "Usage: mytool [-v|--verbose] serve [--port=INT:8080] [--tls] [--root=PATH] <dir:PATH>",
            "Usage: mytool init <path:PATH>",
        ])
        .unwrap()
    }

    #[test]
    fn test_render_usage_block() {
        assert_eq!(
            render(&mytool()),
            "Usage:\n  mytool [-v|--verbose] serve [--port=INT:8080] [--tls] [--root=PATH] <dir:PATH>\n  mytool init <path:PATH>\n"
        );
    }

    #[test]
    fn test_doc_keys() {
        let keys: Vec<String> = synthesized_docs(&mytool()).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "-v, --verbose",
                "serve",
                "--port=INT:8080",
                "--tls",
                "--root=PATH",
                "<dir:PATH>",
                "init",
                "<path:PATH>",
            ]
        );
    }

    #[test]
    fn test_synthesized_descriptions() {
        let spec = compile(&["Usage: build [--include=PATH+] [-j=INT:4] <dir:PATH:.>"]).unwrap();
        assert_eq!(
            synthesized_docs(&spec),
            vec![
                (
                    "--include=PATH+".to_string(),
                    "value option PATH (repeatable)".to_string()
                ),
                ("-j=INT:4".to_string(), "value option INT (default 4)".to_string()),
                ("<dir:PATH:.>".to_string(), "positional PATH (default .)".to_string()),
            ]
        );
    }

    #[test]
    fn test_shared_keys_are_listed_once() {
        let spec = compile(&["Usage: t a [--x]", "Usage: t b [--x]"]).unwrap();
        let docs = synthesized_docs(&spec);
        assert_eq!(docs.iter().filter(|(k, _)| k == "--x").count(), 1);
    }

    #[test]
    fn test_user_docs_override_and_unknown_keys_are_dropped() {
        let docs = vec![
            ("serve".to_string(), "Start the HTTP server".to_string()),
            ("-v, --verbose".to_string(), "Verbose logging".to_string()),
            ("--nope".to_string(), "Not declared".to_string()),
        ];
        let text = render_with_docs(&mytool(), &docs);

        assert!(text.starts_with("Usage:\n"));
        assert!(text.contains("\n\nOptions & Arguments:\n"));
        assert!(text.contains("  serve            -  Start the HTTP server\n"));
        assert!(text.contains("  -v, --verbose    -  Verbose logging\n"));
        assert!(text.contains("  --tls            -  boolean flag\n"));
        assert!(!text.contains("--nope"));
    }
}
