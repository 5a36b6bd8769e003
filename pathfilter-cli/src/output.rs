//! Encodings for rendering matched file lists.

use clap::ValueEnum;

/// How per-filter file lists are rendered on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Do not emit file lists.
    None,
    /// JSON array of path strings.
    Json,
    /// Comma-separated values with RFC 4180 quoting.
    Csv,
    /// Space-separated, single-quoted only where needed.
    Shell,
    /// Space-separated, unsafe characters backslash-escaped.
    Escape,
}

/// Render a list of paths in the requested encoding. `ListFormat::None`
/// yields an empty string.
pub fn serialize_paths(paths: &[&str], format: ListFormat) -> String {
    match format {
        ListFormat::None => String::new(),
        ListFormat::Json => {
            serde_json::to_string(paths).expect("string slices always serialize")
        }
        ListFormat::Csv => paths
            .iter()
            .map(|path| csv_escape(path))
            .collect::<Vec<_>>()
            .join(","),
        ListFormat::Shell => paths
            .iter()
            .map(|path| shell_escape(path))
            .collect::<Vec<_>>()
            .join(" "),
        ListFormat::Escape => paths
            .iter()
            .map(|path| backslash_escape(path))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Quote a CSV value per RFC 4180: only when it contains a comma, quote,
/// or line break, with embedded quotes doubled.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Single-quote a value for POSIX shells unless every character is safe
/// as-is.
fn shell_escape(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_safe_char) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// Backslash-escape every character outside the safe set.
fn backslash_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if !is_safe_char(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ',' | '.' | '_' | '+' | ':' | '@' | '%' | '/' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_list() {
        assert_eq!(
            serialize_paths(&["src/a.rs", "a \"b\".txt"], ListFormat::Json),
            r#"["src/a.rs","a \"b\".txt"]"#
        );
    }

    #[test]
    fn test_csv_plain_values_are_unquoted() {
        assert_eq!(
            serialize_paths(&["src/a.rs", "docs/b.md"], ListFormat::Csv),
            "src/a.rs,docs/b.md"
        );
    }

    #[test]
    fn test_csv_reserved_characters_force_quoting() {
        assert_eq!(csv_escape("a,b.txt"), "\"a,b.txt\"");
        assert_eq!(csv_escape("say \"hi\".txt"), "\"say \"\"hi\"\".txt\"");
        assert_eq!(csv_escape("plain.txt"), "plain.txt");
    }

    #[test]
    fn test_shell_quotes_only_when_needed() {
        assert_eq!(shell_escape("src/a.rs"), "src/a.rs");
        assert_eq!(shell_escape("a b.txt"), "'a b.txt'");
        assert_eq!(shell_escape("it's.txt"), "'it'\\''s.txt'");
        assert_eq!(shell_escape(""), "''");
    }

    #[test]
    fn test_backslash_escapes_unsafe_characters() {
        assert_eq!(backslash_escape("src/a.rs"), "src/a.rs");
        assert_eq!(backslash_escape("a b$c.txt"), "a\\ b\\$c.txt");
    }

    #[test]
    fn test_none_renders_nothing() {
        assert_eq!(serialize_paths(&["src/a.rs"], ListFormat::None), "");
    }
}
