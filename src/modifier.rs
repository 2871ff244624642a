//! Comma-separated `name[=value]` modifier lists with an optional `~`
//! exception marker (§4.4). Used for both AdGuard's `[$...]` cosmetic
//! bracket and network rules' `$...` modifier tail.

use crate::scanner::{self, SplitMode};

/// A single `[~]name[=value]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    pub name: String,
    pub value: Option<String>,
    pub exception: bool,
    /// Only ever set for uBO procedural modifiers negated via
    /// `:not(...)` — absent (`false`) everywhere else.
    pub not: bool,
}

impl Modifier {
    fn simple(name: impl Into<String>, value: Option<String>, exception: bool) -> Self {
        Modifier {
            name: name.into(),
            value,
            exception,
            not: false,
        }
    }
}

/// An ordered sequence of modifiers.
pub type ModifierList = Vec<Modifier>;

/// Parses a comma-separated modifier list. A comma preceded by `\` is part
/// of a value (this is how regex-valued modifiers such as `$replace=/a\,b/`
/// carry a literal comma) and does not split.
///
/// A single empty (after-trim) fragment — i.e. an empty `input` — parses to
/// an empty list rather than a list containing one nameless modifier.
pub fn parse(input: &str) -> ModifierList {
    let fragments = scanner::split_by(SplitMode::OutsideStringsOutsideRegex, input, ',');
    if fragments.len() == 1 && fragments[0].trim().is_empty() {
        return Vec::new();
    }
    fragments.iter().map(|f| parse_one(f)).collect()
}

fn parse_one(fragment: &str) -> Modifier {
    let trimmed = fragment.trim();
    let (name_part, value) = match scanner::find_unescaped_outside_strings_outside_regex(trimmed, '=', 0) {
        Some(idx) => (
            &trimmed[..idx],
            Some(trimmed[idx + 1..].trim().to_string()),
        ),
        None => (trimmed, None),
    };
    let name_part = name_part.trim();
    if let Some(stripped) = name_part.strip_prefix('~') {
        Modifier::simple(stripped.trim(), value, true)
    } else {
        Modifier::simple(name_part, value, false)
    }
}

/// `[~]name[=value]` fragments joined by `,`.
pub fn generate(list: &ModifierList) -> String {
    list.iter()
        .map(generate_one)
        .collect::<Vec<_>>()
        .join(",")
}

fn generate_one(modifier: &Modifier) -> String {
    let mut out = String::new();
    if modifier.exception {
        out.push('~');
    }
    out.push_str(&modifier.name);
    if let Some(value) = &modifier.value {
        out.push('=');
        out.push_str(value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_only_modifiers() {
        let list = parse("script,~image");
        assert_eq!(
            list,
            vec![
                Modifier::simple("script", None, false),
                Modifier::simple("image", None, true),
            ]
        );
    }

    #[test]
    fn parses_name_value_modifiers() {
        let list = parse("domain=a.com|b.com,path=/x");
        assert_eq!(
            list,
            vec![
                Modifier::simple("domain", Some("a.com|b.com".to_string()), false),
                Modifier::simple("path", Some("/x".to_string()), false),
            ]
        );
    }

    #[test]
    fn empty_input_is_empty_list() {
        assert_eq!(parse(""), Vec::new());
        assert_eq!(parse("   "), Vec::new());
    }

    #[test]
    fn escaped_comma_stays_in_the_value() {
        let list = parse(r"replace=/a\,b/c/");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].value.as_deref(), Some(r"/a\,b/c/"));
    }

    #[test]
    fn trims_names_and_values() {
        let list = parse(" domain = a.com , script ");
        assert_eq!(list[0].name, "domain");
        assert_eq!(list[0].value.as_deref(), Some("a.com"));
        assert_eq!(list[1].name, "script");
    }

    #[test]
    fn empty_value_after_equals_is_some_empty_string() {
        let list = parse("redirect-rule=");
        assert_eq!(list[0].value.as_deref(), Some(""));
    }

    #[test]
    fn generate_round_trips() {
        let list = parse("script,~image,domain=a.com");
        assert_eq!(generate(&list), "script,~image,domain=a.com");
    }
}
