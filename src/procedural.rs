//! Lifts uBO "procedural" pseudo-classes (`:matches-path(...)`, `:has(...)`,
//! …) out of a CSS selector into modifier records (§4.6).
//!
//! A full CSS selector grammar would reject the very pseudo-classes this
//! parser exists to find — `:matches-path` isn't standard CSS. So rather
//! than carry a CSS-library AST with source spans across the public API,
//! this re-scans the input with a bracket-depth counter keyed on `:NAME(`
//! triggers, the alternative the design notes call out for exactly this
//! reason.

use crate::modifier::Modifier;
use ahash::AHashSet;

/// The set of procedural-pseudo names this parser recognizes.
///
/// Built from the closed set §4.6 describes, but extensible: an embedder
/// tracking a uBO release with a newer procedural operator can widen the
/// registry with [`ProceduralRegistry::with_extra`] instead of forking the
/// crate.
#[derive(Debug, Clone)]
pub struct ProceduralRegistry {
    names: AHashSet<&'static str>,
}

const DEFAULT_NAMES: &[&str] = &[
    "has",
    "has-text",
    "if",
    "if-not",
    "matches-attr",
    "matches-css",
    "matches-css-after",
    "matches-css-before",
    "matches-path",
    "min-text-length",
    "others",
    "upward",
    "watch-attr",
    "xpath",
];

impl Default for ProceduralRegistry {
    fn default() -> Self {
        ProceduralRegistry {
            names: DEFAULT_NAMES.iter().copied().collect(),
        }
    }
}

impl ProceduralRegistry {
    /// The default registry, widened with additional recognized names.
    pub fn with_extra(extra: impl IntoIterator<Item = &'static str>) -> Self {
        let mut registry = Self::default();
        registry.names.extend(extra);
        registry
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn iter_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().copied()
    }
}

/// The result of lifting procedural pseudos out of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProceduralBlock {
    pub modifiers: Vec<Modifier>,
    pub rest: String,
}

/// Scans `selector` for recognized procedural pseudo-classes, excising each
/// one (or its enclosing `:not(...)` when it is that pseudo's sole child)
/// and recording it as a modifier. Selectors with no candidate pseudo at
/// all are returned unchanged with an empty modifier list.
pub fn parse(selector: &str, registry: &ProceduralRegistry) -> ProceduralBlock {
    if !has_any_candidate(selector, registry) {
        return ProceduralBlock {
            modifiers: Vec::new(),
            rest: selector.to_string(),
        };
    }

    let mut modifiers = Vec::new();
    let mut keep = vec![true; selector.len()];
    let mut search_from = 0usize;

    while let Some((colon, paren_idx, close)) = find_candidate(selector, search_from, registry) {
        let name = &selector[colon + 1..paren_idx];
        let arg = selector[paren_idx + 1..close].to_string();

        if let Some((not_start, not_end)) = detect_not_wrapper(selector, colon, close) {
            modifiers.push(Modifier {
                name: name.to_string(),
                value: Some(arg),
                exception: false,
                not: true,
            });
            keep[not_start..not_end].iter_mut().for_each(|k| *k = false);
            search_from = not_end;
        } else {
            modifiers.push(Modifier {
                name: name.to_string(),
                value: Some(arg),
                exception: false,
                not: false,
            });
            keep[colon..=close].iter_mut().for_each(|k| *k = false);
            search_from = close + 1;
        }
    }

    let rest: String = selector
        .char_indices()
        .filter(|(i, _)| keep[*i])
        .map(|(_, c)| c)
        .collect();
    log::debug!(
        "procedural: lifted {} modifier(s) out of selector",
        modifiers.len()
    );
    ProceduralBlock {
        modifiers,
        rest: rest.trim().to_string(),
    }
}

/// Re-emits `[:not(]:NAME(value)[)]` for each modifier (input ordering is
/// not preserved — see DESIGN.md), followed by a space and `rest`.
pub fn generate(block: &ProceduralBlock) -> String {
    let mut out = String::new();
    for modifier in &block.modifiers {
        if modifier.not {
            out.push_str(":not(");
        }
        out.push(':');
        out.push_str(&modifier.name);
        out.push('(');
        if let Some(value) = &modifier.value {
            out.push_str(value);
        }
        out.push(')');
        if modifier.not {
            out.push(')');
        }
    }
    if !block.modifiers.is_empty() {
        out.push(' ');
    }
    out.push_str(&block.rest);
    out
}

fn has_any_candidate(selector: &str, registry: &ProceduralRegistry) -> bool {
    let mut search_from = 0usize;
    while let Some(rel) = selector[search_from..].find(':') {
        let p = search_from + rel;
        let after = &selector[p + 1..];
        for name in registry.iter_names() {
            if after.starts_with(name) && after.as_bytes().get(name.len()) == Some(&b'(') {
                return true;
            }
        }
        search_from = p + 1;
    }
    false
}

/// Returns `(colon_index, open_paren_index, close_paren_index)` for the
/// next recognized `:NAME(...)` at or after `start`.
fn find_candidate(
    s: &str,
    start: usize,
    registry: &ProceduralRegistry,
) -> Option<(usize, usize, usize)> {
    let mut search_from = start;
    loop {
        let rel = s[search_from..].find(':')?;
        let colon = search_from + rel;
        let after = &s[colon + 1..];
        let mut matched: Option<&str> = None;
        for name in registry.iter_names() {
            if after.starts_with(name) && after.as_bytes().get(name.len()) == Some(&b'(') {
                if matched.map_or(true, |m| name.len() > m.len()) {
                    matched = Some(name);
                }
            }
        }
        if let Some(name) = matched {
            let paren_idx = colon + 1 + name.len();
            if let Some(close) = find_matching_paren(s, paren_idx) {
                return Some((colon, paren_idx, close));
            }
        }
        search_from = colon + 1;
    }
}

/// Finds the `)` matching the `(` at `open_idx`, tracking nested
/// parentheses and quoted strings (so a `)` inside `matches-css(... "x)y"
/// ...)` doesn't close early).
fn find_matching_paren(s: &str, open_idx: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut idx = open_idx;
    for ch in s[open_idx..].chars() {
        let escaped = prev == Some('\\');
        if let Some(q) = quote {
            if ch == q && !escaped {
                quote = None;
            }
        } else {
            match ch {
                '\'' | '"' if !escaped => quote = Some(ch),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                _ => {}
            }
        }
        prev = Some(ch);
        idx += ch.len_utf8();
    }
    None
}

/// `:not(:NAME(...))` where the pseudo is `:not`'s only child — detected by
/// checking the five bytes before `colon` are literally `:not(` and the
/// byte after `close` is `)`.
fn detect_not_wrapper(selector: &str, colon: usize, close: usize) -> Option<(usize, usize)> {
    let not_start = colon.checked_sub(5)?;
    if &selector[not_start..colon] != ":not(" {
        return None;
    }
    if selector.as_bytes().get(close + 1) != Some(&b')') {
        return None;
    }
    Some((not_start, close + 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_candidate_returns_selector_unchanged() {
        let block = parse(".ad > div", &ProceduralRegistry::default());
        assert!(block.modifiers.is_empty());
        assert_eq!(block.rest, ".ad > div");
    }

    #[test]
    fn lifts_a_simple_procedural_pseudo() {
        let block = parse(":matches-path(/a) .ad", &ProceduralRegistry::default());
        assert_eq!(block.modifiers.len(), 1);
        assert_eq!(block.modifiers[0].name, "matches-path");
        assert_eq!(block.modifiers[0].value.as_deref(), Some("/a"));
        assert!(!block.modifiers[0].not);
        assert_eq!(block.rest, ".ad");
    }

    #[test]
    fn lifts_not_wrapped_pseudo_as_negated() {
        let block = parse(".ad:not(:has(> .x))", &ProceduralRegistry::default());
        assert_eq!(block.modifiers.len(), 1);
        assert!(block.modifiers[0].not);
        assert_eq!(block.modifiers[0].name, "has");
        assert_eq!(block.modifiers[0].value.as_deref(), Some("> .x"));
        assert_eq!(block.rest, ".ad");
    }

    #[test]
    fn tolerates_nested_parens_in_arguments() {
        let block = parse(
            ".ad:matches-css(background-image: /a\\(b\\)/)",
            &ProceduralRegistry::default(),
        );
        assert_eq!(block.modifiers[0].value.as_deref(), Some("background-image: /a\\(b\\)/"));
    }

    #[test]
    fn generate_round_trips_without_not() {
        let block = parse(":matches-path(/a) .ad", &ProceduralRegistry::default());
        assert_eq!(generate(&block), ":matches-path(/a) .ad");
    }

    #[test]
    fn with_extra_widens_registry() {
        let registry = ProceduralRegistry::with_extra(["my-custom-op"]);
        assert!(registry.contains("my-custom-op"));
        assert!(registry.contains("matches-path"));
    }
}
