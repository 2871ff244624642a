//! Locates the dialect-discriminating separator in a rule (§4.2).
//!
//! The recognized separators are a small fixed set, so rather than build a
//! real trie node graph we keep them as a table and pick the longest match —
//! same end result (`#%#//scriptlet` wins over `#%#` because it's longer),
//! much less code for eighteen literals.

use crate::dialect::{Dialect, RuleCategory};

/// One of the eighteen separator literals recognized across the three
/// dialects. Carries its own literal text, exception flag, and dialect hint
/// through the methods below rather than as struct fields, so the enum stays
/// `Copy` and cheap to pass around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    ElementHide,
    ElementHideException,
    ElementHideExtended,
    ElementHideExtendedException,
    CssInject,
    CssInjectException,
    CssInjectExtended,
    CssInjectExtendedException,
    Scriptlet,
    ScriptletException,
    ScriptletLong,
    ScriptletLongException,
    UboScriptlet,
    UboScriptletException,
    UboHtml,
    UboHtmlException,
    AdgHtml,
    AdgHtmlException,
}

/// Every recognized literal. Order does not matter for matching (the matcher
/// always picks the longest hit), but it is grouped by family for
/// readability.
const SEPARATORS: &[(Separator, &str)] = &[
    (Separator::ElementHide, "##"),
    (Separator::ElementHideException, "#@#"),
    (Separator::ElementHideExtended, "#?#"),
    (Separator::ElementHideExtendedException, "#@?#"),
    (Separator::CssInject, "#$#"),
    (Separator::CssInjectException, "#@$#"),
    (Separator::CssInjectExtended, "#$?#"),
    (Separator::CssInjectExtendedException, "#@$?#"),
    (Separator::Scriptlet, "#%#"),
    (Separator::ScriptletException, "#@%#"),
    (Separator::ScriptletLong, "#%#//scriptlet"),
    (Separator::ScriptletLongException, "#@%#//scriptlet"),
    (Separator::UboScriptlet, "##+js"),
    (Separator::UboScriptletException, "#@#+js"),
    (Separator::UboHtml, "##^"),
    (Separator::UboHtmlException, "#@#^"),
    (Separator::AdgHtml, "$$"),
    (Separator::AdgHtmlException, "$@$"),
];

impl Separator {
    /// The exact bytes that appear verbatim in a serialized rule.
    pub fn literal(self) -> &'static str {
        SEPARATORS
            .iter()
            .find(|(sep, _)| *sep == self)
            .map(|(_, lit)| *lit)
            .expect("every Separator variant has a table entry")
    }

    /// `true` iff the literal's second character is `@`.
    pub fn is_exception(self) -> bool {
        self.literal().as_bytes().get(1) == Some(&b'@')
    }

    /// The dialect this separator implies, if any. The plain element-hide
    /// family (`##`, `#@#`, `#?#`, `#@?#`) is shared by uBO and AdGuard and
    /// so carries no hint on its own — the body decides.
    pub fn dialect_hint(self) -> Option<Dialect> {
        use Separator::*;
        match self {
            CssInject | CssInjectException | CssInjectExtended | CssInjectExtendedException
            | Scriptlet | ScriptletException | ScriptletLong | ScriptletLongException
            | AdgHtml | AdgHtmlException => Some(Dialect::AdGuard),
            UboScriptlet | UboScriptletException | UboHtml | UboHtmlException => {
                Some(Dialect::UblockOrigin)
            }
            ElementHide | ElementHideException | ElementHideExtended
            | ElementHideExtendedException => None,
        }
    }

    /// Every separator recognized by this crate marks a cosmetic rule; the
    /// network parser locates its own `$` modifier boundary independently
    /// (§4.10), never through this trie.
    pub fn category(self) -> RuleCategory {
        RuleCategory::Cosmetic
    }
}

/// The result of a successful [`locate`] call: the byte range the separator
/// occupies in the input, and which one it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub start: usize,
    pub end: usize,
    pub separator: Separator,
}

/// Finds the dialect-discriminating separator in `input`, if any.
///
/// Finds the earliest `#`-rooted trie match and the earliest `$`-rooted
/// trie match independently, then returns whichever starts first (`#`
/// winning exact ties). This is what keeps a rule such as
/// `example.com$$script[tag-content="##example"]` resolving to `$$` even
/// though a `##` appears later inside the attribute-value string: the `##`
/// candidate's position is compared against `$$`'s and loses, rather than
/// being returned unconditionally just because `#`-scanning runs first.
pub fn locate(input: &str) -> Option<Located> {
    let hash_match = find_earliest_hash_match(input);
    let dollar_match = find_earliest_dollar_match(input);

    match (hash_match, dollar_match) {
        (Some(h), Some(d)) => {
            if h.start <= d.start {
                log::trace!("separator: matched {:?} at {}", h.separator, h.start);
                Some(h)
            } else {
                log::trace!("separator: matched {:?} at {}", d.separator, d.start);
                Some(d)
            }
        }
        (Some(h), None) => {
            log::trace!("separator: matched {:?} at {}", h.separator, h.start);
            Some(h)
        }
        (None, Some(d)) => {
            log::trace!("separator: matched {:?} at {}", d.separator, d.start);
            Some(d)
        }
        (None, None) => None,
    }
}

fn find_earliest_hash_match(input: &str) -> Option<Located> {
    let mut scan_from = 0usize;
    while let Some(rel) = input[scan_from..].find('#') {
        let p = scan_from + rel;
        if let Some((separator, end)) = match_hash_trie(input, p) {
            if matches!(separator, Separator::ElementHide) && is_comment_continuation(input, p) {
                log::trace!("separator: rejecting '##' at {p} as comment continuation");
                scan_from = p + 1;
                continue;
            }
            return Some(Located {
                start: p,
                end,
                separator,
            });
        }
        scan_from = p + 1;
    }
    None
}

fn find_earliest_dollar_match(input: &str) -> Option<Located> {
    let mut scan_from = 0usize;
    while let Some(rel) = input[scan_from..].find('$') {
        let p = scan_from + rel;
        if let Some((separator, end)) = match_dollar_trie(input, p) {
            return Some(Located {
                start: p,
                end,
                separator,
            });
        }
        scan_from = p + 1;
    }
    None
}

fn match_hash_trie(input: &str, p: usize) -> Option<(Separator, usize)> {
    let mut best: Option<(Separator, usize)> = None;
    for (sep, lit) in SEPARATORS {
        if !lit.starts_with('#') {
            continue;
        }
        if input[p..].starts_with(lit) {
            let end = p + lit.len();
            if best.map_or(true, |(_, best_end)| end > best_end) {
                best = Some((*sep, end));
            }
        }
    }
    best
}

fn match_dollar_trie(input: &str, p: usize) -> Option<(Separator, usize)> {
    if input[p..].starts_with("$@$") {
        Some((Separator::AdgHtmlException, p + 3))
    } else if input[p..].starts_with("$$") {
        Some((Separator::AdgHtml, p + 2))
    } else {
        None
    }
}

/// `##` immediately following a space is an EasyList-style comment
/// continuation (`! some comment ## more comment`), not a separator.
fn is_comment_continuation(input: &str, p: usize) -> bool {
    p > 0 && input[..p].chars().next_back() == Some(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_wins() {
        let loc = locate("example.com#%#//scriptlet('s')").unwrap();
        assert_eq!(loc.separator, Separator::ScriptletLong);
        assert_eq!(&"example.com#%#//scriptlet('s')"[loc.start..loc.end], "#%#//scriptlet");
    }

    #[test]
    fn exception_flag_from_second_char() {
        assert!(Separator::ElementHideException.is_exception());
        assert!(!Separator::ElementHide.is_exception());
        assert!(Separator::AdgHtmlException.is_exception());
        assert!(!Separator::AdgHtml.is_exception());
    }

    #[test]
    fn hash_preferred_over_dollar_when_earlier() {
        let loc = locate(r#"example.com$$script[tag-content="#example"]"#).unwrap();
        assert_eq!(loc.separator, Separator::AdgHtml);
    }

    #[test]
    fn dollar_wins_even_when_a_later_hash_trie_match_exists() {
        // The `##` inside the attribute-value string forms a real trie match
        // (unlike the single-`#` case above), so `locate` must compare its
        // position against `$$`'s and still prefer `$$` because it starts
        // earlier in the string.
        let loc = locate(r#"example.com$$script[tag-content="##example"]"#).unwrap();
        assert_eq!(loc.separator, Separator::AdgHtml);
        assert_eq!(loc.start, 11);
    }

    #[test]
    fn comment_continuation_is_skipped() {
        // No real separator here: the "##" is preceded by a space and the
        // remainder of the line has no further candidate.
        assert!(locate("this is a comment ## not a rule").is_none());
    }

    #[test]
    fn comment_continuation_does_not_block_a_later_real_separator() {
        let loc = locate("ignored ## middle#@#.ad").unwrap();
        assert_eq!(loc.separator, Separator::ElementHideException);
        assert_eq!(loc.start, 17);
    }

    #[test]
    fn not_found_returns_none() {
        assert!(locate("||example.com^$script").is_none());
    }

    #[test]
    fn ubo_scriptlet_vs_plain_element_hide() {
        let loc = locate("example.com##+js(foo)").unwrap();
        assert_eq!(loc.separator, Separator::UboScriptlet);
    }
}
