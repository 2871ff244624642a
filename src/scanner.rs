//! Quote-, escape-, and regex-aware character scanning over a rule fragment.
//!
//! Every other parser in this crate is built out of these primitives rather
//! than ad hoc indexing, so that "is this comma inside a string literal"
//! logic only has to be gotten right once. None of these operations can
//! fail: an absent match is `None`, never an error.

/// The escape character filter-list syntax uses throughout.
pub const ESC: char = '\\';

/// Smallest index `>= start` where `input[i] == target` and the character
/// immediately before it is not [`ESC`]. The predecessor at `start == 0` is
/// absent, so the escape check is satisfied vacuously there.
pub fn find_next_unescaped(input: &str, target: char, start: usize) -> Option<usize> {
    let mut prev = preceding_char(input, start);
    let mut idx = start;
    for ch in input[start..].chars() {
        if ch == target && prev != Some(ESC) {
            return Some(idx);
        }
        prev = Some(ch);
        idx += ch.len_utf8();
    }
    None
}

/// Symmetric to [`find_next_unescaped`], scanning the whole string and
/// keeping the last unescaped match.
pub fn find_last_unescaped(input: &str, target: char) -> Option<usize> {
    let mut prev: Option<char> = None;
    let mut idx = 0;
    let mut last = None;
    for ch in input.chars() {
        if ch == target && prev != Some(ESC) {
            last = Some(idx);
        }
        prev = Some(ch);
        idx += ch.len_utf8();
    }
    last
}

/// As [`find_next_unescaped`], but `target` is only reported while no `'`,
/// `"`, or `/` delimiter is currently open. A delimiter character not
/// preceded by [`ESC`] toggles a single-slot "currently open" state: it
/// opens that delimiter if none is open, or closes it if it matches.
pub fn find_unescaped_outside_strings_outside_regex(
    input: &str,
    target: char,
    start: usize,
) -> Option<usize> {
    scan_outside_delimiters(input, target, start, true)
}

/// As [`find_unescaped_outside_strings_outside_regex`], but `/` is inert —
/// only `'` and `"` open or close a tracked region.
pub fn find_unescaped_outside_strings(input: &str, target: char, start: usize) -> Option<usize> {
    scan_outside_delimiters(input, target, start, false)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Open {
    None,
    Single,
    Double,
    Regex,
}

fn scan_outside_delimiters(
    input: &str,
    target: char,
    start: usize,
    track_regex: bool,
) -> Option<usize> {
    let mut state = Open::None;
    let mut prev = preceding_char(input, start);
    let mut idx = start;
    for ch in input[start..].chars() {
        let escaped = prev == Some(ESC);
        if !escaped {
            match (state, ch) {
                (Open::None, '\'') => state = Open::Single,
                (Open::Single, '\'') => state = Open::None,
                (Open::None, '"') => state = Open::Double,
                (Open::Double, '"') => state = Open::None,
                (Open::None, '/') if track_regex => state = Open::Regex,
                (Open::Regex, '/') if track_regex => state = Open::None,
                _ => {}
            }
            if ch == target && state == Open::None {
                return Some(idx);
            }
        }
        prev = Some(ch);
        idx += ch.len_utf8();
    }
    None
}

fn preceding_char(input: &str, byte_index: usize) -> Option<char> {
    if byte_index == 0 {
        None
    } else {
        input[..byte_index].chars().next_back()
    }
}

/// Which escaping discipline [`split_by`] should use to locate delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// Plain substring search; the delimiter never appears inside a value.
    Plain,
    /// [`find_unescaped_outside_strings`].
    OutsideStrings,
    /// [`find_unescaped_outside_strings_outside_regex`].
    OutsideStringsOutsideRegex,
}

/// Splits `input` on every occurrence of `delimiter` located by `mode`,
/// preserving empty fragments. An empty `input` yields a single empty
/// fragment, matching `"".split(delimiter)` semantics.
pub fn split_by(mode: SplitMode, input: &str, delimiter: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0usize;
    loop {
        let found = match mode {
            SplitMode::Plain => input[start..].find(delimiter).map(|i| i + start),
            SplitMode::OutsideStrings => find_unescaped_outside_strings(input, delimiter, start),
            SplitMode::OutsideStringsOutsideRegex => {
                find_unescaped_outside_strings_outside_regex(input, delimiter, start)
            }
        };
        match found {
            Some(idx) => {
                out.push(input[start..idx].to_string());
                start = idx + delimiter.len_utf8();
            }
            None => {
                out.push(input[start..].to_string());
                break;
            }
        }
    }
    out
}

/// True for the two characters filter-list syntax treats as insignificant
/// horizontal whitespace.
#[inline]
pub fn is_whitespace(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

/// True iff `input` has more than two characters, starts with `/`, and its
/// last character is an unescaped `/` — i.e. it is shaped like a regex
/// literal rather than a plain string.
pub fn is_regex_pattern(input: &str) -> bool {
    if input.chars().count() <= 2 || !input.starts_with('/') {
        return false;
    }
    match find_last_unescaped(input, '/') {
        Some(idx) => idx + 1 == input.len(),
        None => false,
    }
}

/// Inserts [`ESC`] before every occurrence of `character` not already
/// preceded by it. Idempotent: escaping an already-escaped string is a
/// no-op.
pub fn escape(input: &str, character: char) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev: Option<char> = None;
    for ch in input.chars() {
        if ch == character && prev != Some(ESC) {
            out.push(ESC);
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_next_unescaped_basic() {
        assert_eq!(find_next_unescaped("a,b,c", ',', 0), Some(1));
        assert_eq!(find_next_unescaped("a,b,c", ',', 2), Some(3));
        assert_eq!(find_next_unescaped(r"a\,b,c", ',', 0), Some(4));
    }

    #[test]
    fn find_next_unescaped_boundary_at_zero() {
        assert_eq!(find_next_unescaped(",a", ',', 0), Some(0));
    }

    #[test]
    fn find_last_unescaped_basic() {
        assert_eq!(find_last_unescaped("a,b,c", ','), Some(3));
        assert_eq!(find_last_unescaped(r"a,b\,c", ','), Some(1));
        assert_eq!(find_last_unescaped("abc", ','), None);
    }

    #[test]
    fn outside_strings_skips_quoted_commas() {
        assert_eq!(
            find_unescaped_outside_strings_outside_regex("'a,b',c", ',', 0),
            Some(5)
        );
        assert_eq!(
            find_unescaped_outside_strings_outside_regex(r#""a,b",c"#, ',', 0),
            Some(5)
        );
    }

    #[test]
    fn outside_strings_outside_regex_skips_regex_slash_commas() {
        assert_eq!(
            find_unescaped_outside_strings_outside_regex("/a,b/,c", ',', 0),
            Some(5)
        );
    }

    #[test]
    fn outside_strings_does_not_track_regex() {
        // With regex-tracking off, the slash is inert so the comma inside it splits.
        assert_eq!(find_unescaped_outside_strings("/a,b/,c", ',', 0), Some(2));
    }

    #[test]
    fn split_by_preserves_empty_fragments() {
        assert_eq!(
            split_by(SplitMode::Plain, "a,,b", ','),
            vec!["a", "", "b"]
        );
        assert_eq!(split_by(SplitMode::Plain, "", ','), vec![""]);
    }

    #[test]
    fn split_by_outside_strings_outside_regex() {
        assert_eq!(
            split_by(SplitMode::OutsideStringsOutsideRegex, "'a,b',c,/d,e/", ','),
            vec!["'a,b'", "c", "/d,e/"]
        );
    }

    #[test]
    fn is_regex_pattern_checks_shape() {
        assert!(is_regex_pattern("/a/"));
        assert!(is_regex_pattern("/a\\/b/"));
        assert!(!is_regex_pattern("/a"));
        assert!(!is_regex_pattern("//"));
        assert!(!is_regex_pattern("abc"));
    }

    #[test]
    fn escape_is_idempotent() {
        let once = escape("a,b,c", ',');
        assert_eq!(once, r"a\,b\,c");
        let twice = escape(&once, ',');
        assert_eq!(once, twice);
    }

    #[test]
    fn whitespace_predicate() {
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\t'));
        assert!(!is_whitespace('\n'));
    }
}
