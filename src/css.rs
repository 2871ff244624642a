//! CSS-body grammars: element-hide selector lists, CSS-injection bodies
//! (AdGuard block shape, uBO `:style()`/`:remove()` shape, media-query
//! wrapper, `remove` sentinel), and HTML-filter bodies (§4.7).
//!
//! The design notes call out two ways to keep a CSS-library AST from
//! leaking across this crate's public API: depend on a parser exposing
//! typed trees with source spans, or carry CSS fragments as annotated
//! strings. Selectors here take the second path — a real `selectors`-crate
//! parse would reject the nonstandard pseudo-classes (`:has-text`,
//! `:-abp-has`, `:xpath`, …) this format is full of, and round-tripping
//! them untouched is the whole point. `cssparser` is still used, narrowly,
//! where the grammar really is standard CSS: tokenizing a declaration to
//! check whether its property is literally `remove` (the value doesn't
//! matter for that check).

use crate::dialect::Dialect;
use crate::error::{FilterError, Result};
use cssparser::{Parser, ParserInput, Token};
use regex::Regex;
use std::sync::LazyLock;

// Compiled once, like the teacher's own `HAS_TEXT_PATTERN` — these are
// program constants, not per-call parse state, so there's nothing to
// recompile on every `parse_css_inject*` call.
static ADG_SHAPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^.+\{.+\}$").unwrap());
static UBO_SHAPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sel>.+)(?::style\((?P<decls>.+)\)|:remove\(\))$").unwrap()
});
static MEDIA_QUERY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@media\s*(?P<mql>[^{]+)\s*\{\s*(?P<inner>.+)\s*\}$").unwrap()
});

/// A single selector, carried verbatim as written — see the module docs.
pub type Selector = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHideBody {
    pub selectors: Vec<Selector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlFilterBody {
    pub selectors: Vec<Selector>,
}

/// Either a retained declaration-block's text, or the sentinel recorded
/// when the block held exactly one `remove` declaration (any value) and
/// nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleBlock {
    Remove,
    Declarations(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssInjectBody {
    pub media_query: Option<String>,
    pub selectors: Vec<Selector>,
    pub block: Option<StyleBlock>,
}

/// Trims `input`; if no unescaped top-level `,` is present, the whole
/// thing is one selector, otherwise it's a comma-joined selector list.
/// Never fails — any nonempty text is accepted as a selector.
pub fn parse_element_hide(input: &str) -> ElementHideBody {
    ElementHideBody {
        selectors: split_selector_list(input.trim()),
    }
}

pub fn generate_element_hide(body: &ElementHideBody) -> String {
    body.selectors.join(",")
}

/// Identical to element-hide parsing, but applied to the input after the
/// AdGuard `""` → `\"` string-literal transcoding (uBO inputs never
/// contain doubled quotes, so the transform is a no-op for them).
pub fn parse_html_filter(input: &str) -> HtmlFilterBody {
    let transcoded = transcode_double_quotes(input.trim());
    HtmlFilterBody {
        selectors: split_selector_list(&transcoded),
    }
}

/// Reverses the `""` transcoding when regenerating for AdGuard; uBO output
/// keeps the plain `\"` form.
pub fn generate_html_filter(body: &HtmlFilterBody, dialect: Dialect) -> String {
    let joined = body.selectors.join(",");
    if dialect == Dialect::AdGuard {
        untranscode_double_quotes(&joined)
    } else {
        joined
    }
}

/// Tries the AdGuard block shape, then the uBO `:style()`/`:remove()`
/// shape. Returns `None` when `input` matches neither recognition
/// predicate — "not a CSS injection," not an error.
pub fn parse_css_inject(input: &str) -> Option<Result<CssInjectBody>> {
    let trimmed = input.trim();
    if ADG_SHAPE_PATTERN.is_match(trimmed) {
        return Some(parse_css_inject_adguard(trimmed));
    }
    if UBO_SHAPE_PATTERN.is_match(trimmed) {
        return Some(parse_css_inject_ubo(trimmed));
    }
    None
}

pub fn parse_css_inject_adguard(input: &str) -> Result<CssInjectBody> {
    let trimmed = input.trim();
    let (media_query, rule_text) = match MEDIA_QUERY_PATTERN.captures(trimmed) {
        Some(caps) => (
            Some(caps["mql"].trim().to_string()),
            caps["inner"].trim().to_string(),
        ),
        None => (None, trimmed.to_string()),
    };

    let caps = ADG_SHAPE_PATTERN.captures(&rule_text).ok_or_else(|| FilterError::CssSyntaxError {
        message: "expected `selector { declarations }`".to_string(),
        fragment: rule_text.clone(),
    })?;
    let whole = caps.get(0).unwrap().as_str();
    let open_brace = whole
        .find('{')
        .expect("ADG_SHAPE_PATTERN only matches text containing `{`");
    let close_brace = whole
        .rfind('}')
        .expect("ADG_SHAPE_PATTERN only matches text containing `}`");
    let selectors = split_selector_list(whole[..open_brace].trim());
    let decl_text = whole[open_brace + 1..close_brace].trim().to_string();

    let block = classify_declarations(&decl_text)?;
    log::debug!(
        "css: parsed AdGuard CSS-injection body, media_query={}",
        media_query.is_some()
    );
    Ok(CssInjectBody {
        media_query,
        selectors,
        block: Some(block),
    })
}

pub fn parse_css_inject_ubo(input: &str) -> Result<CssInjectBody> {
    let trimmed = input.trim();
    let caps = UBO_SHAPE_PATTERN
        .captures(trimmed)
        .ok_or_else(|| FilterError::CssSyntaxError {
            message: "expected `selector:style(...)` or `selector:remove()`".to_string(),
            fragment: trimmed.to_string(),
        })?;
    let selectors = split_selector_list(caps["sel"].trim());
    let block = match caps.name("decls") {
        Some(m) => StyleBlock::Declarations(m.as_str().trim().to_string()),
        None => StyleBlock::Remove,
    };
    log::debug!("css: parsed uBO CSS-injection body");
    Ok(CssInjectBody {
        media_query: None,
        selectors,
        block: Some(block),
    })
}

/// `@media <mql> { <selectors> { <block> } }` for AdGuard; `<selectors>:style(<block>)`
/// / `:remove()` / `:style()` for uBO. Fails for any other dialect, and
/// fails for uBO when a media query is present (uBO has no media-query
/// CSS-injection shape).
pub fn generate_css_inject(body: &CssInjectBody, dialect: Dialect) -> Result<String> {
    match dialect {
        Dialect::AdGuard => Ok(generate_css_inject_adguard(body)),
        Dialect::UblockOrigin => generate_css_inject_ubo(body),
        other => Err(FilterError::UnsupportedSyntax {
            detail: format!("CSS-injection body cannot be generated for dialect {other:?}"),
        }),
    }
}

fn generate_css_inject_adguard(body: &CssInjectBody) -> String {
    let selectors = body.selectors.join(",");
    let block_text = match &body.block {
        Some(StyleBlock::Remove) => "{ remove: true; }".to_string(),
        Some(StyleBlock::Declarations(decl)) => format!("{{ {decl} }}"),
        None => "{ }".to_string(),
    };
    let rule = format!("{selectors} {block_text}");
    match &body.media_query {
        Some(mql) => format!("@media {mql} {{ {rule} }}"),
        None => rule,
    }
}

fn generate_css_inject_ubo(body: &CssInjectBody) -> Result<String> {
    if body.media_query.is_some() {
        return Err(FilterError::MediaQueryInUbo);
    }
    let selectors = body.selectors.join(",");
    let tail = match &body.block {
        Some(StyleBlock::Remove) => ":remove()".to_string(),
        Some(StyleBlock::Declarations(decl)) => format!(":style({decl})"),
        None => ":style()".to_string(),
    };
    Ok(format!("{selectors}{tail}"))
}

/// Splits declaration text on top-level `;`, drops a trailing empty
/// fragment from a trailing semicolon, and checks for a lone declaration
/// whose property is literally `remove` against the two mixing errors
/// §4.7.2 step 3 lists. Per §3's `Remove` invariant, this is a check on the
/// property name alone — the value is irrelevant (`remove: false` is still
/// a `remove` declaration for mixing-error purposes).
fn classify_declarations(decl_text: &str) -> Result<StyleBlock> {
    let parts = split_declarations(decl_text);
    let remove_count = parts.iter().filter(|p| is_remove_property(p)).count();
    if remove_count > 1 {
        return Err(FilterError::MultipleRemoveDeclarations {
            fragment: decl_text.to_string(),
        });
    }
    if remove_count == 1 && parts.len() > 1 {
        return Err(FilterError::MixedRemoveAndDeclarations {
            fragment: decl_text.to_string(),
        });
    }
    if remove_count == 1 {
        Ok(StyleBlock::Remove)
    } else {
        Ok(StyleBlock::Declarations(decl_text.trim().to_string()))
    }
}

fn is_remove_property(declaration: &str) -> bool {
    let mut parser_input = ParserInput::new(declaration);
    let mut parser = Parser::new(&mut parser_input);
    let is_remove = matches!(parser.next(), Ok(Token::Ident(name)) if name.eq_ignore_ascii_case("remove"));
    if !is_remove {
        return false;
    }
    matches!(parser.next(), Ok(Token::Colon))
}

/// Splits `input` on a bracket-/quote-aware top-level occurrence of
/// `delimiter`; a `(`/`[` and its matching close don't count, nor does a
/// delimiter inside a quoted string.
fn split_top_level(input: &str, delimiter: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut start = 0usize;
    let mut idx = 0usize;
    for ch in input.chars() {
        let escaped = prev == Some('\\');
        if let Some(q) = quote {
            if ch == q && !escaped {
                quote = None;
            }
        } else {
            match ch {
                '\'' | '"' if !escaped => quote = Some(ch),
                '(' | '[' => depth += 1,
                ')' | ']' => depth -= 1,
                c if c == delimiter && depth == 0 => {
                    out.push(input[start..idx].trim().to_string());
                    start = idx + ch.len_utf8();
                }
                _ => {}
            }
        }
        prev = Some(ch);
        idx += ch.len_utf8();
    }
    out.push(input[start..].trim().to_string());
    out
}

fn split_selector_list(input: &str) -> Vec<Selector> {
    split_top_level(input, ',')
}

fn split_declarations(input: &str) -> Vec<String> {
    let mut parts = split_top_level(input, ';');
    if parts.len() > 1 && parts.last().map_or(false, |p| p.is_empty()) {
        parts.pop();
    }
    parts
}

/// Inside a double-quoted string, a doubled `""` becomes `\"`; a lone `"`
/// closes the string. Outside of strings, input passes through unchanged.
fn transcode_double_quotes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let chars: Vec<char> = input.chars().collect();
    let mut in_string = false;
    let mut i = 0usize;
    while i < chars.len() {
        let ch = chars[i];
        if in_string && ch == '"' {
            if chars.get(i + 1) == Some(&'"') {
                out.push('\\');
                out.push('"');
                i += 2;
                continue;
            }
            in_string = false;
            out.push(ch);
            i += 1;
            continue;
        }
        if !in_string && ch == '"' {
            in_string = true;
        }
        out.push(ch);
        i += 1;
    }
    out
}

/// The approximate inverse of [`transcode_double_quotes`]: every escaped
/// quote produced by that transform came from a doubled quote, so turning
/// `\"` back into `""` globally recovers the AdGuard form.
fn untranscode_double_quotes(input: &str) -> String {
    input.replace("\\\"", "\"\"")
}
