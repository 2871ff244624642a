//! Scriptlet-call bodies: the AdGuard/uBO single parenthesized call, and
//! the ABP semicolon-separated sequence of whitespace-delimited calls
//! (§4.8).

use crate::error::{FilterError, Result};
use crate::scanner::{self, SplitMode};

/// How a scriptlet parameter's delimiters were written, so generation can
/// re-add the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Unquoted,
    SingleQuoted,
    DoubleQuoted,
    RegExp,
}

/// A single scriptlet argument (or the call name, which is just the first
/// parameter). `value` has its delimiters already stripped for the quoted
/// and regex kinds; embedded escapes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub kind: ParamKind,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptletCall {
    pub name: Parameter,
    pub args: Vec<Parameter>,
}

/// An ordered sequence of calls. AdGuard/uBO bodies always produce exactly
/// one; ABP bodies may produce several.
pub type ScriptletBody = Vec<ScriptletCall>;

/// Dispatches on whether the trimmed body starts with `(` (AdGuard/uBO
/// shape) or not (ABP shape).
pub fn parse(input: &str) -> Result<ScriptletBody> {
    let trimmed = input.trim();
    if trimmed.starts_with('(') {
        Ok(vec![parse_call_shape(trimmed)?])
    } else {
        parse_abp_shape(trimmed)
    }
}

/// Parses a single `(arg, arg, ...)` call. An empty parenthesized body
/// (`()`) is valid and returns a call with an empty name and no args.
fn parse_call_shape(trimmed: &str) -> Result<ScriptletCall> {
    if !trimmed.starts_with('(') {
        return Err(FilterError::MissingOpenParen {
            fragment: trimmed.to_string(),
        });
    }
    if !trimmed.ends_with(')') {
        return Err(FilterError::MissingCloseParen {
            fragment: trimmed.to_string(),
        });
    }
    let inner = &trimmed[1..trimmed.len() - 1];
    let fragments = scanner::split_by(SplitMode::OutsideStringsOutsideRegex, inner, ',');
    if fragments.len() == 1 && fragments[0].trim().is_empty() {
        return Ok(ScriptletCall {
            name: Parameter {
                kind: ParamKind::Unquoted,
                value: String::new(),
            },
            args: Vec::new(),
        });
    }
    let mut params = fragments.iter().map(|f| classify_parameter(f.trim()));
    let name = params.next().expect("fragments is nonempty here");
    Ok(ScriptletCall {
        name,
        args: params.collect(),
    })
}

fn parse_abp_shape(trimmed: &str) -> Result<ScriptletBody> {
    let stripped = trimmed.strip_suffix(';').unwrap_or(trimmed);
    let call_texts =
        scanner::split_by(SplitMode::OutsideStringsOutsideRegex, stripped, ';');
    call_texts
        .iter()
        .map(|t| parse_abp_call(t.trim()))
        .collect()
}

fn parse_abp_call(call_text: &str) -> Result<ScriptletCall> {
    let words = split_abp_whitespace(call_text);
    let mut params = words.iter().map(|w| classify_parameter(w));
    let name = params.next().ok_or_else(|| FilterError::NoScriptletSpecified {
        fragment: call_text.to_string(),
    })?;
    if name.value.is_empty() {
        return Err(FilterError::NoScriptletSpecified {
            fragment: call_text.to_string(),
        });
    }
    Ok(ScriptletCall {
        name,
        args: params.collect(),
    })
}

/// The ABP whitespace-splitting state machine: whitespace inside a quoted
/// argument is preserved; an unescaped quote opens (flushing any
/// accumulated unquoted text first) or closes a quoted region; escaped
/// whitespace stays part of the current unquoted argument; an unterminated
/// quote at end of input is kept as a literal character in a single
/// Unquoted word.
fn split_abp_whitespace(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut open_quote: Option<char> = None;
    let mut chars = input.chars().peekable();
    let mut has_current = false;

    while let Some(ch) = chars.next() {
        match open_quote {
            Some(q) => {
                if ch == '\\' {
                    if let Some(&next) = chars.peek() {
                        current.push(ch);
                        current.push(next);
                        chars.next();
                        continue;
                    }
                    current.push(ch);
                    continue;
                }
                if ch == q {
                    current.push(ch);
                    words.push(current.clone());
                    current.clear();
                    has_current = false;
                    open_quote = None;
                } else {
                    current.push(ch);
                }
            }
            None => {
                if ch == '\\' {
                    if let Some(&next) = chars.peek() {
                        current.push(ch);
                        current.push(next);
                        chars.next();
                        has_current = true;
                        continue;
                    }
                    current.push(ch);
                    has_current = true;
                    continue;
                }
                if scanner::is_whitespace(ch) {
                    if has_current {
                        words.push(current.clone());
                        current.clear();
                        has_current = false;
                    }
                    continue;
                }
                if ch == '\'' || ch == '"' {
                    if has_current {
                        words.push(current.clone());
                        current.clear();
                        has_current = false;
                    }
                    current.push(ch);
                    open_quote = Some(ch);
                } else {
                    current.push(ch);
                    has_current = true;
                }
            }
        }
    }
    if has_current || open_quote.is_some() {
        words.push(current);
    }
    words
}

/// Classifies a parameter fragment by its delimiter pair, stripping the
/// delimiters for the quoted/regex kinds.
fn classify_parameter(fragment: &str) -> Parameter {
    if fragment.len() >= 2 && fragment.starts_with('\'') && fragment.ends_with('\'') {
        Parameter {
            kind: ParamKind::SingleQuoted,
            value: fragment[1..fragment.len() - 1].to_string(),
        }
    } else if fragment.len() >= 2 && fragment.starts_with('"') && fragment.ends_with('"') {
        Parameter {
            kind: ParamKind::DoubleQuoted,
            value: fragment[1..fragment.len() - 1].to_string(),
        }
    } else if scanner::is_regex_pattern(fragment) {
        Parameter {
            kind: ParamKind::RegExp,
            value: fragment[1..fragment.len() - 1].to_string(),
        }
    } else {
        Parameter {
            kind: ParamKind::Unquoted,
            value: fragment.to_string(),
        }
    }
}

/// AdGuard/uBO calls are joined with `, ` inside parentheses; ABP calls
/// are joined with `; `, each call's parameters joined with a single
/// space. Every parameter is re-delimited and its delimiter character
/// escaped inside the value (the §4.1 `escape` helper, applied per kind).
pub fn generate(body: &ScriptletBody, is_abp: bool) -> String {
    if is_abp {
        body.iter()
            .map(generate_abp_call)
            .collect::<Vec<_>>()
            .join("; ")
    } else {
        let calls: Vec<String> = body.iter().map(generate_call_shape).collect();
        calls.join("\n")
    }
}

fn generate_call_shape(call: &ScriptletCall) -> String {
    let mut params = vec![generate_parameter(&call.name, false)];
    params.extend(call.args.iter().map(|p| generate_parameter(p, false)));
    format!("({})", params.join(", "))
}

fn generate_abp_call(call: &ScriptletCall) -> String {
    let mut params = vec![generate_parameter(&call.name, true)];
    params.extend(call.args.iter().map(|p| generate_parameter(p, true)));
    params.join(" ")
}

/// Unquoted values escape `,` in the AdGuard/uBO call shape (where a
/// comma would be mistaken for the argument separator) and whitespace plus
/// `;` in the ABP shape instead (where those are the separators).
fn generate_parameter(param: &Parameter, is_abp: bool) -> String {
    match param.kind {
        ParamKind::Unquoted if is_abp => {
            scanner::escape(&scanner::escape(&param.value, ' '), ';')
        }
        ParamKind::Unquoted => scanner::escape(&param.value, ','),
        ParamKind::SingleQuoted => format!("'{}'", scanner::escape(&param.value, '\'')),
        ParamKind::DoubleQuoted => format!("\"{}\"", scanner::escape(&param.value, '"')),
        ParamKind::RegExp => format!("/{}/", scanner::escape(&param.value, '/')),
    }
}
