//! The network rule parser (§4.10): exception marker, modifier-separator
//! isolation from the right, and the `responseheader`/`removeheader`
//! header-removal specializations.

use crate::dialect::{Dialect, RuleCategory};
use crate::error::{FilterError, Result};
use crate::modifier::{self, ModifierList};
use crate::scanner;
use crate::separator::{self, Separator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkKind {
    Basic { modifiers: ModifierList },
    RemoveHeader { header: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRule {
    pub category: RuleCategory,
    pub dialect: Dialect,
    pub exception: bool,
    pub pattern: String,
    pub kind: NetworkKind,
}

/// Parses `raw` as a network rule. Assumes the caller has already ruled
/// out a cosmetic interpretation (the cosmetic dispatcher's separator
/// detection runs first, per the crate root's dispatch order): this
/// parser succeeds on every remaining non-comment line, so it returns
/// `Result` rather than `Option<Result<_>>`.
pub fn parse(raw: &str) -> Result<NetworkRule> {
    let trimmed = raw.trim();

    if trimmed.contains("responseheader(") {
        return parse_ubo_responseheader(trimmed);
    }

    let (exception, rest) = match trimmed.strip_prefix("@@") {
        Some(r) => (true, r),
        None => (false, trimmed),
    };

    match locate_modifier_separator(rest) {
        Some(idx) => {
            let pattern = rest[..idx].to_string();
            let modifiers = modifier::parse(&rest[idx + 1..]);
            if modifiers.len() == 1 && modifiers[0].name == "removeheader" {
                let header = modifiers[0].value.clone().unwrap_or_default();
                if header.is_empty() {
                    return Err(FilterError::EmptyRemoveHeader);
                }
                Ok(NetworkRule {
                    category: RuleCategory::Network,
                    dialect: Dialect::AdGuard,
                    exception,
                    pattern,
                    kind: NetworkKind::RemoveHeader { header },
                })
            } else {
                Ok(NetworkRule {
                    category: RuleCategory::Network,
                    dialect: Dialect::Common,
                    exception,
                    pattern,
                    kind: NetworkKind::Basic { modifiers },
                })
            }
        }
        None => Ok(NetworkRule {
            category: RuleCategory::Network,
            dialect: Dialect::Common,
            exception,
            pattern: rest.to_string(),
            kind: NetworkKind::Basic {
                modifiers: ModifierList::new(),
            },
        }),
    }
}

fn parse_ubo_responseheader(trimmed: &str) -> Result<NetworkRule> {
    let located = separator::locate(trimmed).ok_or_else(|| FilterError::InvalidResponseHeader {
        fragment: trimmed.to_string(),
    })?;
    if !matches!(located.separator, Separator::UboHtml | Separator::UboHtmlException) {
        return Err(FilterError::InvalidResponseHeader {
            fragment: trimmed.to_string(),
        });
    }
    let pattern = trimmed[..located.start].trim().to_string();
    let body = trimmed[located.end..].trim();
    let inner = body
        .strip_prefix("responseheader(")
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| FilterError::InvalidResponseHeader {
            fragment: body.to_string(),
        })?;
    if inner.is_empty() {
        return Err(FilterError::InvalidResponseHeader {
            fragment: body.to_string(),
        });
    }
    log::debug!("network: parsed uBO responseheader removal for {inner:?}");
    Ok(NetworkRule {
        category: RuleCategory::Network,
        dialect: Dialect::UblockOrigin,
        exception: located.separator.is_exception(),
        pattern,
        kind: NetworkKind::RemoveHeader {
            header: inner.to_string(),
        },
    })
}

/// Scans from the right for an unescaped `$` not immediately followed by
/// `/` — the guard that keeps a trailing regex modifier value such as
/// `$replace=/.../` from being mis-split at its own internal `$`-less
/// slashes. `find_last_unescaped` alone would stop at the rightmost `$`,
/// which is always the real modifier separator in valid input; the `/`
/// guard additionally rejects a `$` that's actually inside that regex
/// value's delimiters.
fn locate_modifier_separator(input: &str) -> Option<usize> {
    let mut search_end = input.len();
    loop {
        let candidate = scanner::find_last_unescaped(&input[..search_end], '$')?;
        if input[candidate + 1..].starts_with('/') {
            search_end = candidate;
            continue;
        }
        return Some(candidate);
    }
}

/// `@@` if exception, then `pattern`, then the kind-specific tail: uBO
/// header removal appends its cosmetic-shaped separator and
/// `responseheader(name)`; AdGuard header removal appends
/// `$removeheader=name`; a basic rule appends `$` plus the modifier list
/// when any modifiers are present.
pub fn generate(rule: &NetworkRule) -> String {
    let mut out = String::new();
    if rule.exception {
        out.push_str("@@");
    }
    out.push_str(&rule.pattern);
    match &rule.kind {
        NetworkKind::RemoveHeader { header } => {
            if rule.dialect == Dialect::UblockOrigin {
                let sep = if rule.exception {
                    Separator::UboHtmlException
                } else {
                    Separator::UboHtml
                };
                out.push_str(sep.literal());
                out.push_str("responseheader(");
                out.push_str(header);
                out.push(')');
            } else {
                out.push_str("$removeheader=");
                out.push_str(header);
            }
        }
        NetworkKind::Basic { modifiers } => {
            if !modifiers.is_empty() {
                out.push('$');
                out.push_str(&modifier::generate(modifiers));
            }
        }
    }
    out
}
