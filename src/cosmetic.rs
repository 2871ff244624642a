//! The cosmetic-rule dispatcher (§4.9): pattern → separator → body, with
//! dialect resolution and cross-dialect compatibility enforcement.

use crate::adg_bracket::{self, AdgModifierBlock};
use crate::css;
use crate::dialect::{Dialect, RuleCategory};
use crate::domain::{self, DomainList, DomainSeparator};
use crate::error::{FilterError, Result};
use crate::modifier::ModifierList;
use crate::procedural::{self, ProceduralBlock, ProceduralRegistry};
use crate::scriptlet;
use crate::separator::{self, Separator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CosmeticType {
    ElementHide,
    CssInject,
    Scriptlet,
    Html,
    Js,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CosmeticBody {
    ElementHide(css::ElementHideBody),
    CssInject(css::CssInjectBody),
    Scriptlet(scriptlet::ScriptletBody),
    Html(css::HtmlFilterBody),
    Js(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosmeticRule {
    pub kind: CosmeticType,
    pub dialect: Dialect,
    pub exception: bool,
    pub modifiers: ModifierList,
    pub domains: DomainList,
    pub separator: Separator,
    pub body: CosmeticBody,
}

/// [`parse`] with the default [`ProceduralRegistry`] — the common case for
/// callers that don't track an extended uBO procedural-operator set.
pub fn parse_default(raw: &str) -> Option<Result<CosmeticRule>> {
    parse(raw, &ProceduralRegistry::default())
}

/// Parses `raw` as a cosmetic rule. Returns `None` when the line isn't a
/// cosmetic rule at all (a plain comment, no recognized separator, or a
/// `##^responseheader(...)` line reserved for the network parser) — only
/// a line that committed to the cosmetic shape but is malformed produces
/// `Some(Err(_))`.
pub fn parse(raw: &str, registry: &ProceduralRegistry) -> Option<Result<CosmeticRule>> {
    if is_comment(raw) {
        return None;
    }
    let located = separator::locate(raw)?;
    let pattern_raw = raw[..located.start].trim();
    let body_raw = raw[located.end..].trim();
    let exception = located.separator.is_exception();

    let bracket = match adg_bracket::parse(pattern_raw) {
        Ok(b) => b,
        Err(e) => return Some(Err(e)),
    };
    let mut dialect = Dialect::Common;
    if !bracket.modifiers.is_empty() {
        dialect = Dialect::AdGuard;
    }

    let domains = if bracket.rest.trim().is_empty() {
        DomainList {
            separator: DomainSeparator::Comma,
            domains: Vec::new(),
        }
    } else {
        match domain::parse(&bracket.rest, DomainSeparator::Comma) {
            Ok(d) => d,
            Err(e) => return Some(Err(e)),
        }
    };

    dispatch_body(
        located.separator,
        dialect,
        exception,
        bracket.modifiers,
        domains,
        body_raw,
        registry,
    )
}

use Separator::*;

fn dispatch_body(
    sep: Separator,
    mut dialect: Dialect,
    exception: bool,
    modifiers: ModifierList,
    domains: DomainList,
    body_raw: &str,
    registry: &ProceduralRegistry,
) -> Option<Result<CosmeticRule>> {
    match sep {
        ElementHide | ElementHideException | ElementHideExtended | ElementHideExtendedException => {
            let probe = procedural::parse(body_raw, registry);
            let has_procedural = !probe.modifiers.is_empty();

            if has_procedural && dialect == Dialect::AdGuard {
                return Some(Err(FilterError::AdgAndUboMixed {
                    fragment: body_raw.to_string(),
                }));
            }
            let rest = if has_procedural {
                dialect = Dialect::UblockOrigin;
                probe.rest.clone()
            } else {
                body_raw.to_string()
            };
            let final_modifiers = if has_procedural { probe.modifiers } else { modifiers };

            let is_ubo_inject = css_inject_shape_present(&rest);
            if is_ubo_inject {
                if dialect == Dialect::AdGuard {
                    return Some(Err(FilterError::AdgCssWithUboInject {
                        fragment: rest,
                    }));
                }
                dialect = Dialect::UblockOrigin;
                let body = match css::parse_css_inject_ubo(&rest) {
                    Ok(b) => b,
                    Err(e) => return Some(Err(e)),
                };
                Some(Ok(CosmeticRule {
                    kind: CosmeticType::CssInject,
                    dialect,
                    exception,
                    modifiers: final_modifiers,
                    domains,
                    separator: sep,
                    body: CosmeticBody::CssInject(body),
                }))
            } else {
                let body = css::parse_element_hide(&rest);
                Some(Ok(CosmeticRule {
                    kind: CosmeticType::ElementHide,
                    dialect,
                    exception,
                    modifiers: final_modifiers,
                    domains,
                    separator: sep,
                    body: CosmeticBody::ElementHide(body),
                }))
            }
        }

        CssInject | CssInjectException | CssInjectExtended | CssInjectExtendedException => {
            match css::parse_css_inject_adguard(body_raw) {
                Ok(body) => Some(Ok(CosmeticRule {
                    kind: CosmeticType::CssInject,
                    dialect: Dialect::AdGuard,
                    exception,
                    modifiers,
                    domains,
                    separator: sep,
                    body: CosmeticBody::CssInject(body),
                })),
                Err(_) => match scriptlet::parse(body_raw) {
                    Ok(calls) => Some(Ok(CosmeticRule {
                        kind: CosmeticType::Scriptlet,
                        dialect: Dialect::AdblockPlus,
                        exception,
                        modifiers,
                        domains,
                        separator: sep,
                        body: CosmeticBody::Scriptlet(calls),
                    })),
                    Err(e) => Some(Err(e)),
                },
            }
        }

        UboScriptlet | UboScriptletException => {
            match scriptlet::parse(body_raw) {
                Ok(calls) => Some(Ok(CosmeticRule {
                    kind: CosmeticType::Scriptlet,
                    dialect: Dialect::UblockOrigin,
                    exception,
                    modifiers,
                    domains,
                    separator: sep,
                    body: CosmeticBody::Scriptlet(calls),
                })),
                Err(e) => Some(Err(e)),
            }
        }

        ScriptletLong | ScriptletLongException => {
            match scriptlet::parse(body_raw) {
                Ok(calls) => Some(Ok(CosmeticRule {
                    kind: CosmeticType::Scriptlet,
                    dialect: Dialect::AdGuard,
                    exception,
                    modifiers,
                    domains,
                    separator: sep,
                    body: CosmeticBody::Scriptlet(calls),
                })),
                Err(e) => Some(Err(e)),
            }
        }

        UboHtml | UboHtmlException => {
            if body_raw.starts_with("responseheader(") {
                return None;
            }
            let probe = procedural::parse(body_raw, registry);
            let has_procedural = !probe.modifiers.is_empty();
            let rest = if has_procedural { probe.rest.clone() } else { body_raw.to_string() };
            let final_modifiers = if has_procedural { probe.modifiers } else { modifiers };
            let body = css::parse_html_filter(&rest);
            Some(Ok(CosmeticRule {
                kind: CosmeticType::Html,
                dialect: Dialect::UblockOrigin,
                exception,
                modifiers: final_modifiers,
                domains,
                separator: sep,
                body: CosmeticBody::Html(body),
            }))
        }

        AdgHtml | AdgHtmlException => {
            let probe = procedural::parse(body_raw, registry);
            if !probe.modifiers.is_empty() {
                return Some(Err(FilterError::UboProceduralOnAdgHtml {
                    fragment: body_raw.to_string(),
                }));
            }
            let body = css::parse_html_filter(body_raw);
            Some(Ok(CosmeticRule {
                kind: CosmeticType::Html,
                dialect: Dialect::AdGuard,
                exception,
                modifiers,
                domains,
                separator: sep,
                body: CosmeticBody::Html(body),
            }))
        }

        Scriptlet | ScriptletException => Some(Ok(CosmeticRule {
            kind: CosmeticType::Js,
            dialect: Dialect::AdGuard,
            exception,
            modifiers,
            domains,
            separator: sep,
            body: CosmeticBody::Js(body_raw.to_string()),
        })),
    }
}

/// `true` iff `rest` contains `:style(` or `:remove(` and matches the uBO
/// CSS-injection shape — used to tell a plain element-hide body apart from
/// a uBO CSS-injection one once any procedural pseudos have been lifted.
fn css_inject_shape_present(rest: &str) -> bool {
    (rest.contains(":style(") || rest.contains(":remove(")) && css::parse_css_inject_ubo(rest).is_ok()
}

fn is_comment(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    trimmed.starts_with('!') || (trimmed.starts_with('#') && trimmed[1..].starts_with(' '))
}

/// Emits, in order: the AdGuard modifier bracket (when `dialect` is
/// AdGuard and modifiers are non-empty); the domain list; the separator;
/// then the body. A uBO body with procedural modifiers re-wraps them into
/// the selector text via §4.6 generation; ABP scriptlet calls are joined
/// with `; `; a parsed-but-illegal multi-call AdGuard/uBO scriptlet body
/// emits one complete rule per call, joined by newlines.
pub fn generate(rule: &CosmeticRule) -> Result<String> {
    let mut prefix = String::new();
    if rule.dialect == Dialect::AdGuard && !rule.modifiers.is_empty() {
        prefix.push_str(&adg_bracket::generate(&AdgModifierBlock {
            modifiers: rule.modifiers.clone(),
            rest: String::new(),
        }));
    }
    prefix.push_str(&domain::generate(&rule.domains));
    prefix.push_str(rule.separator.literal());

    match &rule.body {
        CosmeticBody::ElementHide(body) => {
            let selectors = css::generate_element_hide(body);
            let text = maybe_wrap_procedural(rule, &selectors);
            Ok(format!("{prefix}{text}"))
        }
        CosmeticBody::Html(body) => {
            let text = css::generate_html_filter(body, rule.dialect);
            let text = maybe_wrap_procedural(rule, &text);
            Ok(format!("{prefix}{text}"))
        }
        CosmeticBody::CssInject(body) => {
            let text = css::generate_css_inject(body, rule.dialect)?;
            Ok(format!("{prefix}{text}"))
        }
        CosmeticBody::Js(text) => Ok(format!("{prefix}{text}")),
        CosmeticBody::Scriptlet(calls) => {
            if rule.dialect == Dialect::AdblockPlus {
                Ok(format!("{prefix}{}", scriptlet::generate(calls, true)))
            } else if calls.len() > 1 {
                Ok(calls
                    .iter()
                    .map(|call| format!("{prefix}{}", scriptlet::generate(&vec![call.clone()], false)))
                    .collect::<Vec<_>>()
                    .join("\n"))
            } else {
                Ok(format!("{prefix}{}", scriptlet::generate(calls, false)))
            }
        }
    }
}

fn maybe_wrap_procedural(rule: &CosmeticRule, rest: &str) -> String {
    if rule.dialect == Dialect::UblockOrigin && !rule.modifiers.is_empty() {
        procedural::generate(&ProceduralBlock {
            modifiers: rule.modifiers.clone(),
            rest: rest.to_string(),
        })
    } else {
        rest.to_string()
    }
}

/// Every separator this dispatcher recognizes marks a cosmetic rule.
pub fn category(_rule: &CosmeticRule) -> RuleCategory {
    RuleCategory::Cosmetic
}
