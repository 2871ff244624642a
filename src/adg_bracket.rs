//! The AdGuard `[$modifier,list]` prefix block on a cosmetic pattern (§4.5).

use crate::error::{FilterError, Result};
use crate::modifier::{self, ModifierList};
use crate::scanner;

/// The parsed `[$...]` block plus whatever followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdgModifierBlock {
    pub modifiers: ModifierList,
    pub rest: String,
}

/// Extracts a leading `[$modifiers]` block from a cosmetic-rule pattern.
///
/// Returns an empty modifier list (not an error) when `input` doesn't start
/// with `[` at all — that's simply the common case of a pattern with no
/// AdGuard modifier bracket.
pub fn parse(input: &str) -> Result<AdgModifierBlock> {
    let trimmed = input.trim();
    if !trimmed.starts_with('[') {
        return Ok(AdgModifierBlock {
            modifiers: ModifierList::new(),
            rest: trimmed.to_string(),
        });
    }
    if !trimmed[1..].starts_with('$') {
        return Err(FilterError::MissingModifierMarker {
            fragment: trimmed.to_string(),
        });
    }
    let close = scanner::find_next_unescaped(trimmed, ']', 2).ok_or_else(|| {
        FilterError::MissingClosingBracket {
            fragment: trimmed.to_string(),
        }
    })?;
    let inner = trimmed[2..close].trim();
    if inner.is_empty() {
        return Err(FilterError::NoModifiersSpecified);
    }
    let modifiers = modifier::parse(inner);
    let rest = trimmed[close + 1..].trim().to_string();
    log::debug!("adg_bracket: parsed {} modifier(s), rest = {:?}", modifiers.len(), rest);
    Ok(AdgModifierBlock { modifiers, rest })
}

/// `[$` + modifier-list generation + `]`.
pub fn generate(block: &AdgModifierBlock) -> String {
    format!("[${}]", modifier::generate(&block.modifiers))
}
