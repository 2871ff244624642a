//! A lossless parser and regenerator for adblock filter-list rule syntax
//! across three dialects: AdGuard, uBlock Origin, and Adblock Plus.
//!
//! A raw rule line goes in, a typed AST node comes out; [`cosmetic::generate`]
//! and [`network::generate`] go the other way, emitting a canonical rule
//! string from that AST. The hard part lives in [`cosmetic`]: deciding
//! which of the recognized separators splits a rule, picking the right
//! body grammar for whatever's on the right of it, and enforcing
//! compatibility between the three dialects' overlapping syntaxes.
//!
//! # Detection vs. parsing
//!
//! Every entry point follows the same two-phase shape: "is this rule even
//! of this kind" is answered silently (`None` for no), and "now parse it"
//! is total (an `Err` for anything malformed once the shape has been
//! committed to). [`parse`] is the top-level entry point that runs the
//! cosmetic dispatcher first and falls back to the network parser, the
//! way real filter-list consumers do.
//!
//! # Example
//!
//! ```
//! use filterlist_syntax::{parse, generate, Rule};
//!
//! let rule = parse("example.com,~example.net##.ad").unwrap();
//! assert!(matches!(rule, Rule::Cosmetic(_)));
//! assert_eq!(generate(&rule).unwrap(), "example.com,~example.net##.ad");
//! ```

pub mod adg_bracket;
pub mod cosmetic;
pub mod css;
pub mod dialect;
pub mod domain;
pub mod error;
pub mod modifier;
pub mod network;
pub mod procedural;
pub mod scanner;
pub mod scriptlet;
pub mod separator;

#[cfg(test)]
mod tests;

pub use cosmetic::{CosmeticBody, CosmeticRule, CosmeticType};
pub use dialect::{Dialect, RuleCategory};
pub use error::{FilterError, Result};
pub use network::{NetworkKind, NetworkRule};
pub use procedural::ProceduralRegistry;

/// Either half of the category split in §3's data model: a cosmetic rule
/// (page-content manipulation) or a network rule (URL matching).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Cosmetic(CosmeticRule),
    Network(NetworkRule),
}

/// Parses a single raw rule line with the default [`ProceduralRegistry`].
///
/// Tries the cosmetic dispatcher first; if the line isn't a cosmetic rule
/// (no recognized separator, a plain comment, or a `##^responseheader(...)`
/// line reserved for network parsing), falls back to the network parser,
/// which is expected to succeed on every remaining non-comment line.
pub fn parse(raw: &str) -> Result<Rule> {
    parse_with_registry(raw, &ProceduralRegistry::default())
}

/// As [`parse`], but with an explicit [`ProceduralRegistry`] for callers
/// tracking uBO procedural operators beyond this crate's default set.
pub fn parse_with_registry(raw: &str, registry: &ProceduralRegistry) -> Result<Rule> {
    match cosmetic::parse(raw, registry) {
        Some(Ok(rule)) => Ok(Rule::Cosmetic(rule)),
        Some(Err(e)) => Err(e),
        None => network::parse(raw).map(Rule::Network),
    }
}

/// Regenerates the canonical rule string for `rule`.
pub fn generate(rule: &Rule) -> Result<String> {
    match rule {
        Rule::Cosmetic(r) => cosmetic::generate(r),
        Rule::Network(r) => Ok(network::generate(r)),
    }
}

/// Parses every line in `input` independently and in parallel, skipping
/// blank lines. Per §5's concurrency model, rule parsing is embarrassingly
/// parallel: no line's result depends on another's.
pub fn parse_all(input: &str) -> Vec<Result<Rule>> {
    use rayon::prelude::*;
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(parse)
        .collect()
}
