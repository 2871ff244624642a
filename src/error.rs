//! The exhaustive error taxonomy for parsing and regenerating filter rules.
//!
//! Parsers never catch errors raised by sub-parsers they call — they
//! propagate with `?` and are surfaced to the caller with the offending
//! fragment embedded for diagnostic quoting. Generators never catch errors
//! either: a malformed AST reaching a generator is the caller's bug, not
//! something to recover from.

use thiserror::Error;

/// Every way a parse or generate call can fail once the input has already
/// been recognized as "of this kind" (see the crate root docs for the
/// detection/parse two-phase split).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("empty domain in domain list: {fragment:?}")]
    EmptyDomain { fragment: String },

    #[error("`~` followed by whitespace in domain list: {fragment:?}")]
    ExceptionFollowedByWhitespace { fragment: String },

    #[error("double exception `~~` in domain list: {fragment:?}")]
    DoubleException { fragment: String },

    #[error("`[` pattern prefix not followed by `$`: {fragment:?}")]
    MissingModifierMarker { fragment: String },

    #[error("no closing `]` found for `[$...`: {fragment:?}")]
    MissingClosingBracket { fragment: String },

    #[error("empty `[$]` modifier block")]
    NoModifiersSpecified,

    #[error("scriptlet call missing opening `(`: {fragment:?}")]
    MissingOpenParen { fragment: String },

    #[error("scriptlet call missing closing `)`: {fragment:?}")]
    MissingCloseParen { fragment: String },

    #[error("empty scriptlet name: {fragment:?}")]
    NoScriptletSpecified { fragment: String },

    #[error("more than one `remove` declaration in CSS-injection body: {fragment:?}")]
    MultipleRemoveDeclarations { fragment: String },

    #[error("`remove` declaration mixed with other declarations: {fragment:?}")]
    MixedRemoveAndDeclarations { fragment: String },

    #[error("cannot regenerate a media-query CSS-injection body for uBlock Origin")]
    MediaQueryInUbo,

    #[error("generator cannot emit this body for the requested dialect: {detail}")]
    UnsupportedSyntax { detail: String },

    #[error("AdGuard modifier bracket mixed with uBO procedural modifiers or CSS injection: {fragment:?}")]
    AdgAndUboMixed { fragment: String },

    #[error("AdGuard modifier bracket combined with uBO `:style()`/`:remove()`: {fragment:?}")]
    AdgCssWithUboInject { fragment: String },

    #[error("uBO procedural modifier inside an AdGuard HTML filter: {fragment:?}")]
    UboProceduralOnAdgHtml { fragment: String },

    #[error("malformed `responseheader(...)` body: {fragment:?}")]
    InvalidResponseHeader { fragment: String },

    #[error("`$removeheader=` with an empty value")]
    EmptyRemoveHeader,

    #[error("generator was given an AST whose separator is not in the trie")]
    UnknownSeparator,

    #[error("CSS capability rejected a fragment: {message} (in {fragment:?})")]
    CssSyntaxError { message: String, fragment: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;
