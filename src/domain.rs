//! Comma- or pipe-separated domain lists with `~` exception markers (§4.3).

use crate::error::{FilterError, Result};
use crate::scanner::{self, SplitMode};

/// A single entry in a [`DomainList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub name: String,
    pub exception: bool,
}

/// The separator a [`DomainList`] was written (and will be regenerated)
/// with — `,` for network/cosmetic pattern domain lists, `|` for the
/// uBO/AdGuard `domain=a.com|~b.com` modifier value form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainSeparator {
    Comma,
    Pipe,
}

impl DomainSeparator {
    fn as_char(self) -> char {
        match self {
            DomainSeparator::Comma => ',',
            DomainSeparator::Pipe => '|',
        }
    }
}

/// An ordered list of domains, in source order (order is significant for
/// regeneration, not just a set).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainList {
    pub separator: DomainSeparator,
    pub domains: Vec<Domain>,
}

/// Parses `input` as a domain list joined by `separator`.
///
/// Domain names never contain a backslash, so fragments are split with a
/// plain (non-escape-aware) search rather than [`scanner::find_unescaped_outside_strings_outside_regex`].
pub fn parse(input: &str, separator: DomainSeparator) -> Result<DomainList> {
    let mut domains = Vec::new();
    for raw in scanner::split_by(SplitMode::Plain, input, separator.as_char()) {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "~" {
            return Err(FilterError::EmptyDomain {
                fragment: raw.clone(),
            });
        }
        if let Some(rest) = trimmed.strip_prefix('~') {
            match rest.chars().next() {
                Some(c) if scanner::is_whitespace(c) => {
                    return Err(FilterError::ExceptionFollowedByWhitespace {
                        fragment: trimmed.to_string(),
                    });
                }
                Some('~') => {
                    return Err(FilterError::DoubleException {
                        fragment: trimmed.to_string(),
                    });
                }
                _ => {}
            }
            domains.push(Domain {
                name: rest.to_string(),
                exception: true,
            });
        } else {
            domains.push(Domain {
                name: trimmed.to_string(),
                exception: false,
            });
        }
    }
    Ok(DomainList { separator, domains })
}

/// `[~]name` fragments joined by the list's separator. Names are assumed
/// already normalized, so this does not re-trim them.
pub fn generate(list: &DomainList) -> String {
    let sep = list.separator.as_char();
    list.domains
        .iter()
        .map(|d| {
            if d.exception {
                format!("~{}", d.name)
            } else {
                d.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(&sep.to_string())
}
