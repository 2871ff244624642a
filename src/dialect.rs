//! The tagged values that cut across every rule: which dialect it belongs
//! to, and whether it is a cosmetic or network rule.

/// One of the three adblocker syntax families, or `Common` before a parse
/// has narrowed it to a specific one. `Common` is the "revision 2" name the
/// source settled on for what an earlier revision called `Unknown` — same
/// meaning, one name kept (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Syntactically valid in more than one dialect; not yet narrowed.
    Common,
    AdGuard,
    UblockOrigin,
    AdblockPlus,
}

impl Dialect {
    /// `true` once a parse step has committed to a specific dialect.
    pub fn is_narrowed(self) -> bool {
        !matches!(self, Dialect::Common)
    }
}

/// Whether a rule manipulates page content or matches network requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    Cosmetic,
    Network,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_is_not_narrowed() {
        assert!(!Dialect::Common.is_narrowed());
        assert!(Dialect::AdGuard.is_narrowed());
        assert!(Dialect::UblockOrigin.is_narrowed());
        assert!(Dialect::AdblockPlus.is_narrowed());
    }
}
