//! Repairs applied to every page regardless of host.

use super::{FilterError, FilterSet, Replacement};

pub(super) fn filter_set() -> Result<FilterSet, FilterError> {
    FilterSet::new("global", ".*")?
        // Pilcrow permalinks, including the mis-decoded `Â¶` form
        .with_removal(r#"\[(?:Â)?¶\]\(#[^\s]+\s+"[^"]+"\)"#)?
        // Whitespace just inside link labels
        .with_substitution(
            r"\[[\n\s]*([^\]\n]*)[\n\s]*\]\(([^\)]*)\)",
            Replacement::template("[${1}](${2})"),
        )?
        // Links glued together
        .with_substitution(r"\)\[", Replacement::literal(")\n["))?
        // Scheme-relative targets
        .with_substitution(
            r"\[([^\]]*)\]\(//([^\)]*)\)",
            Replacement::template("[${1}](https://${2})"),
        )
}
