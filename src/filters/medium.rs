//! Medium: upscale lazy-load image placeholders and split linked images.

use super::{FilterError, FilterSet, Replacement};

pub(super) fn filter_set() -> Result<FilterSet, FilterError> {
    FilterSet::new("medium", r"(?:.*\.)?medium\.com")?
        .with_literal_substitution(
            "(https://miro.medium.com/max/60/",
            "(https://miro.medium.com/max/600/",
        )?
        .with_substitution(
            r"\s*\[\s*!\[([^\]]+)\]\(([^\)]+)\)\s*\]\(([^\?\)]*)\?[^\)]*\)\s*",
            Replacement::template("\n![${1}](${2})\n[${1}](${3})\n\n"),
        )
}
