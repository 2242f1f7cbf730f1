//! Stack Overflow: drop the sidebar link block.

use super::{FilterError, FilterSet};

pub(super) fn filter_set() -> Result<FilterSet, FilterError> {
    FilterSet::new("stackoverflow", r"(?:.*\.)?stackoverflow\.com")?
        .with_removal(r"(?s)\* +Links.*Three +\|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_sidebar_block() {
        let set = filter_set().expect("stackoverflow set compiles");
        let md = "Answer body\n* Links\n* [Blog](/blog)\n* Company\nOne | Two | Three |\nfooter";

        assert!(set.matches_host("stackoverflow.com"));
        assert_eq!(set.apply(md), "Answer body\n\nfooter");
        assert_eq!(set.apply("Answer body"), "Answer body");
    }
}
