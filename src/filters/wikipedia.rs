//! Wikipedia article cleanup: citation back-links, section edit links, audio
//! widgets, thumbnail URLs and heading underlines.

use regex::Captures;

use super::{FilterError, FilterSet, Replacement};

/// Setext underlines at least this long are re-derived from the heading text.
const MIN_UNDERLINE_LEN: usize = 32;

pub(super) fn filter_set() -> Result<FilterSet, FilterError> {
    FilterSet::new("wikipedia", r".*\.wikipedia\.org")?
        .with_removal(r"\*\*\[\^\]\(#cite_ref[^\)]+\)\*\*")?
        .with_removal(r#"(?i)(?:\\\[)?\[edit\]\([^\s]+\s+"[^"]+"\)(?:\\\])?"#)?
        .with_removal(r"(?i)\^\s\[Jump up to[^\)]*\)")?
        .with_removal(r"\[[^\]]*\]\(#cite_ref[^\)]+\)")?
        .with_removal(r"\[!\[Edit this at Wikidata\].*")?
        .with_removal(
            r"\[!\[Listen to this article\]\([^\)]*\)\]\([^\)]*\.(mp3|ogg|oga|flac)[^\)]*\)",
        )?
        .with_removal(r"\[This audio file\]\([^\)]*\).*")?
        .with_removal(r"!\[Spoken Wikipedia icon\]\([^\)]*\)")?
        .with_removal(r"\[.*\]\(.*Play audio.*\).*")?
        // Thumbnail URL -> original upload
        .with_substitution(
            r"(?i)\(https://upload.wikimedia.org/wikipedia/([^/]+)/thumb/([^\)]+\..{3,4})/[^\)]+\)",
            Replacement::template("(https://upload.wikimedia.org/wikipedia/${1}/${2})"),
        )?
        .with_substitution(
            &format!(r"\n(.+)\n-{{{MIN_UNDERLINE_LEN},}}\n"),
            Replacement::computed(underline_heading),
        )?
        // Removed back-links can leave neighbouring links glued together
        .with_substitution(r"\)\[", Replacement::literal(")\n["))
}

fn underline_heading(caps: &Captures) -> String {
    let title = &caps[1];
    format!("\n{title}\n{}\n", "-".repeat(title.chars().count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(text: &str) -> String {
        filter_set().expect("wikipedia set compiles").apply(text)
    }

    #[test]
    fn test_matches_language_subdomains_only() {
        let set = filter_set().expect("wikipedia set compiles");
        assert!(set.matches_host("en.wikipedia.org"));
        assert!(set.matches_host("de.m.wikipedia.org"));
        assert!(!set.matches_host("wikipedia.org"));
        assert!(!set.matches_host("example.com"));
    }

    #[test]
    fn test_removes_edit_section_links() {
        let md = r#"History\[[edit](/w/index.php?title=Rust&action=edit&section=1 "Edit section: History")\]"#;
        assert_eq!(apply(md), "History");
    }

    #[test]
    fn test_removes_citation_links() {
        let md = "Rust is fast.[\\[1\\]](#cite_note-1) More.\n\
                  **[^](#cite_ref-1)** Source\n\
                  ^ [Jump up to: a b](#cite_ref-2) Other";
        let result = apply(md);

        assert!(result.contains("[\\[1\\]](#cite_note-1)"), "got: {result}");
        assert!(!result.contains("#cite_ref"), "got: {result}");
        assert!(!result.contains("Jump up to"), "got: {result}");
        assert!(result.contains("Source"));
    }

    #[test]
    fn test_removes_audio_widgets() {
        let md = "Intro\n\
                  [![Listen to this article](/img/speaker.png)](//upload.wikimedia.org/a/Rust.ogg)\n\
                  ![Spoken Wikipedia icon](/img/icon.svg)\n\
                  [This audio file](/wiki/File:Rust.ogg) was created from a revision\n\
                  [![Edit this at Wikidata](/img/edit.svg)](https://www.wikidata.org/wiki/Q575650)\n\
                  Outro";
        assert_eq!(apply(md), "Intro\n\n\n\n\nOutro");
    }

    #[test]
    fn test_rewrites_thumbnail_urls() {
        let md = "![Logo](https://upload.wikimedia.org/wikipedia/commons/thumb/d/d5/Rust_logo.svg/120px-Rust_logo.svg.png)";
        assert_eq!(
            apply(md),
            "![Logo](https://upload.wikimedia.org/wikipedia/commons/d/d5/Rust_logo.svg)"
        );
    }

    #[test]
    fn test_rederives_long_underlines() {
        let md = format!("intro\nHistory\n{}\nbody", "-".repeat(40));
        assert_eq!(apply(&md), "intro\nHistory\n-------\nbody");
    }

    #[test]
    fn test_short_underlines_are_kept() {
        let md = format!("intro\nHistory\n{}\nbody", "-".repeat(10));
        assert_eq!(apply(&md), md);
    }

    #[test]
    fn test_splits_links_joined_by_removed_backlink() {
        assert_eq!(apply("[a](x)**[^](#cite_ref-1)**[b](y)"), "[a](x)\n[b](y)");
    }

    #[test]
    fn test_is_idempotent() {
        let md = format!(
            "Lead\nA long section title that needs an underline\n{}\n\
             Fact.[\\[1\\]](#cite_note-1) \\[[edit](/w/x \"Edit section: A\")\\]\n\
             ![T](https://upload.wikimedia.org/wikipedia/en/thumb/a/ab/F.jpg/220px-F.jpg)\n",
            "-".repeat(60)
        );
        let once = apply(&md);
        assert_eq!(apply(&once), once);
    }
}
