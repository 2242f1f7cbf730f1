//! Placeholder substitution for fragments that must bypass htmd.
//!
//! Code blocks and tables are rendered to Markdown up front, then replaced in
//! the source HTML by an opaque token wrapped in a `<p>` element. htmd sees an
//! ordinary paragraph of text and emits the token unchanged; `restore_all`
//! swaps each token back for the Markdown recorded when it was registered.
//!
//! Token shape: `urltomarkdown{kind}{ordinal}z{nonce}`. Only lowercase ASCII
//! letters and digits, so the converter has nothing to escape. The nonce is
//! drawn per request and re-drawn while the source document already contains
//! it, so page text can never be mistaken for a token.

use regex::Regex;
use uuid::Uuid;

/// Fixed prefix of every token
pub const TOKEN_PREFIX: &str = "urltomarkdown";

/// Restored snippets may contain tokens of fragments registered before them
/// (a code block inside a table). Expansion depth is bounded by the number of
/// nesting levels, this cap only guards against a corrupt record table.
const MAX_EXPANSION_DEPTH: usize = 16;

/// The kind of fragment a placeholder stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    CodeBlock,
    Table,
}

impl FragmentKind {
    const fn tag(self) -> &'static str {
        match self {
            Self::CodeBlock => "codeblock",
            Self::Table => "table",
        }
    }
}

/// One registered fragment
#[derive(Debug, Clone)]
pub struct Placeholder {
    pub token: String,
    pub kind: FragmentKind,
    pub rendered_markdown: String,
}

/// Request-scoped store of placeholder tokens and their final Markdown.
///
/// Never shared between requests: create one per conversion with
/// [`PlaceholderVault::for_document`].
#[derive(Debug)]
pub struct PlaceholderVault {
    nonce: String,
    token_re: Regex,
    records: Vec<Placeholder>,
}

impl PlaceholderVault {
    /// Create a vault whose tokens cannot collide with text in `source`.
    #[must_use]
    pub fn for_document(source: &str) -> Self {
        let mut nonce = Uuid::new_v4().simple().to_string();
        while source.contains(&nonce) {
            nonce = Uuid::new_v4().simple().to_string();
        }

        // The nonce is 32 hex digits and the kind tags are fixed words, so the
        // pattern needs no escaping and always compiles.
        let token_re = Regex::new(&format!(
            r"{TOKEN_PREFIX}(?:codeblock|table)([0-9]+)z{nonce}"
        ))
        .expect("placeholder token pattern is built from hex digits only");

        Self {
            nonce,
            token_re,
            records: Vec::new(),
        }
    }

    /// Record `rendered_markdown` and return the token that stands for it.
    pub fn register(&mut self, kind: FragmentKind, rendered_markdown: String) -> String {
        let ordinal = self.records.len();
        let token = format!("{TOKEN_PREFIX}{}{ordinal}z{}", kind.tag(), self.nonce);

        self.records.push(Placeholder {
            token: token.clone(),
            kind,
            rendered_markdown,
        });

        token
    }

    /// Block-level HTML to splice into the source in place of a fragment.
    #[must_use]
    pub fn placeholder_html(token: &str) -> String {
        format!("<p>{token}</p>")
    }

    /// Register a fragment and return the HTML that replaces it.
    pub fn shield(&mut self, kind: FragmentKind, rendered_markdown: String) -> String {
        let token = self.register(kind, rendered_markdown);
        Self::placeholder_html(&token)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[Placeholder] {
        &self.records
    }

    /// True if `text` still contains a token from this vault.
    #[must_use]
    pub fn has_residual_tokens(&self, text: &str) -> bool {
        self.token_re.is_match(text)
    }

    /// Replace every token in `text` with its recorded Markdown.
    ///
    /// Restored Markdown is itself scanned for tokens, so fragments nested in
    /// other fragments come back too. Each token is expected exactly once;
    /// duplicates are restored as well but logged, and tokens that never
    /// appear are reported at debug level.
    pub fn restore_all(&self, text: &str) -> String {
        if self.records.is_empty() {
            return text.to_string();
        }

        let mut seen = vec![0usize; self.records.len()];
        let restored = self.expand(text, &mut seen, 0);

        for (record, count) in self.records.iter().zip(&seen) {
            match count {
                0 => tracing::debug!(
                    token = %record.token,
                    kind = ?record.kind,
                    "Placeholder was dropped by the markdown converter"
                ),
                1 => {}
                n => tracing::warn!(
                    token = %record.token,
                    occurrences = n,
                    "Placeholder occurred more than once"
                ),
            }
        }

        if self.has_residual_tokens(&restored) {
            tracing::warn!("Placeholder tokens survived restoration");
        }

        restored
    }

    fn expand(&self, text: &str, seen: &mut [usize], depth: usize) -> String {
        if depth > MAX_EXPANSION_DEPTH {
            tracing::warn!(depth, "Placeholder expansion depth exceeded");
            return text.to_string();
        }

        let mut output = String::with_capacity(text.len());
        let mut last_end = 0;

        for caps in self.token_re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            output.push_str(&text[last_end..whole.start()]);
            last_end = whole.end();

            let record = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|ordinal| self.records.get(ordinal).map(|r| (ordinal, r)));

            match record {
                Some((ordinal, record)) => {
                    seen[ordinal] += 1;
                    let inner = self.expand(&record.rendered_markdown, seen, depth + 1);
                    output.push_str(&inner);
                }
                // Ordinal outside the table: leave the text alone.
                None => output.push_str(whole.as_str()),
            }
        }

        output.push_str(&text[last_end..]);
        output
    }
}
