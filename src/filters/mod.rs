//! Site-aware Markdown repair filters.
//!
//! A [`FilterSet`] binds a hostname predicate to ordered removal and
//! substitution rules. The [`FilterRegistry`] applies every matching set in
//! registration order, starting with the universal set that matches every
//! host. Rules are plain data: each pattern is compiled once, under explicit
//! size limits, when the set is built.
//!
//! The registry is populated at startup and shared read-only afterwards:
//!
//! ```rust
//! # use url_to_markdown::filters::{FilterRegistry, FilterSet, Replacement};
//! # use std::sync::Arc;
//! let mut registry = FilterRegistry::with_builtin_sets()?;
//! registry.register(
//!     FilterSet::new("docs", r"(?:.*\.)?docs\.example\.com")?
//!         .with_removal(r"Was this page helpful\?")?
//!         .with_substitution(r"\(/v1/", Replacement::literal("(/v2/"))?,
//! );
//! let registry = Arc::new(registry);
//!
//! let md = registry.apply("docs.example.com", "[a](/v1/x) Was this page helpful?");
//! assert_eq!(md, "[a](/v2/x) ");
//! # Ok::<(), url_to_markdown::filters::FilterError>(())
//! ```

mod global;
mod medium;
mod stackoverflow;
mod wikipedia;

use regex::{Captures, NoExpand, Regex, RegexBuilder};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Compiled program size limit for a single rule pattern
const PATTERN_SIZE_LIMIT: usize = 2 * 1024 * 1024;

/// Lazy DFA cache limit for a single rule pattern
const PATTERN_DFA_SIZE_LIMIT: usize = 4 * 1024 * 1024;

/// Errors raised while building filter sets
#[derive(Debug, Error)]
pub enum FilterError {
    /// Pattern failed to compile or exceeded the size limits
    #[error("Invalid filter pattern `{pattern}` in set '{set}': {source}")]
    InvalidPattern {
        set: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Compile a rule or domain pattern with the filter size limits.
fn compile_pattern(set: &str, pattern: &str) -> Result<Regex, FilterError> {
    RegexBuilder::new(pattern)
        .size_limit(PATTERN_SIZE_LIMIT)
        .dfa_size_limit(PATTERN_DFA_SIZE_LIMIT)
        .build()
        .map_err(|source| FilterError::InvalidPattern {
            set: set.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

/// Function computing a replacement from the captures of one match
pub type ComputedReplacement = Arc<dyn Fn(&Captures) -> String + Send + Sync>;

/// What a substitution rule puts in place of each match
#[derive(Clone)]
pub enum Replacement {
    /// Template with `$1` / `${name}` capture references
    Template(String),
    /// Inserted verbatim, `$` included
    Literal(String),
    /// Built from the captures
    Computed(ComputedReplacement),
}

impl Replacement {
    #[must_use]
    pub fn template(template: impl Into<String>) -> Self {
        Self::Template(template.into())
    }

    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Captures) -> String + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    fn apply<'t>(&self, pattern: &Regex, text: &'t str) -> Cow<'t, str> {
        match self {
            Self::Template(template) => pattern.replace_all(text, template.as_str()),
            Self::Literal(literal) => pattern.replace_all(text, NoExpand(literal)),
            Self::Computed(f) => pattern.replace_all(text, |caps: &Captures| f(caps)),
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Self::Literal(l) => f.debug_tuple("Literal").field(l).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Pattern plus replacement
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: Replacement,
}

/// Domain predicate with its ordered removal and substitution rules
#[derive(Debug, Clone)]
pub struct FilterSet {
    name: String,
    domain: Regex,
    removals: Vec<Regex>,
    substitutions: Vec<Substitution>,
}

impl FilterSet {
    /// Start a set whose rules apply to hostnames matching `domain_pattern`.
    ///
    /// The predicate is an unanchored search: `medium\.com` also matches
    /// `blog.medium.com`.
    ///
    /// # Errors
    ///
    /// [`FilterError::InvalidPattern`] if the predicate does not compile.
    pub fn new(name: impl Into<String>, domain_pattern: &str) -> Result<Self, FilterError> {
        let name = name.into();
        let domain = compile_pattern(&name, domain_pattern)?;
        Ok(Self {
            name,
            domain,
            removals: Vec::new(),
            substitutions: Vec::new(),
        })
    }

    /// Append a removal rule: every match is deleted.
    ///
    /// # Errors
    ///
    /// [`FilterError::InvalidPattern`] if the pattern does not compile.
    pub fn with_removal(mut self, pattern: &str) -> Result<Self, FilterError> {
        self.removals.push(compile_pattern(&self.name, pattern)?);
        Ok(self)
    }

    /// Append a substitution rule.
    ///
    /// # Errors
    ///
    /// [`FilterError::InvalidPattern`] if the pattern does not compile.
    pub fn with_substitution(
        mut self,
        pattern: &str,
        replacement: Replacement,
    ) -> Result<Self, FilterError> {
        let pattern = compile_pattern(&self.name, pattern)?;
        self.substitutions.push(Substitution {
            pattern,
            replacement,
        });
        Ok(self)
    }

    /// Append a substitution rule matching `find` literally.
    ///
    /// # Errors
    ///
    /// [`FilterError::InvalidPattern`] if the escaped pattern exceeds the
    /// size limits.
    pub fn with_literal_substitution(self, find: &str, replace: &str) -> Result<Self, FilterError> {
        self.with_substitution(&regex::escape(find), Replacement::literal(replace))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn matches_host(&self, hostname: &str) -> bool {
        self.domain.is_match(hostname)
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.removals.len() + self.substitutions.len()
    }

    /// Apply all removals, then all substitutions, each in order.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let mut text = text.to_string();

        for pattern in &self.removals {
            if let Cow::Owned(changed) = pattern.replace_all(&text, "") {
                text = changed;
            }
        }

        for sub in &self.substitutions {
            if let Cow::Owned(changed) = sub.replacement.apply(&sub.pattern, &text) {
                text = changed;
            }
        }

        text
    }
}

/// Ordered filter sets, universal set first.
///
/// Mutation needs `&mut self`, so once the registry is behind an `Arc` it is
/// read-only and safe to share across requests.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    sets: Vec<FilterSet>,
}

impl FilterRegistry {
    /// A registry holding only the universal set.
    ///
    /// # Errors
    ///
    /// Propagates a compile failure of the universal set.
    pub fn new() -> Result<Self, FilterError> {
        Ok(Self {
            sets: vec![global::filter_set()?],
        })
    }

    /// The universal set followed by the Wikipedia, Medium and Stack Overflow
    /// sets.
    ///
    /// # Errors
    ///
    /// Propagates a compile failure of any built-in set.
    pub fn with_builtin_sets() -> Result<Self, FilterError> {
        let mut registry = Self::new()?;
        registry.register(wikipedia::filter_set()?);
        registry.register(medium::filter_set()?);
        registry.register(stackoverflow::filter_set()?);
        Ok(registry)
    }

    /// Append a set; it runs after every set registered before it.
    pub fn register(&mut self, set: FilterSet) {
        tracing::debug!(
            set = set.name(),
            rules = set.rule_count(),
            position = self.sets.len(),
            "Registered filter set"
        );
        self.sets.push(set);
    }

    #[must_use]
    pub fn sets(&self) -> &[FilterSet] {
        &self.sets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Run every set whose predicate matches `hostname` over `text`.
    ///
    /// An empty hostname still matches the universal set.
    #[must_use]
    pub fn apply(&self, hostname: &str, text: &str) -> String {
        let mut text = text.to_string();
        for set in self.sets.iter().filter(|s| s.matches_host(hostname)) {
            tracing::trace!(set = set.name(), hostname, "Applying filter set");
            text = set.apply(&text);
        }
        text
    }
}
