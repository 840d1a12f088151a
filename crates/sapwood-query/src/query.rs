use std::fmt;

use sapwood_runtime::{Language, Node};

use crate::compile::compile;
use crate::error::QueryError;
use crate::matcher::QueryMatches;
use crate::parser::parse;
use crate::pattern::Pattern;

/// A compiled set of patterns for one language.
pub struct Query {
    language: Language,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) capture_names: Vec<String>,
}

impl Query {
    /// Parses `source` and resolves its node kinds, fields and captures
    /// against `language`.
    pub fn new(language: &Language, source: &str) -> Result<Self, QueryError> {
        let parsed = parse(source)?;
        let (patterns, capture_names) = compile(language, &parsed)?;
        tracing::debug!(
            language = language.name(),
            patterns = patterns.len(),
            captures = capture_names.len(),
            "query compiled"
        );
        Ok(Self {
            language: language.clone(),
            patterns,
            capture_names,
        })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }

    pub fn capture_index_for_name(&self, name: &str) -> Option<usize> {
        self.capture_names.iter().position(|n| n == name)
    }

    /// Where pattern `index` starts in the query source.
    pub fn start_byte_for_pattern(&self, index: usize) -> Option<usize> {
        self.patterns.get(index).map(|p| p.start_byte)
    }

    /// Matches of every pattern at `root` and its descendants, in preorder.
    /// At each node patterns are tried in order and each yields at most one
    /// match. `text` is the source the tree was parsed from; predicates read
    /// captured text from it.
    pub fn matches<'q, 't>(&'q self, root: Node<'t>, text: &'q [u8]) -> QueryMatches<'q, 't> {
        QueryMatches::new(self, root, text)
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("language", &self.language.name())
            .field("patterns", &self.patterns.len())
            .field("captures", &self.capture_names)
            .finish()
    }
}
