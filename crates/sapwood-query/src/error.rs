//! Query errors and their rendering.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

/// What went wrong, broadly. The message carries the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    /// Malformed query text.
    Syntax,
    /// A node kind or token the language doesn't have.
    NodeKind,
    /// A field the language doesn't have.
    Field,
    /// A predicate refers to a capture its pattern doesn't define.
    Capture,
    /// Unknown predicate, wrong arguments or an invalid regex.
    Predicate,
    /// Well-formed but meaningless, e.g. a field outside any node.
    Structure,
}

impl std::fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            QueryErrorKind::Syntax => "syntax error",
            QueryErrorKind::NodeKind => "unknown node kind",
            QueryErrorKind::Field => "unknown field",
            QueryErrorKind::Capture => "unknown capture",
            QueryErrorKind::Predicate => "invalid predicate",
            QueryErrorKind::Structure => "invalid pattern structure",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {}..{}: {message}", range.start, range.end)]
pub struct QueryError {
    kind: QueryErrorKind,
    range: Range<usize>,
    message: String,
}

impl QueryError {
    pub(crate) fn new(
        kind: QueryErrorKind,
        range: Range<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            range,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> QueryErrorKind {
        self.kind
    }

    /// Byte range in the query source.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Renders the error against the query source it came from.
    pub fn render(&self, source: &str) -> String {
        self.render_with(source, Renderer::plain())
    }

    /// Like [`render`](Self::render), with ANSI colors.
    pub fn render_colored(&self, source: &str) -> String {
        self.render_with(source, Renderer::styled())
    }

    fn render_with(&self, source: &str, renderer: Renderer) -> String {
        let span = clamp(self.range.clone(), source.len());
        let kind = self.kind.to_string();
        let snippet = Snippet::source(source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(span).label(&kind));
        let report = [Level::ERROR.primary_title(&self.message).element(snippet)];

        let mut out = String::new();
        write!(out, "{}", renderer.render(&report)).expect("String write never fails");
        out
    }
}

/// Zero-width ranges are widened to one byte so the caret shows.
fn clamp(range: Range<usize>, limit: usize) -> Range<usize> {
    let start = range.start.min(limit);
    let end = range.end.min(limit);
    if start == end {
        return start..(start + 1).min(limit);
    }
    start..end
}
