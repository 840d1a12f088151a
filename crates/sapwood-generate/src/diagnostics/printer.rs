//! Renders grammar diagnostics against the grammar text.
//!
//! Each diagnostic becomes one report: the message as title, the offending
//! span underlined, related spans labeled, hints as `help` lines and a fix as
//! a suggested patch. Without source text the one-line `Display` form is
//! used, prefixed by the grammar path when one is known.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Patch, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};

pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    /// Grammar file name shown in locations.
    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.format(&mut out);
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        for (i, diag) in self.in_source_order().into_iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            match self.source {
                Some(source) => self.format_report(w, diag, source)?,
                None => self.format_line(w, diag)?,
            }
        }
        Ok(())
    }

    fn in_source_order(&self) -> Vec<&'d DiagnosticMessage> {
        let mut ordered: Vec<_> = self.diagnostics.iter().collect();
        ordered.sort_by_key(|d| (d.range.start(), d.kind));
        ordered
    }

    fn format_report(
        &self,
        w: &mut impl Write,
        diag: &DiagnosticMessage,
        source: &str,
    ) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let range = clamp(diag.range, source.len());
        let mut snippet = Snippet::source(source)
            .path(self.path)
            .annotation(AnnotationKind::Primary.span(range.clone()));
        for related in &diag.related {
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(clamp(related.range, source.len()))
                    .label(&related.message),
            );
        }

        let title = level(diag.severity()).primary_title(&diag.message);
        let mut report: Vec<Group> = vec![
            title
                .element(snippet)
                .elements(diag.hints.iter().map(|hint| Level::HELP.message(hint))),
        ];

        if let Some(fix) = &diag.fix {
            let patch = Snippet::source(source)
                .path(self.path)
                .patch(Patch::new(range, &fix.replacement));
            report.push(Level::HELP.secondary_title(&fix.description).element(patch));
        }

        write!(w, "{}", renderer.render(&report))
    }

    fn format_line(&self, w: &mut impl Write, diag: &DiagnosticMessage) -> std::fmt::Result {
        if let Some(path) = self.path {
            write!(w, "{path}: ")?;
        }
        write!(w, "{diag}")
    }
}

fn level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

/// Empty ranges (a missing `;` at end of input) still underline one column.
fn clamp(range: TextRange, limit: usize) -> Range<usize> {
    let start = usize::from(range.start()).min(limit);
    let end = usize::from(range.end()).min(limit);
    if start == end {
        return start..(start + 1).min(limit);
    }
    start..end
}
