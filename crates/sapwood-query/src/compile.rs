//! Resolves parsed patterns against a language.
//!
//! Node kinds, tokens and fields must exist in the language. Capture names
//! are numbered in order of first appearance across the whole query; a
//! predicate may only refer to captures of its own pattern.

use sapwood_runtime::{FieldId, Language, Symbol};

use crate::ast::{self, Name, NodeKind, PredicateArg, PredicateCall};
use crate::error::{QueryError, QueryErrorKind};
use crate::pattern::{CaptureId, Expr, Item, KindTest, NodeTest, Pattern, Step};
use crate::predicate::{Operand, Predicate, TextRegex};

type Result<T> = std::result::Result<T, QueryError>;

/// Compiled patterns and the capture names they refer to.
pub(crate) fn compile(
    language: &Language,
    patterns: &[ast::Pattern],
) -> Result<(Vec<Pattern>, Vec<String>)> {
    let mut compiler = Compiler {
        language,
        capture_names: Vec::new(),
        defined: Vec::new(),
    };
    let patterns = patterns
        .iter()
        .map(|pattern| compiler.pattern(pattern))
        .collect::<Result<_>>()?;
    Ok((patterns, compiler.capture_names))
}

struct Compiler<'l> {
    language: &'l Language,
    capture_names: Vec<String>,
    /// Captures of the pattern being compiled.
    defined: Vec<CaptureId>,
}

impl Compiler<'_> {
    fn pattern(&mut self, pattern: &ast::Pattern) -> Result<Pattern> {
        self.defined.clear();

        if let Some(field) = &pattern.root.field {
            return Err(QueryError::new(
                QueryErrorKind::Structure,
                field.range.clone(),
                format!("field `{}` needs an enclosing node", field.text),
            ));
        }

        let root = self.step(&pattern.root)?;
        let predicates = pattern
            .predicates
            .iter()
            .map(|call| self.predicate(call))
            .collect::<Result<_>>()?;

        Ok(Pattern {
            root,
            predicates,
            start_byte: pattern.range.start,
        })
    }

    fn step(&mut self, step: &ast::Step) -> Result<Step> {
        let field = step.field.as_ref().map(|name| self.field(name)).transpose()?;
        let expr = self.expr(&step.expr)?;
        let captures = step.captures.iter().map(|name| self.capture(&name.text)).collect();
        Ok(Step {
            field,
            expr,
            quantifier: step.quantifier,
            captures,
        })
    }

    fn expr(&mut self, expr: &ast::Expr) -> Result<Expr> {
        Ok(match expr {
            ast::Expr::Node(node) => Expr::Node(self.node(node)?),
            ast::Expr::Anonymous(text) => {
                Expr::Node(NodeTest::leaf(KindTest::Symbol(self.symbol(text, false)?)))
            }
            ast::Expr::Wildcard => Expr::Node(NodeTest::leaf(KindTest::Any)),
            ast::Expr::Alt(branches) => Expr::Alt(
                branches
                    .iter()
                    .map(|branch| self.step(branch))
                    .collect::<Result<_>>()?,
            ),
            ast::Expr::Group(items) => Expr::Group(self.items(items)?),
        })
    }

    fn node(&mut self, node: &ast::NodeExpr) -> Result<NodeTest> {
        let kind = match &node.kind {
            NodeKind::Named(name) => KindTest::Symbol(self.symbol(name, true)?),
            NodeKind::AnyNamed => KindTest::AnyNamed,
            NodeKind::Error => KindTest::Error,
            NodeKind::Missing(None) => KindTest::Missing(None),
            NodeKind::Missing(Some((name, named))) => {
                KindTest::Missing(Some(self.symbol(name, *named)?))
            }
        };
        let negated = node
            .negated
            .iter()
            .map(|name| self.field(name))
            .collect::<Result<_>>()?;
        let children = self.items(&node.children)?;
        Ok(NodeTest {
            kind,
            negated,
            children,
        })
    }

    fn items(&mut self, items: &[ast::Item]) -> Result<Vec<Item>> {
        items
            .iter()
            .map(|item| match item {
                ast::Item::Anchor => Ok(Item::Anchor),
                ast::Item::Step(step) => self.step(step).map(Item::Step),
            })
            .collect()
    }

    fn symbol(&self, name: &Name, named: bool) -> Result<Symbol> {
        self.language
            .symbol_for_name(&name.text, named)
            .ok_or_else(|| {
                let message = if named {
                    format!("unknown node kind `{}`", name.text)
                } else {
                    format!("unknown token {:?}", name.text)
                };
                QueryError::new(QueryErrorKind::NodeKind, name.range.clone(), message)
            })
    }

    fn field(&self, name: &Name) -> Result<FieldId> {
        self.language.field_id(&name.text).ok_or_else(|| {
            QueryError::new(
                QueryErrorKind::Field,
                name.range.clone(),
                format!("unknown field `{}`", name.text),
            )
        })
    }

    fn capture(&mut self, name: &str) -> CaptureId {
        let id = match self.capture_names.iter().position(|n| n == name) {
            Some(id) => id,
            None => {
                self.capture_names.push(name.to_string());
                self.capture_names.len() - 1
            }
        };
        if !self.defined.contains(&id) {
            self.defined.push(id);
        }
        id
    }

    fn resolve(&self, name: &Name) -> Result<CaptureId> {
        self.defined
            .iter()
            .copied()
            .find(|&id| self.capture_names[id] == name.text)
            .ok_or_else(|| {
                QueryError::new(
                    QueryErrorKind::Capture,
                    name.range.clone(),
                    format!("unknown capture `@{}`", name.text),
                )
            })
    }

    fn capture_arg(&self, arg: &PredicateArg) -> Result<CaptureId> {
        match arg {
            PredicateArg::Capture(name) => self.resolve(name),
            PredicateArg::Str(text) => Err(QueryError::new(
                QueryErrorKind::Predicate,
                text.range.clone(),
                "expected a capture",
            )),
        }
    }

    fn predicate(&self, call: &PredicateCall) -> Result<Predicate> {
        let name = call.name.text.as_str();
        let usage = |expected: &str| {
            QueryError::new(
                QueryErrorKind::Predicate,
                call.range.clone(),
                format!("`#{name}` takes {expected}"),
            )
        };

        match name {
            "eq?" | "not-eq?" => {
                let [first, second] = call.args.as_slice() else {
                    return Err(usage("a capture and a capture or string"));
                };
                let capture = self.capture_arg(first)?;
                let operand = match second {
                    PredicateArg::Capture(other) => Operand::Capture(self.resolve(other)?),
                    PredicateArg::Str(text) => Operand::Literal(text.text.clone()),
                };
                Ok(Predicate::Eq {
                    capture,
                    operand,
                    negated: name == "not-eq?",
                })
            }
            "match?" | "not-match?" => {
                let [first, PredicateArg::Str(pattern)] = call.args.as_slice() else {
                    return Err(usage("a capture and a regex string"));
                };
                let capture = self.capture_arg(first)?;
                let regex = TextRegex::new(&pattern.text).map_err(|message| {
                    QueryError::new(
                        QueryErrorKind::Predicate,
                        pattern.range.clone(),
                        format!("invalid regex: {message}"),
                    )
                })?;
                Ok(Predicate::Match {
                    capture,
                    regex,
                    negated: name == "not-match?",
                })
            }
            "any-of?" => {
                let [first, rest @ ..] = call.args.as_slice() else {
                    return Err(usage("a capture and one or more strings"));
                };
                let capture = self.capture_arg(first)?;
                let mut values = Vec::with_capacity(rest.len());
                for arg in rest {
                    match arg {
                        PredicateArg::Str(text) => values.push(text.text.clone()),
                        PredicateArg::Capture(_) => {
                            return Err(usage("a capture and one or more strings"));
                        }
                    }
                }
                if values.is_empty() {
                    return Err(usage("a capture and one or more strings"));
                }
                Ok(Predicate::AnyOf { capture, values })
            }
            _ => Err(QueryError::new(
                QueryErrorKind::Predicate,
                call.name.range.clone(),
                format!("unknown predicate `#{name}`"),
            )),
        }
    }
}
