//! Flattening syntactic rules into productions.
//!
//! Choices expand into alternatives, repetitions become hidden left-recursive
//! helper variables, inline rules are substituted at their use sites, and
//! fields and precedences are pushed down onto individual steps.

use super::precedence::{Assoc, PrecLevel, PrecedenceOrder};
use super::{Expr, ExternalTerminal, ExtractedGrammar, LexicalTerminal, Sym};

/// One position in a production. `Sym::Rule` indexes `FlatGrammar::variables`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub symbol: Sym,
    pub field: Option<String>,
    pub precedence: PrecLevel,
    pub assoc: Option<Assoc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FlatProduction {
    pub steps: Vec<Step>,
    pub dynamic_precedence: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub visible: bool,
    pub supertype: bool,
    /// Repetition helper.
    pub aux: bool,
    /// Rule this variable was written as (itself, or the owner of a helper).
    pub origin: String,
    pub productions: Vec<FlatProduction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatGrammar {
    pub name: String,
    pub lexical: Vec<LexicalTerminal>,
    pub externals: Vec<ExternalTerminal>,
    /// The start variable is first.
    pub variables: Vec<Variable>,
    pub extras: Vec<Sym>,
    pub word: Option<usize>,
    pub conflicts: Vec<Vec<String>>,
}

impl FlatGrammar {
    pub fn production_count(&self) -> usize {
        self.variables.iter().map(|v| v.productions.len()).sum()
    }
}

#[derive(Debug, Clone)]
struct Context {
    field: Option<String>,
    precedence: PrecLevel,
    assoc: Option<Assoc>,
}

struct Flattener<'a> {
    grammar: &'a ExtractedGrammar,
    /// Syntactic rule index to variable index; `None` for inline rules.
    variable_of: Vec<Option<usize>>,
    variables: Vec<Variable>,
    /// Helper counter per origin rule.
    repeat_counts: Vec<usize>,
}

pub fn flatten(grammar: ExtractedGrammar, order: &PrecedenceOrder) -> FlatGrammar {
    let mut variable_of = Vec::with_capacity(grammar.rules.len());
    let mut variables = Vec::new();
    for (index, rule) in grammar.rules.iter().enumerate() {
        // The start rule is never substituted away.
        if rule.inline && index > 0 {
            variable_of.push(None);
            continue;
        }
        variable_of.push(Some(variables.len()));
        variables.push(Variable {
            name: rule.name.clone(),
            visible: rule.visible,
            supertype: rule.supertype,
            aux: false,
            origin: rule.name.clone(),
            productions: Vec::new(),
        });
    }

    let rule_count = variables.len();
    let mut flattener = Flattener {
        grammar: &grammar,
        variable_of,
        variables,
        repeat_counts: vec![0; rule_count],
    };

    for (index, rule) in grammar.rules.iter().enumerate() {
        let Some(variable) = flattener.variable_of[index] else {
            continue;
        };
        let context = Context {
            field: None,
            precedence: order.rule_level(&rule.name).unwrap_or_default(),
            assoc: None,
        };
        let alternatives = flattener.expand(&rule.body, &context, variable);
        flattener.variables[variable].productions = dedup(alternatives);
    }

    let variables = flattener.variables;
    tracing::debug!(
        variables = variables.len(),
        productions = variables.iter().map(|v| v.productions.len()).sum::<usize>(),
        "rules flattened"
    );

    FlatGrammar {
        name: grammar.name,
        lexical: grammar.lexical,
        externals: grammar.externals,
        variables,
        extras: grammar.extras,
        word: grammar.word,
        conflicts: grammar.conflicts,
    }
}

fn dedup(alternatives: Vec<FlatProduction>) -> Vec<FlatProduction> {
    let mut out: Vec<FlatProduction> = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        if !out.contains(&alternative) {
            out.push(alternative);
        }
    }
    out
}

/// Keeps the dynamic precedence with the larger magnitude.
fn combine_dynamic(a: i32, b: i32) -> i32 {
    if b.unsigned_abs() > a.unsigned_abs() { b } else { a }
}

impl Flattener<'_> {
    /// `origin` is the variable whose productions are being built; it names
    /// any repetition helpers.
    fn expand(&mut self, expr: &Expr, context: &Context, origin: usize) -> Vec<FlatProduction> {
        match expr {
            Expr::Blank => vec![FlatProduction::default()],
            Expr::Sym(Sym::Rule(rule)) => match self.variable_of[*rule] {
                Some(variable) => vec![self.single(Sym::Rule(variable), context)],
                None => {
                    let grammar = self.grammar;
                    self.expand(&grammar.rules[*rule].body, context, origin)
                }
            },
            Expr::Sym(terminal) => vec![self.single(*terminal, context)],
            Expr::Seq(members) => {
                let mut acc = vec![FlatProduction::default()];
                for member in members {
                    let tails = self.expand(member, context, origin);
                    let mut next = Vec::with_capacity(acc.len() * tails.len());
                    for head in &acc {
                        for tail in &tails {
                            let mut steps = head.steps.clone();
                            steps.extend(tail.steps.iter().cloned());
                            next.push(FlatProduction {
                                steps,
                                dynamic_precedence: combine_dynamic(
                                    head.dynamic_precedence,
                                    tail.dynamic_precedence,
                                ),
                            });
                        }
                    }
                    acc = next;
                }
                acc
            }
            Expr::Choice(members) => members
                .iter()
                .flat_map(|member| self.expand(member, context, origin))
                .collect(),
            Expr::Repeat(content) => {
                let helper = self.repeat_helper(content, context, origin);
                vec![self.single(Sym::Rule(helper), context), FlatProduction::default()]
            }
            Expr::Repeat1(content) => {
                let helper = self.repeat_helper(content, context, origin);
                vec![self.single(Sym::Rule(helper), context)]
            }
            Expr::Field(name, content) => {
                let inner = Context {
                    field: Some(name.clone()),
                    ..context.clone()
                };
                self.expand(content, &inner, origin)
            }
            Expr::Prec(level, assoc, content) => {
                let inner = Context {
                    precedence: *level,
                    assoc: *assoc,
                    ..context.clone()
                };
                self.expand(content, &inner, origin)
            }
            Expr::Dynamic(value, content) => {
                let mut alternatives = self.expand(content, context, origin);
                for alternative in &mut alternatives {
                    alternative.dynamic_precedence =
                        combine_dynamic(alternative.dynamic_precedence, *value);
                }
                alternatives
            }
        }
    }

    fn single(&self, symbol: Sym, context: &Context) -> FlatProduction {
        let field = match symbol {
            // Fields on a helper are carried by its children instead.
            Sym::Rule(variable) if self.variables[variable].aux => None,
            _ => context.field.clone(),
        };
        FlatProduction {
            steps: vec![Step {
                symbol,
                field,
                precedence: context.precedence,
                assoc: context.assoc,
            }],
            dynamic_precedence: 0,
        }
    }

    /// `helper -> helper content | content`
    fn repeat_helper(&mut self, content: &Expr, context: &Context, origin: usize) -> usize {
        let owner = self.variables[origin].origin.clone();
        let owner_index = self
            .variables
            .iter()
            .position(|v| !v.aux && v.name == owner)
            .unwrap_or(origin);
        self.repeat_counts[owner_index] += 1;

        let helper = self.variables.len();
        self.variables.push(Variable {
            name: format!("{owner}_repeat{}", self.repeat_counts[owner_index]),
            visible: false,
            supertype: false,
            aux: true,
            origin: owner,
            productions: Vec::new(),
        });

        let items = self.expand(content, context, origin);
        let recursive = Step {
            symbol: Sym::Rule(helper),
            field: None,
            precedence: context.precedence,
            assoc: context.assoc,
        };

        let mut productions = Vec::with_capacity(items.len() * 2);
        for item in &items {
            let mut steps = Vec::with_capacity(item.steps.len() + 1);
            steps.push(recursive.clone());
            steps.extend(item.steps.iter().cloned());
            productions.push(FlatProduction {
                steps,
                dynamic_precedence: item.dynamic_precedence,
            });
        }
        productions.extend(items);
        self.variables[helper].productions = dedup(productions);
        helper
    }
}
