//! Grammar type definitions.

use serde::{Deserialize, Serialize};

/// A declarative grammar, as written in the grammar DSL or `grammar.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    /// Grammar name (e.g., "cbnf").
    pub name: String,
    /// Rules in definition order. The first rule is the start symbol.
    pub rules: Vec<(String, Rule)>,
    /// Tokens allowed anywhere (whitespace, comments).
    #[serde(default)]
    pub extras: Vec<Rule>,
    /// Named precedence orderings, highest first.
    #[serde(default)]
    pub precedences: Vec<Vec<PrecedenceEntry>>,
    /// Conflicts the author expects the parser to fork on.
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
    /// Tokens produced by the external scanner, in scanner order.
    #[serde(default)]
    pub externals: Vec<Rule>,
    /// Rules substituted at their use sites.
    #[serde(default)]
    pub inline: Vec<String>,
    /// Hidden rules that group alternatives.
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Identifier-like rule used for keyword extraction.
    #[serde(default)]
    pub word: Option<String>,
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            extras: Vec::new(),
            precedences: Vec::new(),
            conflicts: Vec::new(),
            externals: Vec::new(),
            inline: Vec::new(),
            supertypes: Vec::new(),
            word: None,
        }
    }

    /// Appends a rule, keeping definition order.
    pub fn rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.rules.push((name.into(), rule));
        self
    }

    pub fn start_rule(&self) -> Option<&str> {
        self.rules.first().map(|(name, _)| name.as_str())
    }
}

/// Grammar rule variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    /// Epsilon (empty match).
    Blank,
    /// Literal token.
    String(String),
    /// Regex token.
    Pattern {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    /// Reference to another rule.
    Symbol(String),
    /// Sequence of rules (must match in order).
    Seq(Vec<Rule>),
    /// Alternation.
    Choice(Vec<Rule>),
    /// Zero or more repetitions.
    Repeat(Box<Rule>),
    /// One or more repetitions.
    Repeat1(Box<Rule>),
    /// Named field.
    Field { name: String, content: Box<Rule> },
    /// Force tokenization.
    Token(Box<Rule>),
    /// Tokenization with no preceding padding allowed.
    ImmediateToken(Box<Rule>),
    /// Precedence.
    Prec {
        value: Precedence,
        content: Box<Rule>,
    },
    /// Left-associative precedence.
    PrecLeft {
        value: Precedence,
        content: Box<Rule>,
    },
    /// Right-associative precedence.
    PrecRight {
        value: Precedence,
        content: Box<Rule>,
    },
    /// Dynamic precedence, used to pick between ambiguous parses.
    PrecDynamic { value: i32, content: Box<Rule> },
}

impl Rule {
    pub fn string(value: impl Into<String>) -> Self {
        Rule::String(value.into())
    }

    pub fn pattern(value: impl Into<String>) -> Self {
        Rule::Pattern {
            value: value.into(),
            flags: None,
        }
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Rule::Symbol(name.into())
    }

    pub fn seq(members: impl IntoIterator<Item = Rule>) -> Self {
        Rule::Seq(members.into_iter().collect())
    }

    pub fn choice(members: impl IntoIterator<Item = Rule>) -> Self {
        Rule::Choice(members.into_iter().collect())
    }

    pub fn optional(content: Rule) -> Self {
        Rule::Choice(vec![content, Rule::Blank])
    }

    pub fn repeat(content: Rule) -> Self {
        Rule::Repeat(Box::new(content))
    }

    pub fn repeat1(content: Rule) -> Self {
        Rule::Repeat1(Box::new(content))
    }

    pub fn field(name: impl Into<String>, content: Rule) -> Self {
        Rule::Field {
            name: name.into(),
            content: Box::new(content),
        }
    }

    pub fn token(content: Rule) -> Self {
        Rule::Token(Box::new(content))
    }

    /// Visits every rule nested in `self`, including `self`.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Rule)) {
        f(self);
        match self {
            Rule::Blank | Rule::String(_) | Rule::Pattern { .. } | Rule::Symbol(_) => {}
            Rule::Seq(members) | Rule::Choice(members) => {
                for member in members {
                    member.walk(f);
                }
            }
            Rule::Repeat(content)
            | Rule::Repeat1(content)
            | Rule::Field { content, .. }
            | Rule::Token(content)
            | Rule::ImmediateToken(content)
            | Rule::Prec { content, .. }
            | Rule::PrecLeft { content, .. }
            | Rule::PrecRight { content, .. }
            | Rule::PrecDynamic { content, .. } => content.walk(f),
        }
    }
}

/// Precedence value (numeric or named).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precedence {
    Integer(i32),
    Name(String),
}

/// Entry in a precedence ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrecedenceEntry {
    /// Named precedence level.
    Name(String),
    /// Rule reference; productions of that rule take this level.
    Symbol(String),
}
