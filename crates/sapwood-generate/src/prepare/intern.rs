//! Rule name interning.

use indexmap::IndexMap;
use sapwood_core::{Grammar, Rule};

use crate::error::{GrammarCompileError, Result};

/// Rule names mapped to their definition order. Index 0 is the start rule.
#[derive(Debug)]
pub struct RuleTable<'g> {
    rules: IndexMap<&'g str, &'g Rule>,
    /// Names introduced by `@externals` symbols that have no rule.
    externals: IndexMap<&'g str, usize>,
}

impl<'g> RuleTable<'g> {
    pub fn new(grammar: &'g Grammar) -> Result<Self> {
        if grammar.rules.is_empty() {
            return Err(GrammarCompileError::NoRules);
        }

        let mut rules = IndexMap::with_capacity(grammar.rules.len());
        for (name, rule) in &grammar.rules {
            if rules.insert(name.as_str(), rule).is_some() {
                return Err(GrammarCompileError::DuplicateRule(name.clone()));
            }
        }

        let mut externals = IndexMap::new();
        for (index, external) in grammar.externals.iter().enumerate() {
            if let Rule::Symbol(name) = external {
                if rules.contains_key(name.as_str()) {
                    return Err(GrammarCompileError::Unsupported(format!(
                        "external `{name}` shadows a rule of the same name"
                    )));
                }
                externals.insert(name.as_str(), index);
            }
        }

        Ok(Self { rules, externals })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.rules.get_index_of(name)
    }

    pub fn name(&self, index: usize) -> &'g str {
        self.rules.get_index(index).map_or("", |(name, _)| name)
    }

    pub fn body(&self, index: usize) -> &'g Rule {
        self.rules[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &'g str, &'g Rule)> + '_ {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, (name, rule))| (i, *name, *rule))
    }

    /// External position for a name declared only in `@externals`.
    pub fn external_index(&self, name: &str) -> Option<usize> {
        self.externals.get(name).copied()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.rules.contains_key(name) || self.externals.contains_key(name)
    }
}
