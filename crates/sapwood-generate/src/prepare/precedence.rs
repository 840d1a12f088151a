//! Precedence levels and the partial order declared by `@precedences`.

use std::cmp::Ordering;

use indexmap::IndexSet;
use sapwood_core::{Grammar, Precedence, PrecedenceEntry};

use crate::error::{GrammarCompileError, Result};

/// Resolved precedence of a production step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrecLevel {
    Int(i32),
    /// Index into [`PrecedenceOrder`] levels.
    Named(usize),
}

impl Default for PrecLevel {
    fn default() -> Self {
        PrecLevel::Int(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Level {
    Name(String),
    Rule(String),
}

/// Transitive closure of the `@precedences` lists. Earlier entries are higher.
#[derive(Debug, Default)]
pub struct PrecedenceOrder {
    levels: IndexSet<Level>,
    /// `higher[i][j]`: level `i` outranks level `j`.
    higher: Vec<Vec<bool>>,
}

impl PrecedenceOrder {
    pub fn new(grammar: &Grammar) -> Result<Self> {
        let mut levels = IndexSet::new();
        for list in &grammar.precedences {
            for entry in list {
                levels.insert(level_of(entry));
            }
        }

        let n = levels.len();
        let mut higher = vec![vec![false; n]; n];
        for list in &grammar.precedences {
            for pair in list.windows(2) {
                let a = levels.get_index_of(&level_of(&pair[0])).expect("level registered");
                let b = levels.get_index_of(&level_of(&pair[1])).expect("level registered");
                higher[a][b] = true;
            }
        }

        // Warshall's closure; the lists are short.
        for k in 0..n {
            for i in 0..n {
                if !higher[i][k] {
                    continue;
                }
                for j in 0..n {
                    if higher[k][j] {
                        higher[i][j] = true;
                    }
                }
            }
        }

        let order = Self { levels, higher };
        if let Some(cycle) = order.find_cycle() {
            return Err(GrammarCompileError::ConflictingPrecedence(cycle));
        }
        Ok(order)
    }

    fn find_cycle(&self) -> Option<String> {
        let start = (0..self.levels.len()).find(|&i| self.higher[i][i])?;
        let members: Vec<String> = (0..self.levels.len())
            .filter(|&j| self.higher[start][j] && self.higher[j][start])
            .map(|j| format!("`{}`", self.level_name(j)))
            .collect();
        Some(members.join(", "))
    }

    fn level_name(&self, index: usize) -> &str {
        match &self.levels[index] {
            Level::Name(name) | Level::Rule(name) => name,
        }
    }

    /// Resolves an explicit precedence. Names must be declared.
    pub fn resolve(&self, value: &Precedence) -> Result<PrecLevel> {
        match value {
            Precedence::Integer(n) => Ok(PrecLevel::Int(*n)),
            Precedence::Name(name) => self
                .levels
                .get_index_of(&Level::Name(name.clone()))
                .map(PrecLevel::Named)
                .ok_or_else(|| GrammarCompileError::UndeclaredPrecedence(name.clone())),
        }
    }

    /// Level of a rule listed by name in `@precedences`.
    pub fn rule_level(&self, rule: &str) -> Option<PrecLevel> {
        self.levels
            .get_index_of(&Level::Rule(rule.to_string()))
            .map(PrecLevel::Named)
    }

    /// `None` when the levels are unrelated.
    pub fn compare(&self, a: PrecLevel, b: PrecLevel) -> Option<Ordering> {
        match (a, b) {
            (PrecLevel::Int(x), PrecLevel::Int(y)) => Some(x.cmp(&y)),
            (PrecLevel::Named(i), PrecLevel::Named(j)) => {
                if i == j {
                    Some(Ordering::Equal)
                } else if self.higher[i][j] {
                    Some(Ordering::Greater)
                } else if self.higher[j][i] {
                    Some(Ordering::Less)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

fn level_of(entry: &PrecedenceEntry) -> Level {
    match entry {
        PrecedenceEntry::Name(name) => Level::Name(name.clone()),
        PrecedenceEntry::Symbol(name) => Level::Rule(name.clone()),
    }
}
