//! JSON deserialization for tree-sitter `grammar.json` files.
//!
//! The format uses internally-tagged enums with a `type` field. Aliases and
//! reserved-word contexts have no counterpart in Sapwood and are rejected.

use indexmap::IndexMap;
use serde::Deserialize;

use super::types::{Grammar, Precedence, PrecedenceEntry, Rule};

/// Error during grammar decoding.
#[derive(Debug)]
pub enum GrammarError {
    Json(serde_json::Error),
    Binary(postcard::Error),
    Unsupported(&'static str),
}

impl std::fmt::Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Binary(e) => write!(f, "binary decode error: {e}"),
            Self::Unsupported(what) => write!(f, "unsupported grammar feature: {what}"),
        }
    }
}

impl std::error::Error for GrammarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Binary(e) => Some(e),
            Self::Unsupported(_) => None,
        }
    }
}

impl Grammar {
    /// Parse grammar from a `grammar.json` string.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let raw: RawGrammar = serde_json::from_str(json).map_err(GrammarError::Json)?;
        raw.try_into()
    }
}

#[derive(Debug, Deserialize)]
struct RawGrammar {
    name: String,
    rules: IndexMap<String, RawRule>,
    #[serde(default)]
    extras: Vec<RawRule>,
    #[serde(default)]
    precedences: Vec<Vec<RawPrecedenceEntry>>,
    #[serde(default)]
    conflicts: Vec<Vec<String>>,
    #[serde(default)]
    externals: Vec<RawRule>,
    #[serde(default, rename = "inline")]
    inline_rules: Vec<String>,
    #[serde(default)]
    supertypes: Vec<String>,
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    reserved: IndexMap<String, Vec<RawRule>>,
    #[serde(default)]
    inherits: Option<String>,
}

impl TryFrom<RawGrammar> for Grammar {
    type Error = GrammarError;

    fn try_from(raw: RawGrammar) -> Result<Self, GrammarError> {
        if !raw.reserved.is_empty() {
            return Err(GrammarError::Unsupported("reserved word sets"));
        }
        if raw.inherits.is_some() {
            return Err(GrammarError::Unsupported("grammar inheritance"));
        }

        // IndexMap keeps definition order, so the start rule stays first.
        let rules = raw
            .rules
            .into_iter()
            .map(|(name, rule)| Ok((name, rule.try_into()?)))
            .collect::<Result<_, GrammarError>>()?;

        Ok(Self {
            name: raw.name,
            rules,
            extras: convert_all(raw.extras)?,
            precedences: raw
                .precedences
                .into_iter()
                .map(|level| level.into_iter().map(Into::into).collect())
                .collect(),
            conflicts: raw.conflicts,
            externals: convert_all(raw.externals)?,
            inline: raw.inline_rules,
            supertypes: raw.supertypes,
            word: raw.word,
        })
    }
}

fn convert_all(rules: Vec<RawRule>) -> Result<Vec<Rule>, GrammarError> {
    rules.into_iter().map(TryInto::try_into).collect()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
enum RawRule {
    BLANK,
    STRING {
        value: String,
    },
    PATTERN {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    SYMBOL {
        name: String,
    },
    SEQ {
        members: Vec<RawRule>,
    },
    CHOICE {
        members: Vec<RawRule>,
    },
    REPEAT {
        content: Box<RawRule>,
    },
    REPEAT1 {
        content: Box<RawRule>,
    },
    FIELD {
        name: String,
        content: Box<RawRule>,
    },
    #[allow(dead_code)]
    ALIAS {
        content: Box<RawRule>,
        value: String,
        named: bool,
    },
    TOKEN {
        content: Box<RawRule>,
    },
    IMMEDIATE_TOKEN {
        content: Box<RawRule>,
    },
    PREC {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_LEFT {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_RIGHT {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_DYNAMIC {
        value: i32,
        content: Box<RawRule>,
    },
    #[allow(dead_code)]
    RESERVED {
        context_name: String,
        content: Box<RawRule>,
    },
}

impl TryFrom<RawRule> for Rule {
    type Error = GrammarError;

    fn try_from(raw: RawRule) -> Result<Self, GrammarError> {
        #[allow(clippy::boxed_local)]
        fn conv(content: Box<RawRule>) -> Result<Box<Rule>, GrammarError> {
            Ok(Box::new(Rule::try_from(*content)?))
        }

        Ok(match raw {
            RawRule::BLANK => Rule::Blank,
            RawRule::STRING { value } => Rule::String(value),
            RawRule::PATTERN { value, flags } => Rule::Pattern { value, flags },
            RawRule::SYMBOL { name } => Rule::Symbol(name),
            RawRule::SEQ { members } => Rule::Seq(convert_all(members)?),
            RawRule::CHOICE { members } => Rule::Choice(convert_all(members)?),
            RawRule::REPEAT { content } => Rule::Repeat(conv(content)?),
            RawRule::REPEAT1 { content } => Rule::Repeat1(conv(content)?),
            RawRule::FIELD { name, content } => Rule::Field {
                name,
                content: conv(content)?,
            },
            RawRule::ALIAS { .. } => return Err(GrammarError::Unsupported("ALIAS")),
            RawRule::TOKEN { content } => Rule::Token(conv(content)?),
            RawRule::IMMEDIATE_TOKEN { content } => Rule::ImmediateToken(conv(content)?),
            RawRule::PREC { value, content } => Rule::Prec {
                value: value.into(),
                content: conv(content)?,
            },
            RawRule::PREC_LEFT { value, content } => Rule::PrecLeft {
                value: value.into(),
                content: conv(content)?,
            },
            RawRule::PREC_RIGHT { value, content } => Rule::PrecRight {
                value: value.into(),
                content: conv(content)?,
            },
            RawRule::PREC_DYNAMIC { value, content } => Rule::PrecDynamic {
                value,
                content: conv(content)?,
            },
            RawRule::RESERVED { .. } => return Err(GrammarError::Unsupported("RESERVED")),
        })
    }
}

/// Precedence value: integer or string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrecedence {
    Integer(i32),
    Name(String),
}

impl From<RawPrecedence> for Precedence {
    fn from(raw: RawPrecedence) -> Self {
        match raw {
            RawPrecedence::Integer(n) => Precedence::Integer(n),
            RawPrecedence::Name(s) => Precedence::Name(s),
        }
    }
}

/// Precedence ordering entry (STRING or SYMBOL).
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms)]
enum RawPrecedenceEntry {
    STRING { value: String },
    SYMBOL { name: String },
}

impl From<RawPrecedenceEntry> for PrecedenceEntry {
    fn from(raw: RawPrecedenceEntry) -> Self {
        match raw {
            RawPrecedenceEntry::STRING { value } => PrecedenceEntry::Name(value),
            RawPrecedenceEntry::SYMBOL { name } => PrecedenceEntry::Symbol(name),
        }
    }
}
