use rowan::TextRange;

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// When two diagnostics overlap, the higher-priority one suppresses the
/// lower-priority one, which keeps cascades after an unclosed delimiter quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Swallows the closing delimiters after it on the line
    UnterminatedLiteral,

    // Cascade throughout the rest of the file
    UnclosedGroup,
    UnclosedCall,
    UnclosedConflictSet,

    // User omitted something required
    ExpectedExpression,
    ExpectedRuleName,
    ExpectedDirectiveName,
    ExpectedEquals,
    ExpectedSemicolon,
    ExpectedPrecedence,

    // User wrote something that doesn't belong
    UnknownDirective,
    UnknownCall,
    WrongArgumentCount,
    InvalidEscape,
    InvalidDirectiveValue,
    UnexpectedToken,

    // Valid syntax, questionable meaning
    EmptyString,
    DuplicateDirective,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::DuplicateDirective => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether this kind suppresses `other` when spans overlap.
    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self < other
    }

    pub fn is_structural_error(&self) -> bool {
        matches!(
            self,
            Self::UnclosedGroup | Self::UnclosedCall | Self::UnclosedConflictSet
        )
    }

    pub fn is_root_cause_error(&self) -> bool {
        matches!(
            self,
            Self::ExpectedExpression
                | Self::ExpectedRuleName
                | Self::ExpectedDirectiveName
                | Self::ExpectedEquals
                | Self::ExpectedSemicolon
                | Self::ExpectedPrecedence
        )
    }

    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::ExpectedPrecedence => Some("e.g., `prec(1, expr)` or `prec(\"mul\", expr)`"),
            Self::UnknownCall => Some(
                "available: prec, prec.left, prec.right, prec.dynamic, token, token.immediate",
            ),
            Self::ExpectedSemicolon => Some("every rule and directive ends with `;`"),
            Self::UnterminatedLiteral => Some("literals close on the line they open"),
            _ => None,
        }
    }

    /// Base message, used when no custom detail is given.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnterminatedLiteral => "unterminated literal",

            Self::UnclosedGroup => "missing closing `)`",
            Self::UnclosedCall => "missing closing `)` for call",
            Self::UnclosedConflictSet => "missing closing `]`",

            Self::ExpectedExpression => "expected an expression",
            Self::ExpectedRuleName => "expected rule name",
            Self::ExpectedDirectiveName => "expected directive name",
            Self::ExpectedEquals => "expected `=`",
            Self::ExpectedSemicolon => "expected `;`",
            Self::ExpectedPrecedence => "expected precedence value",

            Self::UnknownDirective => "unknown directive",
            Self::UnknownCall => "unknown function",
            Self::WrongArgumentCount => "wrong number of arguments",
            Self::InvalidEscape => "invalid escape sequence",
            Self::InvalidDirectiveValue => "invalid directive value",
            Self::UnexpectedToken => "unexpected token",

            Self::EmptyString => "empty string literal",
            Self::DuplicateDirective => "directive already set",
        }
    }

    /// Template for custom messages; `{}` is replaced by the caller's detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnknownDirective => "unknown directive `@{}`".to_string(),
            Self::UnknownCall => "unknown function `{}`".to_string(),
            Self::DuplicateDirective => "`@{}` is already set; the later value wins".to_string(),
            Self::UnclosedGroup | Self::UnclosedCall | Self::UnclosedConflictSet => {
                format!("{}; {{}}", self.fallback_message())
            }
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub(crate) replacement: String,
    pub(crate) description: String,
}

impl Fix {
    pub fn new(replacement: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// Underlined in rendered output.
    pub(crate) range: TextRange,
    pub(crate) message: String,
    pub(crate) fix: Option<Fix>,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            message: message.into(),
            fix: None,
            related: Vec::new(),
            hints: kind.default_hint().map(String::from).into_iter().collect(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self::new(kind, range, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity(),
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        if let Some(fix) = &self.fix {
            write!(f, " (fix: {})", fix.description)?;
        }
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}
