//! A compiled grammar bundled with its external scanner.

use std::fmt;
use std::sync::Arc;

use sapwood_table::{FieldId, LoadError, Symbol, Table};

use crate::scanner::ExternalScanner;

/// Everything the parser needs to parse one language.
///
/// Cloning is cheap; the table and scanner are shared.
#[derive(Clone)]
pub struct Language {
    table: Arc<Table>,
    scanner: Option<Arc<dyn ExternalScanner>>,
}

impl Language {
    pub fn new(table: Table) -> Self {
        Self::from_shared(Arc::new(table))
    }

    pub fn from_shared(table: Arc<Table>) -> Self {
        Self {
            table,
            scanner: None,
        }
    }

    /// Load a table cached with [`Table::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        Table::from_bytes(bytes).map(Self::new)
    }

    pub fn with_scanner(mut self, scanner: impl ExternalScanner + 'static) -> Self {
        self.scanner = Some(Arc::new(scanner));
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn scanner(&self) -> Option<&dyn ExternalScanner> {
        self.scanner.as_deref()
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        self.table.symbol_name(symbol)
    }

    /// Visible symbol by name; `named` picks rules over string literals.
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<Symbol> {
        self.table.symbol_for_name(name, named)
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.table.field_id(name)
    }

    pub fn field_name(&self, id: FieldId) -> &str {
        self.table.field_name(id)
    }

    pub fn is_supertype(&self, symbol: Symbol) -> bool {
        self.table.symbol_info(symbol).is_some_and(|s| s.supertype)
    }

    pub(crate) fn same_as(&self, other: &Language) -> bool {
        Arc::ptr_eq(&self.table, &other.table)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("symbols", &self.table.symbol_count())
            .field("states", &self.table.state_count())
            .field("scanner", &self.scanner.is_some())
            .finish()
    }
}
