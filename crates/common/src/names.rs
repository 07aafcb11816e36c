//! Catalog-qualified identifiers for tables and columns.
//!
//! Resolution never mutates a name in place: helpers such as
//! [`TableName::with_catalog`] and [`ColumnName::with_table`] return a
//! qualified copy, and the normalizer records the copies it produced.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog-qualified or bare table identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    catalog: Option<String>,
    name: String,
}

impl TableName {
    /// Create a fully qualified table name.
    pub fn new(catalog: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            catalog: Some(catalog.into()),
            name: name.into(),
        }
    }

    /// Create a bare table name with no catalog attached.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            name: name.into(),
        }
    }

    /// Catalog part, if the name is qualified.
    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    /// Bare table part.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A name is qualified once its catalog is known.
    pub fn is_qualified(&self) -> bool {
        self.catalog.is_some()
    }

    /// Return a copy qualified with `catalog`. An existing catalog is kept.
    pub fn with_catalog(&self, catalog: impl Into<String>) -> Self {
        Self {
            catalog: Some(self.catalog.clone().unwrap_or_else(|| catalog.into())),
            name: self.name.clone(),
        }
    }

    /// Case-insensitive match on the bare table part.
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }

    /// `catalog.table` once qualified, bare name otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.catalog {
            Some(catalog) => format!("{catalog}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Table-qualified or bare column identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnName {
    table: Option<TableName>,
    name: String,
}

impl ColumnName {
    /// Create a column name attached to a table.
    pub fn new(table: TableName, name: impl Into<String>) -> Self {
        Self {
            table: Some(table),
            name: name.into(),
        }
    }

    /// Create a bare column name with no table hint.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    /// Owning table, if any was attached.
    pub fn table(&self) -> Option<&TableName> {
        self.table.as_ref()
    }

    /// Bare column part.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A column is qualified once its table, catalog included, is known.
    pub fn is_qualified(&self) -> bool {
        self.table.as_ref().is_some_and(TableName::is_qualified)
    }

    /// Return a copy attached to `table`, replacing any previous hint.
    pub fn with_table(&self, table: TableName) -> Self {
        Self {
            table: Some(table),
            name: self.name.clone(),
        }
    }

    /// `catalog.table.column` once qualified, shorter forms otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table.qualified_name(), self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Either kind of resolvable identifier, used in error payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualifiedName {
    /// A table identifier.
    Table(TableName),
    /// A column identifier.
    Column(ColumnName),
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualifiedName::Table(table) => write!(f, "table {table}"),
            QualifiedName::Column(column) => write!(f, "column {column}"),
        }
    }
}

impl From<TableName> for QualifiedName {
    fn from(table: TableName) -> Self {
        QualifiedName::Table(table)
    }
}

impl From<ColumnName> for QualifiedName {
    fn from(column: ColumnName) -> Self {
        QualifiedName::Column(column)
    }
}
