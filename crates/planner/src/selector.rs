//! Term model for SELECT/WHERE/JOIN expressions: selectors and relations.

use serde::{Deserialize, Serialize};
use std::fmt;

use fedq_common::{ColumnName, Operator, TableName, TermKind};

/// A term appearing in a projection, predicate, or join condition.
///
/// The set is closed: every consumer matches exhaustively, so a new term
/// kind forces an update everywhere it must be handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Selector {
    /// Column reference.
    Column(ColumnName),
    /// Function call over nested selectors.
    Function {
        /// Function name as written.
        name: String,
        /// Argument selectors, normalized recursively.
        args: Vec<Selector>,
    },
    /// `*` wildcard; never survives normalization.
    Asterisk,
    /// Boolean literal.
    Boolean(bool),
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    FloatingPoint(f64),
    /// String literal.
    String(String),
}

impl Selector {
    /// Kind tag of this term.
    pub fn kind(&self) -> TermKind {
        match self {
            Selector::Column(_) => TermKind::Column,
            Selector::Function { .. } => TermKind::Function,
            Selector::Asterisk => TermKind::Asterisk,
            Selector::Boolean(_) => TermKind::Boolean,
            Selector::Integer(_) => TermKind::Integer,
            Selector::FloatingPoint(_) => TermKind::FloatingPoint,
            Selector::String(_) => TermKind::String,
        }
    }

    /// Tables referenced by this term: the column's table, or the union of
    /// the tables referenced by a function's arguments.
    pub fn tables(&self) -> Vec<&TableName> {
        match self {
            Selector::Column(column) => column.table().into_iter().collect(),
            Selector::Function { args, .. } => {
                let mut tables: Vec<&TableName> = Vec::new();
                for arg in args {
                    for table in arg.tables() {
                        if !tables.contains(&table) {
                            tables.push(table);
                        }
                    }
                }
                tables
            }
            _ => Vec::new(),
        }
    }

    /// The single table owning this term, if exactly one can be determined.
    pub fn owner_table(&self) -> Option<&TableName> {
        let tables = self.tables();
        match tables.as_slice() {
            [table] => Some(table),
            _ => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Column(column) => write!(f, "{column}"),
            Selector::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Selector::Asterisk => write!(f, "*"),
            Selector::Boolean(v) => write!(f, "{v}"),
            Selector::Integer(v) => write!(f, "{v}"),
            Selector::FloatingPoint(v) => write!(f, "{v}"),
            Selector::String(v) => write!(f, "'{v}'"),
        }
    }
}

/// Projection entry: a selector plus its optional alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    /// The projected term.
    pub selector: Selector,
    /// `AS` alias, if any.
    pub alias: Option<String>,
}

impl SelectItem {
    /// Unaliased projection entry.
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            alias: None,
        }
    }

    /// Aliased projection entry.
    pub fn aliased(selector: Selector, alias: impl Into<String>) -> Self {
        Self {
            selector,
            alias: Some(alias.into()),
        }
    }
}

/// Binary predicate between two terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Left-hand term; only a column is legal after validation.
    pub left: Selector,
    /// Comparison operator.
    pub operator: Operator,
    /// Right-hand term.
    pub right: Selector,
}

impl Relation {
    /// Create a relation.
    pub fn new(left: Selector, operator: Operator, right: Selector) -> Self {
        Self {
            left,
            operator,
            right,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}
