//! Operator and term-kind vocabulary shared by relations and type checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operator appearing in a relation.
///
/// Only the comparison group is legal at the top level of a WHERE or JOIN
/// predicate; the arithmetic group exists for nested expressions and is
/// rejected by relation validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<>`
    Distinct,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

impl Operator {
    /// True for the arithmetic operator group.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Subtract | Operator::Multiply | Operator::Divide
        )
    }

    /// True for the comparison operator group.
    pub fn is_comparison(self) -> bool {
        !self.is_arithmetic()
    }

    /// Stable uppercase name, used to synthesize filter-operation tags.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Distinct => "DISTINCT",
            Operator::Gt => "GT",
            Operator::Lt => "LT",
            Operator::Gte => "GTE",
            Operator::Lte => "LTE",
            Operator::Add => "ADD",
            Operator::Subtract => "SUBTRACT",
            Operator::Multiply => "MULTIPLY",
            Operator::Divide => "DIVIDE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Eq => "=",
            Operator::Distinct => "<>",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        };
        write!(f, "{symbol}")
    }
}

/// Kind tag for a term in the selector model.
///
/// Catalog column types map into the same literal-kind space so that
/// column-vs-column and column-vs-literal comparisons share one
/// compatibility rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermKind {
    /// Column reference.
    Column,
    /// Function call.
    Function,
    /// `*` wildcard.
    Asterisk,
    /// Boolean literal.
    Boolean,
    /// Integer literal.
    Integer,
    /// Floating point literal.
    FloatingPoint,
    /// String literal.
    String,
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TermKind::Column => "column",
            TermKind::Function => "function",
            TermKind::Asterisk => "asterisk",
            TermKind::Boolean => "boolean",
            TermKind::Integer => "integer",
            TermKind::FloatingPoint => "floating point",
            TermKind::String => "string",
        };
        write!(f, "{name}")
    }
}
