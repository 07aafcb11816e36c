use thiserror::Error;

use crate::metadata::ColumnType;
use crate::names::{ColumnName, QualifiedName};
use crate::term::{Operator, TermKind};

/// Structurally illegal expression shapes rejected during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedKind {
    /// An arithmetic operator used where a comparison is required.
    #[error("operator {0} is arithmetic; only comparison operators are valid in a relation")]
    ArithmeticComparison(Operator),

    /// A function on the left side of a relation.
    #[error("functions are not supported on the left side of a relation yet")]
    FunctionInRelation,

    /// An asterisk inside a relation.
    #[error("asterisk is not supported in relations")]
    AsteriskInRelation,

    /// A right-hand term kind with no validation path yet.
    #[error("{0} terms are not supported on the right side of a relation yet")]
    RightTermNotSupported(TermKind),

    /// A join predicate with an operator other than equality.
    #[error("join relations only accept the equality operator, found {0}")]
    JoinRequiresEquality(Operator),

    /// A join predicate whose terms are not both columns.
    #[error("join relations must compare between columns")]
    JoinTermNotColumn,

    /// A non-column selector in an ORDER BY clause.
    #[error("ORDER BY only accepts columns, found {0}")]
    NonColumnOrderBy(TermKind),

    /// A function selector in a GROUP BY clause.
    #[error("functions are not valid in GROUP BY")]
    FunctionInGroupBy,

    /// An asterisk selector in a GROUP BY clause.
    #[error("asterisk is not valid in GROUP BY")]
    AsteriskInGroupBy,

    /// A literal selector in a GROUP BY clause.
    #[error("GROUP BY only accepts columns, found {0}")]
    NonColumnGroupBy(TermKind),

    /// The same column listed twice in a GROUP BY clause.
    #[error("column {0} is repeated in GROUP BY")]
    RepeatedGroupByColumn(ColumnName),

    /// A projected column that is neither grouped nor aggregated.
    #[error("column {0} must appear in GROUP BY or inside an aggregation function")]
    UngroupedSelectColumn(ColumnName),

    /// An asterisk projection combined with GROUP BY.
    #[error("asterisk is not valid together with GROUP BY")]
    AsteriskWithGroupBy,

    /// A catalog column type with no comparison semantics.
    #[error("column type {0} is not supported in relations yet")]
    UnsupportedColumnType(ColumnType),
}

/// Canonical fedq error taxonomy used across crates.
///
/// Classification guidance:
/// - name/shape/type variants: semantic failures discovered during
///   normalization, one variant per validation kind
/// - [`FedqError::Unsupported`]: syntactically valid but intentionally
///   unimplemented behavior (ORDER BY, GROUP BY, non-select planning)
/// - [`FedqError::InvalidConfig`]: catalog/planner contract violations
/// - [`FedqError::Io`]: raw filesystem IO failures from std APIs
#[derive(Debug, Error)]
pub enum FedqError {
    /// Table or fully qualified column absent from the catalog.
    #[error("name not found: {0}")]
    NameNotFound(QualifiedName),

    /// Unqualified column matching more than one in-scope table.
    #[error("ambiguous column reference: {0} (use table.column)")]
    AmbiguousName(ColumnName),

    /// Column hint resolving to no in-scope table, or a qualified column
    /// failing its existence check.
    #[error("invalid column: {0}")]
    InvalidColumn(ColumnName),

    /// Structurally illegal expression shape.
    #[error("malformed expression: {0}")]
    MalformedExpression(MalformedKind),

    /// Left/right term types incompatible under the operator compatibility
    /// table.
    #[error("type mismatch: column {column} of type {column_type} does not accept a {value} value under {operator}")]
    TypeMismatch {
        /// The left-hand column of the relation.
        column: ColumnName,
        /// Its catalog type.
        column_type: ColumnType,
        /// The relation operator.
        operator: Operator,
        /// Kind of the right-hand value.
        value: TermKind,
    },

    /// Literal on the left side of a comparison; the canonical predicate
    /// shape keeps the column on the left.
    #[error("{kind} literal on the left side of a {operator} comparison")]
    YodaCondition {
        /// Kind of the offending literal.
        kind: TermKind,
        /// The relation operator.
        operator: Operator,
    },

    /// Valid request for a feature not implemented in the current version.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Invalid or inconsistent configuration/catalog/planner state.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transparent std IO failures.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Standard fedq result alias.
pub type Result<T> = std::result::Result<T, FedqError>;
