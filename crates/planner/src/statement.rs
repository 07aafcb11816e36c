//! Parsed statement model consumed by normalization.
//!
//! These are data holders produced by an upstream parser; they carry no
//! validation logic of their own.

use serde::{Deserialize, Serialize};

use fedq_common::TableName;

use crate::selector::{Relation, SelectItem, Selector};

/// Projection clause: the select list plus the DISTINCT flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectExpression {
    /// Whether DISTINCT was requested.
    pub distinct: bool,
    /// Select-list entries in statement order.
    pub items: Vec<SelectItem>,
}

impl SelectExpression {
    /// Plain (non-distinct) select list.
    pub fn new(items: Vec<SelectItem>) -> Self {
        Self {
            distinct: false,
            items,
        }
    }
}

/// Inner join clause: the joined table and its ON predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InnerJoin {
    /// Table on the non-initial side of the join.
    pub table: TableName,
    /// ON predicates.
    pub relations: Vec<Relation>,
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// ORDER BY clause. Accepted syntactically, rejected after shape checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Ordering selectors in statement order.
    pub selectors: Vec<Selector>,
    /// Sort direction.
    pub direction: OrderDirection,
}

/// GROUP BY clause. Accepted syntactically, rejected after shape checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBy {
    /// Grouping selectors in statement order.
    pub selectors: Vec<Selector>,
}

/// A parsed SELECT statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    /// Projection clause.
    pub select: SelectExpression,
    /// FROM tables in declaration order.
    pub from: Vec<TableName>,
    /// Optional inner join.
    pub join: Option<InnerJoin>,
    /// WHERE predicates, implicitly conjoined.
    pub where_clauses: Vec<Relation>,
    /// Optional ORDER BY clause.
    pub order_by: Option<OrderBy>,
    /// Optional GROUP BY clause.
    pub group_by: Option<GroupBy>,
    /// Optional row limit.
    pub limit: Option<u64>,
}

impl SelectStatement {
    /// Minimal statement: a select list over FROM tables.
    pub fn new(select: SelectExpression, from: Vec<TableName>) -> Self {
        Self {
            select,
            from,
            join: None,
            where_clauses: Vec::new(),
            order_by: None,
            group_by: None,
            limit: None,
        }
    }
}

/// A parsed storage-mutation statement (INSERT/DELETE family). Data holder
/// only; planning it is unimplemented in this version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageStatement {
    /// Target table.
    pub table: TableName,
}

/// A parsed metadata-change statement (CREATE/ALTER family). Data holder
/// only; planning it is unimplemented in this version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataStatement {
    /// Target table.
    pub table: TableName,
}

/// Any parsed statement entering normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// SELECT query.
    Select(SelectStatement),
    /// Storage mutation.
    Storage(StorageStatement),
    /// Metadata change.
    Metadata(MetadataStatement),
}
