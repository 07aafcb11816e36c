//! Query wrappers tracking a statement through normalization.

use serde::{Deserialize, Serialize};

use fedq_common::QueryId;

use crate::normalizer::NormalizedFields;
use crate::statement::{MetadataStatement, SelectStatement, Statement, StorageStatement};

/// A parsed statement plus the session context it arrived with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Identifier assigned on entry.
    pub query_id: QueryId,
    /// Session catalog applied to unqualified table names.
    pub default_catalog: String,
    /// The parsed statement.
    pub statement: Statement,
}

impl ParsedQuery {
    /// Wrap a statement with its session context.
    pub fn new(query_id: QueryId, default_catalog: impl Into<String>, statement: Statement) -> Self {
        Self {
            query_id,
            default_catalog: default_catalog.into(),
            statement,
        }
    }
}

/// A SELECT statement that passed normalization, with its resolved fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectValidatedQuery {
    /// Identifier carried over from the parsed query.
    pub query_id: QueryId,
    /// The original statement.
    pub statement: SelectStatement,
    /// Accumulator produced by normalization; read-only from here on.
    pub fields: NormalizedFields,
}

/// A storage mutation passed through untouched; planning rejects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageValidatedQuery {
    /// Identifier carried over from the parsed query.
    pub query_id: QueryId,
    /// The original statement.
    pub statement: StorageStatement,
}

/// A metadata change passed through untouched; planning rejects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataValidatedQuery {
    /// Identifier carried over from the parsed query.
    pub query_id: QueryId,
    /// The original statement.
    pub statement: MetadataStatement,
}

/// Output of normalization, dispatched on by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidatedQuery {
    /// Normalized SELECT.
    Select(SelectValidatedQuery),
    /// Storage mutation passthrough.
    Storage(StorageValidatedQuery),
    /// Metadata change passthrough.
    Metadata(MetadataValidatedQuery),
}
