//! Catalog metadata model: column types, table/column descriptors, clusters,
//! and connector attachments.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::names::{ColumnName, TableName};

/// Catalog column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Boolean column.
    Boolean,
    /// 32-bit integer column.
    Int,
    /// 64-bit integer column.
    BigInt,
    /// 32-bit floating point column.
    Float,
    /// 64-bit floating point column.
    Double,
    /// Text column.
    Text,
    /// Varchar column.
    Varchar,
    /// Datastore-native type opaque to the engine.
    Native,
    /// Set collection.
    Set,
    /// List collection.
    List,
    /// Map collection.
    Map,
}

impl ColumnType {
    /// True for the collection kinds.
    pub fn is_collection(self) -> bool {
        matches!(self, ColumnType::Set | ColumnType::List | ColumnType::Map)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Int => "INT",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Text => "TEXT",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Native => "NATIVE",
            ColumnType::Set => "SET",
            ColumnType::List => "LIST",
            ColumnType::Map => "MAP",
        };
        write!(f, "{name}")
    }
}

/// Cluster a table is placed on; execution connectors attach per cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterName(pub String);

impl fmt::Display for ClusterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Column descriptor as returned by catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Fully qualified column name.
    pub name: ColumnName,
    /// Catalog type of the column.
    pub column_type: ColumnType,
    /// Whether the column is part of the table's primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether the column carries a secondary index.
    #[serde(default)]
    pub indexed: bool,
}

/// Table descriptor as returned by catalog lookups.
///
/// `columns` preserves catalog declaration order; asterisk expansion and
/// projection attachment rely on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Fully qualified table name.
    pub name: TableName,
    /// Cluster the table lives on.
    pub cluster: ClusterName,
    /// Ordered column list.
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Create an empty table descriptor.
    pub fn new(name: TableName, cluster: ClusterName) -> Self {
        Self {
            name,
            cluster,
            columns: Vec::new(),
        }
    }

    /// Append a plain column.
    pub fn with_column(self, name: &str, column_type: ColumnType) -> Self {
        self.push_column(name, column_type, false, false)
    }

    /// Append a primary-key column.
    pub fn with_primary_key(self, name: &str, column_type: ColumnType) -> Self {
        self.push_column(name, column_type, true, false)
    }

    /// Append a secondary-indexed column.
    pub fn with_indexed_column(self, name: &str, column_type: ColumnType) -> Self {
        self.push_column(name, column_type, false, true)
    }

    fn push_column(mut self, name: &str, column_type: ColumnType, pk: bool, indexed: bool) -> Self {
        self.columns.push(ColumnMetadata {
            name: ColumnName::new(self.name.clone(), name),
            column_type,
            primary_key: pk,
            indexed,
        });
        self
    }

    /// Look up a column descriptor by bare column part.
    pub fn column(&self, name: &ColumnName) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name.name() == name.name())
    }

    /// Whether `name` is part of this table's primary key.
    pub fn is_primary_key(&self, name: &ColumnName) -> bool {
        self.column(name).is_some_and(|c| c.primary_key)
    }

    /// Whether `name` carries a secondary index.
    pub fn is_indexed(&self, name: &ColumnName) -> bool {
        self.column(name).is_some_and(|c| c.indexed)
    }

    /// Primary key columns, in declaration order.
    pub fn primary_key(&self) -> Vec<&ColumnName> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| &c.name)
            .collect()
    }

    /// Indexed columns, in declaration order.
    pub fn indexed_columns(&self) -> Vec<&ColumnName> {
        self.columns
            .iter()
            .filter(|c| c.indexed)
            .map(|c| &c.name)
            .collect()
    }
}

/// Connector lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorStatus {
    /// Attached and accepting work.
    Online,
    /// Attached but not accepting work.
    Offline,
}

/// Execution connector descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorMetadata {
    /// Connector name.
    pub name: String,
    /// Current status.
    pub status: ConnectorStatus,
}
