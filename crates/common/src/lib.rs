//! Shared names, metadata model, error types, and IDs for fedq crates.
//!
//! Architecture role:
//! - defines the qualified-name model resolution operates on
//! - defines the catalog metadata vocabulary (column types, tables, clusters,
//!   connectors) consumed by normalization and planning
//! - provides common [`FedqError`] / [`Result`] contracts
//!
//! Key modules:
//! - [`error`]
//! - [`ids`]
//! - [`metadata`]
//! - [`names`]
//! - [`term`]

pub mod error;
pub mod ids;
pub mod metadata;
pub mod names;
pub mod term;

pub use error::{FedqError, MalformedKind, Result};
pub use ids::QueryId;
pub use metadata::{
    ClusterName, ColumnMetadata, ColumnType, ConnectorMetadata, ConnectorStatus, TableMetadata,
};
pub use names::{ColumnName, QualifiedName, TableName};
pub use term::{Operator, TermKind};
