use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};

use fedq_common::{
    ColumnMetadata, ColumnName, ConnectorMetadata, ConnectorStatus, FedqError, Result,
    TableMetadata, TableName,
};
use fedq_planner::MetadataProvider;

/// Connector attachment: which connector serves which cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorAttachment {
    /// Cluster the connector is attached to.
    pub cluster: String,
    /// Connector descriptor.
    pub connector: ConnectorMetadata,
}

/// In-memory metadata store.
///
/// Registration happens at bootstrap; afterwards the store is read-only and
/// safe to share across concurrently planned queries.
#[derive(Debug, Default)]
pub struct MetadataStore {
    tables: HashMap<String, TableMetadata>,
    attachments: Vec<ConnectorAttachment>,
}

impl MetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table, replacing any previous definition.
    pub fn register_table(&mut self, table: TableMetadata) {
        self.tables.insert(table.name.qualified_name(), table);
    }

    /// Attach a connector to a cluster.
    pub fn attach_connector(&mut self, cluster: impl Into<String>, connector: ConnectorMetadata) {
        self.attachments.push(ConnectorAttachment {
            cluster: cluster.into(),
            connector,
        });
    }

    /// Registered table by qualified name.
    pub fn get(&self, name: &TableName) -> Result<&TableMetadata> {
        self.tables
            .get(&name.qualified_name())
            .ok_or_else(|| FedqError::NameNotFound(name.clone().into()))
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the store holds no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Load table definitions from a JSON array of table descriptors.
    pub fn from_json(s: &str) -> Result<Self> {
        let tables: Vec<TableMetadata> =
            serde_json::from_str(s).map_err(|e| FedqError::InvalidConfig(e.to_string()))?;
        let mut store = MetadataStore::new();
        for table in tables {
            store.register_table(table);
        }
        Ok(store)
    }

    /// Load table definitions from a JSON file.
    pub fn load_from_json(path: &str) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_json(&s)
    }
}

impl MetadataProvider for MetadataStore {
    fn table_exists(&self, table: &TableName) -> bool {
        self.tables.contains_key(&table.qualified_name())
    }

    fn column_exists(&self, column: &ColumnName) -> bool {
        column
            .table()
            .and_then(|t| self.tables.get(&t.qualified_name()))
            .is_some_and(|t| t.column(column).is_some())
    }

    fn column(&self, column: &ColumnName) -> Result<ColumnMetadata> {
        column
            .table()
            .and_then(|t| self.tables.get(&t.qualified_name()))
            .and_then(|t| t.column(column))
            .cloned()
            .ok_or_else(|| FedqError::NameNotFound(column.clone().into()))
    }

    fn table(&self, table: &TableName) -> Result<TableMetadata> {
        self.get(table).cloned()
    }

    fn attached_connectors(
        &self,
        status: ConnectorStatus,
        tables: &[TableName],
    ) -> HashMap<TableName, Vec<ConnectorMetadata>> {
        let mut attached = HashMap::new();
        for table in tables {
            let Some(metadata) = self.tables.get(&table.qualified_name()) else {
                continue;
            };
            let connectors: Vec<ConnectorMetadata> = self
                .attachments
                .iter()
                .filter(|a| a.cluster == metadata.cluster.0 && a.connector.status == status)
                .map(|a| a.connector.clone())
                .collect();
            attached.insert(table.clone(), connectors);
        }
        attached
    }
}
