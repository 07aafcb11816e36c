//! Shared catalog fixture for planner integration tests.
#![allow(dead_code)]

use std::collections::HashMap;

use fedq_common::{
    ClusterName, ColumnMetadata, ColumnName, ColumnType, ConnectorMetadata, ConnectorStatus,
    FedqError, Result, TableMetadata, TableName,
};
use fedq_planner::MetadataProvider;

/// In-memory catalog double with connector attachments per cluster.
#[derive(Default)]
pub struct TestCatalog {
    tables: Vec<TableMetadata>,
    connectors: HashMap<String, Vec<ConnectorMetadata>>,
}

impl TestCatalog {
    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_connector(mut self, cluster: &str, name: &str, status: ConnectorStatus) -> Self {
        self.connectors
            .entry(cluster.to_string())
            .or_default()
            .push(ConnectorMetadata {
                name: name.to_string(),
                status,
            });
        self
    }

    fn find(&self, table: &TableName) -> Option<&TableMetadata> {
        self.tables
            .iter()
            .find(|t| t.name.qualified_name() == table.qualified_name())
    }
}

impl MetadataProvider for TestCatalog {
    fn table_exists(&self, table: &TableName) -> bool {
        self.find(table).is_some()
    }

    fn column_exists(&self, column: &ColumnName) -> bool {
        column
            .table()
            .and_then(|t| self.find(t))
            .is_some_and(|t| t.column(column).is_some())
    }

    fn column(&self, column: &ColumnName) -> Result<ColumnMetadata> {
        column
            .table()
            .and_then(|t| self.find(t))
            .and_then(|t| t.column(column))
            .cloned()
            .ok_or_else(|| FedqError::NameNotFound(column.clone().into()))
    }

    fn table(&self, table: &TableName) -> Result<TableMetadata> {
        self.find(table)
            .cloned()
            .ok_or_else(|| FedqError::NameNotFound(table.clone().into()))
    }

    fn attached_connectors(
        &self,
        status: ConnectorStatus,
        tables: &[TableName],
    ) -> HashMap<TableName, Vec<ConnectorMetadata>> {
        let mut attached = HashMap::new();
        for table in tables {
            let Some(metadata) = self.find(table) else {
                continue;
            };
            let connectors: Vec<ConnectorMetadata> = self
                .connectors
                .get(&metadata.cluster.0)
                .into_iter()
                .flatten()
                .filter(|c| c.status == status)
                .cloned()
                .collect();
            attached.insert(table.clone(), connectors);
        }
        attached
    }
}

/// Two-table demo catalog: `demo.t1(id pk, a, b, name)` on `cluster1` and
/// `demo.t2(id pk, c)` on `cluster2`.
pub fn demo_catalog() -> TestCatalog {
    TestCatalog::default()
        .with_table(
            TableMetadata::new(
                TableName::new("demo", "t1"),
                ClusterName("cluster1".to_string()),
            )
            .with_primary_key("id", ColumnType::Int)
            .with_column("a", ColumnType::Int)
            .with_column("b", ColumnType::Int)
            .with_column("name", ColumnType::Text),
        )
        .with_table(
            TableMetadata::new(
                TableName::new("demo", "t2"),
                ClusterName("cluster2".to_string()),
            )
            .with_primary_key("id", ColumnType::Int)
            .with_column("c", ColumnType::Int),
        )
}
