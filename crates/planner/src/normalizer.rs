use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use fedq_common::{
    ColumnMetadata, ColumnName, ColumnType, ConnectorMetadata, ConnectorStatus, FedqError,
    MalformedKind, Operator, Result, TableMetadata, TableName, TermKind,
};

use crate::query::{
    MetadataValidatedQuery, ParsedQuery, SelectValidatedQuery, StorageValidatedQuery,
    ValidatedQuery,
};
use crate::selector::{Relation, SelectItem, Selector};
use crate::statement::{
    GroupBy, InnerJoin, OrderBy, SelectExpression, SelectStatement, Statement,
};

/// The normalizer and planner need catalog metadata to resolve names.
/// The embedding engine provides this from its metadata store.
///
/// Implementations must support concurrent reads; the core never mutates
/// the catalog.
pub trait MetadataProvider {
    /// Whether a fully qualified table exists.
    fn table_exists(&self, table: &TableName) -> bool;

    /// Whether a fully qualified column exists.
    fn column_exists(&self, column: &ColumnName) -> bool;

    /// Column descriptor for a fully qualified column.
    fn column(&self, column: &ColumnName) -> Result<ColumnMetadata>;

    /// Table descriptor for a fully qualified table.
    fn table(&self, table: &TableName) -> Result<TableMetadata>;

    /// Connectors with the given status attached to the clusters serving
    /// `tables`, keyed by table.
    fn attached_connectors(
        &self,
        status: ConnectorStatus,
        tables: &[TableName],
    ) -> HashMap<TableName, Vec<ConnectorMetadata>>;
}

/// Accumulator owned by one normalization run for one query.
///
/// Table order preserves statement declaration order; it later determines
/// the default join target. Columns are deduplicated by qualified name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFields {
    /// Catalogs touched by the query.
    pub catalogs: Vec<String>,
    /// Resolved tables in declaration order.
    pub tables: Vec<TableName>,
    /// Resolved columns referenced anywhere in the query.
    pub columns: Vec<ColumnName>,
    /// Validated projection.
    pub selectors: Vec<SelectItem>,
    /// Whether the projection is DISTINCT.
    pub distinct: bool,
    /// Validated join, if present.
    pub join: Option<InnerJoin>,
    /// Validated WHERE predicates.
    pub where_relations: Vec<Relation>,
    /// ORDER BY recorded before its staged rejection.
    pub order_by: Option<OrderBy>,
    /// GROUP BY recorded before its staged rejection.
    pub group_by: Option<GroupBy>,
}

impl NormalizedFields {
    fn add_catalog(&mut self, catalog: &str) {
        if !self.catalogs.iter().any(|c| c == catalog) {
            self.catalogs.push(catalog.to_string());
        }
    }

    fn add_table(&mut self, table: &TableName) {
        if !self.tables.contains(table) {
            self.tables.push(table.clone());
        }
    }

    fn add_column(&mut self, column: &ColumnName) {
        if !self.columns.contains(column) {
            self.columns.push(column.clone());
        }
    }
}

/// Semantic normalizer for parsed statements.
///
/// Passes run in fixed order — tables, select expression, joins, where,
/// order by, group by — and a failure in any pass aborts the whole run.
///
/// Guarantees on success:
/// - every table and column name is fully qualified and exists;
/// - unqualified columns resolved to exactly one in-scope table;
/// - relations are shape- and type-checked against catalog column types;
/// - asterisks are expanded to explicit column selectors.
pub struct Normalizer<'a> {
    provider: &'a dyn MetadataProvider,
}

impl<'a> Normalizer<'a> {
    /// Create a normalizer over a catalog.
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        Self { provider }
    }

    /// Normalize a parsed query into its validated form.
    ///
    /// Storage and metadata statements are data holders with no validation
    /// of their own; they pass through and the planner rejects them.
    pub fn normalize(&self, query: ParsedQuery) -> Result<ValidatedQuery> {
        let ParsedQuery {
            query_id,
            default_catalog,
            statement,
        } = query;
        match statement {
            Statement::Select(statement) => {
                let fields = self.normalize_select(&statement, &default_catalog)?;
                Ok(ValidatedQuery::Select(SelectValidatedQuery {
                    query_id,
                    statement,
                    fields,
                }))
            }
            Statement::Storage(statement) => Ok(ValidatedQuery::Storage(StorageValidatedQuery {
                query_id,
                statement,
            })),
            Statement::Metadata(statement) => {
                Ok(ValidatedQuery::Metadata(MetadataValidatedQuery {
                    query_id,
                    statement,
                }))
            }
        }
    }

    /// Normalize a SELECT statement, returning the resolved accumulator.
    pub fn normalize_select(
        &self,
        statement: &SelectStatement,
        default_catalog: &str,
    ) -> Result<NormalizedFields> {
        let mut run = Normalization {
            provider: self.provider,
            default_catalog,
            fields: NormalizedFields::default(),
        };
        run.normalize_tables(&statement.from)?;
        run.normalize_select_expression(&statement.select)?;
        if let Some(join) = &statement.join {
            let join = run.check_join(join)?;
            run.fields.join = Some(join);
        }
        run.normalize_where(&statement.where_clauses)?;
        if let Some(order_by) = &statement.order_by {
            run.normalize_order_by(order_by)?;
        }
        if let Some(group_by) = &statement.group_by {
            run.normalize_group_by(group_by)?;
        }
        Ok(run.fields)
    }
}

/// One normalization run: the provider, the session default catalog, and
/// the accumulator being filled. The accumulator is the only mutable state.
struct Normalization<'a> {
    provider: &'a dyn MetadataProvider,
    default_catalog: &'a str,
    fields: NormalizedFields,
}

impl Normalization<'_> {
    fn normalize_tables(&mut self, from: &[TableName]) -> Result<()> {
        for table in from {
            let resolved = self.check_table(table)?;
            if let Some(catalog) = resolved.catalog() {
                self.fields.add_catalog(catalog);
            }
            self.fields.add_table(&resolved);
        }
        Ok(())
    }

    fn normalize_select_expression(&mut self, select: &SelectExpression) -> Result<()> {
        self.fields.distinct = select.distinct;
        let items = self.check_select_items(&select.items)?;
        self.fields.selectors.extend(items);
        Ok(())
    }

    fn normalize_where(&mut self, where_clauses: &[Relation]) -> Result<()> {
        for relation in where_clauses {
            let normalized = self.check_relation(relation)?;
            self.fields.where_relations.push(normalized);
        }
        Ok(())
    }

    /// Shape-check ORDER BY, record it, then reject it.
    fn normalize_order_by(&mut self, order_by: &OrderBy) -> Result<()> {
        let mut selectors = Vec::with_capacity(order_by.selectors.len());
        for selector in &order_by.selectors {
            match selector {
                Selector::Column(column) => {
                    selectors.push(Selector::Column(self.check_column(column)?));
                }
                other => {
                    return Err(FedqError::MalformedExpression(
                        MalformedKind::NonColumnOrderBy(other.kind()),
                    ))
                }
            }
        }
        self.fields.order_by = Some(OrderBy {
            selectors,
            direction: order_by.direction,
        });
        Err(FedqError::Unsupported("ORDER BY not supported yet".to_string()))
    }

    /// Shape-check GROUP BY and the projection against it, record it, then
    /// reject it.
    fn normalize_group_by(&mut self, group_by: &GroupBy) -> Result<()> {
        let mut grouped: Vec<ColumnName> = Vec::new();
        let mut selectors = Vec::with_capacity(group_by.selectors.len());
        for selector in &group_by.selectors {
            match selector {
                Selector::Column(column) => {
                    let resolved = self.check_column(column)?;
                    if grouped.contains(&resolved) {
                        return Err(FedqError::MalformedExpression(
                            MalformedKind::RepeatedGroupByColumn(resolved),
                        ));
                    }
                    grouped.push(resolved.clone());
                    selectors.push(Selector::Column(resolved));
                }
                Selector::Function { .. } => {
                    return Err(FedqError::MalformedExpression(
                        MalformedKind::FunctionInGroupBy,
                    ))
                }
                Selector::Asterisk => {
                    return Err(FedqError::MalformedExpression(
                        MalformedKind::AsteriskInGroupBy,
                    ))
                }
                other => {
                    return Err(FedqError::MalformedExpression(
                        MalformedKind::NonColumnGroupBy(other.kind()),
                    ))
                }
            }
        }
        // Every projected column must be grouped; functions count as
        // aggregations.
        for item in &self.fields.selectors {
            match &item.selector {
                Selector::Column(column) => {
                    if !grouped.contains(column) {
                        return Err(FedqError::MalformedExpression(
                            MalformedKind::UngroupedSelectColumn(column.clone()),
                        ));
                    }
                }
                Selector::Function { .. } => {}
                Selector::Asterisk => {
                    return Err(FedqError::MalformedExpression(
                        MalformedKind::AsteriskWithGroupBy,
                    ))
                }
                Selector::Boolean(_)
                | Selector::Integer(_)
                | Selector::FloatingPoint(_)
                | Selector::String(_) => {}
            }
        }
        self.fields.group_by = Some(GroupBy { selectors });
        Err(FedqError::Unsupported("GROUP BY not supported yet".to_string()))
    }

    /// Qualify a table with the session catalog if needed and require it to
    /// exist.
    fn check_table(&self, table: &TableName) -> Result<TableName> {
        let resolved = if table.is_qualified() {
            table.clone()
        } else {
            table.with_catalog(self.default_catalog)
        };
        if !self.provider.table_exists(&resolved) {
            return Err(FedqError::NameNotFound(resolved.into()));
        }
        Ok(resolved)
    }

    /// Resolve a column against the tables currently in scope and record it.
    fn check_column(&mut self, column: &ColumnName) -> Result<ColumnName> {
        let resolved = if column.is_qualified() {
            if !self.provider.column_exists(column) {
                return Err(FedqError::InvalidColumn(column.clone()));
            }
            column.clone()
        } else {
            let table = self.search_table_for_column(column)?;
            column.with_table(table)
        };
        self.fields.add_column(&resolved);
        Ok(resolved)
    }

    /// Find the single in-scope table owning `column`.
    ///
    /// Unqualified columns with no hint are searched across every table in
    /// scope; exactly one match is required. A bare table hint is matched
    /// case-insensitively against the in-scope tables.
    fn search_table_for_column(&self, column: &ColumnName) -> Result<TableName> {
        match column.table() {
            Some(table) if table.is_qualified() => {
                if self.provider.column_exists(column) {
                    Ok(table.clone())
                } else {
                    Err(FedqError::NameNotFound(column.clone().into()))
                }
            }
            Some(hint) => {
                for table in &self.fields.tables {
                    if table.name_matches(hint.name()) {
                        return Ok(table.clone());
                    }
                }
                Err(FedqError::InvalidColumn(column.clone()))
            }
            None => {
                let mut found: Option<TableName> = None;
                for table in &self.fields.tables {
                    let candidate = column.with_table(table.clone());
                    if self.provider.column_exists(&candidate) {
                        if found.is_some() {
                            return Err(FedqError::AmbiguousName(column.clone()));
                        }
                        found = Some(table.clone());
                    }
                }
                found.ok_or_else(|| FedqError::NameNotFound(column.clone().into()))
            }
        }
    }

    fn check_select_items(&mut self, items: &[SelectItem]) -> Result<Vec<SelectItem>> {
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            match &item.selector {
                Selector::Column(column) => {
                    let resolved = self.check_column(column)?;
                    result.push(SelectItem {
                        selector: Selector::Column(resolved),
                        alias: item.alias.clone(),
                    });
                }
                Selector::Function { name, args } => {
                    let args = self.check_selector_list(args)?;
                    result.push(SelectItem {
                        selector: Selector::Function {
                            name: name.clone(),
                            args,
                        },
                        alias: item.alias.clone(),
                    });
                }
                Selector::Asterisk => {
                    result.extend(self.expand_asterisk()?.into_iter().map(SelectItem::new));
                }
                // Scalar literals are not projectable and drop out of the
                // select list.
                Selector::Boolean(_)
                | Selector::Integer(_)
                | Selector::FloatingPoint(_)
                | Selector::String(_) => {}
            }
        }
        Ok(result)
    }

    /// Normalize a bare selector list, e.g. function arguments.
    fn check_selector_list(&mut self, selectors: &[Selector]) -> Result<Vec<Selector>> {
        let mut result = Vec::with_capacity(selectors.len());
        for selector in selectors {
            match selector {
                Selector::Column(column) => {
                    result.push(Selector::Column(self.check_column(column)?));
                }
                Selector::Function { name, args } => {
                    result.push(Selector::Function {
                        name: name.clone(),
                        args: self.check_selector_list(args)?,
                    });
                }
                Selector::Asterisk => result.extend(self.expand_asterisk()?),
                Selector::Boolean(_)
                | Selector::Integer(_)
                | Selector::FloatingPoint(_)
                | Selector::String(_) => {}
            }
        }
        Ok(result)
    }

    /// Expand `*` into one column selector per column of every table in
    /// scope, table declaration order first, catalog column order second.
    fn expand_asterisk(&mut self) -> Result<Vec<Selector>> {
        let tables = self.fields.tables.clone();
        let mut selectors = Vec::new();
        for table in &tables {
            let metadata = self.provider.table(table)?;
            for column in &metadata.columns {
                self.fields.add_column(&column.name);
                selectors.push(Selector::Column(column.name.clone()));
            }
        }
        Ok(selectors)
    }

    /// Validate a WHERE or JOIN relation and return its resolved form.
    fn check_relation(&mut self, relation: &Relation) -> Result<Relation> {
        if relation.operator.is_arithmetic() {
            return Err(FedqError::MalformedExpression(
                MalformedKind::ArithmeticComparison(relation.operator),
            ));
        }
        let left = match &relation.left {
            Selector::Column(column) => self.check_column(column)?,
            Selector::Function { .. } => {
                return Err(FedqError::MalformedExpression(
                    MalformedKind::FunctionInRelation,
                ))
            }
            Selector::Asterisk => {
                return Err(FedqError::MalformedExpression(
                    MalformedKind::AsteriskInRelation,
                ))
            }
            other => {
                return Err(FedqError::YodaCondition {
                    kind: other.kind(),
                    operator: relation.operator,
                })
            }
        };
        let right = match &relation.right {
            Selector::Column(_)
            | Selector::Boolean(_)
            | Selector::Integer(_)
            | Selector::FloatingPoint(_)
            | Selector::String(_) => {
                self.check_right_selector(&left, relation.operator, &relation.right)?
            }
            other @ (Selector::Function { .. } | Selector::Asterisk) => {
                return Err(FedqError::MalformedExpression(
                    MalformedKind::RightTermNotSupported(other.kind()),
                ))
            }
        };
        Ok(Relation {
            left: Selector::Column(left),
            operator: relation.operator,
            right,
        })
    }

    /// Resolve the right-hand term of a relation and check it against the
    /// left column's catalog type.
    fn check_right_selector(
        &self,
        left: &ColumnName,
        operator: Operator,
        right: &Selector,
    ) -> Result<Selector> {
        let left_metadata = self.provider.column(left)?;
        let (right, value) = match right {
            Selector::Column(column) => {
                let table = self.search_table_for_column(column)?;
                let resolved = column.with_table(table);
                let metadata = self.provider.column(&resolved)?;
                (
                    Selector::Column(resolved),
                    literal_kind(metadata.column_type)?,
                )
            }
            other => (other.clone(), other.kind()),
        };
        check_compatibility(left, left_metadata.column_type, operator, value)?;
        Ok(right)
    }

    /// Validate a join clause. The joined table enters the scope set before
    /// its relations are checked, so predicates may reference either side.
    fn check_join(&mut self, join: &InnerJoin) -> Result<InnerJoin> {
        let table = self.check_table(&join.table)?;
        self.fields.add_table(&table);
        let mut relations = Vec::with_capacity(join.relations.len());
        for relation in &join.relations {
            let normalized = self.check_relation(relation)?;
            match normalized.operator {
                Operator::Eq => match (&normalized.left, &normalized.right) {
                    (Selector::Column(left), Selector::Column(right)) => {
                        self.check_column(right)?;
                        self.check_column(left)?;
                    }
                    _ => {
                        return Err(FedqError::MalformedExpression(
                            MalformedKind::JoinTermNotColumn,
                        ))
                    }
                },
                operator => {
                    return Err(FedqError::MalformedExpression(
                        MalformedKind::JoinRequiresEquality(operator),
                    ))
                }
            }
            relations.push(normalized);
        }
        Ok(InnerJoin { table, relations })
    }
}

/// Map a catalog column type into the literal-kind space, so column-vs-column
/// and column-vs-literal comparisons share one compatibility rule set.
fn literal_kind(column_type: ColumnType) -> Result<TermKind> {
    match column_type {
        ColumnType::Int | ColumnType::BigInt => Ok(TermKind::Integer),
        ColumnType::Float | ColumnType::Double => Ok(TermKind::FloatingPoint),
        ColumnType::Text | ColumnType::Varchar => Ok(TermKind::String),
        ColumnType::Boolean => Ok(TermKind::Boolean),
        ColumnType::Native | ColumnType::Set | ColumnType::List | ColumnType::Map => Err(
            FedqError::MalformedExpression(MalformedKind::UnsupportedColumnType(column_type)),
        ),
    }
}

/// Fixed compatibility table over (column type, operator, value kind).
fn check_compatibility(
    column: &ColumnName,
    column_type: ColumnType,
    operator: Operator,
    value: TermKind,
) -> Result<()> {
    let mismatch = || FedqError::TypeMismatch {
        column: column.clone(),
        column_type,
        operator,
        value,
    };
    match column_type {
        ColumnType::Boolean => {
            if operator != Operator::Eq || value != TermKind::Boolean {
                return Err(mismatch());
            }
        }
        ColumnType::Int | ColumnType::BigInt | ColumnType::Float | ColumnType::Double => {
            if value != TermKind::Integer && value != TermKind::FloatingPoint {
                return Err(mismatch());
            }
        }
        ColumnType::Text | ColumnType::Varchar => {
            if value != TermKind::String {
                return Err(mismatch());
            }
            if operator != Operator::Eq && operator != Operator::Distinct {
                return Err(mismatch());
            }
        }
        ColumnType::Native | ColumnType::Set | ColumnType::List | ColumnType::Map => {
            return Err(FedqError::MalformedExpression(
                MalformedKind::UnsupportedColumnType(column_type),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedq_common::ClusterName;

    #[derive(Default)]
    struct TestProvider {
        tables: Vec<TableMetadata>,
    }

    impl TestProvider {
        fn with_table(mut self, table: TableMetadata) -> Self {
            self.tables.push(table);
            self
        }

        fn find(&self, table: &TableName) -> Option<&TableMetadata> {
            self.tables
                .iter()
                .find(|t| t.name.qualified_name() == table.qualified_name())
        }
    }

    impl MetadataProvider for TestProvider {
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
            _status: ConnectorStatus,
            _tables: &[TableName],
        ) -> HashMap<TableName, Vec<ConnectorMetadata>> {
            HashMap::new()
        }
    }

    fn demo_catalog() -> TestProvider {
        TestProvider::default()
            .with_table(
                TableMetadata::new(
                    TableName::new("demo", "t1"),
                    ClusterName("cluster1".to_string()),
                )
                .with_primary_key("id", ColumnType::Int)
                .with_column("a", ColumnType::Int)
                .with_column("name", ColumnType::Text)
                .with_column("flag", ColumnType::Boolean)
                .with_column("score", ColumnType::Double),
            )
            .with_table(
                TableMetadata::new(
                    TableName::new("demo", "t2"),
                    ClusterName("cluster2".to_string()),
                )
                .with_primary_key("id", ColumnType::Int)
                .with_column("b", ColumnType::Int)
                .with_column("name", ColumnType::Text),
            )
    }

    fn select_columns(names: &[&str]) -> SelectExpression {
        SelectExpression::new(
            names
                .iter()
                .map(|n| SelectItem::new(Selector::Column(ColumnName::bare(*n))))
                .collect(),
        )
    }

    fn normalize(
        provider: &TestProvider,
        statement: &SelectStatement,
    ) -> Result<NormalizedFields> {
        Normalizer::new(provider).normalize_select(statement, "demo")
    }

    #[test]
    fn resolves_unqualified_column_to_single_table() {
        let provider = demo_catalog();
        let statement = SelectStatement::new(
            select_columns(&["a"]),
            vec![TableName::bare("t1"), TableName::bare("t2")],
        );
        let fields = normalize(&provider, &statement).expect("normalize");
        assert_eq!(fields.tables.len(), 2);
        assert_eq!(
            fields.selectors[0].selector,
            Selector::Column(ColumnName::new(TableName::new("demo", "t1"), "a"))
        );
        assert!(fields
            .columns
            .contains(&ColumnName::new(TableName::new("demo", "t1"), "a")));
    }

    #[test]
    fn ambiguous_unqualified_column_is_rejected() {
        let provider = demo_catalog();
        let statement = SelectStatement::new(
            select_columns(&["name"]),
            vec![TableName::bare("t1"), TableName::bare("t2")],
        );
        let err = normalize(&provider, &statement).expect_err("must fail");
        assert!(matches!(err, FedqError::AmbiguousName(_)), "err={err}");
    }

    #[test]
    fn unknown_column_is_rejected() {
        let provider = demo_catalog();
        let statement =
            SelectStatement::new(select_columns(&["missing"]), vec![TableName::bare("t1")]);
        let err = normalize(&provider, &statement).expect_err("must fail");
        assert!(matches!(err, FedqError::NameNotFound(_)), "err={err}");
    }

    #[test]
    fn table_hint_matches_case_insensitively() {
        let provider = demo_catalog();
        let statement = SelectStatement::new(
            SelectExpression::new(vec![SelectItem::new(Selector::Column(ColumnName::new(
                TableName::bare("T1"),
                "a",
            )))]),
            vec![TableName::bare("t1")],
        );
        let fields = normalize(&provider, &statement).expect("normalize");
        assert_eq!(
            fields.selectors[0].selector,
            Selector::Column(ColumnName::new(TableName::new("demo", "t1"), "a"))
        );
    }

    #[test]
    fn table_hint_outside_scope_is_invalid() {
        let provider = demo_catalog();
        let statement = SelectStatement::new(
            SelectExpression::new(vec![SelectItem::new(Selector::Column(ColumnName::new(
                TableName::bare("t2"),
                "b",
            )))]),
            vec![TableName::bare("t1")],
        );
        let err = normalize(&provider, &statement).expect_err("must fail");
        assert!(matches!(err, FedqError::InvalidColumn(_)), "err={err}");
    }

    #[test]
    fn unknown_table_is_rejected() {
        let provider = demo_catalog();
        let statement =
            SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("missing")]);
        let err = normalize(&provider, &statement).expect_err("must fail");
        assert!(matches!(err, FedqError::NameNotFound(_)), "err={err}");
    }

    #[test]
    fn literal_on_left_is_a_yoda_condition() {
        let provider = demo_catalog();
        let mut statement =
            SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);
        statement.where_clauses.push(Relation::new(
            Selector::Integer(5),
            Operator::Eq,
            Selector::Column(ColumnName::bare("a")),
        ));
        let err = normalize(&provider, &statement).expect_err("must fail");
        assert!(matches!(err, FedqError::YodaCondition { .. }), "err={err}");
    }

    #[test]
    fn text_column_accepts_only_string_equality() {
        let provider = demo_catalog();
        let base = SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);

        let mut mismatch = base.clone();
        mismatch.where_clauses.push(Relation::new(
            Selector::Column(ColumnName::bare("name")),
            Operator::Eq,
            Selector::Integer(5),
        ));
        let err = normalize(&provider, &mismatch).expect_err("must fail");
        assert!(matches!(err, FedqError::TypeMismatch { .. }), "err={err}");

        let mut ordering = base.clone();
        ordering.where_clauses.push(Relation::new(
            Selector::Column(ColumnName::bare("name")),
            Operator::Gt,
            Selector::String("x".to_string()),
        ));
        let err = normalize(&provider, &ordering).expect_err("must fail");
        assert!(matches!(err, FedqError::TypeMismatch { .. }), "err={err}");

        let mut ok = base;
        ok.where_clauses.push(Relation::new(
            Selector::Column(ColumnName::bare("name")),
            Operator::Eq,
            Selector::String("x".to_string()),
        ));
        let fields = normalize(&provider, &ok).expect("normalize");
        assert_eq!(fields.where_relations.len(), 1);
    }

    #[test]
    fn numeric_columns_accept_any_comparator() {
        let provider = demo_catalog();
        let mut statement =
            SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);
        statement.where_clauses.push(Relation::new(
            Selector::Column(ColumnName::bare("a")),
            Operator::Gt,
            Selector::Integer(5),
        ));
        statement.where_clauses.push(Relation::new(
            Selector::Column(ColumnName::bare("score")),
            Operator::Lte,
            Selector::FloatingPoint(1.5),
        ));
        let fields = normalize(&provider, &statement).expect("normalize");
        assert_eq!(fields.where_relations.len(), 2);
    }

    #[test]
    fn boolean_column_rejects_non_equality() {
        let provider = demo_catalog();
        let mut statement =
            SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);
        statement.where_clauses.push(Relation::new(
            Selector::Column(ColumnName::bare("flag")),
            Operator::Distinct,
            Selector::Boolean(true),
        ));
        let err = normalize(&provider, &statement).expect_err("must fail");
        assert!(matches!(err, FedqError::TypeMismatch { .. }), "err={err}");
    }

    #[test]
    fn arithmetic_operator_is_not_a_relation() {
        let provider = demo_catalog();
        let mut statement =
            SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);
        statement.where_clauses.push(Relation::new(
            Selector::Column(ColumnName::bare("a")),
            Operator::Add,
            Selector::Integer(5),
        ));
        let err = normalize(&provider, &statement).expect_err("must fail");
        assert!(
            matches!(
                err,
                FedqError::MalformedExpression(MalformedKind::ArithmeticComparison(_))
            ),
            "err={err}"
        );
    }

    #[test]
    fn column_against_column_is_type_checked() {
        let provider = demo_catalog();
        let from = vec![TableName::bare("t1"), TableName::bare("t2")];

        let mut ok = SelectStatement::new(select_columns(&["a"]), from.clone());
        ok.where_clauses.push(Relation::new(
            Selector::Column(ColumnName::bare("a")),
            Operator::Eq,
            Selector::Column(ColumnName::bare("b")),
        ));
        let fields = normalize(&provider, &ok).expect("normalize");
        let Selector::Column(right) = &fields.where_relations[0].right else {
            panic!("right term must stay a column");
        };
        assert_eq!(right.qualified_name(), "demo.t2.b");

        let mut mismatch = SelectStatement::new(select_columns(&["a"]), from);
        mismatch.where_clauses.push(Relation::new(
            Selector::Column(ColumnName::new(TableName::bare("t1"), "a")),
            Operator::Eq,
            Selector::Column(ColumnName::new(TableName::bare("t1"), "name")),
        ));
        let err = normalize(&provider, &mismatch).expect_err("must fail");
        assert!(matches!(err, FedqError::TypeMismatch { .. }), "err={err}");
    }

    #[test]
    fn function_on_left_of_relation_is_unsupported() {
        let provider = demo_catalog();
        let mut statement =
            SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);
        statement.where_clauses.push(Relation::new(
            Selector::Function {
                name: "lower".to_string(),
                args: vec![Selector::Column(ColumnName::bare("name"))],
            },
            Operator::Eq,
            Selector::String("x".to_string()),
        ));
        let err = normalize(&provider, &statement).expect_err("must fail");
        assert!(
            matches!(
                err,
                FedqError::MalformedExpression(MalformedKind::FunctionInRelation)
            ),
            "err={err}"
        );
    }

    #[test]
    fn asterisk_expands_in_table_then_catalog_column_order() {
        let provider = demo_catalog();
        let statement = SelectStatement::new(
            SelectExpression::new(vec![SelectItem::new(Selector::Asterisk)]),
            vec![TableName::bare("t1"), TableName::bare("t2")],
        );
        let fields = normalize(&provider, &statement).expect("normalize");
        let names: Vec<String> = fields
            .selectors
            .iter()
            .map(|s| s.selector.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "demo.t1.id",
                "demo.t1.a",
                "demo.t1.name",
                "demo.t1.flag",
                "demo.t1.score",
                "demo.t2.id",
                "demo.t2.b",
                "demo.t2.name",
            ]
        );
        assert_eq!(fields.columns.len(), names.len());
    }

    #[test]
    fn function_arguments_are_normalized_recursively() {
        let provider = demo_catalog();
        let statement = SelectStatement::new(
            SelectExpression::new(vec![SelectItem::aliased(
                Selector::Function {
                    name: "count".to_string(),
                    args: vec![Selector::Column(ColumnName::bare("a"))],
                },
                "n",
            )]),
            vec![TableName::bare("t1")],
        );
        let fields = normalize(&provider, &statement).expect("normalize");
        let Selector::Function { args, .. } = &fields.selectors[0].selector else {
            panic!("function selector expected");
        };
        assert_eq!(
            args[0],
            Selector::Column(ColumnName::new(TableName::new("demo", "t1"), "a"))
        );
        assert_eq!(fields.selectors[0].alias.as_deref(), Some("n"));
    }

    #[test]
    fn literal_select_items_drop_out_of_the_projection() {
        let provider = demo_catalog();
        let statement = SelectStatement::new(
            SelectExpression::new(vec![
                SelectItem::new(Selector::Integer(5)),
                SelectItem::new(Selector::Column(ColumnName::bare("a"))),
            ]),
            vec![TableName::bare("t1")],
        );
        let fields = normalize(&provider, &statement).expect("normalize");
        assert_eq!(fields.selectors.len(), 1);
    }

    #[test]
    fn join_accepts_only_equality_between_columns() {
        let provider = demo_catalog();
        let base = SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);

        let mut ok = base.clone();
        ok.join = Some(InnerJoin {
            table: TableName::bare("t2"),
            relations: vec![Relation::new(
                Selector::Column(ColumnName::new(TableName::bare("t1"), "id")),
                Operator::Eq,
                Selector::Column(ColumnName::new(TableName::bare("t2"), "id")),
            )],
        });
        let fields = normalize(&provider, &ok).expect("normalize");
        let join = fields.join.expect("join recorded");
        assert_eq!(join.table.qualified_name(), "demo.t2");
        assert_eq!(fields.tables.len(), 2);

        let mut non_eq = base.clone();
        non_eq.join = Some(InnerJoin {
            table: TableName::bare("t2"),
            relations: vec![Relation::new(
                Selector::Column(ColumnName::new(TableName::bare("t1"), "id")),
                Operator::Gt,
                Selector::Column(ColumnName::new(TableName::bare("t2"), "id")),
            )],
        });
        let err = normalize(&provider, &non_eq).expect_err("must fail");
        assert!(
            matches!(
                err,
                FedqError::MalformedExpression(MalformedKind::JoinRequiresEquality(_))
            ),
            "err={err}"
        );

        let mut literal = base;
        literal.join = Some(InnerJoin {
            table: TableName::bare("t2"),
            relations: vec![Relation::new(
                Selector::Column(ColumnName::new(TableName::bare("t1"), "id")),
                Operator::Eq,
                Selector::Integer(5),
            )],
        });
        let err = normalize(&provider, &literal).expect_err("must fail");
        assert!(
            matches!(
                err,
                FedqError::MalformedExpression(MalformedKind::JoinTermNotColumn)
            ),
            "err={err}"
        );
    }

    #[test]
    fn order_by_is_shape_checked_then_rejected() {
        let provider = demo_catalog();
        let base = SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);

        let mut staged = base.clone();
        staged.order_by = Some(OrderBy {
            selectors: vec![Selector::Column(ColumnName::bare("a"))],
            direction: crate::statement::OrderDirection::Asc,
        });
        let err = normalize(&provider, &staged).expect_err("must fail");
        assert!(matches!(err, FedqError::Unsupported(_)), "err={err}");

        let mut bad_shape = base;
        bad_shape.order_by = Some(OrderBy {
            selectors: vec![Selector::Integer(1)],
            direction: crate::statement::OrderDirection::Asc,
        });
        let err = normalize(&provider, &bad_shape).expect_err("must fail");
        assert!(
            matches!(
                err,
                FedqError::MalformedExpression(MalformedKind::NonColumnOrderBy(_))
            ),
            "err={err}"
        );
    }

    #[test]
    fn group_by_is_shape_checked_then_rejected() {
        let provider = demo_catalog();
        let base = SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);

        let mut staged = base.clone();
        staged.group_by = Some(GroupBy {
            selectors: vec![Selector::Column(ColumnName::bare("a"))],
        });
        let err = normalize(&provider, &staged).expect_err("must fail");
        assert!(matches!(err, FedqError::Unsupported(_)), "err={err}");

        let mut repeated = base.clone();
        repeated.group_by = Some(GroupBy {
            selectors: vec![
                Selector::Column(ColumnName::bare("a")),
                Selector::Column(ColumnName::bare("a")),
            ],
        });
        let err = normalize(&provider, &repeated).expect_err("must fail");
        assert!(
            matches!(
                err,
                FedqError::MalformedExpression(MalformedKind::RepeatedGroupByColumn(_))
            ),
            "err={err}"
        );

        let mut ungrouped = base;
        ungrouped.group_by = Some(GroupBy {
            selectors: vec![Selector::Column(ColumnName::bare("id"))],
        });
        let err = normalize(&provider, &ungrouped).expect_err("must fail");
        assert!(
            matches!(
                err,
                FedqError::MalformedExpression(MalformedKind::UngroupedSelectColumn(_))
            ),
            "err={err}"
        );
    }

    #[test]
    fn prequalified_statement_normalizes_to_itself() {
        let provider = demo_catalog();
        let t1 = TableName::new("demo", "t1");
        let a = ColumnName::new(t1.clone(), "a");
        let mut statement = SelectStatement::new(
            SelectExpression::new(vec![SelectItem::new(Selector::Column(a.clone()))]),
            vec![t1.clone()],
        );
        statement.where_clauses.push(Relation::new(
            Selector::Column(a.clone()),
            Operator::Eq,
            Selector::Integer(5),
        ));
        let fields = normalize(&provider, &statement).expect("normalize");
        assert_eq!(fields.tables, vec![t1]);
        assert_eq!(fields.selectors[0].selector, Selector::Column(a.clone()));
        assert_eq!(
            fields.where_relations[0].left,
            Selector::Column(a.clone())
        );
        assert_eq!(fields.columns, vec![a]);
    }
}
