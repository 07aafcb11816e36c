mod support;

use fedq_common::{ColumnName, FedqError, MalformedKind, Operator, QueryId, TableName};
use fedq_planner::{
    GroupBy, InnerJoin, Normalizer, OrderBy, OrderDirection, ParsedQuery, Relation,
    SelectExpression, SelectItem, SelectStatement, Selector, Statement, ValidatedQuery,
};

use support::demo_catalog;

fn parsed(statement: SelectStatement) -> ParsedQuery {
    ParsedQuery::new(QueryId(1), "demo", Statement::Select(statement))
}

fn select_columns(names: &[&str]) -> SelectExpression {
    SelectExpression::new(
        names
            .iter()
            .map(|n| SelectItem::new(Selector::Column(ColumnName::bare(*n))))
            .collect(),
    )
}

#[test]
fn select_statement_normalizes_through_the_query_wrapper() {
    let catalog = demo_catalog();
    let mut statement =
        SelectStatement::new(select_columns(&["a", "b"]), vec![TableName::bare("t1")]);
    statement.where_clauses.push(Relation::new(
        Selector::Column(ColumnName::bare("a")),
        Operator::Gte,
        Selector::Integer(1),
    ));

    let validated = Normalizer::new(&catalog)
        .normalize(parsed(statement))
        .expect("normalize");
    let ValidatedQuery::Select(select) = validated else {
        panic!("select statements stay select queries");
    };
    assert_eq!(select.query_id, QueryId(1));
    assert_eq!(select.fields.catalogs, vec!["demo".to_string()]);
    assert_eq!(
        select.fields.tables,
        vec![TableName::new("demo", "t1")]
    );
    assert_eq!(select.fields.where_relations[0].to_string(), "demo.t1.a >= 1");
}

#[test]
fn storage_and_metadata_statements_pass_through_unvalidated() {
    let catalog = demo_catalog();
    let normalizer = Normalizer::new(&catalog);

    // The target table does not exist; passthrough statements are not
    // validated against the catalog.
    let storage = ParsedQuery::new(
        QueryId(2),
        "demo",
        Statement::Storage(fedq_planner::StorageStatement {
            table: TableName::bare("missing"),
        }),
    );
    let validated = normalizer.normalize(storage).expect("passthrough");
    assert!(matches!(validated, ValidatedQuery::Storage(_)));

    let metadata = ParsedQuery::new(
        QueryId(3),
        "demo",
        Statement::Metadata(fedq_planner::MetadataStatement {
            table: TableName::bare("missing"),
        }),
    );
    let validated = normalizer.normalize(metadata).expect("passthrough");
    assert!(matches!(validated, ValidatedQuery::Metadata(_)));
}

#[test]
fn join_predicates_see_both_sides_of_the_scope() {
    let catalog = demo_catalog();
    let mut statement = SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);
    // Unqualified columns in ON resolve against FROM and JOIN tables alike.
    statement.join = Some(InnerJoin {
        table: TableName::bare("t2"),
        relations: vec![Relation::new(
            Selector::Column(ColumnName::bare("b")),
            Operator::Eq,
            Selector::Column(ColumnName::bare("c")),
        )],
    });
    let validated = Normalizer::new(&catalog)
        .normalize(parsed(statement))
        .expect("normalize");
    let ValidatedQuery::Select(select) = validated else {
        panic!("select expected");
    };
    let join = select.fields.join.expect("join recorded");
    assert_eq!(join.relations[0].to_string(), "demo.t1.b = demo.t2.c");
    // Both join keys are recorded for projection.
    assert!(select
        .fields
        .columns
        .contains(&ColumnName::new(TableName::new("demo", "t1"), "b")));
    assert!(select
        .fields
        .columns
        .contains(&ColumnName::new(TableName::new("demo", "t2"), "c")));
}

#[test]
fn order_by_shape_errors_precede_the_staged_rejection() {
    let catalog = demo_catalog();
    let normalizer = Normalizer::new(&catalog);

    let mut plain = SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);
    plain.order_by = Some(OrderBy {
        selectors: vec![Selector::Column(ColumnName::bare("a"))],
        direction: OrderDirection::Asc,
    });
    let err = normalizer.normalize(parsed(plain)).expect_err("must fail");
    assert!(matches!(err, FedqError::Unsupported(_)), "err={err}");

    let mut function = SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);
    function.order_by = Some(OrderBy {
        selectors: vec![Selector::Function {
            name: "lower".to_string(),
            args: vec![Selector::Column(ColumnName::bare("name"))],
        }],
        direction: OrderDirection::Desc,
    });
    let err = normalizer.normalize(parsed(function)).expect_err("must fail");
    assert!(
        matches!(
            err,
            FedqError::MalformedExpression(MalformedKind::NonColumnOrderBy(_))
        ),
        "err={err}"
    );
}

#[test]
fn group_by_accepts_aggregated_projections_before_rejection() {
    let catalog = demo_catalog();
    let normalizer = Normalizer::new(&catalog);

    // Grouped column plus an aggregate over another column: the shape passes
    // and the staged rejection fires.
    let mut statement = SelectStatement::new(
        SelectExpression::new(vec![
            SelectItem::new(Selector::Column(ColumnName::bare("a"))),
            SelectItem::aliased(
                Selector::Function {
                    name: "count".to_string(),
                    args: vec![Selector::Column(ColumnName::bare("b"))],
                },
                "n",
            ),
        ]),
        vec![TableName::bare("t1")],
    );
    statement.group_by = Some(GroupBy {
        selectors: vec![Selector::Column(ColumnName::bare("a"))],
    });
    let err = normalizer.normalize(parsed(statement)).expect_err("must fail");
    assert!(matches!(err, FedqError::Unsupported(_)), "err={err}");
}

#[test]
fn bare_join_keys_turn_ambiguous_once_both_tables_are_in_scope() {
    let catalog = demo_catalog();
    let mut statement = SelectStatement::new(select_columns(&["a"]), vec![TableName::bare("t1")]);
    statement.join = Some(InnerJoin {
        table: TableName::bare("t2"),
        relations: vec![Relation::new(
            Selector::Column(ColumnName::bare("id")),
            Operator::Eq,
            Selector::Column(ColumnName::new(TableName::bare("t2"), "id")),
        )],
    });
    let err = Normalizer::new(&catalog)
        .normalize(parsed(statement))
        .expect_err("must fail");
    // `id` exists in both tables once the join table is in scope.
    assert!(matches!(err, FedqError::AmbiguousName(_)), "err={err}");
}
