//! Workflow planner: turns a validated query into a [`LogicalWorkflow`].

use std::collections::HashMap;

use tracing::{debug, error};

use fedq_common::{
    ConnectorMetadata, ConnectorStatus, FedqError, Operator, Result, TableMetadata, TableName,
};

use crate::logical_workflow::{
    Filter, FilterOperation, Join, Limit, LogicalStep, LogicalWorkflow, Project, Select, StepId,
};
use crate::normalizer::MetadataProvider;
use crate::query::{SelectValidatedQuery, ValidatedQuery};
use crate::selector::{SelectItem, Selector};

/// Defines the set of [`LogicalStep`] required to execute a statement,
/// ordered as a workflow on a [`LogicalWorkflow`] structure. The workflow
/// may contain several initial steps, but it always finishes in a single
/// operation.
#[derive(Debug, Default)]
pub struct Planner;

impl Planner {
    /// Create a planner.
    pub fn new() -> Self {
        Self
    }

    /// Plan a validated query.
    ///
    /// Only the select path is implemented; storage and metadata workflows
    /// are rejected as unsupported.
    pub fn plan(
        &self,
        query: &ValidatedQuery,
        provider: &dyn MetadataProvider,
    ) -> Result<LogicalWorkflow> {
        match query {
            ValidatedQuery::Select(select) => self.build_select_workflow(select, provider),
            ValidatedQuery::Storage(_) => Err(FedqError::Unsupported(
                "storage workflow planning is not implemented yet".to_string(),
            )),
            ValidatedQuery::Metadata(_) => Err(FedqError::Unsupported(
                "metadata workflow planning is not implemented yet".to_string(),
            )),
        }
    }

    /// Collect the workflow's source tables and ask the catalog which online
    /// connectors serve them. Execution planning proper starts from this map.
    pub fn candidate_connectors(
        &self,
        workflow: &LogicalWorkflow,
        provider: &dyn MetadataProvider,
    ) -> HashMap<TableName, Vec<ConnectorMetadata>> {
        let mut tables = Vec::with_capacity(workflow.initial_steps().len());
        for id in workflow.initial_steps() {
            if let LogicalStep::Project(project) = &workflow.step(*id).step {
                tables.push(project.table.clone());
            }
        }
        provider.attached_connectors(ConnectorStatus::Online, &tables)
    }

    fn build_select_workflow(
        &self,
        query: &SelectValidatedQuery,
        provider: &dyn MetadataProvider,
    ) -> Result<LogicalWorkflow> {
        let fields = &query.fields;
        let mut workflow = LogicalWorkflow::new();

        // One Project per source table, initially column-less, tagged with
        // the cluster its table lives on. Missing metadata is fatal.
        let mut table_map: HashMap<String, TableMetadata> = HashMap::new();
        let mut last_steps: Vec<(String, StepId)> = Vec::with_capacity(fields.tables.len());
        for table in &fields.tables {
            let metadata = provider.table(table)?;
            let key = table.qualified_name();
            let id = workflow.add_step(LogicalStep::Project(Project {
                table: table.clone(),
                cluster: metadata.cluster.clone(),
                columns: Vec::new(),
            }));
            last_steps.push((key.clone(), id));
            table_map.insert(key, metadata);
        }

        // Attach every resolved column to its owning table's Project.
        for column in &fields.columns {
            let project = column
                .table()
                .map(TableName::qualified_name)
                .and_then(|key| last_step_of(&last_steps, &key));
            match project {
                Some(id) => {
                    if let LogicalStep::Project(project) = &mut workflow.step_mut(id).step {
                        project.columns.push(column.clone());
                    }
                }
                None => {
                    return Err(FedqError::InvalidConfig(format!(
                        "column {column} does not belong to a projected table"
                    )))
                }
            }
        }

        // Append a Filter after the owning table's current last step. A
        // relation whose table cannot be determined is logged and skipped;
        // every other failure here aborts planning.
        for relation in &fields.where_relations {
            let resolved = relation
                .left
                .owner_table()
                .map(TableName::qualified_name)
                .and_then(|key| {
                    let previous = last_step_of(&last_steps, &key)?;
                    let metadata = table_map.get(&key)?;
                    Some((key, previous, metadata))
                });
            match resolved {
                Some((key, previous, metadata)) => {
                    let operation = filter_operation(metadata, &relation.left, relation.operator)?;
                    let id = workflow.add_step(LogicalStep::Filter(Filter {
                        operation,
                        relation: relation.clone(),
                    }));
                    workflow.link(previous, id);
                    update_last_step(&mut last_steps, &key, id);
                }
                None => {
                    error!(relation = %relation, "cannot determine filter target table, skipping relation");
                }
            }
        }

        // Splice the join in as the convergent successor of both branches.
        if let Some(join) = &fields.join {
            let target = match fields.tables.first() {
                Some(table) => table.qualified_name(),
                None => {
                    return Err(FedqError::InvalidConfig(
                        "join without a target table".to_string(),
                    ))
                }
            };
            let joined = join.table.qualified_name();
            let id = format!("{target}${joined}");
            let step = workflow.add_step(LogicalStep::Join(Join {
                id: id.clone(),
                sources: vec![target.clone(), joined.clone()],
                relations: join.relations.clone(),
            }));
            for key in [&target, &joined] {
                match last_step_of(&last_steps, key) {
                    Some(previous) => workflow.link(previous, step),
                    None => {
                        return Err(FedqError::InvalidConfig(format!(
                            "join source {key} has no projected branch"
                        )))
                    }
                }
            }
            last_steps.push((id, step));
        }

        // Initial steps are the Project chain heads; all branches converge on
        // one last step.
        let mut initial_steps: Vec<StepId> = Vec::new();
        for (_, id) in &last_steps {
            if workflow.step(*id).step.is_union() {
                continue;
            }
            let head = workflow.chain_head(*id);
            if matches!(workflow.step(head).step, LogicalStep::Project(_))
                && !initial_steps.contains(&head)
            {
                initial_steps.push(head);
            }
        }
        let first = initial_steps.first().copied().ok_or_else(|| {
            FedqError::InvalidConfig("workflow has no initial steps".to_string())
        })?;
        let mut last = workflow.chain_last(first);

        if let Some(rows) = query.statement.limit {
            let id = workflow.add_step(LogicalStep::Limit(Limit { rows }));
            workflow.link(last, id);
            last = id;
        }

        let select = generate_select(&fields.selectors, &table_map);
        let id = workflow.add_step(LogicalStep::Select(select));
        workflow.link(last, id);
        workflow.set_initial_steps(initial_steps);
        workflow.set_last_step(id);
        debug!(query_id = %query.query_id, steps = workflow.len(), "built select workflow");
        Ok(workflow)
    }
}

/// Synthesize the filter-operation tag for a predicate and resolve it
/// against the closed set of known filter operations.
fn filter_operation(
    table: &TableMetadata,
    selector: &Selector,
    operator: Operator,
) -> Result<FilterOperation> {
    let kind = match selector {
        Selector::Function { .. } => "FUNCTION",
        Selector::Column(column) => {
            if table.is_primary_key(column) {
                "PK"
            } else if table.is_indexed(column) {
                "INDEXED"
            } else {
                "NON_INDEXED"
            }
        }
        other => {
            return Err(FedqError::InvalidConfig(format!(
                "filter left term {other} is neither a column nor a function"
            )))
        }
    };
    let tag = format!("FILTER_{}_{}", kind, operator.name());
    FilterOperation::from_name(&tag)
        .ok_or_else(|| FedqError::InvalidConfig(format!("unknown filter operation {tag}")))
}

/// Build the terminal Select: canonical selector text to alias, and alias to
/// catalog column type for aliased column selectors.
fn generate_select(selectors: &[SelectItem], table_map: &HashMap<String, TableMetadata>) -> Select {
    let mut aliases = HashMap::new();
    let mut types = HashMap::new();
    for item in selectors {
        let canonical = item.selector.to_string();
        match &item.alias {
            Some(alias) => {
                aliases.insert(canonical, alias.clone());
                if let Selector::Column(column) = &item.selector {
                    let column_type = column
                        .table()
                        .and_then(|t| table_map.get(&t.qualified_name()))
                        .and_then(|m| m.column(column))
                        .map(|c| c.column_type);
                    if let Some(column_type) = column_type {
                        types.insert(alias.clone(), column_type);
                    }
                }
            }
            None => {
                aliases.insert(canonical.clone(), canonical);
            }
        }
    }
    Select { aliases, types }
}

fn last_step_of(steps: &[(String, StepId)], key: &str) -> Option<StepId> {
    steps.iter().find(|(k, _)| k == key).map(|(_, id)| *id)
}

fn update_last_step(steps: &mut Vec<(String, StepId)>, key: &str, id: StepId) {
    match steps.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = id,
        None => steps.push((key.to_string(), id)),
    }
}
