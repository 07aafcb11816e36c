//! Logical workflow IR: the backend-agnostic plan connectors walk.
//!
//! Steps live in an arena indexed by [`StepId`]. Each node records its
//! parent steps (one for linear steps, two for joins) and at most one child,
//! so the plan forms a tree that merges at joins and terminates in exactly
//! one Select step.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use fedq_common::{ClusterName, ColumnName, ColumnType, TableName};

use crate::selector::Relation;

/// Index of a step within its workflow's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub usize);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Filter execution strategy tag, `FILTER_<kind>_<operator>`.
///
/// The set is closed: planner-synthesized tags are resolved against it and
/// an unrecognized combination is a configuration error, never a silent
/// fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum FilterOperation {
    FilterPkEq,
    FilterPkDistinct,
    FilterPkGt,
    FilterPkLt,
    FilterPkGte,
    FilterPkLte,
    FilterIndexedEq,
    FilterIndexedDistinct,
    FilterIndexedGt,
    FilterIndexedLt,
    FilterIndexedGte,
    FilterIndexedLte,
    FilterNonIndexedEq,
    FilterNonIndexedDistinct,
    FilterNonIndexedGt,
    FilterNonIndexedLt,
    FilterNonIndexedGte,
    FilterNonIndexedLte,
    FilterFunctionEq,
    FilterFunctionDistinct,
    FilterFunctionGt,
    FilterFunctionLt,
    FilterFunctionGte,
    FilterFunctionLte,
}

impl FilterOperation {
    /// Resolve a synthesized tag against the closed set.
    pub fn from_name(name: &str) -> Option<Self> {
        let operation = match name {
            "FILTER_PK_EQ" => FilterOperation::FilterPkEq,
            "FILTER_PK_DISTINCT" => FilterOperation::FilterPkDistinct,
            "FILTER_PK_GT" => FilterOperation::FilterPkGt,
            "FILTER_PK_LT" => FilterOperation::FilterPkLt,
            "FILTER_PK_GTE" => FilterOperation::FilterPkGte,
            "FILTER_PK_LTE" => FilterOperation::FilterPkLte,
            "FILTER_INDEXED_EQ" => FilterOperation::FilterIndexedEq,
            "FILTER_INDEXED_DISTINCT" => FilterOperation::FilterIndexedDistinct,
            "FILTER_INDEXED_GT" => FilterOperation::FilterIndexedGt,
            "FILTER_INDEXED_LT" => FilterOperation::FilterIndexedLt,
            "FILTER_INDEXED_GTE" => FilterOperation::FilterIndexedGte,
            "FILTER_INDEXED_LTE" => FilterOperation::FilterIndexedLte,
            "FILTER_NON_INDEXED_EQ" => FilterOperation::FilterNonIndexedEq,
            "FILTER_NON_INDEXED_DISTINCT" => FilterOperation::FilterNonIndexedDistinct,
            "FILTER_NON_INDEXED_GT" => FilterOperation::FilterNonIndexedGt,
            "FILTER_NON_INDEXED_LT" => FilterOperation::FilterNonIndexedLt,
            "FILTER_NON_INDEXED_GTE" => FilterOperation::FilterNonIndexedGte,
            "FILTER_NON_INDEXED_LTE" => FilterOperation::FilterNonIndexedLte,
            "FILTER_FUNCTION_EQ" => FilterOperation::FilterFunctionEq,
            "FILTER_FUNCTION_DISTINCT" => FilterOperation::FilterFunctionDistinct,
            "FILTER_FUNCTION_GT" => FilterOperation::FilterFunctionGt,
            "FILTER_FUNCTION_LT" => FilterOperation::FilterFunctionLt,
            "FILTER_FUNCTION_GTE" => FilterOperation::FilterFunctionGte,
            "FILTER_FUNCTION_LTE" => FilterOperation::FilterFunctionLte,
            _ => return None,
        };
        Some(operation)
    }

    /// Stable tag name.
    pub fn name(self) -> &'static str {
        match self {
            FilterOperation::FilterPkEq => "FILTER_PK_EQ",
            FilterOperation::FilterPkDistinct => "FILTER_PK_DISTINCT",
            FilterOperation::FilterPkGt => "FILTER_PK_GT",
            FilterOperation::FilterPkLt => "FILTER_PK_LT",
            FilterOperation::FilterPkGte => "FILTER_PK_GTE",
            FilterOperation::FilterPkLte => "FILTER_PK_LTE",
            FilterOperation::FilterIndexedEq => "FILTER_INDEXED_EQ",
            FilterOperation::FilterIndexedDistinct => "FILTER_INDEXED_DISTINCT",
            FilterOperation::FilterIndexedGt => "FILTER_INDEXED_GT",
            FilterOperation::FilterIndexedLt => "FILTER_INDEXED_LT",
            FilterOperation::FilterIndexedGte => "FILTER_INDEXED_GTE",
            FilterOperation::FilterIndexedLte => "FILTER_INDEXED_LTE",
            FilterOperation::FilterNonIndexedEq => "FILTER_NON_INDEXED_EQ",
            FilterOperation::FilterNonIndexedDistinct => "FILTER_NON_INDEXED_DISTINCT",
            FilterOperation::FilterNonIndexedGt => "FILTER_NON_INDEXED_GT",
            FilterOperation::FilterNonIndexedLt => "FILTER_NON_INDEXED_LT",
            FilterOperation::FilterNonIndexedGte => "FILTER_NON_INDEXED_GTE",
            FilterOperation::FilterNonIndexedLte => "FILTER_NON_INDEXED_LTE",
            FilterOperation::FilterFunctionEq => "FILTER_FUNCTION_EQ",
            FilterOperation::FilterFunctionDistinct => "FILTER_FUNCTION_DISTINCT",
            FilterOperation::FilterFunctionGt => "FILTER_FUNCTION_GT",
            FilterOperation::FilterFunctionLt => "FILTER_FUNCTION_LT",
            FilterOperation::FilterFunctionGte => "FILTER_FUNCTION_GTE",
            FilterOperation::FilterFunctionLte => "FILTER_FUNCTION_LTE",
        }
    }
}

impl fmt::Display for FilterOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Retrieve columns of one source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Source table.
    pub table: TableName,
    /// Cluster the table lives on.
    pub cluster: ClusterName,
    /// Columns to retrieve, attached during planning.
    pub columns: Vec<ColumnName>,
}

/// Apply one validated predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Execution strategy tag for the predicate.
    pub operation: FilterOperation,
    /// The predicate itself.
    pub relation: Relation,
}

/// Merge two branches on join predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    /// Identifier of the join, `<target>$<joined>`.
    pub id: String,
    /// Qualified names of both source tables.
    pub sources: Vec<String>,
    /// Join predicates.
    pub relations: Vec<Relation>,
}

/// Cap the number of returned rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// Maximum row count.
    pub rows: u64,
}

/// Terminal step shaping the result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    /// Canonical selector text to output alias (or to itself if unaliased).
    pub aliases: HashMap<String, String>,
    /// Output alias to catalog column type, aliased column selectors only.
    pub types: HashMap<String, ColumnType>,
}

/// One abstract operator in the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalStep {
    /// Source-table projection; always an initial step.
    Project(Project),
    /// Predicate application.
    Filter(Filter),
    /// Branch merge; the only step with two parents.
    Join(Join),
    /// Row cap.
    Limit(Limit),
    /// Terminal result shaping.
    Select(Select),
}

impl LogicalStep {
    /// Union-kind steps merge multiple branches and are never chain heads.
    pub fn is_union(&self) -> bool {
        matches!(self, LogicalStep::Join(_))
    }
}

/// Arena node: a step plus its parent and child links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepNode {
    /// The operator.
    pub step: LogicalStep,
    /// Parent steps; one entry for linear steps, two for joins.
    pub previous: Vec<StepId>,
    /// Child step, if linked.
    pub next: Option<StepId>,
}

/// The plan: an arena of linked steps with explicit entry and exit points.
///
/// The workflow may contain several initial steps (one Project per source
/// table) but always finishes in a single terminal step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalWorkflow {
    steps: Vec<StepNode>,
    initial_steps: Vec<StepId>,
    last_step: Option<StepId>,
}

impl LogicalWorkflow {
    /// Create an empty workflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unlinked step to the arena.
    pub fn add_step(&mut self, step: LogicalStep) -> StepId {
        let id = StepId(self.steps.len());
        self.steps.push(StepNode {
            step,
            previous: Vec::new(),
            next: None,
        });
        id
    }

    /// Link `previous -> next`, recording both directions.
    pub fn link(&mut self, previous: StepId, next: StepId) {
        self.steps[previous.0].next = Some(next);
        self.steps[next.0].previous.push(previous);
    }

    /// Node for a step id.
    pub fn step(&self, id: StepId) -> &StepNode {
        &self.steps[id.0]
    }

    pub(crate) fn step_mut(&mut self, id: StepId) -> &mut StepNode {
        &mut self.steps[id.0]
    }

    /// Walk backward along first-parent links to the head of a chain.
    pub fn chain_head(&self, id: StepId) -> StepId {
        let mut current = id;
        while let Some(&previous) = self.step(current).previous.first() {
            current = previous;
        }
        current
    }

    /// Walk forward along child links to the last step of a chain.
    pub fn chain_last(&self, id: StepId) -> StepId {
        let mut current = id;
        while let Some(next) = self.step(current).next {
            current = next;
        }
        current
    }

    /// Entry points, one Project per source table, in declaration order.
    pub fn initial_steps(&self) -> &[StepId] {
        &self.initial_steps
    }

    /// The single terminal step.
    pub fn last_step(&self) -> Option<StepId> {
        self.last_step
    }

    pub(crate) fn set_initial_steps(&mut self, steps: Vec<StepId>) {
        self.initial_steps = steps;
    }

    pub(crate) fn set_last_step(&mut self, step: StepId) {
        self.last_step = Some(step);
    }

    /// All nodes in arena order.
    pub fn steps(&self) -> impl Iterator<Item = (StepId, &StepNode)> {
        self.steps.iter().enumerate().map(|(i, n)| (StepId(i), n))
    }

    /// Number of steps in the workflow.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the workflow holds no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
