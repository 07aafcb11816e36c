//! Semantic normalization and logical workflow planning.
//!
//! Pipeline: a parsed statement enters [`normalizer::Normalizer`], which
//! resolves names and checks shapes/types against a [`normalizer::MetadataProvider`];
//! the validated query then enters [`planner::Planner`], which builds the
//! [`logical_workflow::LogicalWorkflow`] downstream connectors consume.

pub mod explain;
pub mod logical_workflow;
pub mod normalizer;
pub mod planner;
pub mod query;
pub mod selector;
pub mod statement;

pub use explain::*;
pub use logical_workflow::*;
pub use normalizer::*;
pub use planner::*;
pub use query::*;
pub use selector::*;
pub use statement::*;
