// Child References
// Status entries naming each run created for a pipeline run

use crate::matrix::merge::StateMerger;
use crate::state::{PipelineRunState, TaskMultiMap};

use serde::Serialize;

/// Reference from a pipeline run's status to one child run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildReference {
    pub name: String,
    pub pipeline_task_name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combination_id: Option<String>,
}

/// One child reference per run, with expanded tasks listed at the position
/// their task was declared
pub fn child_references(
    declared: &PipelineRunState,
    expanded: &TaskMultiMap,
) -> Vec<ChildReference> {
    StateMerger::merge_declarations(declared, expanded)
        .iter()
        .map(|entry| ChildReference {
            name: entry.run.name().to_string(),
            pipeline_task_name: entry.task_name().to_string(),
            kind: entry.run.kind().to_string(),
            combination_id: entry.combination_id.clone(),
        })
        .collect()
}
