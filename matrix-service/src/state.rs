// Pipeline Run State
// Resolved per-run task entries and name-keyed lookup over them

use crate::parser::models::{Pipeline, PipelineTask, ResourceBinding};

use serde::Serialize;
use std::collections::HashMap;

/// Identifier of the run that executes a pipeline task.
///
/// Built-in tasks run as task runs; custom tasks are delegated to an external
/// controller and get a custom run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum RunIdentifier {
    TaskRun(String),
    CustomRun(String),
}

impl RunIdentifier {
    /// Identifier kind matching the task's reference
    pub fn for_task(task: &PipelineTask, name: impl Into<String>) -> Self {
        if task.is_custom_task() {
            RunIdentifier::CustomRun(name.into())
        } else {
            RunIdentifier::TaskRun(name.into())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RunIdentifier::TaskRun(name) | RunIdentifier::CustomRun(name) => name,
        }
    }

    /// Same kind of identifier with `-{suffix}` appended to the name
    pub fn with_suffix(&self, suffix: &str) -> Self {
        match self {
            RunIdentifier::TaskRun(name) => RunIdentifier::TaskRun(format!("{}-{}", name, suffix)),
            RunIdentifier::CustomRun(name) => {
                RunIdentifier::CustomRun(format!("{}-{}", name, suffix))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RunIdentifier::TaskRun(_) => "TaskRun",
            RunIdentifier::CustomRun(_) => "CustomRun",
        }
    }
}

/// Task definition resolved for a pipeline task; `task_spec` is carried opaquely
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedTaskResources {
    pub task_name: Option<String>,
    pub kind: Option<String>,
    pub task_spec: Option<serde_yaml::Value>,
    /// Legacy bound input resources
    pub inputs: Vec<ResourceBinding>,
    /// Legacy bound output resources
    pub outputs: Vec<ResourceBinding>,
}

/// Outcome of a legacy condition check attached to a pipeline task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConditionCheck {
    pub condition_name: String,
    pub check_name: String,
}

/// A pipeline task resolved for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPipelineTask {
    pub pipeline_task: PipelineTask,
    pub run: RunIdentifier,
    pub resolved_task_resources: Option<ResolvedTaskResources>,
    pub condition_checks: Vec<ResolvedConditionCheck>,
    /// Id of the matrix combination this entry was fanned out from
    pub combination_id: Option<String>,
}

impl ResolvedPipelineTask {
    pub fn new(pipeline_task: PipelineTask, run: RunIdentifier) -> Self {
        Self {
            pipeline_task,
            run,
            resolved_task_resources: None,
            condition_checks: Vec::new(),
            combination_id: None,
        }
    }

    pub fn with_resources(mut self, resources: ResolvedTaskResources) -> Self {
        self.resolved_task_resources = Some(resources);
        self
    }

    pub fn task_name(&self) -> &str {
        &self.pipeline_task.name
    }

    pub fn is_matrixed(&self) -> bool {
        self.pipeline_task.is_matrixed()
    }
}

/// Ordered run state for a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PipelineRunState(Vec<ResolvedPipelineTask>);

impl PipelineRunState {
    pub fn new(entries: Vec<ResolvedPipelineTask>) -> Self {
        Self(entries)
    }

    /// Build the initial run state for a pipeline, one entry per declared task
    /// with finally tasks last. Run identifiers are `{run_name}-{task_name}`.
    pub fn from_pipeline(pipeline: &Pipeline, run_name: &str) -> Self {
        pipeline
            .all_tasks()
            .map(|task| {
                let run = RunIdentifier::for_task(task, format!("{}-{}", run_name, task.name));
                let entry = ResolvedPipelineTask::new(task.clone(), run);
                match &task.task_ref {
                    Some(task_ref) => entry.with_resources(ResolvedTaskResources {
                        task_name: Some(task_ref.name.clone()),
                        kind: task_ref.kind.clone(),
                        ..Default::default()
                    }),
                    None => entry,
                }
            })
            .collect()
    }

    pub fn entries(&self) -> &[ResolvedPipelineTask] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedPipelineTask> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, entry: ResolvedPipelineTask) {
        self.0.push(entry);
    }

    /// Run names in state order
    pub fn run_names(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.run.name()).collect()
    }

    /// Group entries by task name, keeping first-seen key order
    pub fn to_multimap(&self) -> TaskMultiMap {
        let mut map = TaskMultiMap::new();
        for entry in &self.0 {
            map.insert(entry.clone());
        }
        map
    }
}

impl FromIterator<ResolvedPipelineTask> for PipelineRunState {
    fn from_iter<T: IntoIterator<Item = ResolvedPipelineTask>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PipelineRunState {
    type Item = ResolvedPipelineTask;
    type IntoIter = std::vec::IntoIter<ResolvedPipelineTask>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PipelineRunState {
    type Item = &'a ResolvedPipelineTask;
    type IntoIter = std::slice::Iter<'a, ResolvedPipelineTask>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Ordered multi-map from task name to the entries carrying that name.
///
/// After fan-out a task name maps to one entry per combination, so names are
/// not unique keys. Keys keep first-insertion order; entries under a key keep
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct TaskMultiMap {
    groups: Vec<(String, Vec<ResolvedPipelineTask>)>,
    /// Quick lookup of group index by task name
    indices: HashMap<String, usize>,
}

impl TaskMultiMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: ResolvedPipelineTask) {
        match self.indices.get(entry.task_name()) {
            Some(&idx) => self.groups[idx].1.push(entry),
            None => {
                let name = entry.task_name().to_string();
                self.indices.insert(name.clone(), self.groups.len());
                self.groups.push((name, vec![entry]));
            }
        }
    }

    pub fn get(&self, task_name: &str) -> Option<&[ResolvedPipelineTask]> {
        self.indices
            .get(task_name)
            .map(|&idx| self.groups[idx].1.as_slice())
    }

    pub fn contains_key(&self, task_name: &str) -> bool {
        self.indices.contains_key(task_name)
    }

    /// Task names in first-insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// Groups in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ResolvedPipelineTask])> {
        self.groups
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    /// Number of distinct task names
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::models::{Param, TaskRef};

    fn entry(task: &str, run: &str) -> ResolvedPipelineTask {
        ResolvedPipelineTask::new(
            PipelineTask::new(task),
            RunIdentifier::TaskRun(run.to_string()),
        )
    }

    #[test]
    fn test_run_identifier_suffix_keeps_kind() {
        let task_run = RunIdentifier::TaskRun("a-taskRun".to_string());
        assert_eq!(
            task_run.with_suffix("3"),
            RunIdentifier::TaskRun("a-taskRun-3".to_string())
        );

        let custom_run = RunIdentifier::CustomRun("a-run".to_string());
        assert_eq!(
            custom_run.with_suffix("0"),
            RunIdentifier::CustomRun("a-run-0".to_string())
        );
        assert_eq!(custom_run.kind(), "CustomRun");
    }

    #[test]
    fn test_from_pipeline_assigns_run_kinds() {
        let mut build = PipelineTask::new("build");
        build.task_ref = Some(TaskRef::new("compile"));
        build.matrix = vec![Param::array("arch", ["amd64", "arm64"])];

        let mut notify = PipelineTask::new("notify");
        notify.task_ref = Some(TaskRef::custom("slack", "example.dev/v1", "Notifier"));

        let pipeline = Pipeline {
            name: "release".to_string(),
            tasks: vec![build],
            finally: vec![notify],
        };

        let state = PipelineRunState::from_pipeline(&pipeline, "release-run");
        assert_eq!(state.len(), 2);
        assert_eq!(
            state.entries()[0].run,
            RunIdentifier::TaskRun("release-run-build".to_string())
        );
        assert_eq!(
            state.entries()[1].run,
            RunIdentifier::CustomRun("release-run-notify".to_string())
        );
        assert_eq!(
            state.entries()[1]
                .resolved_task_resources
                .as_ref()
                .and_then(|r| r.kind.as_deref()),
            Some("Notifier")
        );
        assert!(state.entries()[0].is_matrixed());
    }

    #[test]
    fn test_multimap_groups_duplicate_names() {
        let state = PipelineRunState::new(vec![
            entry("b", "run-b-0"),
            entry("a", "run-a"),
            entry("b", "run-b-1"),
        ]);

        let map = state.to_multimap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);

        let b_runs: Vec<_> = map
            .get("b")
            .unwrap()
            .iter()
            .map(|e| e.run.name())
            .collect();
        assert_eq!(b_runs, vec!["run-b-0", "run-b-1"]);

        assert!(map.contains_key("a"));
        assert!(map.get("c").is_none());
    }

    #[test]
    fn test_multimap_is_independent_of_state() {
        let state = PipelineRunState::new(vec![entry("a", "run-a")]);
        let map = state.to_multimap();
        drop(state);
        assert_eq!(map.get("a").unwrap()[0].run.name(), "run-a");
    }
}
