// Matrix Fan-out
// Expands matrixed task entries into one concrete entry per combination

use crate::config::FanOutConfig;
use crate::error::{MatrixError, MatrixResult};
use crate::matrix::combination::{Combination, CombinationCounter, CombinationGenerator};
use crate::state::{PipelineRunState, ResolvedPipelineTask, ResolvedTaskResources};

use serde::Serialize;

/// Combinations generated for one matrixed pipeline task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCombinations {
    pub pipeline_task_name: String,
    pub combinations: Vec<Combination>,
}

/// Turns a matrixed entry into its concrete per-combination entries
pub struct TaskExpander;

impl TaskExpander {
    /// Expand `entry` over `combinations`, one entry per combination in id order.
    ///
    /// Returns the entry unchanged when it declares no matrix.
    pub fn expand(
        entry: &ResolvedPipelineTask,
        combinations: &[Combination],
    ) -> Vec<ResolvedPipelineTask> {
        if !entry.is_matrixed() {
            return vec![entry.clone()];
        }

        combinations
            .iter()
            .map(|combination| Self::expand_one(entry, combination))
            .collect()
    }

    /// Generate the entry's combinations and expand over them
    pub fn fan_out_task(
        entry: &ResolvedPipelineTask,
    ) -> (Vec<ResolvedPipelineTask>, Option<TaskCombinations>) {
        if !entry.is_matrixed() {
            return (vec![entry.clone()], None);
        }

        let combinations = CombinationGenerator::generate(&entry.pipeline_task.matrix);
        let expanded = Self::expand(entry, &combinations);

        tracing::debug!(
            task = %entry.task_name(),
            combinations = combinations.len(),
            "fanned out matrixed task"
        );

        let record = TaskCombinations {
            pipeline_task_name: entry.task_name().to_string(),
            combinations,
        };
        (expanded, Some(record))
    }

    fn expand_one(entry: &ResolvedPipelineTask, combination: &Combination) -> ResolvedPipelineTask {
        let mut pipeline_task = entry.pipeline_task.clone();
        pipeline_task.matrix = Vec::new();
        pipeline_task.resources = None;
        pipeline_task.conditions = Vec::new();
        pipeline_task
            .params
            .extend(combination.params.iter().cloned());

        // Legacy input/output bindings are not carried onto matrixed runs
        let resolved_task_resources =
            entry
                .resolved_task_resources
                .as_ref()
                .map(|resources| ResolvedTaskResources {
                    task_name: resources.task_name.clone(),
                    kind: resources.kind.clone(),
                    task_spec: resources.task_spec.clone(),
                    inputs: Vec::new(),
                    outputs: Vec::new(),
                });

        ResolvedPipelineTask {
            pipeline_task,
            run: entry.run.with_suffix(&combination.id),
            resolved_task_resources,
            condition_checks: Vec::new(),
            combination_id: Some(combination.id.clone()),
        }
    }
}

/// Fan out every entry of a run state, in state order.
///
/// Entries without a matrix pass through unchanged. Each matrixed task also
/// yields its [`TaskCombinations`] record.
#[tracing::instrument(skip(state), fields(entries = state.len()))]
pub fn fan_out(state: &PipelineRunState) -> (PipelineRunState, Vec<TaskCombinations>) {
    let mut fanned_out = PipelineRunState::default();
    let mut records = Vec::new();

    for entry in state {
        let (expanded, record) = TaskExpander::fan_out_task(entry);
        for e in expanded {
            fanned_out.push(e);
        }
        records.extend(record);
    }

    (fanned_out, records)
}

/// Reject the first matrixed task whose combination count exceeds the limit
pub fn check_combination_limits(
    state: &PipelineRunState,
    config: &FanOutConfig,
) -> MatrixResult<()> {
    for entry in state.iter().filter(|e| e.is_matrixed()) {
        let count = CombinationCounter::count(&entry.pipeline_task.matrix);
        if !config.allows(count) {
            tracing::warn!(
                task = %entry.task_name(),
                count,
                max = config.max_combinations,
                "matrix exceeds combination limit"
            );
            return Err(MatrixError::TooManyCombinations {
                task: entry.task_name().to_string(),
                count,
                max: config.max_combinations,
            });
        }
    }
    Ok(())
}

/// Like [`fan_out`], but first counts every matrix against the configured
/// maximum. Nothing is expanded if any task is over the limit.
pub fn fan_out_checked(
    state: &PipelineRunState,
    config: &FanOutConfig,
) -> MatrixResult<(PipelineRunState, Vec<TaskCombinations>)> {
    check_combination_limits(state, config)?;
    Ok(fan_out(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::models::{
        Param, PipelineTask, PipelineTaskCondition, PipelineTaskResources, ResourceBinding,
        TaskRef,
    };
    use crate::state::{ResolvedConditionCheck, RunIdentifier};

    fn matrixed_entry() -> ResolvedPipelineTask {
        let mut task = PipelineTask::new("a-task");
        task.task_ref = Some(TaskRef::new("a-taskRef"));
        task.params = vec![Param::string("foo", "a-value")];
        task.matrix = vec![Param::array("platform", ["north", "east", "south", "west"])];

        ResolvedPipelineTask::new(task, RunIdentifier::TaskRun("a-taskRun".to_string()))
    }

    fn plain_entry(name: &str) -> ResolvedPipelineTask {
        ResolvedPipelineTask::new(
            PipelineTask::new(name),
            RunIdentifier::TaskRun(format!("{}-run", name)),
        )
    }

    #[test]
    fn test_expand_simple() {
        let entry = matrixed_entry();
        let combinations = CombinationGenerator::generate(&entry.pipeline_task.matrix);

        let expanded = TaskExpander::expand(&entry, &combinations);

        assert_eq!(expanded.len(), 4);
        for (i, (e, value)) in expanded
            .iter()
            .zip(["north", "east", "south", "west"])
            .enumerate()
        {
            assert_eq!(e.run, RunIdentifier::TaskRun(format!("a-taskRun-{}", i)));
            assert_eq!(e.combination_id, Some(i.to_string()));
            assert_eq!(e.task_name(), "a-task");
            assert!(e.pipeline_task.matrix.is_empty());
            assert_eq!(
                e.pipeline_task.params,
                vec![
                    Param::string("foo", "a-value"),
                    Param::string("platform", value),
                ]
            );
            assert_eq!(e.pipeline_task.task_ref, Some(TaskRef::new("a-taskRef")));
        }

        // source entry is untouched
        assert_eq!(entry, matrixed_entry());
    }

    #[test]
    fn test_expand_without_matrix_is_identity() {
        let entry = plain_entry("b-task");

        let expanded = TaskExpander::expand(&entry, &[]);

        assert_eq!(expanded, vec![entry]);
        assert_eq!(expanded[0].run.name(), "b-task-run");
        assert_eq!(expanded[0].combination_id, None);
    }

    #[test]
    fn test_expand_custom_run() {
        let mut entry = matrixed_entry();
        entry.pipeline_task.task_ref = Some(TaskRef::custom("wait", "example.dev/v1", "Wait"));
        entry.run = RunIdentifier::CustomRun("a-run".to_string());

        let (expanded, _) = TaskExpander::fan_out_task(&entry);

        let runs: Vec<_> = expanded.iter().map(|e| e.run.clone()).collect();
        assert_eq!(
            runs,
            (0..4)
                .map(|i| RunIdentifier::CustomRun(format!("a-run-{}", i)))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_expand_keeps_duplicate_param_names() {
        let mut entry = matrixed_entry();
        entry.pipeline_task.params = vec![Param::string("platform", "static")];

        let (expanded, _) = TaskExpander::fan_out_task(&entry);

        assert_eq!(
            expanded[0].pipeline_task.params,
            vec![
                Param::string("platform", "static"),
                Param::string("platform", "north"),
            ]
        );
    }

    #[test]
    fn test_expand_drops_legacy_bindings() {
        let mut entry = matrixed_entry();
        let binding = ResourceBinding {
            name: "source".to_string(),
            resource: "repo".to_string(),
        };
        entry.pipeline_task.resources = Some(PipelineTaskResources {
            inputs: vec![binding.clone()],
            outputs: vec![],
        });
        entry.pipeline_task.conditions = vec![PipelineTaskCondition {
            condition_ref: "is-main".to_string(),
            params: vec![],
        }];
        entry.condition_checks = vec![ResolvedConditionCheck {
            condition_name: "is-main".to_string(),
            check_name: "a-taskRun-is-main".to_string(),
        }];
        entry.resolved_task_resources = Some(ResolvedTaskResources {
            task_name: Some("a-taskRef".to_string()),
            kind: Some("Task".to_string()),
            task_spec: Some(serde_yaml::from_str("steps: [{name: echo}]").unwrap()),
            inputs: vec![binding.clone()],
            outputs: vec![binding],
        });

        let (expanded, _) = TaskExpander::fan_out_task(&entry);

        for e in &expanded {
            assert!(e.pipeline_task.resources.is_none());
            assert!(e.pipeline_task.conditions.is_empty());
            assert!(e.condition_checks.is_empty());

            let resources = e.resolved_task_resources.as_ref().unwrap();
            assert_eq!(resources.task_name.as_deref(), Some("a-taskRef"));
            assert_eq!(resources.kind.as_deref(), Some("Task"));
            assert_eq!(
                resources.task_spec,
                entry.resolved_task_resources.as_ref().unwrap().task_spec
            );
            assert!(resources.inputs.is_empty());
            assert!(resources.outputs.is_empty());
        }
    }

    #[test]
    fn test_expanded_entries_are_independent() {
        let entry = matrixed_entry();
        let (mut expanded, _) = TaskExpander::fan_out_task(&entry);

        expanded[0]
            .pipeline_task
            .params
            .push(Param::string("extra", "x"));

        assert_eq!(expanded[1].pipeline_task.params.len(), 2);
        assert_eq!(entry.pipeline_task.params.len(), 1);
    }

    #[test]
    fn test_fan_out_state() {
        let state = PipelineRunState::new(vec![plain_entry("x"), matrixed_entry()]);

        let (fanned_out, records) = fan_out(&state);

        assert_eq!(
            fanned_out.run_names(),
            vec![
                "x-run",
                "a-taskRun-0",
                "a-taskRun-1",
                "a-taskRun-2",
                "a-taskRun-3"
            ]
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pipeline_task_name, "a-task");
        assert_eq!(records[0].combinations.len(), 4);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_fan_out_is_repeatable() {
        let state = PipelineRunState::new(vec![matrixed_entry(), plain_entry("y")]);
        assert_eq!(fan_out(&state), fan_out(&state));
    }

    #[test]
    fn test_fan_out_checked_within_limit() {
        let state = PipelineRunState::new(vec![matrixed_entry()]);
        let config = FanOutConfig::with_max_combinations(4);

        let (fanned_out, _) = fan_out_checked(&state, &config).unwrap();
        assert_eq!(fanned_out.len(), 4);
    }

    #[test]
    fn test_fan_out_checked_over_limit() {
        let state = PipelineRunState::new(vec![plain_entry("x"), matrixed_entry()]);
        let config = FanOutConfig::with_max_combinations(3);

        let err = fan_out_checked(&state, &config).unwrap_err();
        match err {
            MatrixError::TooManyCombinations { task, count, max } => {
                assert_eq!(task, "a-task");
                assert_eq!(count, 4);
                assert_eq!(max, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
