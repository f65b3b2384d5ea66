// Matrix Validation
// Semantic checks run on a parsed pipeline before any fan-out

use crate::config::FanOutConfig;
use crate::error::{MatrixError, MatrixResult};
use crate::matrix::combination::CombinationCounter;
use crate::parser::error::ValidationError;
use crate::parser::models::{Pipeline, PipelineTask};

use std::collections::HashSet;

/// Validator for matrixed pipelines
pub struct MatrixValidator;

impl MatrixValidator {
    /// Validate a pipeline, collecting every problem found.
    ///
    /// Task names must be unique across both `tasks` and `finally`.
    pub fn validate(
        pipeline: &Pipeline,
        config: &FanOutConfig,
    ) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let sections = [("tasks", &pipeline.tasks), ("finally", &pipeline.finally)];
        let mut task_names = HashSet::new();
        for (section, tasks) in sections {
            for (i, task) in tasks.iter().enumerate() {
                let task_path = format!("{}[{}]", section, i);

                if !task_names.insert(task.name.as_str()) {
                    errors.push(ValidationError::new(
                        format!("duplicate task name '{}'", task.name),
                        format!("{}.name", task_path),
                    ));
                }

                if task.is_matrixed() {
                    Self::validate_matrix(task, &task_path, config, &mut errors);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(errors = errors.len(), "pipeline failed matrix validation");
            Err(errors)
        }
    }

    /// Like [`MatrixValidator::validate`], folding the problems into a
    /// [`MatrixError::Validation`]
    pub fn check(pipeline: &Pipeline, config: &FanOutConfig) -> MatrixResult<()> {
        Self::validate(pipeline, config).map_err(MatrixError::Validation)
    }

    fn validate_matrix(
        task: &PipelineTask,
        task_path: &str,
        config: &FanOutConfig,
        errors: &mut Vec<ValidationError>,
    ) {
        let mut param_names = HashSet::new();
        for (j, param) in task.matrix.iter().enumerate() {
            let path = format!("{}.matrix[{}]", task_path, j);

            if !param_names.insert(param.name.as_str()) {
                errors.push(
                    ValidationError::new(
                        format!("duplicate matrix param '{}'", param.name),
                        &path,
                    )
                    .with_suggestion("matrix param names must be unique within a task"),
                );
            }

            match param.value.as_array() {
                None => errors.push(
                    ValidationError::new(
                        format!("matrix param '{}' must be an array of strings", param.name),
                        &path,
                    )
                    .with_suggestion(format!(
                        "use a list, e.g. value: [{}]",
                        param.value.as_str().unwrap_or_default()
                    )),
                ),
                Some([]) => errors.push(ValidationError::new(
                    format!("matrix param '{}' has no values", param.name),
                    &path,
                )),
                Some(_) => {}
            }
        }

        if task.has_resource_bindings() {
            errors.push(ValidationError::new(
                "matrixed tasks cannot bind input or output resources",
                format!("{}.resources", task_path),
            ));
        }

        if !task.conditions.is_empty() {
            errors.push(
                ValidationError::new(
                    "matrixed tasks cannot declare conditions",
                    format!("{}.conditions", task_path),
                )
                .with_suggestion("use 'when' expressions on the task instead"),
            );
        }

        let count = CombinationCounter::count(&task.matrix);
        if !config.allows(count) {
            errors.push(
                ValidationError::new(
                    format!(
                        "matrix produces {} combinations, more than the maximum of {}",
                        count, config.max_combinations
                    ),
                    format!("{}.matrix", task_path),
                )
                .with_suggestion("reduce the number of matrix values or raise maxCombinations"),
            );
        }
    }
}
