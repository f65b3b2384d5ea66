use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use matrix_service::{CombinationCounter, FanOutConfig, MatrixError, MatrixValidator};

use super::load_pipeline;
use crate::output;

/// Validate a pipeline YAML file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the pipeline YAML file
    pub pipeline: PathBuf,
}

pub fn execute(args: ValidateArgs, config: &FanOutConfig) -> Result<()> {
    output::status("Validating", &format!("{}", args.pipeline.display()));

    let pipeline = load_pipeline(&args.pipeline)?;
    output::check("YAML syntax valid");

    let matrixed: Vec<_> = pipeline.all_tasks().filter(|t| t.is_matrixed()).collect();
    output::check(&format!(
        "Structure: {} tasks, {} finally, {} matrixed",
        pipeline.tasks.len(),
        pipeline.finally.len(),
        matrixed.len()
    ));

    match MatrixValidator::validate(&pipeline, config) {
        Ok(()) => {
            for task in matrixed {
                output::check(&format!(
                    "{}: {} combinations",
                    task.name,
                    CombinationCounter::count(&task.matrix)
                ));
            }
            output::check("Matrix validation passed");
            Ok(())
        }
        Err(errors) => {
            output::error(&format!("{} validation error(s):", errors.len()));
            for error in &errors {
                output::error(&format!("  - [{}] {}", error.path, error.message));
                if let Some(suggestion) = &error.suggestion {
                    output::info(&format!("    Suggestion: {}", suggestion));
                }
            }
            Err(MatrixError::Validation(errors).into())
        }
    }
}
