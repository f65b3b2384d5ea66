use std::path::PathBuf;

use clap::{Args, ValueEnum};
use color_eyre::Result;

use matrix_service::{
    child_references, fan_out_checked, FanOutConfig, MatrixError, MatrixValidator,
    PipelineRunState, ResolvedPipelineTask, TaskCombinations,
};

use super::load_pipeline;
use crate::output;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print the runs generated for a pipeline
#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Path to the pipeline YAML file
    pub pipeline: PathBuf,

    /// Pipeline run name used as the prefix of every run identifier
    #[arg(long, default_value = "run")]
    pub run: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: ExpandArgs, config: &FanOutConfig) -> Result<()> {
    let pipeline = load_pipeline(&args.pipeline)?;

    if let Err(err) = MatrixValidator::check(&pipeline, config) {
        if let MatrixError::Validation(errors) = &err {
            for error in errors {
                output::error(&error.to_string());
            }
        }
        return Err(err.into());
    }

    let declared = PipelineRunState::from_pipeline(&pipeline, &args.run);
    let (fanned_out, records) = fan_out_checked(&declared, config)?;
    let references = child_references(&declared, &fanned_out.to_multimap());

    match args.format {
        OutputFormat::Json => {
            let document = serde_json::json!({
                "pipeline": pipeline.name,
                "combinations": records,
                "childReferences": references,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Text => {
            output::header(&format!(
                "{}: {} declared tasks, {} runs",
                pipeline.name,
                declared.len(),
                fanned_out.len()
            ));
            let entries = fanned_out.to_multimap();
            for entry in &declared {
                let Some(runs) = entries.get(entry.task_name()) else {
                    continue;
                };
                output::status("Task", entry.task_name());
                for run in runs {
                    output::run_line(run.run.name(), &describe(run, &records));
                }
            }
        }
    }

    Ok(())
}

fn describe(entry: &ResolvedPipelineTask, records: &[TaskCombinations]) -> String {
    let Some(id) = &entry.combination_id else {
        return entry.run.kind().to_string();
    };

    let combination = records
        .iter()
        .filter(|r| r.pipeline_task_name == entry.task_name())
        .flat_map(|r| r.combinations.iter())
        .find(|c| &c.id == id);

    let values: Vec<String> = combination
        .map(|c| {
            c.params
                .iter()
                .map(|p| format!("{}={}", p.name, p.value.as_str().unwrap_or_default()))
                .collect()
        })
        .unwrap_or_default();
    format!("{} #{} [{}]", entry.run.kind(), id, values.join(", "))
}
