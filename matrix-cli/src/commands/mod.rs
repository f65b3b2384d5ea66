pub mod expand;
pub mod validate;

use std::path::Path;

use color_eyre::Result;

use matrix_service::{MatrixError, Pipeline, PipelineParser};

/// Parse a pipeline file. Parse errors carry the source excerpt and any
/// suggestion into the report.
pub fn load_pipeline(path: &Path) -> Result<Pipeline> {
    if !path.exists() {
        color_eyre::eyre::bail!("Pipeline file not found: {}", path.display());
    }

    let pipeline = PipelineParser::parse_file(path).map_err(MatrixError::Parse)?;
    Ok(pipeline)
}
