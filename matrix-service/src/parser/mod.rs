// Pipeline YAML Parser
// Parses pipeline documents declaring tasks, params and matrices

pub mod error;
pub mod models;

pub use error::{ParseError, ParseErrorKind, ParseResult, ValidationError};
pub use models::*;

use std::fs;
use std::path::Path;

/// Parser for pipeline documents
pub struct PipelineParser;

impl PipelineParser {
    /// Parse pipeline from YAML string
    pub fn parse(content: &str) -> ParseResult<Pipeline> {
        let pipeline: Pipeline =
            serde_yaml::from_str(content).map_err(|e| ParseError::from_yaml_error(&e, content))?;

        tracing::debug!(
            pipeline = %pipeline.name,
            tasks = pipeline.tasks.len(),
            finally = pipeline.finally.len(),
            "parsed pipeline"
        );
        Ok(pipeline)
    }

    /// Parse pipeline from file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<Pipeline> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ParseError::io(format!("failed to read {}: {}", path.display(), e)))?;

        Self::parse(&content)
    }
}
