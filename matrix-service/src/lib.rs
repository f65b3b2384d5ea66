// Matrix Service Library
// Deterministic fan-out of matrixed pipeline tasks into concrete runs

pub mod config;
pub mod error;
pub mod matrix;
pub mod parser;
pub mod state;
pub mod status;
pub mod validate;

// Re-export commonly used types
pub use config::{FanOutConfig, DEFAULT_MAX_COMBINATIONS};
pub use error::{MatrixError, MatrixResult};

// Re-export parser types
pub use parser::{
    Matrix, Param, ParamValue, ParseError, ParseErrorKind, ParseResult, Pipeline, PipelineParser,
    PipelineTask, TaskRef, ValidationError,
};

// Re-export engine types
pub use matrix::{
    check_combination_limits, fan_out, fan_out_checked, Combination, CombinationCounter,
    CombinationGenerator, StateMerger, TaskCombinations, TaskExpander,
};
pub use state::{PipelineRunState, ResolvedPipelineTask, RunIdentifier, TaskMultiMap};
pub use status::{child_references, ChildReference};
pub use validate::MatrixValidator;
