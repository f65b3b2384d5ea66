// Matrix Engine Module
// Combination generation, task fan-out and state merging

pub mod combination;
pub mod fanout;
pub mod merge;

// Re-export key types
pub use combination::{Combination, CombinationCounter, CombinationGenerator};
pub use fanout::{
    check_combination_limits, fan_out, fan_out_checked, TaskCombinations, TaskExpander,
};
pub use merge::StateMerger;
