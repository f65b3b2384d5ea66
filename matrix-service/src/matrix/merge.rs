// State Merging
// Reintegrates fanned-out entries into the declaration list and the run state

use crate::state::{PipelineRunState, TaskMultiMap};

/// Merge policies for fanned-out entries.
///
/// The two policies feed different consumers and intentionally differ in
/// where expanded entries land.
pub struct StateMerger;

impl StateMerger {
    /// Splice expanded entries in at the position of the task they came from.
    ///
    /// Walks `declared` in order; a task present in `expanded` is replaced by
    /// all of its expanded entries, any other task is kept as-is.
    pub fn merge_declarations(
        declared: &PipelineRunState,
        expanded: &TaskMultiMap,
    ) -> PipelineRunState {
        let mut merged = PipelineRunState::default();
        for entry in declared {
            match expanded.get(entry.task_name()) {
                Some(entries) => {
                    for e in entries {
                        merged.push(e.clone());
                    }
                }
                None => merged.push(entry.clone()),
            }
        }
        merged
    }

    /// Drop every entry of `state` whose task was expanded, keep the rest in
    /// order, then append the expanded entries as one block in `expanded` order.
    pub fn merge_run_state(
        state: &PipelineRunState,
        expanded: &PipelineRunState,
    ) -> PipelineRunState {
        let expanded_by_name = expanded.to_multimap();

        state
            .iter()
            .filter(|entry| !expanded_by_name.contains_key(entry.task_name()))
            .chain(expanded.iter())
            .cloned()
            .collect()
    }
}
