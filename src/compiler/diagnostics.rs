use crate::graph::{Handle, VariableSlot};
use ahash::AHashMap;
use thiserror::Error;

/// A non-fatal problem found while compiling. The offending node is skipped and
/// traversal carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("Node '{node_id}' referenced by '{referenced_by}' does not exist")]
    NodeNotFound {
        node_id: String,
        referenced_by: String,
    },

    #[error("Node '{node_id}' calls unregistered function '{function_name}'")]
    UnknownFunction {
        node_id: String,
        function_name: String,
    },

    #[error("Assignment node '{node_id}' has no embedded node and emits nothing")]
    MissingEmbeddedNode { node_id: String },

    #[error("Conditional '{node_id}' has {ignored} extra connection(s) on '{handle}' that were ignored")]
    BranchFanOut {
        node_id: String,
        handle: Handle,
        ignored: usize,
    },

    #[error("No free variable slot for node '{node_id}'; its result is left unbound")]
    VariableSlotsExhausted { node_id: String },

    #[error("Conditional '{node_id}' is reachable from its own branch and was not expanded again")]
    RecursiveBranch { node_id: String },

    #[error("Node '{node_id}' has no argument to receive variable {slot}")]
    ArgumentSubstitutionSkipped { node_id: String, slot: VariableSlot },

    #[error("Timing node '{node_id}' is reachable from the entry point and was ignored")]
    UnexpectedTiming { node_id: String },

    #[error("Timing node '{node_id}' is not the entry point and was ignored")]
    AdditionalEntryPoint { node_id: String },

    #[error("Traversal limit of {limit} calls reached at conditional '{node_id}'; remaining branches were left empty")]
    TraversalLimitReached { node_id: String, limit: usize },
}

/// The node ids one traversal call visited, in visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalRecord {
    pub start: String,
    pub visited: Vec<String>,
}

/// Instrumentation for every traversal call made during a compile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalTrace {
    pub calls: Vec<TraversalRecord>,
}

impl TraversalTrace {
    pub(super) fn begin(&mut self, start: &str) -> usize {
        self.calls.push(TraversalRecord {
            start: start.to_string(),
            visited: Vec::new(),
        });
        self.calls.len() - 1
    }

    pub(super) fn record(&mut self, call: usize, node_id: &str) {
        if let Some(record) = self.calls.get_mut(call) {
            record.visited.push(node_id.to_string());
        }
    }

    /// The highest number of times any single node was visited within one call.
    pub fn max_visits_per_call(&self) -> usize {
        self.calls
            .iter()
            .flat_map(|record| {
                let mut counts: AHashMap<&str, usize> = AHashMap::new();
                for id in &record.visited {
                    *counts.entry(id.as_str()).or_default() += 1;
                }
                counts.into_values().max()
            })
            .max()
            .unwrap_or(0)
    }

    pub fn total_visits(&self) -> usize {
        self.calls.iter().map(|record| record.visited.len()).sum()
    }
}
