use super::CompileOptions;
use super::allocator::VariableAllocator;
use super::arguments::ordered_arguments;
use super::diagnostics::{Diagnostic, TraversalTrace};
use crate::graph::{Condition, FunctionCall, GraphSnapshot, Handle, Node, NodeBody, NodeVariant};
use crate::registry::FunctionRegistry;
use crate::script::{CallExpr, Statement};
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Walks the snapshot breadth-first and serializes every node it reaches.
///
/// Allocator, diagnostics and trace are shared by all traversal calls of one pass;
/// each call keeps its own visited set.
pub(super) struct ScriptWalker<'a> {
    snapshot: &'a GraphSnapshot,
    registry: &'a FunctionRegistry,
    options: &'a CompileOptions,
    index: AHashMap<&'a str, &'a Node>,
    allocator: VariableAllocator,
    diagnostics: Vec<Diagnostic>,
    trace: TraversalTrace,
    /// Conditionals whose branches are currently being expanded.
    expanding: Vec<&'a str>,
    limit_reported: bool,
}

impl<'a> ScriptWalker<'a> {
    pub(super) fn new(
        snapshot: &'a GraphSnapshot,
        registry: &'a FunctionRegistry,
        options: &'a CompileOptions,
    ) -> Self {
        let mut index = AHashMap::with_capacity(snapshot.nodes.len());
        for node in &snapshot.nodes {
            // First node with a given id wins, matching lookup by array order.
            index.entry(node.id.as_str()).or_insert(node);
        }

        Self {
            snapshot,
            registry,
            options,
            index,
            allocator: VariableAllocator::for_snapshot(snapshot),
            diagnostics: Vec::new(),
            trace: TraversalTrace::default(),
            expanding: Vec::new(),
            limit_reported: false,
        }
    }

    pub(super) fn report(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "compile diagnostic");
        self.diagnostics.push(diagnostic);
    }

    pub(super) fn registry(&self) -> &'a FunctionRegistry {
        self.registry
    }

    pub(super) fn finish(self) -> (Vec<Diagnostic>, TraversalTrace, VariableAllocator) {
        (self.diagnostics, self.trace, self.allocator)
    }

    /// One traversal call: breadth-first from `start_id` along `output` handles.
    pub(super) fn walk(&mut self, start_id: &str, referenced_by: &str) -> Vec<Statement> {
        let snapshot = self.snapshot;
        let call = self.trace.begin(start_id);
        let mut statements = Vec::new();
        let mut visited: AHashSet<String> = AHashSet::new();
        let mut queue: VecDeque<(String, String)> = VecDeque::new();
        queue.push_back((start_id.to_string(), referenced_by.to_string()));

        while let Some((node_id, from)) = queue.pop_front() {
            if !visited.insert(node_id.clone()) {
                continue;
            }
            let Some(node) = self.index.get(node_id.as_str()).copied() else {
                self.report(Diagnostic::NodeNotFound {
                    node_id,
                    referenced_by: from,
                });
                continue;
            };
            self.trace.record(call, &node.id);
            trace!(node_id = %node.id, variant = %node.variant(), "visiting node");

            if node.variant() == NodeVariant::Timing {
                self.report(Diagnostic::UnexpectedTiming {
                    node_id: node.id.clone(),
                });
                continue;
            }

            if let Some(statement) = self.visit(node) {
                statements.push(statement);
            }

            for edge in snapshot.outgoing(&node.id, Handle::Output) {
                if !visited.contains(&edge.target_id) {
                    queue.push_back((edge.target_id.clone(), node.id.clone()));
                }
            }
        }

        statements
    }

    fn visit(&mut self, node: &'a Node) -> Option<Statement> {
        match &node.body {
            NodeBody::Conditional(condition) => self.expand_conditional(node, condition),
            NodeBody::ContinueIf(condition) => Some(Statement::ContinueIf {
                condition: condition.to_string(),
            }),
            NodeBody::Consequence(call) => self.serialize_call(node, call).map(Statement::Call),
            NodeBody::ValueAcquisition(call) => {
                let call = self.serialize_call(node, call)?;
                Some(self.bind_result(node, call))
            }
            NodeBody::Assignment(assignment) => match &assignment.embedded {
                Some(embedded) => {
                    let call = self.serialize_call(node, &embedded.call)?;
                    Some(self.bind_result(node, call))
                }
                None => {
                    self.report(Diagnostic::MissingEmbeddedNode {
                        node_id: node.id.clone(),
                    });
                    None
                }
            },
            // Filtered out by `walk`.
            NodeBody::Timing(_) => None,
        }
    }

    fn bind_result(&mut self, node: &Node, call: CallExpr) -> Statement {
        match self.allocator.bind(node) {
            Some(slot) => Statement::Assign { slot, call },
            None => {
                self.report(Diagnostic::VariableSlotsExhausted {
                    node_id: node.id.clone(),
                });
                Statement::Call(call)
            }
        }
    }

    fn expand_conditional(&mut self, node: &'a Node, condition: &Condition) -> Option<Statement> {
        if self.expanding.contains(&node.id.as_str()) {
            self.report(Diagnostic::RecursiveBranch {
                node_id: node.id.clone(),
            });
            return None;
        }

        self.expanding.push(&node.id);
        let on_true = self.branch(node, Handle::True).unwrap_or_default();
        let on_false = self.branch(node, Handle::False);
        self.expanding.pop();

        Some(Statement::Conditional {
            condition: condition.to_string(),
            on_true,
            on_false,
        })
    }

    /// Compiles the branch behind `handle` in a fresh traversal call.
    /// Only the first connection is followed; `None` when the handle is unconnected
    /// or the pass has used up its traversal calls.
    fn branch(&mut self, node: &'a Node, handle: Handle) -> Option<Vec<Statement>> {
        let snapshot = self.snapshot;
        let mut edges = snapshot.outgoing(&node.id, handle);
        let first = edges.next()?;
        let ignored = edges.count();
        if ignored > 0 && self.options.warn_on_branch_fanout {
            self.report(Diagnostic::BranchFanOut {
                node_id: node.id.clone(),
                handle,
                ignored,
            });
        }
        let limit = self.options.max_traversal_calls;
        if self.trace.calls.len() >= limit {
            if !self.limit_reported {
                self.limit_reported = true;
                self.report(Diagnostic::TraversalLimitReached {
                    node_id: node.id.clone(),
                    limit,
                });
            }
            return None;
        }
        debug!(node_id = %node.id, %handle, target = %first.target_id, "expanding branch");
        Some(self.walk(&first.target_id, &node.id))
    }

    /// Serializes a call in schema order, substituting bound variables from upstream nodes.
    /// Unregistered functions are reported and yield `None`.
    pub(super) fn serialize_call(&mut self, node: &Node, call: &FunctionCall) -> Option<CallExpr> {
        let Some(schema) = self.registry.lookup(&call.function_name) else {
            self.report(Diagnostic::UnknownFunction {
                node_id: node.id.clone(),
                function_name: call.function_name.clone(),
            });
            return None;
        };

        let mut arguments = ordered_arguments(schema, &call.parameters);
        if self.options.substitute_variables {
            self.substitute_variables(node, &mut arguments);
        }
        Some(CallExpr::new(call.function_name.clone(), arguments))
    }

    /// Every incoming edge from a node holding a slot overwrites argument 0.
    /// Which parameter the edge logically feeds is not tracked.
    fn substitute_variables(&mut self, node: &Node, arguments: &mut [String]) {
        let snapshot = self.snapshot;
        for edge in snapshot.incoming(&node.id) {
            let Some(slot) = self.allocator.slot_of(&edge.source_id) else {
                continue;
            };
            match arguments.first_mut() {
                Some(first) => *first = slot.to_string(),
                None => self.report(Diagnostic::ArgumentSubstitutionSkipped {
                    node_id: node.id.clone(),
                    slot,
                }),
            }
        }
    }
}
