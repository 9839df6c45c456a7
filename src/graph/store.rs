use super::model::*;
use super::VariableSlot;
use crate::error::GraphError;
use crate::registry::{FunctionCategory, FunctionRegistry};
use std::sync::Arc;
use tracing::debug;

/// An immutable view of the nodes and connections at one point in time.
///
/// This is the only thing the compiler ever reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Connection>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Connection>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Connections leaving `id` through `handle`, in edge order.
    pub fn outgoing<'a>(&'a self, id: &'a str, handle: Handle) -> impl Iterator<Item = &'a Connection> {
        self.edges
            .iter()
            .filter(move |e| e.source_id == id && e.source_handle == handle)
    }

    /// Connections arriving at `id`, in edge order.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Connection> {
        self.edges.iter().filter(move |e| e.target_id == id)
    }

    pub fn timing_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| n.variant() == NodeVariant::Timing)
    }
}

/// What kind of node to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTemplate {
    /// A registry-backed node; the variant follows from the function's category.
    Function(String),
    Conditional,
    ContinueIf,
    Assignment,
}

/// Holds the graph being edited.
///
/// Every operation leaves `self` untouched and returns a new store, so a snapshot
/// handed to the compiler can never change underneath it.
#[derive(Debug, Clone)]
pub struct GraphStore {
    snapshot: GraphSnapshot,
    registry: Arc<FunctionRegistry>,
    next_id: u64,
}

impl GraphStore {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        Self::from_snapshot(GraphSnapshot::default(), registry)
    }

    /// Wraps an existing snapshot, e.g. one loaded from an interchange document.
    pub fn from_snapshot(snapshot: GraphSnapshot, registry: Arc<FunctionRegistry>) -> Self {
        Self {
            snapshot,
            registry,
            next_id: 0,
        }
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> GraphSnapshot {
        self.snapshot
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.snapshot.node(id)
    }

    /// Creates a node from `template`, returning the new store and the node.
    pub fn add_node(
        &self,
        template: NodeTemplate,
        params: Parameters,
        position: Position,
    ) -> Result<(Self, Node), GraphError> {
        let body = match template {
            NodeTemplate::Function(name) => {
                let schema = self
                    .registry
                    .lookup(&name)
                    .ok_or_else(|| GraphError::UnknownFunction(name.clone()))?;
                let call = FunctionCall {
                    function_name: name.clone(),
                    parameters: params,
                };
                match schema.category {
                    FunctionCategory::Timing => NodeBody::Timing(call),
                    FunctionCategory::ValueAcquisition => NodeBody::ValueAcquisition(call),
                    FunctionCategory::Consequence => NodeBody::Consequence(call),
                    other => {
                        return Err(GraphError::NotPlaceable {
                            function_name: name,
                            category: other.to_string(),
                        });
                    }
                }
            }
            NodeTemplate::Conditional => NodeBody::Conditional(Condition::default()),
            NodeTemplate::ContinueIf => NodeBody::ContinueIf(Condition::default()),
            NodeTemplate::Assignment => NodeBody::Assignment(Assignment::default()),
        };

        let mut next = self.clone();
        let id = next.fresh_id();
        let node = Node {
            id,
            position,
            body,
        };
        debug!(node_id = %node.id, variant = %node.variant(), "adding node");
        next.snapshot.nodes.push(node.clone());
        Ok((next, node))
    }

    /// Replaces a node's parameter map. For an Assignment this targets the embedded node.
    pub fn update_node_parameters(&self, id: &str, patch: Parameters) -> Result<Self, GraphError> {
        self.with_node(id, |node| {
            let variant = node.variant();
            match &mut node.body {
                NodeBody::Timing(call) | NodeBody::ValueAcquisition(call) | NodeBody::Consequence(call) => {
                    call.parameters = patch;
                    Ok(())
                }
                NodeBody::Assignment(assignment) => {
                    let embedded = assignment
                        .embedded
                        .as_mut()
                        .ok_or_else(|| GraphError::MissingEmbeddedNode(node.id.clone()))?;
                    embedded.call.parameters = patch;
                    Ok(())
                }
                NodeBody::Conditional(_) | NodeBody::ContinueIf(_) => Err(GraphError::NotParameterized {
                    node_id: node.id.clone(),
                    variant,
                }),
            }
        })
    }

    /// Replaces the condition of a Conditional or ContinueIf node.
    pub fn set_condition(&self, id: &str, condition: Condition) -> Result<Self, GraphError> {
        self.with_node(id, |node| {
            let variant = node.variant();
            match &mut node.body {
                NodeBody::Conditional(current) | NodeBody::ContinueIf(current) => {
                    *current = condition;
                    Ok(())
                }
                _ => Err(GraphError::NotConditional {
                    node_id: node.id.clone(),
                    variant,
                }),
            }
        })
    }

    /// Places a value-producing function inside an Assignment, replacing any previous one.
    pub fn embed_node(
        &self,
        assignment_id: &str,
        function_name: &str,
        params: Parameters,
    ) -> Result<Self, GraphError> {
        let schema = self
            .registry
            .lookup(function_name)
            .ok_or_else(|| GraphError::UnknownFunction(function_name.to_string()))?;
        if !schema.is_value_producing() {
            return Err(GraphError::NotValueProducing(function_name.to_string()));
        }
        let embedded_id = format!("{}_embedded", assignment_id);
        self.with_node(assignment_id, |node| match &mut node.body {
            NodeBody::Assignment(assignment) => {
                assignment.embedded = Some(ValueAcquisitionNode {
                    id: embedded_id,
                    call: FunctionCall {
                        function_name: function_name.to_string(),
                        parameters: params,
                    },
                });
                Ok(())
            }
            _ => Err(GraphError::NotAnAssignment(node.id.clone())),
        })
    }

    pub fn bind_variable(&self, assignment_id: &str, slot: VariableSlot) -> Result<Self, GraphError> {
        self.with_node(assignment_id, |node| match &mut node.body {
            NodeBody::Assignment(assignment) => {
                assignment.bound_variable = Some(slot);
                Ok(())
            }
            _ => Err(GraphError::NotAnAssignment(node.id.clone())),
        })
    }

    pub fn move_node(&self, id: &str, position: Position) -> Result<Self, GraphError> {
        self.with_node(id, |node| {
            node.position = position;
            Ok(())
        })
    }

    /// Removes a node together with every connection touching it.
    pub fn remove_node(&self, id: &str) -> Result<Self, GraphError> {
        if !self.snapshot.contains(id) {
            return Err(GraphError::NodeNotFound(id.to_string()));
        }
        let mut next = self.clone();
        next.snapshot.nodes.retain(|n| n.id != id);
        next.snapshot
            .edges
            .retain(|e| e.source_id != id && e.target_id != id);
        debug!(node_id = id, "removed node");
        Ok(next)
    }

    pub fn connect(
        &self,
        source_id: &str,
        source_handle: Handle,
        target_id: &str,
        target_handle: Handle,
    ) -> Result<Self, GraphError> {
        let source = self
            .node(source_id)
            .ok_or_else(|| GraphError::NodeNotFound(source_id.to_string()))?;
        let target = self
            .node(target_id)
            .ok_or_else(|| GraphError::NodeNotFound(target_id.to_string()))?;

        if !source.variant().has_output(source_handle) {
            return Err(GraphError::InvalidSourceHandle {
                node_id: source_id.to_string(),
                variant: source.variant(),
                handle: source_handle,
            });
        }
        if !target.variant().accepts_input(target_handle) {
            return Err(GraphError::InvalidTargetHandle {
                node_id: target_id.to_string(),
                variant: target.variant(),
                handle: target_handle,
            });
        }

        let connection = Connection::new(source_id, source_handle, target_id, target_handle);
        if self.snapshot.edges.contains(&connection) {
            return Err(GraphError::DuplicateConnection {
                source_id: source_id.to_string(),
                source_handle,
                target_id: target_id.to_string(),
                target_handle,
            });
        }

        let mut next = self.clone();
        next.snapshot.edges.push(connection);
        debug!(
            source = source_id,
            %source_handle,
            target = target_id,
            "connected nodes"
        );
        Ok(next)
    }

    pub fn disconnect(
        &self,
        source_id: &str,
        source_handle: Handle,
        target_id: &str,
        target_handle: Handle,
    ) -> Result<Self, GraphError> {
        let connection = Connection::new(source_id, source_handle, target_id, target_handle);
        let index = self
            .snapshot
            .edges
            .iter()
            .position(|e| *e == connection)
            .ok_or_else(|| GraphError::ConnectionNotFound {
                source_id: source_id.to_string(),
                source_handle,
                target_id: target_id.to_string(),
                target_handle,
            })?;
        let mut next = self.clone();
        next.snapshot.edges.remove(index);
        Ok(next)
    }

    /// Clones the store and applies `edit` to the node `id`.
    fn with_node<F>(&self, id: &str, edit: F) -> Result<Self, GraphError>
    where
        F: FnOnce(&mut Node) -> Result<(), GraphError>,
    {
        let mut next = self.clone();
        let node = next
            .snapshot
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        edit(node)?;
        Ok(next)
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let candidate = format!("node_{}", self.next_id);
            self.next_id += 1;
            if !self.snapshot.contains(&candidate) {
                return candidate;
            }
        }
    }
}
