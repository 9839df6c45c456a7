//! The JSON shape exchanged with the canvas editor.
//!
//! The editor only knows how to build this document and how to display the text the
//! compiler hands back; it never sees the traversal itself.

use super::model::*;
use super::store::{GraphSnapshot, GraphStore};
use super::VariableSlot;
use crate::error::ConversionError;
use crate::registry::FunctionRegistry;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDocument {
    pub id: String,
    pub variant: NodeVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_variable: Option<VariableSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_node: Option<Box<NodeDocument>>,
    /// Only meaningful for Conditional and ContinueIf nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDocument {
    pub source: String,
    pub source_handle: Handle,
    pub target: String,
    pub target_handle: Handle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub edges: Vec<EdgeDocument>,
}

/// A trait for editor-side models that can be turned into a compilable snapshot.
///
/// Implement it on your own document structs to feed a different editor format to
/// the compiler.
pub trait IntoGraph {
    /// Consumes the object and converts it into a graph snapshot.
    fn into_graph(self) -> Result<GraphSnapshot, ConversionError>;
}

impl GraphDocument {
    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(json).map_err(|e| ConversionError::JsonParseError(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, ConversionError> {
        serde_json::to_string_pretty(self).map_err(|e| ConversionError::JsonParseError(e.to_string()))
    }

    /// Converts the document into an editable store, replaying every edge through
    /// [`GraphStore::connect`] so invalid handles and dangling ids are rejected.
    pub fn into_store(self, registry: Arc<FunctionRegistry>) -> Result<GraphStore, ConversionError> {
        let GraphSnapshot { nodes, edges } = self.into_graph()?;
        let mut store = GraphStore::from_snapshot(GraphSnapshot::new(nodes, Vec::new()), registry);
        for edge in edges {
            store = store.connect(
                &edge.source_id,
                edge.source_handle,
                &edge.target_id,
                edge.target_handle,
            )?;
        }
        Ok(store)
    }
}

impl IntoGraph for GraphDocument {
    /// Edges are carried over verbatim; the compiler tolerates dangling references.
    fn into_graph(self) -> Result<GraphSnapshot, ConversionError> {
        let mut seen = AHashSet::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for doc in self.nodes {
            if !seen.insert(doc.id.clone()) {
                return Err(ConversionError::DuplicateNodeId(doc.id));
            }
            nodes.push(convert_node(doc)?);
        }

        let edges = self
            .edges
            .into_iter()
            .map(|e| Connection {
                source_id: e.source,
                source_handle: e.source_handle,
                target_id: e.target,
                target_handle: e.target_handle,
            })
            .collect();

        Ok(GraphSnapshot::new(nodes, edges))
    }
}

fn convert_node(doc: NodeDocument) -> Result<Node, ConversionError> {
    let body = match doc.variant {
        NodeVariant::Timing => NodeBody::Timing(require_call(&doc)?),
        NodeVariant::ValueAcquisition => NodeBody::ValueAcquisition(require_call(&doc)?),
        NodeVariant::Consequence => NodeBody::Consequence(require_call(&doc)?),
        NodeVariant::Conditional => NodeBody::Conditional(doc.condition.clone().unwrap_or_default()),
        NodeVariant::ContinueIf => NodeBody::ContinueIf(doc.condition.clone().unwrap_or_default()),
        NodeVariant::Assignment => {
            let embedded = match doc.embedded_node.as_deref() {
                Some(inner) if inner.variant != NodeVariant::ValueAcquisition => {
                    return Err(ConversionError::InvalidNode {
                        node_id: doc.id.clone(),
                        message: format!(
                            "embedded node '{}' must be ValueAcquisition, found {}",
                            inner.id, inner.variant
                        ),
                    });
                }
                Some(inner) => Some(ValueAcquisitionNode {
                    id: inner.id.clone(),
                    call: require_call(inner)?,
                }),
                None => None,
            };
            NodeBody::Assignment(Assignment {
                bound_variable: doc.bound_variable,
                embedded,
            })
        }
    };

    Ok(Node {
        id: doc.id,
        position: doc.position,
        body,
    })
}

fn require_call(doc: &NodeDocument) -> Result<FunctionCall, ConversionError> {
    let function_name = doc
        .function_name
        .clone()
        .ok_or_else(|| ConversionError::InvalidNode {
            node_id: doc.id.clone(),
            message: format!("{} node requires a functionName", doc.variant),
        })?;
    Ok(FunctionCall {
        function_name,
        parameters: doc.parameters.clone(),
    })
}

impl From<&Node> for NodeDocument {
    fn from(node: &Node) -> Self {
        let mut doc = NodeDocument {
            id: node.id.clone(),
            variant: node.variant(),
            function_name: None,
            position: node.position,
            parameters: Parameters::new(),
            bound_variable: None,
            embedded_node: None,
            condition: None,
        };
        match &node.body {
            NodeBody::Timing(call) | NodeBody::ValueAcquisition(call) | NodeBody::Consequence(call) => {
                doc.function_name = Some(call.function_name.clone());
                doc.parameters = call.parameters.clone();
            }
            NodeBody::Conditional(condition) | NodeBody::ContinueIf(condition) => {
                doc.condition = Some(condition.clone());
            }
            NodeBody::Assignment(assignment) => {
                doc.bound_variable = assignment.bound_variable;
                doc.embedded_node = assignment.embedded.as_ref().map(|embedded| {
                    Box::new(NodeDocument {
                        id: embedded.id.clone(),
                        variant: NodeVariant::ValueAcquisition,
                        function_name: Some(embedded.call.function_name.clone()),
                        position: Position::default(),
                        parameters: embedded.call.parameters.clone(),
                        bound_variable: None,
                        embedded_node: None,
                        condition: None,
                    })
                });
            }
        }
        doc
    }
}

impl From<&GraphSnapshot> for GraphDocument {
    fn from(snapshot: &GraphSnapshot) -> Self {
        GraphDocument {
            nodes: snapshot.nodes.iter().map(NodeDocument::from).collect(),
            edges: snapshot
                .edges
                .iter()
                .map(|e| EdgeDocument {
                    source: e.source_id.clone(),
                    source_handle: e.source_handle,
                    target: e.target_id.clone(),
                    target_handle: e.target_handle,
                })
                .collect(),
        }
    }
}
