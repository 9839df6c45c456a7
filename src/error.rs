use crate::graph::{Handle, NodeVariant};
use thiserror::Error;

/// Fatal errors that abort a compile call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("No Timing node found: add a Timing node to give the script an entry point")]
    NoEntryPoint,
}

/// Errors raised by Graph Store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    #[error("Function '{0}' is not registered")]
    UnknownFunction(String),

    #[error("Function '{function_name}' is a {category} function and cannot be placed as a node")]
    NotPlaceable {
        function_name: String,
        category: String,
    },

    #[error("Function '{0}' does not produce a value and cannot be embedded in an Assignment")]
    NotValueProducing(String),

    #[error("Handle '{handle}' is not an output of {variant} node '{node_id}'")]
    InvalidSourceHandle {
        node_id: String,
        variant: NodeVariant,
        handle: Handle,
    },

    #[error("Handle '{handle}' is not an input of {variant} node '{node_id}'")]
    InvalidTargetHandle {
        node_id: String,
        variant: NodeVariant,
        handle: Handle,
    },

    #[error("Connection {source_id}:{source_handle} -> {target_id}:{target_handle} already exists")]
    DuplicateConnection {
        source_id: String,
        source_handle: Handle,
        target_id: String,
        target_handle: Handle,
    },

    #[error("Connection {source_id}:{source_handle} -> {target_id}:{target_handle} does not exist")]
    ConnectionNotFound {
        source_id: String,
        source_handle: Handle,
        target_id: String,
        target_handle: Handle,
    },

    #[error("{variant} node '{node_id}' does not carry function parameters")]
    NotParameterized {
        node_id: String,
        variant: NodeVariant,
    },

    #[error("{variant} node '{node_id}' does not carry a condition")]
    NotConditional {
        node_id: String,
        variant: NodeVariant,
    },

    #[error("Node '{0}' is not an Assignment node")]
    NotAnAssignment(String),

    #[error("Assignment node '{0}' has no embedded node")]
    MissingEmbeddedNode(String),
}

/// Errors that can occur when converting an external document into a graph snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Failed to parse graph document: {0}")]
    JsonParseError(String),

    #[error("Node '{node_id}' is invalid: {message}")]
    InvalidNode { node_id: String, message: String },

    #[error("Duplicate node id '{0}'")]
    DuplicateNodeId(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Raised when a string does not name a `VALUE_n` slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a variable slot (expected VALUE_0 through VALUE_9)")]
pub struct SlotParseError(pub String);

/// Errors that can occur while loading function schemas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Failed to parse function registry JSON: {0}")]
    JsonParseError(String),

    #[error("Function schema has an empty name")]
    EmptyName,
}
