//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the glitchscript crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use glitchscript::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let document_json = std::fs::read_to_string("path/to/graph.json")?;
//! let snapshot = GraphDocument::from_json(&document_json)?.into_graph()?;
//!
//! let registry = FunctionRegistry::with_defaults();
//! println!("{}", compile_to_text(&snapshot, &registry));
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::{
    CompileOptions, CompiledScript, Compiler, Diagnostic, NO_ENTRY_POINT_MESSAGE, compile_to_text,
};

// Graph model and store
pub use crate::graph::{
    Assignment, ComparisonOperator, Condition, ConditionTerm, Connection, FunctionCall,
    GraphDocument, GraphSnapshot, GraphStore, Handle, IntoGraph, LogicalOperator, Node, NodeBody,
    NodeTemplate, NodeVariant, ParamValue, Parameters, Position, ValueAcquisitionNode,
    VariableSlot,
};

// Registry
pub use crate::registry::{FunctionCategory, FunctionRegistry, FunctionSchema};

// Output
pub use crate::script::{Script, Statement};

// Error types
pub use crate::error::{CompileError, ConversionError, GraphError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
