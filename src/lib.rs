//! # GlitchScript - Node Graph to Script Compiler
//!
//! **GlitchScript** turns a graph of typed nodes, wired together on a canvas, into the
//! slash-delimited script dialect used by the game's modding layer. The crate owns the
//! graph data model and the compiler; rendering and editing the canvas are left to the
//! caller, which only has to build the graph and display the text it gets back.
//!
//! ## Core Workflow
//!
//! 1.  **Describe Functions**: A [`FunctionRegistry`](registry::FunctionRegistry) lists every
//!     callable function with its category and ordered parameters. The built-in catalog
//!     covers the stock dialect; custom functions can be registered on top.
//! 2.  **Build the Graph**: Mutate a [`GraphStore`](graph::GraphStore) through its operations
//!     (`add_node`, `connect`, `update_node_parameters`, ...). Each operation returns a new
//!     store, so earlier snapshots never change. Editors with their own format can implement
//!     [`IntoGraph`](graph::IntoGraph) or go through the JSON
//!     [`GraphDocument`](graph::GraphDocument).
//! 3.  **Compile**: Hand a snapshot to [`Compiler`](compiler::Compiler). The first Timing node
//!     becomes the entry point, reachable nodes are serialized breadth-first and value
//!     producing nodes are bound to `VALUE_n` slots.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glitchscript::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let registry = Arc::new(FunctionRegistry::with_defaults());
//!     let store = GraphStore::new(registry.clone());
//!
//!     let (store, timing) = store.add_node(
//!         NodeTemplate::Function("RoundStart".to_string()),
//!         Parameters::new(),
//!         Position::default(),
//!     )?;
//!     let (store, buff) = store.add_node(
//!         NodeTemplate::Function("buf".to_string()),
//!         Parameters::new()
//!             .with("target", "Self")
//!             .with("keyword", "Enhancement")
//!             .with("stack", 3)
//!             .with("turn", 2)
//!             .with("delay", 0),
//!         Position::new(200.0, 0.0),
//!     )?;
//!     let store = store.connect(&timing.id, Handle::Output, &buff.id, Handle::Input)?;
//!
//!     let compiled = Compiler::builder(store.snapshot())
//!         .with_registry(&registry)
//!         .build()
//!         .compile()?;
//!
//!     assert_eq!(
//!         compiled.text(),
//!         "Modular/TIMING:RoundStart/buf(Self,Enhancement,3,2,0)/"
//!     );
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod registry;
pub mod script;
