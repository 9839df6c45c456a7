use crate::error::CompileError;
use crate::graph::{FunctionCall, GraphSnapshot, Handle, Node, NodeBody, VariableSlot};
use crate::registry::{FunctionRegistry, FunctionSchema};
use crate::script::{Script, TimingHeader};
use std::borrow::Cow;
use tracing::{debug, info, instrument};

pub mod allocator;
pub mod arguments;
pub mod diagnostics;
mod traversal;

pub use allocator::VariableAllocator;
pub use diagnostics::{Diagnostic, TraversalRecord, TraversalTrace};

use traversal::ScriptWalker;

/// Text shown in place of a script when the graph has no Timing node.
pub const NO_ENTRY_POINT_MESSAGE: &str =
    "Error: no Timing node found. Add a Timing node to give the script an entry point.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Report extra connections on a Conditional's `true`/`false` handles.
    pub warn_on_branch_fanout: bool,
    /// Replace argument 0 with the slot of an upstream value-producing node.
    pub substitute_variables: bool,
    /// Upper bound on traversal calls per compile pass. Branches past it are left empty.
    pub max_traversal_calls: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            warn_on_branch_fanout: true,
            substitute_variables: true,
            max_traversal_calls: 10_000,
        }
    }
}

/// Everything a compile pass produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledScript {
    pub script: Script,
    pub diagnostics: Vec<Diagnostic>,
    pub trace: TraversalTrace,
    /// `(node id, slot)` in binding order.
    pub bindings: Vec<(String, VariableSlot)>,
}

impl CompiledScript {
    pub fn text(&self) -> String {
        self.script.to_string()
    }
}

pub struct Compiler<'a> {
    snapshot: &'a GraphSnapshot,
    registry: Cow<'a, FunctionRegistry>,
    options: CompileOptions,
}

pub struct CompilerBuilder<'a> {
    snapshot: &'a GraphSnapshot,
    registry: Cow<'a, FunctionRegistry>,
    options: CompileOptions,
}

impl<'a> CompilerBuilder<'a> {
    pub fn new(snapshot: &'a GraphSnapshot) -> Self {
        Self {
            snapshot,
            registry: Cow::Owned(FunctionRegistry::with_defaults()),
            options: CompileOptions::default(),
        }
    }

    /// Uses `registry` instead of the built-in catalog.
    pub fn with_registry(mut self, registry: &'a FunctionRegistry) -> Self {
        self.registry = Cow::Borrowed(registry);
        self
    }

    /// Adds or replaces a single function schema.
    pub fn with_function(mut self, schema: FunctionSchema) -> Self {
        self.registry.to_mut().register(schema);
        self
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Compiler<'a> {
        Compiler {
            snapshot: self.snapshot,
            registry: self.registry,
            options: self.options,
        }
    }
}

impl<'a> Compiler<'a> {
    pub fn builder(snapshot: &'a GraphSnapshot) -> CompilerBuilder<'a> {
        CompilerBuilder::new(snapshot)
    }

    /// Compiles the snapshot into a script.
    ///
    /// The first Timing node in node order is the entry point. Each connection on its
    /// `output` handle starts an independent traversal whose statements are appended in
    /// edge order. Only a missing entry point is fatal; other problems end up in
    /// [`CompiledScript::diagnostics`].
    #[instrument(skip_all, fields(nodes = self.snapshot.nodes.len(), edges = self.snapshot.edges.len()))]
    pub fn compile(&self) -> Result<CompiledScript, CompileError> {
        let mut timing_nodes = self.snapshot.nodes.iter().filter_map(|node| match &node.body {
            NodeBody::Timing(call) => Some((node, call)),
            _ => None,
        });
        let (entry, entry_call) = timing_nodes.next().ok_or(CompileError::NoEntryPoint)?;

        let mut walker = ScriptWalker::new(self.snapshot, &self.registry, &self.options);
        for (other, _) in timing_nodes {
            walker.report(Diagnostic::AdditionalEntryPoint {
                node_id: other.id.clone(),
            });
        }

        let mut script = Script::new(timing_header(entry, entry_call, &mut walker));
        for edge in self.snapshot.outgoing(&entry.id, Handle::Output) {
            debug!(target_node = %edge.target_id, "compiling statement stream");
            let statements = walker.walk(&edge.target_id, &entry.id);
            script.statements.extend(statements);
        }

        let (diagnostics, trace, allocator) = walker.finish();
        info!(
            statements = script.statements.len(),
            diagnostics = diagnostics.len(),
            "compilation finished"
        );

        Ok(CompiledScript {
            script,
            diagnostics,
            trace,
            bindings: allocator.bindings(),
        })
    }
}

/// Renders the entry point. Arguments are only emitted for triggers whose schema
/// declares parameters.
fn timing_header(entry: &Node, call: &FunctionCall, walker: &mut ScriptWalker<'_>) -> TimingHeader {
    let takes_arguments = walker
        .registry()
        .lookup(&call.function_name)
        .is_some_and(|schema| !schema.parameters.is_empty());
    let arguments = if takes_arguments {
        walker
            .serialize_call(entry, call)
            .map(|serialized| serialized.arguments)
    } else {
        if !walker.registry().contains(&call.function_name) {
            walker.report(Diagnostic::UnknownFunction {
                node_id: entry.id.clone(),
                function_name: call.function_name.clone(),
            });
        }
        None
    };

    TimingHeader {
        name: call.function_name.clone(),
        arguments,
    }
}

/// Compiles `snapshot` and always returns something displayable: the script text, or
/// [`NO_ENTRY_POINT_MESSAGE`] when there is nothing to compile from.
pub fn compile_to_text(snapshot: &GraphSnapshot, registry: &FunctionRegistry) -> String {
    match Compiler::builder(snapshot).with_registry(registry).build().compile() {
        Ok(compiled) => compiled.text(),
        Err(CompileError::NoEntryPoint) => NO_ENTRY_POINT_MESSAGE.to_string(),
    }
}
