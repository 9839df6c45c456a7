use clap::{Parser, ValueEnum};
use glitchscript::compiler::CompileOptions;
use glitchscript::prelude::*;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Compiles a GlitchScript node graph into script text
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the graph JSON document exported by the editor
    graph_path: Option<String>,

    /// Additional function schemas (JSON list) merged onto the built-in catalog
    #[arg(short, long)]
    registry: Option<String>,

    /// Write the script to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Replay every connection through the graph store and reject invalid ones
    #[arg(long)]
    strict: bool,

    /// Keep literal arguments even when an upstream node holds a variable
    #[arg(long)]
    no_substitution: bool,

    /// Do not report extra connections on conditional branches
    #[arg(long)]
    allow_branch_fanout: bool,

    /// Maximum traversal calls per compile; nested branches past it are left empty
    #[arg(long, default_value_t = 10_000)]
    max_traversal_calls: usize,

    /// Print the function catalog and exit
    #[arg(long)]
    list_functions: bool,

    /// Log verbosity; RUST_LOG takes precedence when set
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let registry = load_registry(cli.registry.as_deref());

    if cli.list_functions {
        print_catalog(&registry);
        return;
    }

    let graph_path = cli
        .graph_path
        .clone()
        .unwrap_or_else(|| exit_with_error("A graph path is required unless --list-functions is given."));

    run_compilation(&cli, &graph_path, Arc::new(registry));
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_registry(path: Option<&str>) -> FunctionRegistry {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read registry file '{}': {}", path, e))
            });
            FunctionRegistry::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to load registry: {}", e)))
        }
        None => FunctionRegistry::with_defaults(),
    }
}

fn run_compilation(cli: &Cli, graph_path: &str, registry: Arc<FunctionRegistry>) {
    let total_start = Instant::now();

    // --- 1. Loading ---
    let json = fs::read_to_string(graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read graph file '{}': {}", graph_path, e))
    });
    let document = GraphDocument::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse graph: {}", e)));

    // --- 2. Conversion ---
    let snapshot = if cli.strict {
        document
            .into_store(registry.clone())
            .map(|store| store.into_snapshot())
    } else {
        document.into_graph()
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert graph: {}", e)));

    // --- 3. Compilation ---
    let compile_start = Instant::now();
    let options = CompileOptions {
        warn_on_branch_fanout: !cli.allow_branch_fanout,
        substitute_variables: !cli.no_substitution,
        max_traversal_calls: cli.max_traversal_calls,
    };
    let compiler = Compiler::builder(&snapshot)
        .with_registry(&registry)
        .with_options(options)
        .build();

    let text = match compiler.compile() {
        Ok(compiled) => {
            for diagnostic in &compiled.diagnostics {
                eprintln!("warning: {}", diagnostic);
            }
            for (node_id, slot) in &compiled.bindings {
                eprintln!("  -> {} bound to node '{}'", slot, node_id);
            }
            let statements: usize = compiled
                .script
                .statements
                .iter()
                .map(Statement::len_recursive)
                .sum();
            eprintln!(
                "{} statement(s), {} node visit(s) across {} traversal call(s)",
                statements,
                compiled.trace.total_visits(),
                compiled.trace.calls.len()
            );
            compiled.text()
        }
        Err(CompileError::NoEntryPoint) => {
            println!("{}", NO_ENTRY_POINT_MESSAGE);
            std::process::exit(2);
        }
    };
    let compile_duration = compile_start.elapsed();

    // --- 4. Output ---
    match &cli.output {
        Some(path) => {
            fs::write(path, &text).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write script to '{}': {}", path, e))
            });
            eprintln!("Wrote script to '{}'", path);
        }
        None => println!("{}", text),
    }

    eprintln!(
        "Compiled {} nodes / {} connections in {:?} (total {:?})",
        snapshot.nodes.len(),
        snapshot.edges.len(),
        compile_duration,
        total_start.elapsed()
    );
}

fn print_catalog(registry: &FunctionRegistry) {
    let categories = [
        FunctionCategory::Timing,
        FunctionCategory::ValueAcquisition,
        FunctionCategory::Consequence,
        FunctionCategory::Conditional,
        FunctionCategory::ContinueIf,
    ];
    for category in categories {
        println!("{}:", category);
        for schema in registry.by_category(category) {
            println!("  {}({})", schema.name, schema.parameters.join(", "));
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
