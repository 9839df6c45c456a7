use clap::Parser;
use glitchscript::graph::{EdgeDocument, NodeDocument};
use glitchscript::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;

/// A CLI tool to generate random node graphs for stress-testing the compiler
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON document to
    #[arg(short, long, default_value = "generated_graph.json")]
    output: String,

    /// Number of nodes after the Timing entry point
    #[arg(short, long, default_value_t = 25)]
    nodes: usize,

    /// Number of extra back-edges that introduce cycles
    #[arg(long, default_value_t = 0)]
    cycles: usize,

    /// Seed for reproducible graphs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let registry = FunctionRegistry::with_defaults();

    println!(
        "Generating a graph with {} node(s) and {} back-edge(s)...",
        cli.nodes, cli.cycles
    );

    let document = generate_graph(&mut rng, &registry, cli.nodes, cli.cycles);
    fs::write(&cli.output, document.to_json_pretty()?)?;

    println!(
        "Successfully generated {} nodes and {} edges into '{}'",
        document.nodes.len(),
        document.edges.len(),
        cli.output
    );
    Ok(())
}

fn generate_graph(
    rng: &mut StdRng,
    registry: &FunctionRegistry,
    node_count: usize,
    cycles: usize,
) -> GraphDocument {
    let mut document = GraphDocument::default();
    document.nodes.push(function_node(
        rng,
        registry,
        "node_0".to_string(),
        NodeVariant::Timing,
        FunctionCategory::Timing,
    ));

    for i in 1..=node_count {
        let id = format!("node_{}", i);
        let node = match rng.random_range(0..5) {
            0 => function_node(
                rng,
                registry,
                id,
                NodeVariant::ValueAcquisition,
                FunctionCategory::ValueAcquisition,
            ),
            1 => conditional_node(rng, id, NodeVariant::Conditional),
            2 => conditional_node(rng, id, NodeVariant::ContinueIf),
            3 => assignment_node(rng, registry, id),
            _ => function_node(
                rng,
                registry,
                id,
                NodeVariant::Consequence,
                FunctionCategory::Consequence,
            ),
        };
        let parent = &document.nodes[rng.random_range(0..i)];
        document.edges.push(EdgeDocument {
            source: parent.id.clone(),
            source_handle: random_output(rng, parent.variant),
            target: node.id.clone(),
            target_handle: Handle::Input,
        });
        document.nodes.push(node);
    }

    // Back-edges never point at the Timing node, which has no input.
    for _ in 0..cycles.min(node_count) {
        let from = rng.random_range(1..=node_count);
        let to = rng.random_range(1..=from);
        let source = &document.nodes[from];
        document.edges.push(EdgeDocument {
            source: source.id.clone(),
            source_handle: random_output(rng, source.variant),
            target: document.nodes[to].id.clone(),
            target_handle: Handle::Input,
        });
    }

    document
}

fn random_output(rng: &mut StdRng, variant: NodeVariant) -> Handle {
    let handles = variant.output_handles();
    handles[rng.random_range(0..handles.len())]
}

fn empty_node(id: String, variant: NodeVariant) -> NodeDocument {
    NodeDocument {
        id,
        variant,
        function_name: None,
        position: Position::default(),
        parameters: Parameters::new(),
        bound_variable: None,
        embedded_node: None,
        condition: None,
    }
}

fn function_node(
    rng: &mut StdRng,
    registry: &FunctionRegistry,
    id: String,
    variant: NodeVariant,
    category: FunctionCategory,
) -> NodeDocument {
    let schemas: Vec<&FunctionSchema> = registry.by_category(category).collect();
    let schema = schemas[rng.random_range(0..schemas.len())];
    let parameters = schema
        .parameters
        .iter()
        .map(|name| (name.clone(), ParamValue::from(rng.random_range(0..10_i32))))
        .collect();

    let mut node = empty_node(id, variant);
    node.function_name = Some(schema.name.clone());
    node.parameters = parameters;
    node.position = Position::new(rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0));
    node
}

fn conditional_node(rng: &mut StdRng, id: String, variant: NodeVariant) -> NodeDocument {
    let operators = [
        ComparisonOperator::Greater,
        ComparisonOperator::Less,
        ComparisonOperator::Equal,
    ];
    let logics = [LogicalOperator::And, LogicalOperator::Or, LogicalOperator::Xor];
    let terms = (0..rng.random_range(0..3_usize))
        .map(|_| {
            ConditionTerm::new(
                format!("VALUE_{}", rng.random_range(0..VariableSlot::COUNT)),
                operators[rng.random_range(0..operators.len())],
                rng.random_range(0..10_u8).to_string(),
            )
        })
        .collect();

    let mut node = empty_node(id, variant);
    node.condition = Some(Condition::new(logics[rng.random_range(0..logics.len())], terms));
    node
}

fn assignment_node(rng: &mut StdRng, registry: &FunctionRegistry, id: String) -> NodeDocument {
    let embedded = function_node(
        rng,
        registry,
        format!("{}_embedded", id),
        NodeVariant::ValueAcquisition,
        FunctionCategory::ValueAcquisition,
    );
    let mut node = empty_node(id, NodeVariant::Assignment);
    node.bound_variable = VariableSlot::new(rng.random_range(0..VariableSlot::COUNT));
    node.embedded_node = Some(Box::new(embedded));
    node
}
