//! Common test utilities for building graphs and compiling them.
#![allow(dead_code)]
use glitchscript::prelude::*;
use std::sync::Arc;

pub fn timing(id: &str, function_name: &str) -> Node {
    Node::new(id, NodeBody::Timing(FunctionCall::new(function_name)))
}

pub fn consequence(id: &str, call: FunctionCall) -> Node {
    Node::new(id, NodeBody::Consequence(call))
}

pub fn acquisition(id: &str, call: FunctionCall) -> Node {
    Node::new(id, NodeBody::ValueAcquisition(call))
}

pub fn conditional(id: &str, condition: Condition) -> Node {
    Node::new(id, NodeBody::Conditional(condition))
}

pub fn continue_if(id: &str, condition: Condition) -> Node {
    Node::new(id, NodeBody::ContinueIf(condition))
}

pub fn assignment(id: &str, slot: Option<&str>, embedded: Option<FunctionCall>) -> Node {
    Node::new(
        id,
        NodeBody::Assignment(Assignment {
            bound_variable: slot.map(|s| s.parse().expect("valid slot")),
            embedded: embedded.map(|call| ValueAcquisitionNode {
                id: format!("{}_embedded", id),
                call,
            }),
        }),
    )
}

/// `getdata(target, id)`
pub fn getdata(target: &str, id: i32) -> FunctionCall {
    FunctionCall::new("getdata")
        .with_param("target", target)
        .with_param("id", id)
}

/// `buf(Self,Enhancement,3,2,0)`
pub fn enhancement_buff() -> FunctionCall {
    FunctionCall::new("buf")
        .with_param("target", "Self")
        .with_param("keyword", "Enhancement")
        .with_param("stack", 3)
        .with_param("turn", 2)
        .with_param("delay", 0)
}

pub fn damage(target: &str, amount: i32) -> FunctionCall {
    FunctionCall::new("damage")
        .with_param("target", target)
        .with_param("amount", amount)
}

pub fn heal(target: &str, amount: i32) -> FunctionCall {
    FunctionCall::new("heal")
        .with_param("target", target)
        .with_param("amount", amount)
}

pub fn flow(source: &str, target: &str) -> Connection {
    Connection::new(source, Handle::Output, target, Handle::Input)
}

pub fn branch(source: &str, handle: Handle, target: &str) -> Connection {
    Connection::new(source, handle, target, Handle::Input)
}

pub fn new_store() -> GraphStore {
    GraphStore::new(Arc::new(FunctionRegistry::with_defaults()))
}

/// Adds a registry-backed node and returns its id.
pub fn place(store: GraphStore, function_name: &str, params: Parameters) -> (GraphStore, String) {
    let (store, node) = store
        .add_node(
            NodeTemplate::Function(function_name.to_string()),
            params,
            Position::default(),
        )
        .expect("function is placeable");
    (store, node.id)
}

pub fn compile(snapshot: &GraphSnapshot) -> CompiledScript {
    Compiler::builder(snapshot)
        .build()
        .compile()
        .expect("graph has an entry point")
}

/// Logic: `RoundStart -> Assignment(VALUE_2 = getdata(Self,5))`
pub fn create_assignment_graph() -> GraphSnapshot {
    GraphSnapshot::new(
        vec![
            timing("t", "RoundStart"),
            assignment("a", Some("VALUE_2"), Some(getdata("Self", 5))),
        ],
        vec![flow("t", "a")],
    )
}

/// Logic: `RoundStart -> IF(VALUE_0>5) -> buf(Self,Enhancement,3,2,0)`
pub fn create_conditional_graph() -> GraphSnapshot {
    GraphSnapshot::new(
        vec![
            timing("t", "RoundStart"),
            conditional(
                "c",
                Condition::single("VALUE_0", ComparisonOperator::Greater, "5"),
            ),
            consequence("b", enhancement_buff()),
        ],
        vec![flow("t", "c"), branch("c", Handle::True, "b")],
    )
}

pub const ASSIGNMENT_GRAPH_JSON: &str = r#"{
  "nodes": [
    {
      "id": "1",
      "variant": "Timing",
      "functionName": "RoundStart",
      "position": { "x": 100.0, "y": 100.0 },
      "parameters": {}
    },
    {
      "id": "2",
      "variant": "Assignment",
      "position": { "x": 300.0, "y": 100.0 },
      "boundVariable": "VALUE_2",
      "embeddedNode": {
        "id": "2_embedded",
        "variant": "ValueAcquisition",
        "functionName": "getdata",
        "parameters": { "target": "Self", "id": 5 }
      }
    },
    {
      "id": "3",
      "variant": "Conditional",
      "position": { "x": 500.0, "y": 100.0 },
      "condition": {
        "logic": "OR",
        "terms": [
          { "left": "VALUE_2", "operator": ">", "right": "5" },
          { "left": "VALUE_2", "operator": "<", "right": "-5" }
        ]
      }
    },
    {
      "id": "4",
      "variant": "Consequence",
      "functionName": "buf",
      "position": { "x": 700.0, "y": 50.0 },
      "parameters": { "target": "Self", "keyword": "Enhancement", "stack": 3, "turn": 2, "delay": 0 }
    },
    {
      "id": "5",
      "variant": "Consequence",
      "functionName": "heal",
      "position": { "x": 700.0, "y": 150.0 },
      "parameters": { "target": "Self", "amount": 10 }
    }
  ],
  "edges": [
    { "source": "1", "sourceHandle": "output", "target": "2", "targetHandle": "input" },
    { "source": "2", "sourceHandle": "output", "target": "3", "targetHandle": "input" },
    { "source": "3", "sourceHandle": "true", "target": "4", "targetHandle": "input" },
    { "source": "3", "sourceHandle": "false", "target": "5", "targetHandle": "input" }
  ]
}"#;
