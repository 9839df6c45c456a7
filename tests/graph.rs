//! Tests for Graph Store operations and their validation.
mod common;
use common::*;
use glitchscript::prelude::*;

#[test]
fn test_add_node_derives_variant_from_category() {
    let store = new_store();
    let (next, node) = store
        .add_node(
            NodeTemplate::Function("getdata".to_string()),
            Parameters::new().with("target", "Self").with("id", 5),
            Position::new(10.0, 20.0),
        )
        .unwrap();

    assert_eq!(node.id, "node_0");
    assert_eq!(node.variant(), NodeVariant::ValueAcquisition);
    assert_eq!(node.function_name(), Some("getdata"));
    assert_eq!(node.position, Position::new(10.0, 20.0));
    assert_eq!(next.node("node_0"), Some(&node));
}

#[test]
fn test_operations_leave_original_store_untouched() {
    let store = new_store();
    let (next, _) = place(store.clone(), "RoundStart", Parameters::new());

    assert!(store.snapshot().nodes.is_empty());
    assert_eq!(next.snapshot().nodes.len(), 1);

    let moved = next.move_node("node_0", Position::new(5.0, 5.0)).unwrap();
    assert_eq!(next.node("node_0").unwrap().position, Position::default());
    assert_eq!(moved.node("node_0").unwrap().position, Position::new(5.0, 5.0));
}

#[test]
fn test_generated_ids_are_unique() {
    let store = new_store();
    let (store, first) = place(store, "RoundStart", Parameters::new());
    let (store, second) = place(store, "damage", Parameters::new());
    let (store, third) = store
        .add_node(NodeTemplate::Conditional, Parameters::new(), Position::default())
        .map(|(s, n)| (s, n.id))
        .unwrap();

    assert_eq!(first, "node_0");
    assert_eq!(second, "node_1");
    assert_eq!(third, "node_2");
    assert_eq!(store.snapshot().nodes.len(), 3);
}

#[test]
fn test_generated_ids_skip_existing_nodes() {
    let snapshot = GraphSnapshot::new(
        vec![timing("node_0", "RoundStart"), consequence("node_1", damage("Enemy", 1))],
        vec![],
    );
    let store = GraphStore::from_snapshot(snapshot, std::sync::Arc::new(FunctionRegistry::with_defaults()));
    let (_, id) = place(store, "heal", Parameters::new());
    assert_eq!(id, "node_2");
}

#[test]
fn test_structural_templates_create_empty_nodes() {
    let store = new_store();
    let (store, conditional) = store
        .add_node(NodeTemplate::Conditional, Parameters::new(), Position::default())
        .unwrap();
    let (store, guard) = store
        .add_node(NodeTemplate::ContinueIf, Parameters::new(), Position::default())
        .unwrap();
    let (_, assignment) = store
        .add_node(NodeTemplate::Assignment, Parameters::new(), Position::default())
        .unwrap();

    assert_eq!(conditional.body, NodeBody::Conditional(Condition::default()));
    assert_eq!(guard.body, NodeBody::ContinueIf(Condition::default()));
    assert_eq!(assignment.body, NodeBody::Assignment(Assignment::default()));
}

#[test]
fn test_add_node_rejects_unknown_and_structural_functions() {
    let store = new_store();
    let unknown = store.add_node(
        NodeTemplate::Function("explode".to_string()),
        Parameters::new(),
        Position::default(),
    );
    assert_eq!(unknown.unwrap_err(), GraphError::UnknownFunction("explode".to_string()));

    let structural = store.add_node(
        NodeTemplate::Function("IF".to_string()),
        Parameters::new(),
        Position::default(),
    );
    assert_eq!(
        structural.unwrap_err(),
        GraphError::NotPlaceable {
            function_name: "IF".to_string(),
            category: "Conditional".to_string(),
        }
    );
}

#[test]
fn test_update_parameters_replaces_map() {
    let (store, id) = place(new_store(), "damage", Parameters::new().with("target", "Enemy"));
    let updated = store
        .update_node_parameters(&id, Parameters::new().with("amount", 7))
        .unwrap();

    let call = updated.node(&id).unwrap().body.function_call().unwrap();
    assert_eq!(call.parameters.get("amount"), Some(&ParamValue::Number(7.0)));
    assert_eq!(call.parameters.get("target"), None);
}

#[test]
fn test_update_parameters_rejects_conditions_and_missing_nodes() {
    let (store, conditional) = new_store()
        .add_node(NodeTemplate::Conditional, Parameters::new(), Position::default())
        .unwrap();

    assert_eq!(
        store
            .update_node_parameters(&conditional.id, Parameters::new())
            .unwrap_err(),
        GraphError::NotParameterized {
            node_id: conditional.id.clone(),
            variant: NodeVariant::Conditional,
        }
    );
    assert_eq!(
        store.update_node_parameters("ghost", Parameters::new()).unwrap_err(),
        GraphError::NodeNotFound("ghost".to_string())
    );
}

#[test]
fn test_set_condition_only_on_conditional_nodes() {
    let (store, guard) = new_store()
        .add_node(NodeTemplate::ContinueIf, Parameters::new(), Position::default())
        .unwrap();
    let condition = Condition::single("VALUE_0", ComparisonOperator::Less, "3");
    let updated = store.set_condition(&guard.id, condition.clone()).unwrap();
    assert_eq!(updated.node(&guard.id).unwrap().body.condition(), Some(&condition));

    let (store, heal_id) = place(updated, "heal", Parameters::new());
    assert_eq!(
        store.set_condition(&heal_id, condition).unwrap_err(),
        GraphError::NotConditional {
            node_id: heal_id.clone(),
            variant: NodeVariant::Consequence,
        }
    );
}

#[test]
fn test_embed_node_into_assignment() {
    let (store, assignment) = new_store()
        .add_node(NodeTemplate::Assignment, Parameters::new(), Position::default())
        .unwrap();

    assert_eq!(
        store
            .update_node_parameters(&assignment.id, Parameters::new())
            .unwrap_err(),
        GraphError::MissingEmbeddedNode(assignment.id.clone())
    );

    let store = store
        .embed_node(&assignment.id, "gethp", Parameters::new().with("target", "Enemy"))
        .unwrap();
    let NodeBody::Assignment(body) = &store.node(&assignment.id).unwrap().body else {
        panic!("expected an assignment");
    };
    let embedded = body.embedded.as_ref().unwrap();
    assert_eq!(embedded.id, format!("{}_embedded", assignment.id));
    assert_eq!(embedded.call.function_name, "gethp");

    let store = store
        .update_node_parameters(&assignment.id, Parameters::new().with("target", "Self"))
        .unwrap();
    assert_eq!(
        store.node(&assignment.id).unwrap().body.function_call().unwrap().parameters.get("target"),
        Some(&ParamValue::from("Self"))
    );
}

#[test]
fn test_embed_node_rejects_non_value_functions() {
    let (store, assignment) = new_store()
        .add_node(NodeTemplate::Assignment, Parameters::new(), Position::default())
        .unwrap();
    assert_eq!(
        store
            .embed_node(&assignment.id, "damage", Parameters::new())
            .unwrap_err(),
        GraphError::NotValueProducing("damage".to_string())
    );

    let (store, heal_id) = place(store, "heal", Parameters::new());
    assert_eq!(
        store.embed_node(&heal_id, "gethp", Parameters::new()).unwrap_err(),
        GraphError::NotAnAssignment(heal_id.clone())
    );
}

#[test]
fn test_bind_variable() {
    let (store, assignment) = new_store()
        .add_node(NodeTemplate::Assignment, Parameters::new(), Position::default())
        .unwrap();
    let slot: VariableSlot = "VALUE_7".parse().unwrap();
    let store = store.bind_variable(&assignment.id, slot).unwrap();
    let NodeBody::Assignment(body) = &store.node(&assignment.id).unwrap().body else {
        panic!("expected an assignment");
    };
    assert_eq!(body.bound_variable, Some(slot));

    let (store, timing_id) = place(store, "RoundStart", Parameters::new());
    assert_eq!(
        store.bind_variable(&timing_id, slot).unwrap_err(),
        GraphError::NotAnAssignment(timing_id.clone())
    );
}

#[test]
fn test_connect_validates_handles() {
    let (store, t) = place(new_store(), "RoundStart", Parameters::new());
    let (store, d) = place(store, "damage", Parameters::new());
    let (store, c) = store
        .add_node(NodeTemplate::Conditional, Parameters::new(), Position::default())
        .map(|(s, n)| (s, n.id))
        .unwrap();

    assert_eq!(
        store.connect(&d, Handle::Output, &t, Handle::Input).unwrap_err(),
        GraphError::InvalidTargetHandle {
            node_id: t.clone(),
            variant: NodeVariant::Timing,
            handle: Handle::Input,
        }
    );
    assert_eq!(
        store.connect(&c, Handle::Output, &d, Handle::Input).unwrap_err(),
        GraphError::InvalidSourceHandle {
            node_id: c.clone(),
            variant: NodeVariant::Conditional,
            handle: Handle::Output,
        }
    );
    assert_eq!(
        store.connect(&t, Handle::True, &d, Handle::Input).unwrap_err(),
        GraphError::InvalidSourceHandle {
            node_id: t.clone(),
            variant: NodeVariant::Timing,
            handle: Handle::True,
        }
    );
    assert_eq!(
        store.connect(&t, Handle::Output, "ghost", Handle::Input).unwrap_err(),
        GraphError::NodeNotFound("ghost".to_string())
    );

    let store = store.connect(&c, Handle::False, &d, Handle::Input).unwrap();
    assert_eq!(store.snapshot().edges, vec![branch(&c, Handle::False, &d)]);
}

#[test]
fn test_connect_rejects_duplicates() {
    let (store, t) = place(new_store(), "RoundStart", Parameters::new());
    let (store, d) = place(store, "damage", Parameters::new());
    let store = store.connect(&t, Handle::Output, &d, Handle::Input).unwrap();

    assert!(matches!(
        store.connect(&t, Handle::Output, &d, Handle::Input),
        Err(GraphError::DuplicateConnection { .. })
    ));
}

#[test]
fn test_disconnect() {
    let (store, t) = place(new_store(), "RoundStart", Parameters::new());
    let (store, d) = place(store, "damage", Parameters::new());
    let connected = store.connect(&t, Handle::Output, &d, Handle::Input).unwrap();

    let disconnected = connected.disconnect(&t, Handle::Output, &d, Handle::Input).unwrap();
    assert!(disconnected.snapshot().edges.is_empty());
    assert_eq!(connected.snapshot().edges.len(), 1);

    assert_eq!(
        disconnected
            .disconnect(&t, Handle::Output, &d, Handle::Input)
            .unwrap_err(),
        GraphError::ConnectionNotFound {
            source_id: t.clone(),
            source_handle: Handle::Output,
            target_id: d.clone(),
            target_handle: Handle::Input,
        }
    );
}

#[test]
fn test_remove_node_drops_incident_connections() {
    let (store, t) = place(new_store(), "RoundStart", Parameters::new());
    let (store, d) = place(store, "damage", Parameters::new());
    let (store, h) = place(store, "heal", Parameters::new());
    let store = store
        .connect(&t, Handle::Output, &d, Handle::Input)
        .and_then(|s| s.connect(&d, Handle::Output, &h, Handle::Input))
        .and_then(|s| s.connect(&t, Handle::Output, &h, Handle::Input))
        .unwrap();

    let removed = store.remove_node(&d).unwrap();
    assert!(removed.node(&d).is_none());
    assert_eq!(removed.snapshot().edges, vec![flow(&t, &h)]);
    assert_eq!(
        removed.remove_node(&d).unwrap_err(),
        GraphError::NodeNotFound(d.clone())
    );
}

#[test]
fn test_graph_built_through_store_compiles() {
    let (store, t) = place(new_store(), "RoundStart", Parameters::new());
    let (store, a) = store
        .add_node(NodeTemplate::Assignment, Parameters::new(), Position::default())
        .map(|(s, n)| (s, n.id))
        .unwrap();
    let store = store
        .embed_node(&a, "getdata", Parameters::new().with("target", "Self").with("id", 5))
        .and_then(|s| s.bind_variable(&a, "VALUE_2".parse().unwrap()))
        .and_then(|s| s.connect(&t, Handle::Output, &a, Handle::Input))
        .unwrap();

    let compiled = Compiler::builder(store.snapshot())
        .with_registry(store.registry())
        .build()
        .compile()
        .unwrap();
    assert_eq!(compiled.text(), "Modular/TIMING:RoundStart/VALUE_2:getdata(Self,5)/");
}

#[test]
fn test_snapshot_queries() {
    let snapshot = create_conditional_graph();
    assert!(snapshot.contains("c"));
    assert!(!snapshot.contains("ghost"));
    assert_eq!(snapshot.timing_nodes().count(), 1);
    assert_eq!(snapshot.outgoing("c", Handle::True).count(), 1);
    assert_eq!(snapshot.outgoing("c", Handle::False).count(), 0);
    assert_eq!(snapshot.incoming("b").next(), Some(&branch("c", Handle::True, "b")));
}

#[test]
fn test_handle_table() {
    assert!(NodeVariant::Timing.input_handles().is_empty());
    assert_eq!(NodeVariant::Timing.output_handles(), &[Handle::Output]);
    assert_eq!(NodeVariant::Conditional.output_handles(), &[Handle::True, Handle::False]);
    for variant in [
        NodeVariant::ValueAcquisition,
        NodeVariant::Consequence,
        NodeVariant::ContinueIf,
        NodeVariant::Assignment,
    ] {
        assert_eq!(variant.input_handles(), &[Handle::Input]);
        assert_eq!(variant.output_handles(), &[Handle::Output]);
    }
}
