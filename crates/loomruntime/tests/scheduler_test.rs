mod common;

use common::{definition, fetch, merge_concat};
use loomcore::EngineError;
use loomruntime::execution_order;

#[test]
fn dependencies_come_before_dependents() {
    let def = definition(vec![
        fetch("a", "t"),
        fetch("b", "t").with_inputs(["a"]),
        merge_concat("c", &["a", "b"]),
    ]);

    let order = execution_order(&def).unwrap();
    assert_eq!(order, vec!["a", "b", "c"]);

    for node in &def.nodes {
        let position = order.iter().position(|id| *id == node.id).unwrap();
        for input in &node.inputs {
            let input_position = order.iter().position(|id| id == input).unwrap();
            assert!(
                input_position < position,
                "input {} must come before {}",
                input,
                node.id
            );
        }
    }
}

#[test]
fn order_is_independent_of_node_storage_order() {
    // Same graph as above, nodes stored back to front.
    let def = definition(vec![
        merge_concat("c", &["a", "b"]),
        fetch("b", "t").with_inputs(["a"]),
        fetch("a", "t"),
    ]);

    let order = execution_order(&def).unwrap();
    assert_eq!(order, vec!["a", "b", "c"]);
}

#[test]
fn ties_break_by_fifo_enqueue_order_not_id_sort() {
    // Both roots are ready at seed time; "b" is declared first, so it
    // runs first even though "a" sorts before it.
    let def = definition(vec![
        fetch("b", "t"),
        fetch("a", "t"),
        merge_concat("c", &["a", "b"]),
    ]);
    assert_eq!(execution_order(&def).unwrap(), vec!["b", "a", "c"]);

    // Diamond: after "root" completes, its dependents enqueue in
    // declaration order.
    let def = definition(vec![
        fetch("root", "t"),
        fetch("right", "t").with_inputs(["root"]),
        fetch("left", "t").with_inputs(["root"]),
        merge_concat("join", &["left", "right"]),
    ]);
    assert_eq!(
        execution_order(&def).unwrap(),
        vec!["root", "right", "left", "join"]
    );
}

#[test]
fn cycle_is_a_fatal_pre_execution_error() {
    let def = definition(vec![
        fetch("a", "t").with_inputs(["b"]),
        fetch("b", "t").with_inputs(["a"]),
    ]);

    assert!(matches!(
        execution_order(&def),
        Err(EngineError::CycleDetected)
    ));
}

#[test]
fn order_survives_serialization_round_trip() {
    let def = definition(vec![
        fetch("b", "t"),
        fetch("a", "t").with_inputs(["b"]),
        merge_concat("c", &["b", "a"]),
        fetch("d", "t").with_inputs(["c"]),
    ]);

    let original = execution_order(&def).unwrap();

    let encoded = serde_json::to_string(&def).unwrap();
    let reloaded: loomcore::WorkflowDefinition = serde_json::from_str(&encoded).unwrap();
    let after = execution_order(&reloaded).unwrap();

    assert_eq!(original, after);
}
