use graphschema::{Bindings, CypherFragment};
use serde_json::{Value, json};

fn bound(text: &str, name: &str, value: Value) -> CypherFragment {
    let mut bindings = Bindings::new();
    bindings.insert(name.to_string(), value);
    CypherFragment::with_bindings(text, bindings)
}

#[test]
fn test_then_joins_with_single_space() {
    let fragment = CypherFragment::from("MATCH (a:Person)").then(bound(
        "WHERE a.name = $p1",
        "p1",
        json!("Alice"),
    ));
    assert_eq!(fragment.text, "MATCH (a:Person) WHERE a.name = $p1");
    assert_eq!(fragment.bindings.len(), 1);
    assert_eq!(fragment.to_string(), fragment.text);
}

#[test]
fn test_empty_fragments_do_not_add_separators() {
    let fragment = CypherFragment::join(
        [
            CypherFragment::default(),
            CypherFragment::new("RETURN a"),
            CypherFragment::default(),
        ],
        " ",
    );
    assert_eq!(fragment.text, "RETURN a");
}

#[test]
fn test_identical_rebinding_is_accepted() {
    let left = bound("a.x = $p", "p", json!(1));
    let right = bound("b.x = $p", "p", json!(1));
    let merged = left.try_then(right).unwrap();
    assert_eq!(merged.bindings.len(), 1);
}

#[test]
fn test_conflicting_rebinding_is_reported() {
    let left = bound("a.x = $p", "p", json!(1));
    let right = bound("b.x = $p", "p", json!(2));
    let collision = left.clone().try_then(right).unwrap_err();
    assert_eq!(collision.name, "p");
    assert_eq!(collision.existing, json!(1));
    assert_eq!(collision.incoming, json!(2));

    let mut target = left;
    assert!(
        target
            .try_merge_bindings(bound("", "p", json!(3)).bindings)
            .is_err()
    );
    assert_eq!(target.bindings.get("p"), Some(&json!(1)));
}

#[test]
#[should_panic(expected = "allocator collision")]
fn test_then_panics_on_collision() {
    let _ = bound("a", "p", json!(1)).then(bound("b", "p", json!(2)));
}

#[test]
#[should_panic(expected = "allocator collision")]
fn test_join_panics_on_collision() {
    let _ = CypherFragment::join(
        [bound("a", "p", json!(1)), bound("b", "p", json!(2))],
        ", ",
    );
}

#[test]
fn test_wrap_keeps_bindings() {
    let fragment = bound("a.x = $p", "p", json!(true)).wrap("NOT (", ")");
    assert_eq!(fragment.text, "NOT (a.x = $p)");
    assert_eq!(fragment.bindings.get("p"), Some(&json!(true)));
}

#[test]
fn test_fragment_serializes_as_text_and_bindings() {
    let fragment = bound("RETURN $p", "p", json!([1, 2]));
    let value = serde_json::to_value(&fragment).unwrap();
    assert_eq!(value, json!({"text": "RETURN $p", "bindings": {"p": [1, 2]}}));
}
