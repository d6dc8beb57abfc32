use graphschema::{
    ColumnDescriptor, GraphSchema, GraphSchemaError, MigrationPolicy, SchemaDiff, SemanticType,
    TableSchema, diff,
};
use rand::Rng;


fn person(extra: Option<SemanticType>) -> GraphSchema {
    let mut columns = vec![ColumnDescriptor::new("id", SemanticType::Uuid).identifier()];
    if let Some(semantic) = extra {
        columns.push(ColumnDescriptor::new("score", semantic));
    }
    GraphSchema::new()
        .with_table(TableSchema::node("Person", columns).unwrap())
        .unwrap()
}

#[test]
fn test_empty_diff_is_accepted_by_every_policy() {
    let empty = SchemaDiff::default();
    for policy in [
        MigrationPolicy::None,
        MigrationPolicy::SafeOnly,
        MigrationPolicy::AllowDestructive,
    ] {
        assert!(policy.validate(&empty).is_ok());
    }
}

#[test]
fn test_none_rejects_any_change() {
    let diff = diff(&GraphSchema::new(), &person(None));
    let err = MigrationPolicy::None.validate(&diff).unwrap_err();
    match err {
        GraphSchemaError::MigrationRejected { policy, table, .. } => {
            assert_eq!(policy, MigrationPolicy::None);
            assert_eq!(table, "Person");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_safe_only_accepts_additions() {
    let diff = diff(&person(None), &person(Some(SemanticType::Double)));
    assert!(MigrationPolicy::SafeOnly.validate(&diff).is_ok());
}

#[test]
fn test_safe_only_names_offending_column() {
    let diff = diff(
        &person(Some(SemanticType::Int32)),
        &person(Some(SemanticType::String)),
    );
    let err = MigrationPolicy::SafeOnly.validate(&diff).unwrap_err();
    assert!(err.is_rejection());
    assert_eq!(
        err.to_string(),
        "migration rejected by policy safe_only: table Person column score \
         (storage type changes from INT32 to STRING)"
    );
    assert!(MigrationPolicy::AllowDestructive.validate(&diff).is_ok());
}

#[test]
fn test_policy_monotonicity_on_random_diffs() {
    let mut rng = fuzz_common::labeled_rng("policy-monotonic");
    let choices = [
        None,
        Some(SemanticType::Int32),
        Some(SemanticType::Int64),
        Some(SemanticType::String),
    ];
    for _ in 0..fuzz_common::fuzz_iterations() {
        let pick = |rng: &mut rand::rngs::StdRng| {
            if rng.gen_bool(0.2) {
                GraphSchema::new()
            } else {
                person(choices[rng.gen_range(0..choices.len())].clone())
            }
        };
        let current = pick(&mut rng);
        let target = pick(&mut rng);
        let diff = diff(&current, &target);
        if MigrationPolicy::SafeOnly.permits(&diff) {
            assert!(MigrationPolicy::AllowDestructive.permits(&diff));
        }
        if MigrationPolicy::None.permits(&diff) {
            assert!(diff.is_empty());
            assert!(MigrationPolicy::SafeOnly.permits(&diff));
        }
    }
}

#[test]
fn test_full_schema_drop_is_gated() {
    let diff = diff(&model::full_schema(), &GraphSchema::new());
    let err = MigrationPolicy::SafeOnly.validate(&diff).unwrap_err();
    assert!(err.to_string().contains("table Likes"));
}
