use graphschema::{
    ColumnDescriptor, DefaultSpec, GraphSchemaError, GraphType, SemanticType, TableKind,
    TableSchema, compile_table, drop_table_statement,
};


use model::{Company, Person, Post, WorksAt};

#[test]
fn test_person_compiles_to_expected_ddl() {
    let table = model::person_table();
    assert_eq!(
        table.ddl,
        "CREATE NODE TABLE Person (id UUID PRIMARY KEY, name STRING NOT NULL, age INT32)"
    );
    assert!(table.indexes.is_empty());
    assert_eq!(table.statements().len(), 1);
}

#[test]
fn test_compile_is_pure() {
    let first = compile_table("Post", Post::columns(), TableKind::Node).unwrap();
    let second = compile_table("Post", Post::columns(), TableKind::Node).unwrap();
    assert_eq!(first.statements, second.statements);
    assert_eq!(first.columns, second.columns);
}

#[test]
fn test_index_statements_follow_column_order() {
    let table = TableSchema::node("Post", Post::columns()).unwrap();
    assert_eq!(
        table.ddl,
        "CREATE NODE TABLE Post (id INT64 PRIMARY KEY, body STRING NOT NULL, \
         embedding FLOAT[3], created_at TIMESTAMP NOT NULL DEFAULT current_timestamp())"
    );
    assert_eq!(
        table.indexes,
        vec![
            "CALL CREATE_FTS_INDEX('Post', 'post_body_fts_idx', ['body'])".to_string(),
            "CALL CREATE_VECTOR_INDEX('Post', 'post_embedding_vector_idx', 'embedding')"
                .to_string(),
        ]
    );
}

#[test]
fn test_unique_indexed_column() {
    let table = TableSchema::node("Company", Company::columns()).unwrap();
    assert_eq!(
        table.ddl,
        "CREATE NODE TABLE Company (id UUID PRIMARY KEY, name STRING UNIQUE NOT NULL)"
    );
    assert_eq!(
        table.indexes,
        vec!["CREATE INDEX company_name_index_idx ON Company(name)".to_string()]
    );
}

#[test]
fn test_rel_table_ddl() {
    let table = TableSchema::edge("WorksAt", "Person", "Company", WorksAt::columns()).unwrap();
    assert_eq!(
        table.ddl,
        "CREATE REL TABLE WorksAt(FROM Person TO Company, since DATE)"
    );
    let bare = TableSchema::edge("Knows", "Person", "Person", Vec::new()).unwrap();
    assert_eq!(bare.ddl, "CREATE REL TABLE Knows(FROM Person TO Person)");
}

#[test]
fn test_reserved_words_are_escaped() {
    let table = TableSchema::node(
        "Match",
        vec![
            ColumnDescriptor::new("id", SemanticType::Int64).identifier(),
            ColumnDescriptor::new("order", SemanticType::Int32).nullable(),
            ColumnDescriptor::new("first name", SemanticType::String).nullable(),
        ],
    )
    .unwrap();
    assert_eq!(
        table.ddl,
        "CREATE NODE TABLE `Match` (id INT64 PRIMARY KEY, `order` INT32, `first name` STRING)"
    );
    assert_eq!(drop_table_statement("Match"), "DROP TABLE `Match`");
    assert_eq!(drop_table_statement("Person"), "DROP TABLE Person");
}

#[test]
fn test_storage_mapping_covers_composites() {
    let cases = [
        (SemanticType::Bool, "BOOLEAN"),
        (SemanticType::UInt16, "UINT16"),
        (SemanticType::list(SemanticType::String), "STRING[]"),
        (
            SemanticType::fixed_vector(SemanticType::Double, 128),
            "DOUBLE[128]",
        ),
        (SemanticType::Custom("Money".into()), "STRING"),
    ];
    for (semantic, storage) in cases {
        assert_eq!(semantic.storage_type(), storage);
    }
}

#[test]
fn test_default_literals() {
    let column = |default| {
        ColumnDescriptor::new("v", SemanticType::Double)
            .nullable()
            .with_default(default)
    };
    let table = TableSchema::node(
        "Defaults",
        vec![
            ColumnDescriptor::new("id", SemanticType::Int64).identifier(),
            ColumnDescriptor {
                name: "a".into(),
                ..column(DefaultSpec::Float(2.0))
            },
            ColumnDescriptor {
                name: "b".into(),
                semantic_type: SemanticType::String,
                ..column(DefaultSpec::String("it's".into()))
            },
        ],
    )
    .unwrap();
    assert!(table.ddl.contains("a DOUBLE DEFAULT 2.0"));
    assert!(table.ddl.contains(r"b STRING DEFAULT 'it\'s'"));
}

#[test]
fn test_node_without_identifier_is_rejected() {
    let err = TableSchema::node(
        "Orphan",
        vec![ColumnDescriptor::new("name", SemanticType::String)],
    )
    .unwrap_err();
    assert!(matches!(err, GraphSchemaError::DefinitionError(_)));
}

#[test]
fn test_node_with_two_identifiers_is_rejected() {
    let err = TableSchema::node(
        "Twice",
        vec![
            ColumnDescriptor::new("a", SemanticType::Int64).identifier(),
            ColumnDescriptor::new("b", SemanticType::Int64).identifier(),
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("2 identifier columns"));
}

#[test]
fn test_edge_identifier_is_rejected() {
    let err = TableSchema::edge(
        "Follows",
        "Person",
        "Person",
        vec![ColumnDescriptor::new("id", SemanticType::Int64).identifier()],
    )
    .unwrap_err();
    assert!(matches!(err, GraphSchemaError::DefinitionError(_)));
}

#[test]
fn test_duplicate_columns_are_rejected() {
    let err = TableSchema::node(
        "Dup",
        vec![
            ColumnDescriptor::new("id", SemanticType::Int64).identifier(),
            ColumnDescriptor::new("id", SemanticType::String),
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn test_vector_index_requires_vector_column() {
    let err = TableSchema::node(
        "Doc",
        vec![
            ColumnDescriptor::new("id", SemanticType::Int64).identifier(),
            ColumnDescriptor::new("text", SemanticType::String).vector_indexed(),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, GraphSchemaError::DefinitionError(_)));
}

#[test]
fn test_identifier_normalization() {
    let table = TableSchema::node(
        "Norm",
        vec![
            ColumnDescriptor::new("id", SemanticType::Int64)
                .identifier()
                .unique(),
        ],
    )
    .unwrap();
    assert_eq!(table.ddl, "CREATE NODE TABLE Norm (id INT64 PRIMARY KEY)");
    let id = table.identifier().unwrap();
    assert!(!id.is_unique && !id.is_nullable);
    assert_eq!(Person::table_name(), "Person");
}

#[test]
fn test_index_statements_for_non_plain_column_names() {
    let table = TableSchema::node(
        "Person",
        vec![
            ColumnDescriptor::new("id", SemanticType::Uuid).identifier(),
            ColumnDescriptor::new("first-name", SemanticType::String).indexed(),
            ColumnDescriptor::new("o'clock", SemanticType::String).full_text(),
        ],
    )
    .unwrap();
    assert_eq!(
        table.ddl,
        "CREATE NODE TABLE Person (id UUID PRIMARY KEY, `first-name` STRING NOT NULL, \
         `o'clock` STRING NOT NULL)"
    );
    assert_eq!(
        table.indexes,
        vec![
            "CREATE INDEX person_first_name_index_idx ON Person(`first-name`)".to_string(),
            r"CALL CREATE_FTS_INDEX('Person', 'person_o_clock_fts_idx', ['o\'clock'])"
                .to_string(),
        ]
    );
}

#[test]
fn test_string_default_escapes_backslash() {
    let table = TableSchema::node(
        "Share",
        vec![
            ColumnDescriptor::new("id", SemanticType::Int64).identifier(),
            ColumnDescriptor::new("path", SemanticType::String)
                .with_default(DefaultSpec::String(r"C:\".into())),
            ColumnDescriptor::new("quote", SemanticType::String)
                .nullable()
                .with_default(DefaultSpec::String(r"\'".into())),
        ],
    )
    .unwrap();
    assert!(table.ddl.contains(r"path STRING NOT NULL DEFAULT 'C:\\'"));
    assert!(table.ddl.contains(r"quote STRING DEFAULT '\\\''"));
}

#[test]
fn test_full_text_requires_string_column() {
    let err = TableSchema::node(
        "Doc",
        vec![
            ColumnDescriptor::new("id", SemanticType::Int64).identifier(),
            ColumnDescriptor::new("score", SemanticType::Double).full_text(),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, GraphSchemaError::DefinitionError(_)));
    assert!(err.to_string().contains("requires a STRING column"));
}
