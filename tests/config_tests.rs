use graphschema::{
    CatalogIntrospection, GraphSchemaError, MigrationManager, MigrationPolicy, NameAllocator,
    SchemaConfig, open_catalog,
};
use tempfile::TempDir;


#[test]
fn test_empty_config_uses_defaults() {
    let cfg = SchemaConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, SchemaConfig::default());
    assert_eq!(cfg.policy, MigrationPolicy::SafeOnly);
    assert_eq!(cfg.allocator.param_cache_capacity, None);
    assert!(cfg.sqlite.pragma_settings.is_empty());
}

#[test]
fn test_nested_sections_parse() {
    let cfg = SchemaConfig::from_json_str(
        r#"{
            "policy": "none",
            "dry_run": true,
            "allocator": { "param_cache_capacity": 64 },
            "sqlite": {
                "pragma_settings": { "journal_mode": "WAL", "synchronous": "NORMAL" },
                "statement_cache_capacity": 32
            }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.policy, MigrationPolicy::None);
    assert!(cfg.dry_run);
    assert_eq!(cfg.allocator.param_cache_capacity, Some(64));
    assert_eq!(cfg.sqlite.pragma_settings["synchronous"], "NORMAL");
    assert_eq!(cfg.sqlite.statement_cache_capacity, Some(32));
}

#[test]
fn test_unknown_policy_is_a_config_error() {
    let err = SchemaConfig::from_json_str(r#"{ "policy": "yolo" }"#).unwrap_err();
    assert!(matches!(err, GraphSchemaError::ConfigError(_)));
    let err = SchemaConfig::from_json_str("not json").unwrap_err();
    assert!(matches!(err, GraphSchemaError::ConfigError(_)));
}

#[test]
fn test_policy_text_forms() {
    assert_eq!("safe-only".parse::<MigrationPolicy>().unwrap(), MigrationPolicy::SafeOnly);
    assert_eq!(
        " Allow_Destructive ".parse::<MigrationPolicy>().unwrap(),
        MigrationPolicy::AllowDestructive
    );
    assert!("sometimes".parse::<MigrationPolicy>().is_err());
    assert_eq!(MigrationPolicy::SafeOnly.to_string(), "safe_only");
    assert_eq!(
        serde_json::to_string(&MigrationPolicy::AllowDestructive).unwrap(),
        "\"allow_destructive\""
    );
}

#[test]
fn test_config_round_trips_through_json() {
    let mut cfg = SchemaConfig::new(MigrationPolicy::AllowDestructive).with_dry_run(true);
    cfg.allocator.param_cache_capacity = Some(8);
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(SchemaConfig::from_json_str(&json).unwrap(), cfg);
}

#[test]
fn test_allocator_from_config() {
    let mut cfg = SchemaConfig::default();
    cfg.allocator.param_cache_capacity = Some(4);
    let allocator = NameAllocator::from_config(&cfg.allocator);
    let first = allocator.param_for_value("person_0", "name", &serde_json::json!("a"));
    let second = allocator.param_for_value("person_0", "name", &serde_json::json!("a"));
    assert_eq!(first, second);

    let uncached = NameAllocator::from_config(&SchemaConfig::default().allocator);
    let first = uncached.param_for_value("person_0", "name", &serde_json::json!("a"));
    let second = uncached.param_for_value("person_0", "name", &serde_json::json!("a"));
    assert_ne!(first, second);
}

#[test]
fn test_open_catalog_applies_config() {
    let dir = TempDir::new().unwrap();
    let cfg = SchemaConfig::from_json_str(
        r#"{ "sqlite": { "pragma_settings": { "journal_mode": "WAL" } } }"#,
    )
    .unwrap();
    let catalog = open_catalog(dir.path().join("schema.db"), &cfg).unwrap();
    let mode: String = catalog
        .connection()
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_lowercase(), "wal");

    let mut manager = MigrationManager::with_config(&catalog, &catalog, &cfg);
    manager.migrate(&model::full_schema()).unwrap();
    assert_eq!(catalog.list_tables().unwrap().len(), 5);
}
