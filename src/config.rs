//! Configuration for migrations, name allocation and the SQLite catalog.
//!
//! Every struct deserializes from JSON with all fields optional, so a config
//! file only needs to name what it changes:
//!
//! ```rust
//! use graphschema::{MigrationPolicy, SchemaConfig};
//!
//! let cfg = SchemaConfig::from_json_str(r#"{ "policy": "allow_destructive" }"#)?;
//! assert_eq!(cfg.policy, MigrationPolicy::AllowDestructive);
//! assert!(!cfg.dry_run);
//! # Ok::<(), graphschema::GraphSchemaError>(())
//! ```

use std::collections::BTreeMap;
#[cfg(feature = "sqlite-catalog")]
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{errors::GraphSchemaError, policy::MigrationPolicy};

/// Parameter-name allocation options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Capacity of the `(alias, property, value)` reuse cache.
    ///
    /// **Default:** `None` (every binding gets a fresh name). `Some(0)` is
    /// treated the same as `None`.
    pub param_cache_capacity: Option<usize>,
}

/// Options for [`SqliteCatalog`](crate::SqliteCatalog).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteCatalogConfig {
    /// PRAGMAs applied right after the connection opens, in key order.
    ///
    /// ```rust
    /// use graphschema::SqliteCatalogConfig;
    ///
    /// let mut cfg = SqliteCatalogConfig::default();
    /// cfg.pragma_settings.insert("journal_mode".into(), "WAL".into());
    /// ```
    pub pragma_settings: BTreeMap<String, String>,
    /// Prepared-statement cache size; SQLite's default when unset.
    pub statement_cache_capacity: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// **Default:** [`MigrationPolicy::SafeOnly`]
    pub policy: MigrationPolicy,
    pub allocator: AllocatorConfig,
    /// Plan migrations without executing them.
    pub dry_run: bool,
    pub sqlite: SqliteCatalogConfig,
}

impl SchemaConfig {
    pub fn new(policy: MigrationPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, GraphSchemaError> {
        serde_json::from_str(json).map_err(|e| GraphSchemaError::config(e.to_string()))
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Opens the SQLite reference catalog at `path` with the configured PRAGMAs.
#[cfg(feature = "sqlite-catalog")]
pub fn open_catalog<P: AsRef<Path>>(
    path: P,
    cfg: &SchemaConfig,
) -> Result<crate::sqlite_catalog::SqliteCatalog, GraphSchemaError> {
    crate::sqlite_catalog::SqliteCatalog::open_with_config(path, &cfg.sqlite)
}
