use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{diff::SchemaDiff, errors::GraphSchemaError};

/// How much a migration may change. Variants are ordered by permissiveness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPolicy {
    /// Any change is rejected.
    None,
    /// Table and column additions only.
    #[default]
    SafeOnly,
    AllowDestructive,
}

impl MigrationPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            MigrationPolicy::None => "none",
            MigrationPolicy::SafeOnly => "safe_only",
            MigrationPolicy::AllowDestructive => "allow_destructive",
        }
    }

    /// Checks a diff against this policy.
    ///
    /// The error names the first offending table, and the column when the
    /// offence is column-level.
    pub fn validate(self, diff: &SchemaDiff) -> Result<(), GraphSchemaError> {
        match self {
            MigrationPolicy::AllowDestructive => Ok(()),
            MigrationPolicy::SafeOnly => match diff.first_destructive() {
                Some(change) => Err(GraphSchemaError::rejected(
                    self,
                    change.table,
                    change.column,
                    change.reason.describe(),
                )),
                None => Ok(()),
            },
            MigrationPolicy::None => {
                let touched = diff.touched_tables();
                match touched.first() {
                    Some(table) => Err(GraphSchemaError::rejected(
                        self,
                        *table,
                        None,
                        "policy forbids schema changes",
                    )),
                    None => Ok(()),
                }
            }
        }
    }

    pub fn permits(self, diff: &SchemaDiff) -> bool {
        self.validate(diff).is_ok()
    }
}

impl fmt::Display for MigrationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationPolicy {
    type Err = GraphSchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(MigrationPolicy::None),
            "safe_only" | "safeonly" | "safe" => Ok(MigrationPolicy::SafeOnly),
            "allow_destructive" | "allowdestructive" | "destructive" => {
                Ok(MigrationPolicy::AllowDestructive)
            }
            other => Err(GraphSchemaError::config(format!(
                "unknown migration policy {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!("SafeOnly".parse::<MigrationPolicy>().unwrap(), MigrationPolicy::SafeOnly);
        assert_eq!(
            "allow-destructive".parse::<MigrationPolicy>().unwrap(),
            MigrationPolicy::AllowDestructive
        );
        assert!("sometimes".parse::<MigrationPolicy>().is_err());
    }

    #[test]
    fn ordering_follows_permissiveness() {
        assert!(MigrationPolicy::None < MigrationPolicy::SafeOnly);
        assert!(MigrationPolicy::SafeOnly < MigrationPolicy::AllowDestructive);
    }
}
