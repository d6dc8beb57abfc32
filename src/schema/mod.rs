mod column;
mod table;
mod types;

pub use column::{ColumnConstraint, ColumnDescriptor, DefaultSpec};
pub use table::{GraphSchema, TableKind, TableSchema};
pub use types::SemanticType;
