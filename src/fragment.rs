use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Bindings = BTreeMap<String, Value>;

/// Composable unit of query text plus the parameter values it references.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CypherFragment {
    pub text: String,
    pub bindings: Bindings,
}

/// Two fragments bound the same parameter name to different values.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingCollision {
    pub name: String,
    pub existing: Value,
    pub incoming: Value,
}

impl fmt::Display for BindingCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parameter {} bound twice ({} vs {})",
            self.name, self.existing, self.incoming
        )
    }
}

impl std::error::Error for BindingCollision {}

impl CypherFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bindings: Bindings::new(),
        }
    }

    pub fn with_bindings(text: impl Into<String>, bindings: Bindings) -> Self {
        Self {
            text: text.into(),
            bindings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.bindings.is_empty()
    }

    /// Merges `other`'s bindings into this fragment without touching the text.
    ///
    /// Re-binding a name to the value it already holds is accepted; any other
    /// overlap is reported and leaves `self` unchanged.
    pub fn try_merge_bindings(&mut self, other: Bindings) -> Result<(), BindingCollision> {
        for (name, incoming) in &other {
            if let Some(existing) = self.bindings.get(name) {
                if existing != incoming {
                    return Err(BindingCollision {
                        name: name.clone(),
                        existing: existing.clone(),
                        incoming: incoming.clone(),
                    });
                }
            }
        }
        self.bindings.extend(other);
        Ok(())
    }

    /// Concatenates the texts with a single space and merges the bindings.
    pub fn try_then(mut self, other: CypherFragment) -> Result<Self, BindingCollision> {
        self.try_merge_bindings(other.bindings)?;
        self.text = join_text(&self.text, &other.text, " ");
        Ok(self)
    }

    /// Concatenates two fragments.
    ///
    /// # Panics
    ///
    /// Panics when both fragments bind the same parameter name to different
    /// values. Names come from one [`crate::allocator::NameAllocator`], so this
    /// only happens when fragments minted by unrelated allocators are mixed.
    pub fn then(self, other: CypherFragment) -> Self {
        match self.try_then(other) {
            Ok(fragment) => fragment,
            Err(collision) => panic!("allocator collision: {collision}"),
        }
    }

    /// Joins fragments with `separator`, merging all bindings.
    ///
    /// # Panics
    ///
    /// Same contract as [`CypherFragment::then`].
    pub fn join<I>(fragments: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = CypherFragment>,
    {
        let mut out = CypherFragment::default();
        for fragment in fragments {
            if let Err(collision) = out.try_merge_bindings(fragment.bindings) {
                panic!("allocator collision: {collision}");
            }
            out.text = join_text(&out.text, &fragment.text, separator);
        }
        out
    }

    /// Wraps the text, keeping bindings.
    pub fn wrap(mut self, prefix: &str, suffix: &str) -> Self {
        self.text = format!("{prefix}{}{suffix}", self.text);
        self
    }
}

impl fmt::Display for CypherFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for CypherFragment {
    fn from(text: &str) -> Self {
        CypherFragment::new(text)
    }
}

fn join_text(left: &str, right: &str, separator: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{left}{separator}{right}"),
    }
}
