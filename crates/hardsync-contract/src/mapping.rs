//! Semantic type to target-language type name mapping.

use crate::SemanticType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps each semantic type to the type name used in generated device code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeMapping(BTreeMap<SemanticType, String>);

impl TypeMapping {
    /// Create an empty mapping.
    pub fn empty() -> Self {
        TypeMapping(BTreeMap::new())
    }

    /// Add or replace an entry.
    pub fn with(mut self, ty: SemanticType, name: impl Into<String>) -> Self {
        self.0.insert(ty, name.into());
        self
    }

    /// Target type name for a semantic type.
    pub fn get(&self, ty: SemanticType) -> Option<&str> {
        self.0.get(&ty).map(String::as_str)
    }

    /// Whether the mapping has an entry for `ty`.
    pub fn contains(&self, ty: SemanticType) -> bool {
        self.0.contains_key(&ty)
    }

    /// The subset of `types` without an entry, preserving order.
    pub fn missing<I>(&self, types: I) -> Vec<SemanticType>
    where
        I: IntoIterator<Item = SemanticType>,
    {
        let mut missing = Vec::new();
        for ty in types {
            if !self.contains(ty) && !missing.contains(&ty) {
                missing.push(ty);
            }
        }
        missing
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> impl Iterator<Item = (SemanticType, &str)> {
        self.0.iter().map(|(ty, name)| (*ty, name.as_str()))
    }
}

impl Default for TypeMapping {
    /// Generic C++ names; the device dialect rewrites them as needed.
    fn default() -> Self {
        TypeMapping::empty()
            .with(SemanticType::Float, "double")
            .with(SemanticType::Integer, "int")
            .with(SemanticType::Text, "std::string")
            .with(SemanticType::None, "void")
    }
}
