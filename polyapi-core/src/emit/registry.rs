//! Two-pass type declaration.
//!
//! Pass 1 declares a named placeholder for every type a profile will emit.
//! Pass 2 fills in bodies and resolves every cross-type reference by name
//! against the placeholders, so declaration order never has to follow
//! reference order.

use indexmap::IndexMap;

use crate::error::{PolyApiError, Result};

#[derive(Debug, Clone)]
pub struct TypeRegistry<H> {
    profile: &'static str,
    entries: IndexMap<String, H>,
}

impl<H> TypeRegistry<H> {
    pub fn new(profile: &'static str) -> Self {
        TypeRegistry {
            profile,
            entries: IndexMap::new(),
        }
    }

    pub fn declare(&mut self, name: &str, handle: H) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(PolyApiError::DuplicateTypeName(name.to_string()));
        }
        self.entries.insert(name.to_string(), handle);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&H> {
        self.entries
            .get(name)
            .ok_or_else(|| PolyApiError::UnresolvedTypeReference {
                profile: self.profile.to_string(),
                type_name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &H)> {
        self.entries.iter().map(|(name, handle)| (name.as_str(), handle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
