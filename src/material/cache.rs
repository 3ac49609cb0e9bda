use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::MaterialKey;
use crate::errors::Result;

/// De-duplicating store of compiled materials.
///
/// Entries are shared through [`Rc`]; callers that keep one across a
/// [`clear`](Self::clear) hold a material the cache no longer knows about.
#[derive(Debug)]
pub struct MaterialCache<T> {
    entries: FxHashMap<MaterialKey, Rc<T>>,
}

impl<T> Default for MaterialCache<T> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<T> MaterialCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the material stored under `key`, building it with `create`
    /// on first use. `create` is not called on a hit.
    pub fn try_emplace(
        &mut self,
        key: MaterialKey,
        create: impl FnOnce(&MaterialKey) -> Result<T>,
    ) -> Result<Rc<T>> {
        if let Some(material) = self.entries.get(&key) {
            return Ok(Rc::clone(material));
        }
        let material = Rc::new(create(&key)?);
        log::debug!(
            "Material cache miss: graph {:016x}, {:?}, {:?}",
            key.graph_hash,
            key.light,
            key.flags
        );
        self.entries.insert(key, Rc::clone(&material));
        Ok(material)
    }

    #[must_use]
    pub fn get(&self, key: &MaterialKey) -> Option<&Rc<T>> {
        self.entries.get(key)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
