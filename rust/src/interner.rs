//! Dense integer indices for task identifiers.
//!
//! The catalog and the precedence graph work on `TaskIdx` so adjacency lists,
//! in-degree counters and metric lookups are plain `Vec` indexing.

use rustc_hash::FxHashMap;

/// Interned task index (u32 for compact adjacency lists).
pub type TaskIdx = u32;

/// Insertion-ordered mapping between task identifiers and indices.
#[derive(Debug, Clone, Default)]
pub struct TaskInterner {
    to_idx: FxHashMap<String, TaskIdx>,
    names: Vec<String>,
}

impl TaskInterner {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_idx: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Register a new identifier. Returns `None` if it was already registered.
    pub fn insert(&mut self, name: &str) -> Option<TaskIdx> {
        if self.to_idx.contains_key(name) {
            return None;
        }
        let idx = self.names.len() as TaskIdx;
        self.names.push(name.to_string());
        self.to_idx.insert(name.to_string(), idx);
        Some(idx)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<TaskIdx> {
        self.to_idx.get(name).copied()
    }

    /// Identifier for an index handed out by this interner.
    ///
    /// Panics on a foreign index; indices never leave the catalog that made them.
    #[inline]
    pub fn name(&self, idx: TaskIdx) -> &str {
        &self.names[idx as usize]
    }

    /// Identifiers in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_dense_indices() {
        let mut interner = TaskInterner::with_capacity(4);

        assert_eq!(interner.insert("weld"), Some(0));
        assert_eq!(interner.insert("paint"), Some(1));
        assert_eq!(interner.insert("weld"), None);

        assert_eq!(interner.get("paint"), Some(1));
        assert_eq!(interner.get("inspect"), None);
        assert_eq!(interner.name(0), "weld");
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_names_keep_registration_order() {
        let mut interner = TaskInterner::default();
        for name in ["c", "a", "b"] {
            interner.insert(name);
        }
        let names: Vec<&str> = interner.names().collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
