//! # Grade Classification
//!
//! An item's grade is always derived from `(definition, level)`; it is never
//! stored. The only memoized value is the grade at level 0, which both chance
//! models request on every call.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::definitions::ItemDefinition;

/// Highest grade an item can have.
pub const MAX_GRADE: u8 = 3;

/// Number of distinct zero grades (rows of a base chance table).
pub const ZERO_GRADES: usize = 3;

/// Returns the smallest `i` with `level < grades[i]`, or 3 once `level`
/// reaches `grades[2]`.
#[inline]
#[must_use]
pub fn classify(grades: &[u32; 4], level: u32) -> u8 {
    if level < grades[0] {
        0
    } else if level < grades[1] {
        1
    } else if level < grades[2] {
        2
    } else {
        MAX_GRADE
    }
}

/// Memoized grade at level 0, keyed by item name.
///
/// Entries are never invalidated while a catalog owns the cache: catalog data
/// is immutable once loaded. A cache handed to another catalog is pruned with
/// [`ZeroGradeCache::retain`] first. Population is idempotent, so concurrent
/// callers racing on the same key store the same value.
#[derive(Debug, Default)]
pub struct ZeroGradeCache {
    grades: RwLock<HashMap<String, u8>>,
}

impl ZeroGradeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached zero grade for `item`, classifying it on first use.
    pub fn get_or_classify(&self, item: &ItemDefinition) -> u8 {
        if let Some(&grade) = self.grades.read().get(&item.name) {
            return grade;
        }
        let grade = item.grade(0);
        *self
            .grades
            .write()
            .entry(item.name.clone())
            .or_insert(grade)
    }

    /// Keeps only the entries for which `keep(name, grade)` returns true.
    pub fn retain(&self, mut keep: impl FnMut(&str, u8) -> bool) {
        self.grades.write().retain(|name, grade| keep(name.as_str(), *grade));
    }

    /// Number of cached items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grades.read().len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grades.read().is_empty()
    }
}
