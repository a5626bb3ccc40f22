//! Cross-file duplicate detection for globally-unique object names.
//!
//! Tracks `(object_type, name)` pairs without caring about bodies, the same
//! way the validator's other bookkeeping tracks names rather than values.
//! Only types with global-uniqueness semantics are checked; which types
//! those are is an explicit set on the registry, not a hard-coded rule.

use std::collections::{HashMap, HashSet};

use crate::diagnostic::Diagnostic;

/// A named `object` definition, as reported by the structural validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub object_type: String,
    pub name: String,
    pub file: String,
    pub line: usize,
}

/// First-seen location of a unique name.
#[derive(Debug, Clone)]
struct FirstSeen {
    file: String,
    line: usize,
}

/// Accumulates named objects across files and flags duplicates.
///
/// The caller owns the registry for the duration of one lint pass and
/// feeds it files in a deterministic order, so "previously defined at"
/// messages are stable across runs.
pub struct Registry {
    unique_types: HashSet<String>,
    seen: HashMap<(String, String), FirstSeen>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry checking the default uniqueness set (`TimePeriod`).
    pub fn new() -> Self {
        Self::with_unique_types(["TimePeriod"])
    }

    /// Registry checking an explicit set of object types.
    pub fn with_unique_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unique_types: types.into_iter().map(Into::into).collect(),
            seen: HashMap::new(),
        }
    }

    /// Record one definition. Returns a diagnostic when the `(type, name)`
    /// pair was already defined; the first-seen entry is never overwritten.
    pub fn record(&mut self, rec: &ObjectRecord) -> Option<Diagnostic> {
        if !self.unique_types.contains(&rec.object_type) {
            return None;
        }

        let key = (rec.object_type.clone(), rec.name.clone());
        match self.seen.get(&key) {
            Some(first) => Some(Diagnostic::error(
                &rec.file,
                rec.line,
                format!(
                    "Duplicate {} name '\"{}\"' (previously defined at {}:{})",
                    rec.object_type, rec.name, first.file, first.line
                ),
            )),
            None => {
                self.seen.insert(
                    key,
                    FirstSeen {
                        file: rec.file.clone(),
                        line: rec.line,
                    },
                );
                None
            }
        }
    }
}
