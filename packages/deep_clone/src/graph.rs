use foldhash::{HashMap, HashMapExt};

use crate::Object;

/// Maps each original object seen during one clone operation to the clone produced for it.
///
/// Keyed by object identity, not by value. Lives only for the duration of a single top-level
/// clone call.
#[derive(Debug)]
pub(crate) struct CloneGraph {
    /// The original is kept alongside its clone so that its address cannot be reused by a new
    /// allocation while the traversal is still running.
    clones: HashMap<usize, (Object, Object)>,
}

impl CloneGraph {
    pub(crate) fn new() -> Self {
        Self {
            clones: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, original: &Object) -> Option<Object> {
        self.clones
            .get(&original.identity())
            .map(|(_, clone)| clone.clone())
    }

    pub(crate) fn insert(&mut self, original: &Object, clone: Object) {
        self.clones
            .insert(original.identity(), (original.clone(), clone));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.clones.len()
    }
}
