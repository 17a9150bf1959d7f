//! Identifiers and a simple allocator for observed elements.

use serde::{Deserialize, Serialize};

/// Opaque handle for an element the host asked us to observe.
///
/// The host keeps its own mapping from id to node; the core never touches
/// the node itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic allocator for ElementId.
/// Released ids are never reused within one engine, so late callbacks for a
/// released element cannot alias a newer one.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_element: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_element(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element = self.next_element.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_element(), ElementId(0));
        assert_eq!(alloc.alloc_element(), ElementId(1));
        alloc.reset();
        assert_eq!(alloc.alloc_element(), ElementId(0));
    }
}
