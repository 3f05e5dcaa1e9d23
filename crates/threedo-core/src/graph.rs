//! Offset arena for flavor records.
//!
//! [`FlavorGraph`] stores the live flavor set keyed by offset. It is a small
//! purpose-built structure rather than a general graph: edges are plain
//! offsets inside each record's secondary payload, and the only reverse edges
//! are the `parents` annotations written by the track-hash rewrite.
//!
//! # Offset assignment
//!
//! A new record always receives `max(live offsets) + 1`. There is no separate
//! counter: removing the records at the top of the arena makes their offsets
//! available again, and every record created afterwards depends on those
//! removals.
//!
//! ```
//! use threedo_core::{flavor::FlavorType, graph::FlavorGraph};
//!
//! let mut graph = FlavorGraph::new();
//! let first = graph.insert(FlavorType::Data, vec![1], vec![]);
//! let second = graph.insert(FlavorType::Data, vec![2], vec![]);
//! assert_eq!((first, second), (1, 2));
//!
//! graph.remove(second);
//! assert_eq!(graph.insert(FlavorType::Data, vec![3], vec![]), 2);
//! ```

use std::collections::{BTreeMap, btree_map};

use log::trace;
use serde::Serialize;

use crate::flavor::{Flavor, FlavorType, NIL_OFFSET, Offset};

/// The live set of flavor records, keyed by offset.
///
/// Offset 0 always holds the canonical empty record and cannot be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlavorGraph {
    flavors: BTreeMap<Offset, Flavor>,
}

impl FlavorGraph {
    /// Creates an arena holding only the empty record at offset 0.
    pub fn new() -> Self {
        let mut flavors = BTreeMap::new();
        flavors.insert(NIL_OFFSET, Flavor::empty());
        Self { flavors }
    }

    /// The offset the next inserted record will receive.
    pub fn next_offset(&self) -> Offset {
        self.flavors
            .last_key_value()
            .map_or(NIL_OFFSET, |(offset, _)| *offset)
            + 1
    }

    /// Stores a new record and returns its offset.
    pub fn insert(
        &mut self,
        flavor_type: FlavorType,
        values1: Vec<i64>,
        values2: Vec<i64>,
    ) -> Offset {
        let offset = self.next_offset();
        let flavor = Flavor::new(flavor_type, offset, values1, values2);
        trace!(offset, flavor:% = flavor; "Stored flavor");
        self.flavors.insert(offset, flavor);
        offset
    }

    /// Removes a record from the live set.
    ///
    /// Returns `None` if no record lives at `offset`, or if `offset` is the
    /// reserved empty record.
    pub fn remove(&mut self, offset: Offset) -> Option<Flavor> {
        if offset == NIL_OFFSET {
            return None;
        }
        let removed = self.flavors.remove(&offset);
        if removed.is_some() {
            trace!(offset; "Removed flavor");
        }
        removed
    }

    pub fn get(&self, offset: Offset) -> Option<&Flavor> {
        self.flavors.get(&offset)
    }

    pub fn get_mut(&mut self, offset: Offset) -> Option<&mut Flavor> {
        self.flavors.get_mut(&offset)
    }

    pub fn contains(&self, offset: Offset) -> bool {
        self.flavors.contains_key(&offset)
    }

    /// Number of live records, including the empty record.
    pub fn len(&self) -> usize {
        self.flavors.len()
    }

    /// Returns `true` if only the empty record is present.
    pub fn is_empty(&self) -> bool {
        self.flavors.len() == 1
    }

    /// Iterates the live records in ascending offset order.
    pub fn iter(&self) -> btree_map::Iter<'_, Offset, Flavor> {
        self.flavors.iter()
    }

    /// Iterates the live offsets in ascending order.
    pub fn offsets(&self) -> impl Iterator<Item = Offset> + '_ {
        self.flavors.keys().copied()
    }

    /// Consumes the arena, returning the offset-keyed record map.
    pub fn into_inner(self) -> BTreeMap<Offset, Flavor> {
        self.flavors
    }
}

impl Default for FlavorGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a FlavorGraph {
    type Item = (&'a Offset, &'a Flavor);
    type IntoIter = btree_map::Iter<'a, Offset, Flavor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_holds_empty_record() {
        let graph = FlavorGraph::new();
        assert_eq!(graph.len(), 1);
        assert!(graph.is_empty());
        assert_eq!(graph.get(0), Some(&Flavor::empty()));
        assert_eq!(graph.next_offset(), 1);
    }

    #[test]
    fn test_empty_record_cannot_be_removed() {
        let mut graph = FlavorGraph::new();
        assert!(graph.remove(0).is_none());
        assert!(graph.contains(0));
    }

    #[test]
    fn test_remove_in_the_middle_keeps_next_offset() {
        let mut graph = FlavorGraph::new();
        for n in 0..4 {
            graph.insert(FlavorType::Data, vec![n], vec![]);
        }
        let removed = graph.remove(2).expect("offset 2 is live");
        assert_eq!(removed.values1(), &[1]);
        assert_eq!(graph.next_offset(), 5);
        assert_eq!(graph.offsets().collect::<Vec<_>>(), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_remove_at_the_top_reuses_offsets() {
        let mut graph = FlavorGraph::new();
        for n in 0..4 {
            graph.insert(FlavorType::Data, vec![n], vec![]);
        }
        graph.remove(4);
        graph.remove(3);
        assert_eq!(graph.insert(FlavorType::List, vec![0], vec![]), 3);
        assert_eq!(graph.get(3).map(Flavor::flavor_type), Some(FlavorType::List));
    }

    #[test]
    fn test_remove_missing_offset() {
        let mut graph = FlavorGraph::new();
        assert!(graph.remove(9).is_none());
    }
}
