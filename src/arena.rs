//! Generational node storage for the Fibonacci heap
//!
//! Nodes live in [`slotmap`] tables and refer to each other by [`NodeRef`]
//! (segment id + generational slot key) instead of pointers. A removed slot
//! bumps its generation, so any [`NodeRef`] still naming it stops resolving.
//!
//! A heap's arena is split into *segments*. New nodes always go into the
//! home segment; [`NodeArena::absorb`] moves another arena's segments in
//! without touching the nodes, which is what keeps `merge` independent of
//! the number of stored elements.

use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Slot key inside a single segment
    pub(crate) struct NodeKey;
}

static NEXT_SEGMENT: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of one segment
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct SegmentId(u64);

impl SegmentId {
    fn fresh() -> Self {
        SegmentId(NEXT_SEGMENT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Reference to a node slot in some segment
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeRef {
    segment: SegmentId,
    key: NodeKey,
}

pub(crate) struct Node<T, P> {
    pub(crate) item: T,
    pub(crate) priority: P,
    pub(crate) parent: Option<NodeRef>,
    /// Any one member of the child list
    pub(crate) child: Option<NodeRef>,
    pub(crate) left: NodeRef,
    pub(crate) right: NodeRef,
    pub(crate) degree: usize,
    pub(crate) marked: bool,
}

type Segment<T, P> = SlotMap<NodeKey, Node<T, P>>;

pub(crate) struct NodeArena<T, P> {
    home: SegmentId,
    segments: FxHashMap<SegmentId, Segment<T, P>>,
}

impl<T, P> NodeArena<T, P> {
    pub(crate) fn new() -> Self {
        Self::with_capacity(0)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let home = SegmentId::fresh();
        let mut segments = FxHashMap::default();
        segments.insert(home, SlotMap::with_capacity_and_key(capacity));
        Self { home, segments }
    }

    /// Allocates a singleton node (its sibling links point at itself)
    pub(crate) fn insert(&mut self, priority: P, item: T) -> NodeRef {
        let segment = self.home;
        let slots = self
            .segments
            .entry(segment)
            .or_insert_with(SlotMap::with_key);
        let key = slots.insert_with_key(|key| {
            let this = NodeRef { segment, key };
            Node {
                item,
                priority,
                parent: None,
                child: None,
                left: this,
                right: this,
                degree: 0,
                marked: false,
            }
        });
        NodeRef { segment, key }
    }

    /// Frees a slot. Non-home segments are dropped once they run empty.
    pub(crate) fn remove(&mut self, node: NodeRef) -> Option<Node<T, P>> {
        let slots = self.segments.get_mut(&node.segment)?;
        let removed = slots.remove(node.key);
        if slots.is_empty() && node.segment != self.home {
            self.segments.remove(&node.segment);
        }
        removed
    }

    pub(crate) fn get(&self, node: NodeRef) -> Option<&Node<T, P>> {
        self.segments.get(&node.segment)?.get(node.key)
    }

    pub(crate) fn get_mut(&mut self, node: NodeRef) -> Option<&mut Node<T, P>> {
        self.segments.get_mut(&node.segment)?.get_mut(node.key)
    }

    pub(crate) fn contains(&self, node: NodeRef) -> bool {
        self.get(node).is_some()
    }

    /// Number of live nodes over all segments
    pub(crate) fn len(&self) -> usize {
        self.segments.values().map(SlotMap::len).sum()
    }

    pub(crate) fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Takes over every segment of `other`, keeping this arena's home segment.
    ///
    /// Cost is proportional to the smaller segment table, never to the node count.
    pub(crate) fn absorb(&mut self, mut other: Self) {
        if other.segments.len() > self.segments.len() {
            std::mem::swap(&mut self.segments, &mut other.segments);
            // Only the other arena's home segment can be empty here
            if self.segments.get(&other.home).is_some_and(SlotMap::is_empty) {
                self.segments.remove(&other.home);
            }
        }
        // The home segment survives even when empty: recreating it would
        // restart slot generations and let stale refs resolve again.
        for (id, slots) in other.segments.drain() {
            if id == self.home || !slots.is_empty() {
                self.segments.insert(id, slots);
            }
        }
    }

    /// Drops every node. The home segment keeps its capacity.
    pub(crate) fn clear(&mut self) {
        let home = self.home;
        self.segments.retain(|id, _| *id == home);
        if let Some(slots) = self.segments.get_mut(&home) {
            slots.clear();
        }
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = &Node<T, P>> {
        self.segments.values().flat_map(SlotMap::values)
    }

    /// Moves every node out, in arbitrary order
    pub(crate) fn into_nodes(self) -> impl Iterator<Item = Node<T, P>> {
        self.segments
            .into_values()
            .flat_map(|slots| slots.into_iter().map(|(_, node)| node))
    }
}

impl<T, P> Index<NodeRef> for NodeArena<T, P> {
    type Output = Node<T, P>;

    /// Panics if `node` is not live; heap code only indexes with links it owns.
    fn index(&self, node: NodeRef) -> &Self::Output {
        match self.get(node) {
            Some(n) => n,
            None => panic!("invalid node reference {node:?}"),
        }
    }
}

impl<T, P> IndexMut<NodeRef> for NodeArena<T, P> {
    fn index_mut(&mut self, node: NodeRef) -> &mut Self::Output {
        match self.get_mut(node) {
            Some(n) => n,
            None => panic!("invalid node reference {node:?}"),
        }
    }
}
