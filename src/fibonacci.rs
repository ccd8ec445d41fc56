//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert, decrease_key, and merge
//! - O(log n) amortized delete_min and delete
//!
//! The structure is a forest of heap-ordered trees whose roots form a circular
//! doubly linked list, with `min` pointing at the smallest root. Work is done
//! lazily: insert and merge only splice root lists, and trees of equal degree
//! are linked together only when the minimum is extracted. Decreasing a key
//! cuts the node loose, and the per-node mark bit turns a second lost child
//! into a cascading cut of the parent.
//!
//! Nodes are stored in a generational arena rather than behind raw pointers,
//! so a handle to a removed element is reported as [`HeapError::StaleHandle`]
//! instead of dangling.

use crate::arena::{NodeArena, NodeRef};
use crate::links;
use crate::traits::{DecreaseKeyHeap, Handle, Heap, HeapError};
use smallvec::{smallvec, SmallVec};
use std::fmt;

/// Golden ratio, base of the degree bound `floor(log_phi(n)) + 1`
const PHI: f64 = 1.618_033_988_749_895;

/// Handle to an element in a Fibonacci heap
///
/// Handles stay valid across `merge` (a handle from the absorbed heap can be
/// used on the merged one) and until their element is popped or deleted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FibonacciHandle {
    node: NodeRef,
}

impl Handle for FibonacciHandle {}

/// Structural view of one node, for inspection and tests
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NodeInfo {
    /// Number of direct children
    pub degree: usize,
    /// Lost a child since it last became a child of its parent
    pub marked: bool,
    /// `None` for roots
    pub parent: Option<FibonacciHandle>,
}

impl NodeInfo {
    /// True when the node sits in the root list
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Fibonacci Heap
///
/// # Example
///
/// ```rust
/// use fibheap_arena::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(5, "item");
/// heap.insert(3, "other");
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.find_min(), Some((&1, &"item")));
/// assert_eq!(heap.extract_min(), Some((1, "item")));
/// ```
pub struct FibonacciHeap<T, P: Ord> {
    arena: NodeArena<T, P>,
    /// Smallest root; also the entry point of the root list
    min: Option<NodeRef>,
    len: usize,
}

impl<T, P: Ord> FibonacciHeap<T, P> {
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            min: None,
            len: 0,
        }
    }

    /// Creates an empty heap with room for `capacity` elements before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: NodeArena::with_capacity(capacity),
            min: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Inserts an element and returns its handle
    ///
    /// **Time Complexity**: O(1)
    ///
    /// The node is allocated before any link is touched, so the heap is never
    /// left half-linked.
    pub fn insert(&mut self, priority: P, item: T) -> FibonacciHandle {
        let node = self.arena.insert(priority, item);
        self.add_root(node);
        self.len += 1;
        FibonacciHandle { node }
    }

    pub fn find_min(&self) -> Option<(&P, &T)> {
        self.min.map(|min| {
            let node = &self.arena[min];
            (&node.priority, &node.item)
        })
    }

    /// Removes and returns the minimum element
    ///
    /// **Time Complexity**: O(log n) amortized
    ///
    /// The minimum's children become roots, then the root list is consolidated
    /// so that no two roots share a degree.
    pub fn extract_min(&mut self) -> Option<(P, T)> {
        let min = self.min?;
        self.len -= 1;
        self.detach(min);
        let node = self.arena.remove(min)?;
        Some((node.priority, node.item))
    }

    /// Lowers the priority of the element behind `handle`
    ///
    /// **Time Complexity**: O(1) amortized
    ///
    /// # Errors
    /// - [`HeapError::StaleHandle`] if the element is no longer in this heap
    /// - [`HeapError::InvalidDecrease`] if `new_priority` is greater than the
    ///   current priority
    ///
    /// The heap is untouched on error.
    pub fn decrease_key(
        &mut self,
        handle: &FibonacciHandle,
        new_priority: P,
    ) -> Result<(), HeapError> {
        let node = handle.node;
        let current = self.arena.get_mut(node).ok_or(HeapError::StaleHandle)?;
        if new_priority > current.priority {
            return Err(HeapError::InvalidDecrease);
        }
        current.priority = new_priority;

        if let Some(parent) = self.arena[node].parent {
            if self.arena[node].priority < self.arena[parent].priority {
                self.cut(node, parent);
                self.cascading_cut(parent);
            }
        }

        if let Some(min) = self.min {
            if self.arena[node].priority < self.arena[min].priority {
                self.min = Some(node);
            }
        }
        Ok(())
    }

    /// Removes the element behind `handle`, wherever it sits in the forest
    ///
    /// **Time Complexity**: O(log n) amortized
    ///
    /// The node is cut from its parent (with cascading cuts), its children
    /// are promoted, and the root list is consolidated only when the removed
    /// node was the minimum. No sentinel priority is involved.
    pub fn delete(&mut self, handle: &FibonacciHandle) -> Result<(P, T), HeapError> {
        let node = handle.node;
        if !self.arena.contains(node) {
            return Err(HeapError::StaleHandle);
        }
        self.len -= 1;
        self.detach(node);
        let removed = self.arena.remove(node).ok_or(HeapError::StaleHandle)?;
        Ok((removed.priority, removed.item))
    }

    /// Changes the priority of the element behind `handle` in either direction
    ///
    /// Decreases run [`decrease_key`](Self::decrease_key). Increases take the
    /// node out of the forest as [`delete`](Self::delete) does and put it back
    /// as a fresh root, so the handle stays valid.
    ///
    /// **Time Complexity**: O(1) amortized for decreases, O(log n) amortized
    /// for increases
    pub fn update_key(
        &mut self,
        handle: &FibonacciHandle,
        new_priority: P,
    ) -> Result<(), HeapError> {
        let node = handle.node;
        let current = self.arena.get(node).ok_or(HeapError::StaleHandle)?;
        if new_priority <= current.priority {
            return self.decrease_key(handle, new_priority);
        }
        self.detach(node);
        self.arena[node].priority = new_priority;
        self.add_root(node);
        Ok(())
    }

    /// Merges another heap into this one, consuming it
    ///
    /// **Time Complexity**: O(1) in the number of elements, O(s) in the number
    /// of arena segments held by the smaller of the two heaps
    ///
    /// A heap keeps one segment per merged-in heap that still has live
    /// elements, so tournament-style merging moves up to k tables per level.
    ///
    /// Handles issued by `other` refer to the same elements in `self` afterward.
    pub fn merge(&mut self, other: Self) {
        let FibonacciHeap { arena, min, len } = other;
        self.arena.absorb(arena);
        self.len += len;

        let Some(other_min) = min else {
            return;
        };
        match self.min {
            None => self.min = Some(other_min),
            Some(self_min) => {
                links::concat(&mut self.arena, self_min, other_min);
                if self.arena[other_min].priority < self.arena[self_min].priority {
                    self.min = Some(other_min);
                }
            }
        }
        tracing::trace!(
            added = len,
            len = self.len,
            segments = self.arena.segment_count(),
            "merged heaps"
        );
    }

    /// Priority and item behind `handle`
    pub fn get(&self, handle: &FibonacciHandle) -> Result<(&P, &T), HeapError> {
        self.arena
            .get(handle.node)
            .map(|node| (&node.priority, &node.item))
            .ok_or(HeapError::StaleHandle)
    }

    /// Mutable access to the item behind `handle`. The priority can only be
    /// changed through the ordered operations.
    pub fn get_item_mut(&mut self, handle: &FibonacciHandle) -> Result<&mut T, HeapError> {
        self.arena
            .get_mut(handle.node)
            .map(|node| &mut node.item)
            .ok_or(HeapError::StaleHandle)
    }

    /// Whether `handle` still names an element of this heap
    pub fn contains(&self, handle: &FibonacciHandle) -> bool {
        self.arena.contains(handle.node)
    }

    pub fn node_info(&self, handle: &FibonacciHandle) -> Result<NodeInfo, HeapError> {
        let node = self.arena.get(handle.node).ok_or(HeapError::StaleHandle)?;
        Ok(NodeInfo {
            degree: node.degree,
            marked: node.marked,
            parent: node.parent.map(|node| FibonacciHandle { node }),
        })
    }

    /// Removes every element. All outstanding handles become stale.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.min = None;
        self.len = 0;
    }

    /// Elements in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&P, &T)> {
        self.arena.nodes().map(|node| (&node.priority, &node.item))
    }

    /// Consumes the heap, returning its elements in arbitrary order
    pub fn into_vec(self) -> Vec<(P, T)> {
        self.arena
            .into_nodes()
            .map(|node| (node.priority, node.item))
            .collect()
    }

    /// Consumes the heap, returning its elements in ascending priority order
    pub fn into_sorted_vec(mut self) -> Vec<(P, T)> {
        let mut out = Vec::with_capacity(self.len);
        while let Some(entry) = self.extract_min() {
            out.push(entry);
        }
        out
    }

    /// Checks every structural invariant of the forest
    ///
    /// - sibling rings are consistent in both directions
    /// - `degree` matches the child ring length, children point at their parent
    /// - every child's priority is at least its parent's
    /// - roots are unmarked and none is smaller than `min`
    /// - the node count matches `len()`
    pub fn verify_internal_structure(&self) -> bool {
        let Some(min) = self.min else {
            return self.len == 0 && self.arena.len() == 0;
        };
        if !self.arena.contains(min) {
            return false;
        }

        let mut seen = 0usize;
        let roots = links::siblings(&self.arena, min);
        let mut stack: Vec<NodeRef> = Vec::new();
        for &root in &roots {
            let node = &self.arena[root];
            if node.parent.is_some()
                || node.marked
                || node.priority < self.arena[min].priority
            {
                return false;
            }
            stack.push(root);
        }
        if !self.ring_is_consistent(&roots) {
            return false;
        }

        while let Some(parent) = stack.pop() {
            seen += 1;
            let node = &self.arena[parent];
            let Some(first) = node.child else {
                if node.degree != 0 {
                    return false;
                }
                continue;
            };
            let children = links::siblings(&self.arena, first);
            if children.len() != node.degree || !self.ring_is_consistent(&children) {
                return false;
            }
            for &child in &children {
                let c = &self.arena[child];
                if c.parent != Some(parent) || c.priority < node.priority {
                    return false;
                }
                stack.push(child);
            }
        }

        seen == self.len && self.arena.len() == self.len
    }

    fn ring_is_consistent(&self, ring: &[NodeRef]) -> bool {
        ring.iter().all(|&node| {
            let n = &self.arena[node];
            self.arena[n.right].left == node && self.arena[n.left].right == node
        })
    }

    /// Adds a parentless singleton to the root list, updating `min`
    fn add_root(&mut self, node: NodeRef) {
        let smaller = match self.min {
            None => true,
            Some(min) => self.arena[node].priority < self.arena[min].priority,
        };
        links::splice_into(&mut self.arena, self.min, node);
        if smaller {
            self.min = Some(node);
        }
    }

    /// Takes `node` out of the forest, leaving it a childless, parentless
    /// singleton. `min` is restored (by consolidation) if `node` was the minimum.
    fn detach(&mut self, node: NodeRef) {
        if let Some(parent) = self.arena[node].parent {
            self.cut(node, parent);
            self.cascading_cut(parent);
        }
        self.promote_children(node);

        let rest = links::remove_from(&mut self.arena, node);
        if self.min == Some(node) {
            match rest {
                None => self.min = None,
                Some(start) => self.consolidate(start),
            }
        }
    }

    /// Moves all children of the root `node` into the root list
    fn promote_children(&mut self, node: NodeRef) {
        let Some(first) = self.arena[node].child.take() else {
            return;
        };
        for child in links::siblings(&self.arena, first) {
            let c = &mut self.arena[child];
            c.parent = None;
            c.marked = false;
        }
        self.arena[node].degree = 0;
        links::concat(&mut self.arena, node, first);
    }

    /// Links roots of equal degree until all root degrees are distinct, then
    /// recomputes `min`
    ///
    /// **Time Complexity**: O(log n) amortized
    ///
    /// The degree table is sized from the current length and grows if a degree
    /// ever exceeds it. On equal priorities the root already in the table
    /// stays the parent.
    fn consolidate(&mut self, start: NodeRef) {
        let roots = links::siblings(&self.arena, start);
        let mut table: SmallVec<[Option<NodeRef>; 64]> =
            smallvec![None; degree_bound(self.len) + 1];
        let mut linked = 0usize;

        for &root in &roots {
            let mut x = root;
            let mut degree = self.arena[x].degree;
            loop {
                if degree >= table.len() {
                    table.resize(degree + 1, None);
                }
                let Some(mut y) = table[degree].take() else {
                    table[degree] = Some(x);
                    break;
                };
                if self.arena[y].priority <= self.arena[x].priority {
                    std::mem::swap(&mut x, &mut y);
                }
                links::link_as_child(&mut self.arena, x, y);
                linked += 1;
                degree += 1;
            }
        }

        // Linking only removed nodes from the root ring, so the ring now holds
        // exactly the table entries.
        let mut min: Option<NodeRef> = None;
        for root in table.iter().flatten().copied() {
            let smaller = match min {
                None => true,
                Some(m) => self.arena[root].priority < self.arena[m].priority,
            };
            if smaller {
                min = Some(root);
            }
        }
        self.min = min;

        tracing::trace!(
            visited = roots.len(),
            linked,
            remaining = roots.len() - linked,
            "consolidated root list"
        );
    }

    /// Moves `node` from `parent`'s child list to the root list
    fn cut(&mut self, node: NodeRef, parent: NodeRef) {
        links::detach_child(&mut self.arena, parent, node);
        let n = &mut self.arena[node];
        n.parent = None;
        n.marked = false;
        self.add_root(node);
        tracing::trace!(degree = self.arena[parent].degree, "cut node from parent");
    }

    /// Walks up from `node`: marks the first unmarked non-root, cutting every
    /// already-marked ancestor on the way
    fn cascading_cut(&mut self, mut node: NodeRef) {
        let mut cascaded = 0usize;
        while let Some(parent) = self.arena[node].parent {
            if !self.arena[node].marked {
                self.arena[node].marked = true;
                break;
            }
            self.cut(node, parent);
            cascaded += 1;
            node = parent;
        }
        if cascaded > 0 {
            tracing::trace!(cascaded, "cascading cut");
        }
    }
}

/// Upper bound on root degree after consolidating `len` nodes
fn degree_bound(len: usize) -> usize {
    if len < 2 {
        return 1;
    }
    ((len as f64).ln() / PHI.ln()).floor() as usize + 1
}

impl<T, P: Ord> Default for FibonacciHeap<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, P: Ord + fmt::Debug> fmt::Debug for FibonacciHeap<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FibonacciHeap")
            .field("len", &self.len)
            .field("min", &self.find_min())
            .finish()
    }
}

impl<T, P: Ord> Extend<(P, T)> for FibonacciHeap<T, P> {
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        for (priority, item) in iter {
            self.insert(priority, item);
        }
    }
}

impl<T, P: Ord> FromIterator<(P, T)> for FibonacciHeap<T, P> {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

impl<T, P: Ord> Heap<T, P> for FibonacciHeap<T, P> {
    fn new() -> Self {
        FibonacciHeap::new()
    }

    fn is_empty(&self) -> bool {
        FibonacciHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        FibonacciHeap::len(self)
    }

    fn push(&mut self, priority: P, item: T) {
        self.insert(priority, item);
    }

    fn peek(&self) -> Option<(&P, &T)> {
        self.find_min()
    }

    fn pop(&mut self) -> Option<(P, T)> {
        self.extract_min()
    }

    fn merge(&mut self, other: Self) {
        FibonacciHeap::merge(self, other)
    }
}

impl<T, P: Ord> DecreaseKeyHeap<T, P> for FibonacciHeap<T, P> {
    type Handle = FibonacciHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle {
        self.insert(priority, item)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError> {
        FibonacciHeap::decrease_key(self, handle, new_priority)
    }

    fn delete(&mut self, handle: &Self::Handle) -> Result<(P, T), HeapError> {
        FibonacciHeap::delete(self, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inserts `n, n-1, ..., 1` and returns handles indexed by priority
    fn descending(n: i32) -> (FibonacciHeap<(), i32>, Vec<Option<FibonacciHandle>>) {
        let mut heap = FibonacciHeap::new();
        let mut handles = vec![None; n as usize + 1];
        for k in (1..=n).rev() {
            handles[k as usize] = Some(heap.insert(k, ()));
        }
        (heap, handles)
    }

    fn info(heap: &FibonacciHeap<(), i32>, handle: Option<FibonacciHandle>) -> NodeInfo {
        heap.node_info(&handle.unwrap()).unwrap()
    }

    #[test]
    fn test_basic_operations() {
        let mut heap = FibonacciHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);

        heap.insert(5, "a");
        heap.insert(3, "b");
        heap.insert(7, "c");

        assert_eq!(heap.len(), 3);
        assert_eq!(heap.find_min(), Some((&3, &"b")));

        assert_eq!(heap.extract_min(), Some((3, "b")));
        assert_eq!(heap.find_min(), Some((&5, &"a")));
        assert!(heap.verify_internal_structure());
    }

    #[test]
    fn test_empty_heap() {
        let mut heap: FibonacciHeap<(), i32> = FibonacciHeap::new();
        assert_eq!(heap.find_min(), None);
        assert_eq!(heap.extract_min(), None);
        assert_eq!(heap.len(), 0);
        assert!(heap.verify_internal_structure());
    }

    #[test]
    fn test_descending_inserts_extract_in_order() {
        let (mut heap, _) = descending(8);
        for expected in 1..=8 {
            assert_eq!(heap.extract_min(), Some((expected, ())));
            assert_eq!(heap.len(), 8 - expected as usize);
            assert!(heap.verify_internal_structure());
        }
        assert_eq!(heap.extract_min(), None);
    }

    #[test]
    fn test_consolidation_shape() {
        let (mut heap, h) = descending(8);
        heap.extract_min();

        // 7 nodes consolidate into trees of size 4, 2 and 1
        assert!(info(&heap, h[2]).is_root());
        assert_eq!(info(&heap, h[2]).degree, 2);
        assert_eq!(info(&heap, h[6]).degree, 1);
        assert_eq!(info(&heap, h[8]).degree, 0);
        assert_eq!(info(&heap, h[5]).parent, h[4]);
        assert_eq!(info(&heap, h[4]).parent, h[2]);
        assert!(heap.verify_internal_structure());
    }

    #[test]
    fn test_decrease_key_on_grandchild() {
        let (mut heap, h) = descending(8);
        heap.extract_min();
        assert_eq!(info(&heap, h[5]).parent, h[4]);

        heap.decrease_key(&h[5].unwrap(), 0).unwrap();

        let grandchild = info(&heap, h[5]);
        assert!(grandchild.is_root());
        assert!(!grandchild.marked);
        let former_parent = info(&heap, h[4]);
        assert_eq!(former_parent.degree, 0);
        assert!(former_parent.marked);
        assert!(!former_parent.is_root());
        assert_eq!(heap.find_min(), Some((&0, &())));
        assert!(heap.verify_internal_structure());
    }

    #[test]
    fn test_cascading_cut() {
        let (mut heap, h) = descending(16);
        heap.extract_min();
        // 2 is the root of an 8-node tree: children 3, 4{5}, 6{7, 8{9}}
        assert_eq!(info(&heap, h[2]).degree, 3);
        assert_eq!(info(&heap, h[6]).parent, h[2]);
        assert_eq!(info(&heap, h[7]).parent, h[6]);
        assert_eq!(info(&heap, h[8]).parent, h[6]);

        heap.decrease_key(&h[7].unwrap(), 0).unwrap();
        assert!(info(&heap, h[7]).is_root());
        assert!(info(&heap, h[6]).marked);
        assert_eq!(info(&heap, h[6]).degree, 1);

        // 6 loses its second child and is cut as well
        heap.decrease_key(&h[8].unwrap(), 1).unwrap();
        let eight = info(&heap, h[8]);
        assert!(eight.is_root());
        assert_eq!(eight.degree, 1);
        let six = info(&heap, h[6]);
        assert!(six.is_root());
        assert!(!six.marked);
        assert_eq!(six.degree, 0);
        assert_eq!(info(&heap, h[2]).degree, 2);
        assert!(!info(&heap, h[2]).marked);
        assert!(heap.verify_internal_structure());

        let order: Vec<i32> = heap.into_sorted_vec().into_iter().map(|(p, _)| p).collect();
        let mut expected = vec![0, 1, 2, 3, 4, 5, 6];
        expected.extend(9..=16);
        assert_eq!(order, expected);
    }

    #[test]
    fn test_decrease_key() {
        let mut heap = FibonacciHeap::new();
        let _h1 = heap.insert(10, "a");
        let h2 = heap.insert(20, "b");
        let h3 = heap.insert(30, "c");

        assert_eq!(heap.find_min(), Some((&10, &"a")));

        heap.decrease_key(&h2, 5).unwrap();
        assert_eq!(heap.find_min(), Some((&5, &"b")));

        heap.decrease_key(&h3, 1).unwrap();
        assert_eq!(heap.find_min(), Some((&1, &"c")));

        // Equal priority is allowed
        heap.decrease_key(&h3, 1).unwrap();
        assert_eq!(heap.len(), 3);
    }

    #[test]
    fn test_invalid_decrease_leaves_heap_unchanged() {
        let (mut heap, h) = descending(8);
        heap.extract_min();
        let before = info(&heap, h[5]);

        assert_eq!(
            heap.decrease_key(&h[5].unwrap(), 100),
            Err(HeapError::InvalidDecrease)
        );
        assert_eq!(heap.find_min(), Some((&2, &())));
        assert_eq!(heap.len(), 7);
        assert_eq!(heap.get(&h[5].unwrap()), Ok((&5, &())));
        assert_eq!(info(&heap, h[5]), before);
    }

    #[test]
    fn test_stale_handle() {
        let mut heap = FibonacciHeap::new();
        let a = heap.insert(1, 'a');
        let b = heap.insert(2, 'b');
        assert_eq!(heap.extract_min(), Some((1, 'a')));

        assert_eq!(heap.decrease_key(&a, 0), Err(HeapError::StaleHandle));
        assert_eq!(heap.delete(&a), Err(HeapError::StaleHandle));
        assert_eq!(heap.update_key(&a, 0), Err(HeapError::StaleHandle));
        assert_eq!(heap.get(&a), Err(HeapError::StaleHandle));
        assert!(!heap.contains(&a));

        // The freed slot is reused without reviving the old handle
        let c = heap.insert(0, 'c');
        assert!(!heap.contains(&a));
        assert_eq!(heap.delete(&c), Ok((0, 'c')));
        assert_eq!(heap.delete(&b), Ok((2, 'b')));
        assert!(heap.is_empty());
    }

    #[test]
    fn test_handle_from_other_heap_is_rejected() {
        let mut a = FibonacciHeap::new();
        let mut b = FibonacciHeap::new();
        let in_b = b.insert(1, ());
        a.insert(5, ());
        assert_eq!(a.decrease_key(&in_b, 0), Err(HeapError::StaleHandle));
        assert_eq!(a.delete(&in_b), Err(HeapError::StaleHandle));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_delete_nested_node() {
        let (mut heap, h) = descending(16);
        heap.extract_min();

        // 8 has a parent (6) and a child (9)
        assert_eq!(heap.delete(&h[8].unwrap()), Ok((8, ())));
        assert_eq!(heap.len(), 14);
        assert!(info(&heap, h[9]).is_root());
        assert!(info(&heap, h[6]).marked);
        assert_eq!(heap.find_min(), Some((&2, &())));
        assert!(heap.verify_internal_structure());

        let order: Vec<i32> = heap.into_sorted_vec().into_iter().map(|(p, _)| p).collect();
        let expected: Vec<i32> = (2..=16).filter(|&k| k != 8).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_delete_min_consolidates() {
        let (mut heap, h) = descending(8);
        assert_eq!(heap.delete(&h[1].unwrap()), Ok((1, ())));
        assert_eq!(heap.find_min(), Some((&2, &())));
        assert_eq!(info(&heap, h[2]).degree, 2);
        assert!(heap.verify_internal_structure());
    }

    #[test]
    fn test_delete_only_node() {
        let mut heap = FibonacciHeap::new();
        let h = heap.insert(42, ());
        assert_eq!(heap.delete(&h), Ok((42, ())));
        assert!(heap.is_empty());
        assert_eq!(heap.find_min(), None);
        assert!(heap.verify_internal_structure());
    }

    #[test]
    fn test_update_key_increase() {
        let (mut heap, h) = descending(8);
        heap.extract_min();

        // Move the current minimum to the back
        heap.update_key(&h[2].unwrap(), 100).unwrap();
        assert_eq!(heap.find_min(), Some((&3, &())));
        assert!(info(&heap, h[2]).is_root());
        assert_eq!(info(&heap, h[2]).degree, 0);
        assert!(heap.verify_internal_structure());

        // Raise a nested node above its children
        heap.update_key(&h[3].unwrap(), 50).unwrap();
        assert!(heap.verify_internal_structure());

        heap.update_key(&h[8].unwrap(), 7).unwrap();
        let order: Vec<i32> = heap.into_sorted_vec().into_iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec![4, 5, 6, 7, 7, 50, 100]);
    }

    #[test]
    fn test_update_key_single_element() {
        let mut heap = FibonacciHeap::new();
        let h = heap.insert(1, "x");
        heap.update_key(&h, 10).unwrap();
        assert_eq!(heap.find_min(), Some((&10, &"x")));
        heap.update_key(&h, 3).unwrap();
        assert_eq!(heap.find_min(), Some((&3, &"x")));
        assert!(heap.verify_internal_structure());
    }

    #[test]
    fn test_merge() {
        let mut heap1 = FibonacciHeap::new();
        heap1.insert(5, "a");
        heap1.insert(10, "b");

        let mut heap2 = FibonacciHeap::new();
        heap2.insert(3, "c");
        heap2.insert(7, "d");

        heap1.merge(heap2);
        assert_eq!(heap1.find_min(), Some((&3, &"c")));
        assert_eq!(heap1.len(), 4);
        assert!(heap1.verify_internal_structure());
    }

    #[test]
    fn test_merge_keeps_handles() {
        let mut odd: FibonacciHeap<(), i32> = [1, 3, 5].into_iter().map(|k| (k, ())).collect();
        let mut even = FibonacciHeap::new();
        let four = even.insert(4, ());
        even.insert(2, ());
        even.insert(6, ());

        odd.merge(even);
        assert_eq!(odd.len(), 6);
        odd.decrease_key(&four, 0).unwrap();
        assert_eq!(odd.find_min(), Some((&0, &())));
        assert!(odd.verify_internal_structure());

        let order: Vec<i32> = odd.into_sorted_vec().into_iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 5, 6]);
    }

    #[test]
    fn test_merge_with_empty() {
        let mut heap = FibonacciHeap::new();
        heap.insert(1, ());
        heap.merge(FibonacciHeap::new());
        assert_eq!(heap.len(), 1);

        let mut empty = FibonacciHeap::new();
        empty.merge(heap);
        assert_eq!(empty.find_min(), Some((&1, &())));
        assert!(empty.verify_internal_structure());
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut heap = FibonacciHeap::new();
        let h = heap.insert(1, ());
        heap.insert(2, ());
        heap.clear();
        assert!(heap.is_empty());
        assert!(!heap.contains(&h));
        heap.insert(3, ());
        assert_eq!(heap.find_min(), Some((&3, &())));
    }

    #[test]
    fn test_get_item_mut() {
        let mut heap = FibonacciHeap::new();
        let h = heap.insert(1, String::from("a"));
        heap.get_item_mut(&h).unwrap().push('b');
        assert_eq!(heap.get(&h), Ok((&1, &String::from("ab"))));
    }

    #[test]
    fn test_iter_and_into_vec() {
        let heap: FibonacciHeap<char, i32> =
            vec![(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
        let mut seen: Vec<i32> = heap.iter().map(|(p, _)| *p).collect();
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3]);

        let mut all = heap.into_vec();
        all.sort();
        assert_eq!(all, vec![(1, 'a'), (2, 'b'), (3, 'c')]);
    }

    #[test]
    fn test_degree_bound() {
        assert_eq!(degree_bound(0), 1);
        assert_eq!(degree_bound(1), 1);
        assert_eq!(degree_bound(2), 2);
        // log_phi(1000) ~= 14.35
        assert_eq!(degree_bound(1000), 15);
    }

    #[test]
    fn test_large_heap_consolidates() {
        let mut heap = FibonacciHeap::with_capacity(5000);
        for k in (0..5000).rev() {
            heap.insert(k, ());
        }
        for expected in 0..2500 {
            assert_eq!(heap.extract_min(), Some((expected, ())));
        }
        assert!(heap.verify_internal_structure());
    }
}
