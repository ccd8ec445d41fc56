//! Circular sibling-list primitives over [`NodeArena`] links
//!
//! Every node sits in exactly one ring: the root list or the child list of
//! its parent. A lone node's `left` and `right` both point at itself. All
//! operations are O(1) except [`siblings`], which walks the ring once.

use crate::arena::{NodeArena, NodeRef};
use smallvec::SmallVec;

/// Ring snapshot; most rings are short, child lists are O(log n)
pub(crate) type Siblings = SmallVec<[NodeRef; 16]>;

/// Makes `node` a singleton ring
pub(crate) fn make_singleton<T, P>(arena: &mut NodeArena<T, P>, node: NodeRef) {
    let n = &mut arena[node];
    n.left = node;
    n.right = node;
}

/// Splices the singleton `node` into the ring containing `list`, just left of it.
///
/// With `list == None` the ring is just `node`. Returns a member of the
/// resulting ring.
pub(crate) fn splice_into<T, P>(
    arena: &mut NodeArena<T, P>,
    list: Option<NodeRef>,
    node: NodeRef,
) -> NodeRef {
    match list {
        None => {
            make_singleton(arena, node);
            node
        }
        Some(anchor) => {
            let anchor_left = arena[anchor].left;
            arena[node].right = anchor;
            arena[node].left = anchor_left;
            arena[anchor_left].right = node;
            arena[anchor].left = node;
            anchor
        }
    }
}

/// Unlinks `node` from its ring and leaves it as a singleton.
///
/// Returns a remaining member, or `None` if `node` was alone.
pub(crate) fn remove_from<T, P>(arena: &mut NodeArena<T, P>, node: NodeRef) -> Option<NodeRef> {
    let (left, right) = (arena[node].left, arena[node].right);
    make_singleton(arena, node);
    if right == node {
        return None;
    }
    arena[left].right = right;
    arena[right].left = left;
    Some(right)
}

/// Joins two disjoint rings into one
pub(crate) fn concat<T, P>(arena: &mut NodeArena<T, P>, a: NodeRef, b: NodeRef) {
    let a_left = arena[a].left;
    let b_left = arena[b].left;
    arena[a_left].right = b;
    arena[b].left = a_left;
    arena[b_left].right = a;
    arena[a].left = b_left;
}

/// Every member of the ring containing `start`, beginning with `start`
pub(crate) fn siblings<T, P>(arena: &NodeArena<T, P>, start: NodeRef) -> Siblings {
    let mut out = Siblings::new();
    let mut current = start;
    loop {
        out.push(current);
        current = arena[current].right;
        if current == start {
            break;
        }
    }
    out
}

/// Moves `child` out of its ring and into `parent`'s child list.
///
/// Sets the parent link, clears the mark and bumps `parent.degree`.
pub(crate) fn link_as_child<T, P: Ord>(
    arena: &mut NodeArena<T, P>,
    parent: NodeRef,
    child: NodeRef,
) {
    debug_assert!(arena[parent].priority <= arena[child].priority);
    remove_from(arena, child);

    let existing = arena[parent].child;
    let entry = splice_into(arena, existing, child);

    let c = &mut arena[child];
    c.parent = Some(parent);
    c.marked = false;

    let p = &mut arena[parent];
    p.child = Some(entry);
    p.degree += 1;
}

/// Removes `child` from `parent`'s child list, fixing `parent.child` and
/// `parent.degree`. The child keeps its parent link; callers reset it.
pub(crate) fn detach_child<T, P>(arena: &mut NodeArena<T, P>, parent: NodeRef, child: NodeRef) {
    let rest = remove_from(arena, child);
    let p = &mut arena[parent];
    if p.child == Some(child) {
        p.child = rest;
    }
    p.degree -= 1;
}
