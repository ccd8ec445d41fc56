//! Dijkstra's and A* search driven by a [`DecreaseKeyHeap`]
//!
//! Only lightweight indices are stored in the heap. An FxHash map takes node
//! states to their index, and a dense table holds per-node costs, the heap
//! handle and the predecessor. When a cheaper route to an open node is found
//! its entry is lowered in place with `decrease_key` instead of pushed again.
//!
//! Dijkstra is A* with a zero heuristic.
//!
//! # Example
//!
//! ```rust
//! use fibheap_arena::pathfinding::{dijkstra, SearchNode};
//! use fibheap_arena::fibonacci::FibonacciHeap;
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! struct Pos { x: i32, y: i32, goal: (i32, i32) }
//!
//! impl SearchNode for Pos {
//!     type Cost = u32;
//!
//!     fn successors(&self) -> Vec<(Self, u32)> {
//!         [(1, 0), (-1, 0), (0, 1), (0, -1)]
//!             .into_iter()
//!             .map(|(dx, dy)| (Pos { x: self.x + dx, y: self.y + dy, goal: self.goal }, 1))
//!             .collect()
//!     }
//!
//!     fn is_goal(&self) -> bool {
//!         (self.x, self.y) == self.goal
//!     }
//! }
//!
//! let start = Pos { x: 0, y: 0, goal: (2, 2) };
//! let (path, cost) = dijkstra::<_, FibonacciHeap<_, _>>(&start).unwrap();
//! assert_eq!(cost, 4);
//! assert_eq!(path.len(), 5);
//! ```

use crate::traits::DecreaseKeyHeap;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::hash::Hash;
use std::ops::Add;

/// Costs must be ordered, copyable, addable and have a zero (`Default`)
pub trait Cost: Ord + Copy + Add<Output = Self> + Default {}

impl<T> Cost for T where T: Ord + Copy + Add<Output = Self> + Default {}

/// A node in a search graph
pub trait SearchNode: Clone + Eq + Hash {
    type Cost: Cost;

    /// Neighbours with the cost of the edge leading to each
    fn successors(&self) -> Vec<(Self, Self::Cost)>;

    fn is_goal(&self) -> bool;
}

/// A node that can estimate its remaining cost to a goal
///
/// The estimate must never exceed the true cost for A* to return optimal paths.
pub trait AStarNode: SearchNode {
    fn heuristic(&self) -> Self::Cost;
}

/// Heap priority ordered by f-score only
#[derive(Debug, Clone, Copy)]
pub struct PriorityCost<C> {
    /// g + h
    pub f_score: C,
    /// Cost from start
    pub g_score: C,
}

impl<C: Ord> PartialEq for PriorityCost<C> {
    fn eq(&self, other: &Self) -> bool {
        self.f_score == other.f_score
    }
}

impl<C: Ord> Eq for PriorityCost<C> {}

impl<C: Ord> PartialOrd for PriorityCost<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Ord> Ord for PriorityCost<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score.cmp(&other.f_score)
    }
}

type NodeIndex = usize;

struct NodeEntry<N: SearchNode, H> {
    node: N,
    g_score: N::Cost,
    /// Present while the node is in the open set
    handle: Option<H>,
    came_from: Option<NodeIndex>,
    closed: bool,
}

struct SearchState<N: SearchNode, H> {
    entries: Vec<NodeEntry<N, H>>,
    index_of: FxHashMap<N, NodeIndex>,
}

impl<N: SearchNode, H> SearchState<N, H> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            index_of: FxHashMap::default(),
        }
    }

    fn index_or_insert(&mut self, node: N, g_score: N::Cost) -> (NodeIndex, bool) {
        if let Some(&index) = self.index_of.get(&node) {
            return (index, false);
        }
        let index = self.entries.len();
        self.index_of.insert(node.clone(), index);
        self.entries.push(NodeEntry {
            node,
            g_score,
            handle: None,
            came_from: None,
            closed: false,
        });
        (index, true)
    }

    fn path_to(&self, mut current: NodeIndex) -> Vec<N> {
        let mut path = vec![self.entries[current].node.clone()];
        while let Some(prev) = self.entries[current].came_from {
            path.push(self.entries[prev].node.clone());
            current = prev;
        }
        path.reverse();
        path
    }
}

/// Shortest path from `start` to the first node where `is_goal()` holds
///
/// Returns the path (both ends included) and its cost, or `None` if no goal
/// is reachable.
pub fn dijkstra<N, H>(start: &N) -> Option<(Vec<N>, N::Cost)>
where
    N: SearchNode,
    H: DecreaseKeyHeap<NodeIndex, PriorityCost<N::Cost>>,
{
    search::<N, H>(start, |_| N::Cost::default())
}

/// A* search guided by [`AStarNode::heuristic`]
pub fn astar<N, H>(start: &N) -> Option<(Vec<N>, N::Cost)>
where
    N: AStarNode,
    H: DecreaseKeyHeap<NodeIndex, PriorityCost<N::Cost>>,
{
    search::<N, H>(start, |n| n.heuristic())
}

/// Every node reachable from `start` at a cost of at most `max_cost`, with
/// its shortest distance, in non-decreasing distance order
pub fn reachable_within<N, H>(start: &N, max_cost: N::Cost) -> Vec<(N, N::Cost)>
where
    N: SearchNode,
    H: DecreaseKeyHeap<NodeIndex, PriorityCost<N::Cost>>,
{
    let mut heap = H::new();
    let mut state: SearchState<N, H::Handle> = SearchState::new();
    let zero = N::Cost::default();
    let mut settled = Vec::new();

    let (start_index, _) = state.index_or_insert(start.clone(), zero);
    let handle = heap.push_with_handle(
        PriorityCost {
            f_score: zero,
            g_score: zero,
        },
        start_index,
    );
    state.entries[start_index].handle = Some(handle);

    while let Some((priority, current)) = heap.pop() {
        let g = priority.g_score;
        if g > max_cost {
            break;
        }
        let entry = &mut state.entries[current];
        entry.closed = true;
        entry.handle = None;
        let node = entry.node.clone();

        for (neighbour, edge) in node.successors() {
            relax(&mut heap, &mut state, current, neighbour, g + edge, zero);
        }
        settled.push((node, g));
    }

    tracing::debug!(settled = settled.len(), "bounded search finished");
    settled
}

fn search<N, H>(
    start: &N,
    heuristic: impl Fn(&N) -> N::Cost,
) -> Option<(Vec<N>, N::Cost)>
where
    N: SearchNode,
    H: DecreaseKeyHeap<NodeIndex, PriorityCost<N::Cost>>,
{
    let mut heap = H::new();
    let mut state: SearchState<N, H::Handle> = SearchState::new();
    let zero = N::Cost::default();

    let (start_index, _) = state.index_or_insert(start.clone(), zero);
    let handle = heap.push_with_handle(
        PriorityCost {
            f_score: heuristic(start),
            g_score: zero,
        },
        start_index,
    );
    state.entries[start_index].handle = Some(handle);

    let mut expanded = 0usize;
    while let Some((priority, current)) = heap.pop() {
        let g = priority.g_score;
        let entry = &mut state.entries[current];
        entry.closed = true;
        entry.handle = None;
        let node = entry.node.clone();
        expanded += 1;

        if node.is_goal() {
            tracing::debug!(expanded, "search reached goal");
            return Some((state.path_to(current), g));
        }

        for (neighbour, edge) in node.successors() {
            let h = heuristic(&neighbour);
            relax(&mut heap, &mut state, current, neighbour, g + edge, h);
        }
    }

    tracing::debug!(expanded, "search exhausted without reaching goal");
    None
}

/// Offers `tentative_g` as a new distance for `neighbour`
fn relax<N, H>(
    heap: &mut H,
    state: &mut SearchState<N, H::Handle>,
    from: NodeIndex,
    neighbour: N,
    tentative_g: N::Cost,
    h: N::Cost,
) where
    N: SearchNode,
    H: DecreaseKeyHeap<NodeIndex, PriorityCost<N::Cost>>,
{
    let (index, is_new) = state.index_or_insert(neighbour, tentative_g);
    let entry = &mut state.entries[index];
    if entry.closed || (!is_new && tentative_g >= entry.g_score) {
        return;
    }

    entry.g_score = tentative_g;
    entry.came_from = Some(from);
    let priority = PriorityCost {
        f_score: tentative_g + h,
        g_score: tentative_g,
    };
    match entry.handle {
        Some(handle) => {
            // Lower f-score, so this cannot be rejected as an increase
            let _ = heap.decrease_key(&handle, priority);
        }
        None => entry.handle = Some(heap.push_with_handle(priority, index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fibonacci::FibonacciHeap;

    type Fib<C> = FibonacciHeap<NodeIndex, PriorityCost<C>>;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    struct Line {
        value: i32,
        goal: i32,
    }

    impl SearchNode for Line {
        type Cost = u32;

        fn successors(&self) -> Vec<(Self, u32)> {
            if self.value < 100 {
                vec![(
                    Line {
                        value: self.value + 1,
                        goal: self.goal,
                    },
                    1,
                )]
            } else {
                vec![]
            }
        }

        fn is_goal(&self) -> bool {
            self.value == self.goal
        }
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    struct Grid {
        x: i32,
        y: i32,
        size: i32,
        goal: (i32, i32),
    }

    impl SearchNode for Grid {
        type Cost = u32;

        fn successors(&self) -> Vec<(Self, u32)> {
            [(1, 0), (-1, 0), (0, 1), (0, -1)]
                .into_iter()
                .map(|(dx, dy)| Grid {
                    x: self.x + dx,
                    y: self.y + dy,
                    ..self.clone()
                })
                .filter(|g| (0..g.size).contains(&g.x) && (0..g.size).contains(&g.y))
                .map(|g| (g, 1))
                .collect()
        }

        fn is_goal(&self) -> bool {
            (self.x, self.y) == self.goal
        }
    }

    impl AStarNode for Grid {
        fn heuristic(&self) -> u32 {
            ((self.x - self.goal.0).abs() + (self.y - self.goal.1).abs()) as u32
        }
    }

    #[test]
    fn test_dijkstra_simple_path() {
        let start = Line { value: 0, goal: 5 };
        let (path, cost) = dijkstra::<_, Fib<u32>>(&start).unwrap();
        assert_eq!(cost, 5);
        assert_eq!(path.len(), 6);
        assert_eq!(path[5].value, 5);
    }

    #[test]
    fn test_dijkstra_no_path() {
        let start = Line { value: 0, goal: -1 };
        assert!(dijkstra::<_, Fib<u32>>(&start).is_none());
    }

    #[test]
    fn test_dijkstra_start_is_goal() {
        let start = Line { value: 7, goal: 7 };
        let (path, cost) = dijkstra::<_, Fib<u32>>(&start).unwrap();
        assert_eq!(cost, 0);
        assert_eq!(path, vec![start]);
    }

    #[test]
    fn test_astar_grid() {
        let start = Grid {
            x: 0,
            y: 0,
            size: 10,
            goal: (9, 9),
        };
        let (path, cost) = astar::<_, Fib<u32>>(&start).unwrap();
        assert_eq!(cost, 18);
        assert_eq!(path.len(), 19);
        assert_eq!(dijkstra::<_, Fib<u32>>(&start).unwrap().1, 18);
    }

    #[test]
    fn test_reachable_within() {
        let start = Line { value: 0, goal: -1 };
        let reached = reachable_within::<_, Fib<u32>>(&start, 3);
        let values: Vec<(i32, u32)> = reached.iter().map(|(n, c)| (n.value, *c)).collect();
        assert_eq!(values, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_priority_cost_ordering() {
        let a = PriorityCost {
            f_score: 1,
            g_score: 9,
        };
        let b = PriorityCost {
            f_score: 2,
            g_score: 0,
        };
        assert!(a < b);
        assert_eq!(
            a,
            PriorityCost {
                f_score: 1,
                g_score: 0
            }
        );
    }
}
