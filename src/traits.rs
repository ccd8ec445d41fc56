//! Common traits for heap data structures
//!
//! - [`Heap`]: push / peek / pop / merge, the `BinaryHeap`-shaped surface
//! - [`DecreaseKeyHeap`]: adds handles, `decrease_key` and `delete`
//!
//! Heaps store `(priority, item)` pairs: the priority orders the heap, the
//! item rides along. Use `()` as the item for a key-only heap.

use std::fmt;

/// Error type for handle-based heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The new priority is greater than the current priority
    InvalidDecrease,
    /// The handle's element was removed, or belongs to another heap
    StaleHandle,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::InvalidDecrease => {
                write!(f, "new priority is greater than the current priority")
            }
            HeapError::StaleHandle => {
                write!(f, "handle is no longer valid (element was removed)")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// A handle to an element in the heap
///
/// Handles are cheap to copy and compare. A handle outlives its element but
/// every use after removal is rejected with [`HeapError::StaleHandle`].
pub trait Handle: Copy + PartialEq + Eq {}

/// Base trait for heap/priority queue data structures
///
/// # Example
///
/// ```rust
/// use fibheap_arena::Heap;
/// use fibheap_arena::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.push(3, "three");
/// heap.push(1, "one");
/// heap.push(2, "two");
///
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// ```
pub trait Heap<T, P: Ord> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element with the given priority
    fn push(&mut self, priority: P, item: T);

    /// Returns the minimum priority and associated item without removing it
    ///
    /// # Time Complexity
    /// O(1)
    fn peek(&self) -> Option<(&P, &T)>;

    /// Removes and returns the minimum priority and associated item
    fn pop(&mut self) -> Option<(P, T)>;

    /// Merges another heap into this one, consuming the other heap
    fn merge(&mut self, other: Self);
}

/// Extended heap trait with handle-based operations
///
/// # Example
///
/// ```rust
/// use fibheap_arena::{DecreaseKeyHeap, Heap};
/// use fibheap_arena::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.push_with_handle(10, "item");
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.peek(), Some((&5, &"item")));
/// ```
pub trait DecreaseKeyHeap<T, P: Ord>: Heap<T, P> {
    /// The handle type for this heap
    type Handle: Handle;

    /// Inserts an element with the given priority, returning a handle
    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle;

    /// Lowers the priority of the element identified by `handle`
    ///
    /// # Errors
    /// - [`HeapError::InvalidDecrease`] if `new_priority` is greater than the
    ///   current priority. An equal priority is accepted.
    /// - [`HeapError::StaleHandle`] if the element is gone.
    ///
    /// The heap is unchanged on error.
    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError>;

    /// Removes the element identified by `handle`, returning it
    ///
    /// # Errors
    /// [`HeapError::StaleHandle`] if the element is gone.
    fn delete(&mut self, handle: &Self::Handle) -> Result<(P, T), HeapError>;
}
