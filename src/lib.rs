//! Fibonacci heap with generational handles
//!
//! A mergeable min-priority queue with:
//!
//! - O(1) insert, peek, merge and (amortized) decrease_key
//! - O(log n) amortized extract-min and delete of any element
//!
//! Nodes live in a generational arena, so handles are plain `Copy` values
//! and a handle whose element has been removed is rejected with
//! [`HeapError::StaleHandle`] rather than dereferenced.
//!
//! # Example
//!
//! ```rust
//! use fibheap_arena::fibonacci::FibonacciHeap;
//! use fibheap_arena::HeapError;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle1 = heap.insert(5, "item1");
//! let _handle2 = heap.insert(3, "item2");
//! heap.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(heap.find_min(), Some((&1, &"item1")));
//!
//! assert_eq!(heap.decrease_key(&handle1, 9), Err(HeapError::InvalidDecrease));
//! assert_eq!(heap.extract_min(), Some((1, "item1")));
//! assert_eq!(heap.decrease_key(&handle1, 0), Err(HeapError::StaleHandle));
//! ```
//!
//! The heap is not internally synchronized. Share it across threads behind a
//! single lock.

mod arena;
pub mod fibonacci;
mod links;
pub mod pathfinding;
pub mod traits;

pub use fibonacci::{FibonacciHandle, FibonacciHeap, NodeInfo};
pub use traits::{DecreaseKeyHeap, Handle, Heap, HeapError};
