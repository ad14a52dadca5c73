//! Dynamic interval index backed by an interval skip list.
//!
//! Stores a multiset of intervals over any ordered value domain and
//! answers the *stabbing query* — every stored interval containing a
//! query point — in expected O(log n + k), with on-line insertion and
//! removal. Interval endpoints become keys in a randomized skip list;
//! each interval leaves markers along a staircase of list edges, and a
//! query harvests markers while descending like an ordinary key search.
//! See [`IntervalSkipList`] for the algorithmic details.
//!
//! # Example
//!
//! ```
//! use interval_skiplist::{ClosedInterval, IntervalSkipList};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let mut index = IntervalSkipList::new(SmallRng::seed_from_u64(7));
//! index.insert(ClosedInterval::new(1, 5));
//! index.insert(ClosedInterval::new(3, 7));
//! index.insert(ClosedInterval::new(10, 12));
//!
//! let mut hits = index.stab(&4);
//! hits.sort();
//! assert_eq!(hits, vec![ClosedInterval::new(1, 5), ClosedInterval::new(3, 7)]);
//! assert!(index.stab(&8).is_empty());
//!
//! assert!(index.remove(&ClosedInterval::new(3, 7)));
//! assert_eq!(index.stab(&6), vec![]);
//! ```
//!
//! Std range types implement [`Interval`] too, so `3..8` (half-open) and
//! `2..=6` (closed) can be stored directly.

mod index;
mod interval;
mod marker;
mod skiplist;

pub use index::Index;
pub use interval::{ClosedInterval, Interval};
pub use skiplist::{IntervalSkipList, Iter, Node, MAX_LEVEL};
