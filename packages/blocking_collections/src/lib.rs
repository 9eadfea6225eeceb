#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Thread-safe collections for handing items between producer and consumer threads.
//!
//! * [`BlockingQueue`] is a first-in-first-out queue.
//! * [`BlockingList`] is a double-ended list that can be pushed to and popped from at both ends.
//!
//! Both are guarded by a single mutex. Consumers choose between popping without blocking
//! (`try_pop*`, returning `None` when empty), blocking until an item arrives (`wait_and_pop*`)
//! and blocking with a timeout. Every push wakes at most one blocked consumer.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use blocking_collections::BlockingQueue;
//!
//! let results = Arc::new(BlockingQueue::new());
//!
//! let workers = (0..4)
//!     .map(|worker| {
//!         let results = Arc::clone(&results);
//!         thread::spawn(move || results.push(worker * 10))
//!     })
//!     .collect::<Vec<_>>();
//!
//! let mut received = (0..4).map(|_| results.wait_and_pop()).collect::<Vec<_>>();
//! received.sort_unstable();
//!
//! assert_eq!(received, vec![0, 10, 20, 30]);
//!
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//! ```

mod constants;
mod deque;
mod list;
mod queue;

pub use list::*;
pub use queue::*;
