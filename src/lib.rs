#![deny(missing_docs)]

//! This crate implements an in-memory B-tree, [BTree], with a run-time minimum degree and a
//! caller-supplied comparator.
//!
//! Insertion splits full nodes on the way down and deletion rebalances on the way down, so each
//! operation is a single root-to-leaf pass. Node memory comes from a [NodeAlloc], by default
//! [Heap]; allocation failure is reported as [Error::Alloc] rather than aborting.
//!
//! # Example
//!
//! ```
//!     use ordered_btree::BTree;
//!     let mut tree = BTree::new(3, |a: &(u32, &str), b: &(u32, &str)| a.0.cmp(&b.0)).unwrap();
//!     tree.insert((44, "London")).unwrap();
//!     tree.insert((33, "Paris")).unwrap();
//!     assert_eq!(tree.search(&(33, "")), Some(&(33, "Paris")));
//!     let names: Vec<_> = tree.iter().map(|e| e.1).collect();
//!     assert_eq!(names, ["Paris", "London"]);
//! ```
//!
//!# Features
//!
//! This crate supports the following cargo features:
//! - `serde` : enables serialisation of [BTree] via serde crate.
//! - `unsafe-optim` : uses unsafe code for extra optimisation.

mod alloc;
mod dump;
mod error;
mod iter;
mod node;
mod remove;
mod tree;
mod vecs;

pub use alloc::{AllocAdapter, Heap, NodeAlloc};
pub use dump::Dump;
pub use error::{Error, Result};
pub use iter::{Cursor, Iter};
pub use tree::BTree;

/// Minimum degree used by [BTree::default].
pub const DEFAULT_DEGREE: usize = 4;

/// Frame limit of the cursor returned by [BTree::cursor]. Enough for any tree that fits in memory.
pub const DEFAULT_DEPTH: usize = 32;

// Tests.

/* mimalloc cannot be used with miri */
#[cfg(all(test, not(miri)))]
use mimalloc::MiMalloc;

#[cfg(all(test, not(miri)))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
