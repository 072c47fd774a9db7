//! Flat, index-addressed WAVL ordered maps for Rust.
//!
//! This crate provides two ordered maps built on one rank-balanced ([WAVL]) tree engine:
//!
//! - [`FlatOrderedMap`] - records stay packed in `[1, len]` of one buffer; removing a record moves
//!   the last record into the hole.
//! - [`HandleOrderedMap`] - removed slots go on a free list, so every record keeps its [`Handle`]
//!   across unrelated insertions, removals and growth.
//!
//! Both maps store whole records `T` and find the key inside each record with a plain function
//! `fn(&T) -> &K`, ordered by any [`Compare`] implementation ([`Natural`] uses [`Ord`]).
//!
//! # Example
//!
//! ```
//! use flat_wavl::{Error, FlatOrderedMap, Growth, Natural};
//!
//! #[derive(Debug, PartialEq)]
//! struct Order {
//!     id: u64,
//!     qty: u32,
//! }
//!
//! fn order_id(order: &Order) -> &u64 {
//!     &order.id
//! }
//!
//! let mut book = FlatOrderedMap::new(order_id);
//! book.insert(Order { id: 7, qty: 10 }).unwrap();
//! book.insert(Order { id: 3, qty: 5 }).unwrap();
//! assert_eq!(book.first(), Some(&Order { id: 3, qty: 5 }));
//!
//! // Storage that may not grow reports a full store instead of reallocating.
//! let mut small = FlatOrderedMap::with_growth(order_id, Natural, Growth::Fixed);
//! let err = small.insert(Order { id: 1, qty: 1 }).unwrap_err();
//! assert_eq!(err.error, Error::NoCapacity);
//! assert_eq!(err.into_record().id, 1);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Relocatable** - Nodes link by slot index, so storage can be moved, cloned or grown freely
//! - **Explicit growth** - [`Growth`] chooses between fixed, bounded and unbounded storage, and a
//!   failed insertion hands the record back in an [`InsertError`]
//! - **`tracing`** (optional feature) - storage growth is reported through the `tracing` crate
//!
//! # Implementation
//!
//! Slot 0 of every store is a sentinel standing for "no node" with rank -1. Nodes store only the
//! parity of their rank, which is all the WAVL rules need: a child one rank below its parent has
//! the opposite parity and a child two ranks below the same parity. An insertion performs at most
//! one single or double rotation, a removal at most two.
//!
//! [WAVL]: https://en.wikipedia.org/wiki/WAVL_tree

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod compare;
mod error;
mod iter;
mod raw;
mod trace;
mod try_insert;

pub mod flat_ordered_map;
pub mod handle_ordered_map;

pub use compare::{Compare, Natural};
pub use error::{Error, InsertError};
pub use flat_ordered_map::FlatOrderedMap;
pub use handle_ordered_map::{Handle, HandleOrderedMap};
pub use iter::{Iter, Range, RangeRev};
pub use raw::{Growth, Violation};
pub use try_insert::TryInsert;
