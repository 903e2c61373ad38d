//! Entity synthesizers for the three Bookshop resources.
//!
//! Books are derived from raw corpus records, customers are generated from
//! embedded name pools, and orders reference entities already live in the
//! virtual tables. All randomized fields draw from the shared
//! [`RandomContext`](crate::random::RandomContext) in a fixed per-record
//! order so synthesis replays with the seed.

pub mod book;
pub mod customer;
pub mod order;
