//! Domain types shared across Foodgram crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers as well as the HTTP edge.

pub mod pagination;
pub mod role;
