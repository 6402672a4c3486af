//! Service plumbing shared by Foodgram binaries: middleware, tracing and small
//! sea-query helpers.

pub mod middleware;
pub mod sea_ext;
pub mod tracing;
