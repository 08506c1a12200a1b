//! Typed results decoded from engine responses.

mod bucket;
mod hits;

pub use bucket::{AggResult, Bucket, BucketCollection};
pub use hits::{Hit, SearchResult};
