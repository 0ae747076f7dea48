//! Adforge Storage
//!
//! Remote store abstraction for campaign output history. The store is
//! append-only from the pipeline's point of view: uploads are idempotent by
//! key and existing versions are never overwritten, which is what lets the
//! version allocator treat remote listings as durable history.

pub mod memory;
pub mod s3;
pub mod traits;

pub use memory::InMemoryStore;
pub use s3::S3RemoteStore;
pub use traits::{RemoteStore, StoreError, StoreResult};
