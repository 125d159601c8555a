//! Testing utilities for storage failure handling
//!
//! This module provides tools for testing how the hub reacts when its
//! durable layer misbehaves:
//!
//! - **Faulty store**: wraps any `OrderedStore` and fails chosen writes or
//!   deletes on demand, so retention and append error paths can be driven
//!   deterministically
//!
//! # Example
//!
//! ```ignore
//! use channelhub_storage::testing::FaultyStore;
//! use channelhub_storage::UnifiedStore;
//!
//! let store = FaultyStore::wrap(UnifiedStore::new());
//! store.fail_deletes_for("flaky");
//! // every delete in channel "flaky" now returns StorageFailure
//! ```

mod faulty;

pub use faulty::{FaultPlan, FaultyStore};
