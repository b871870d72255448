//! propbind — typed accessors over externally-resolved configuration.
//!
//! This facade crate re-exports the propbind sub-crates through a single
//! dependency:
//!
//! ```ignore
//! use propbind::{AccessorSpec, PropertyBinder, TypeRef};
//! use propbind::cache::{ConcurrentMapCache, ExpiringCache};
//! ```

pub extern crate propbind_cache;
pub extern crate propbind_core;

// Re-export everything from propbind-core at the top level for convenience.
pub use propbind_core::*;

/// Cache strategies, re-exported under a short path.
pub use propbind_cache as cache;
