//! Storage traits and in-process implementations.
//!
//! The shared TTL cache backend lives in a separate crate
//! (`hearth-auth-redis`); this module defines the traits it implements plus
//! the in-memory cache used as the fallback tier and in tests.

pub mod cache;
pub mod memory;
pub mod user;

pub use cache::TtlCache;
pub use memory::MemoryCache;
pub use user::{UserRecord, UserStore};
