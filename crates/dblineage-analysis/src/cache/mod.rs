//! Best-effort result cache.
//!
//! [`CacheService`] fronts a [`CacheBackend`] and never fails: backend errors
//! are logged and read as misses.

pub mod backend;
pub mod keys;
pub mod moka_backend;
pub mod service;

pub use backend::{CacheBackend, NoopBackend};
pub use moka_backend::MokaBackend;
pub use service::CacheService;
