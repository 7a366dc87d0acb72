//! Stash - thread-safe in-process caches for a scripting runtime
//!
//! Provides a capacity-bounded LRU store and a fixed-TTL store behind one
//! cache contract, plus the host-facing classes that expose them.

pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod shell;

pub use cache::{CacheStats, MemStash, Stash, TimeStash};
pub use config::Config;
pub use error::{Result, StashError};
pub use host::{ClassRegistry, StashObject, Value};
pub use shell::Shell;
