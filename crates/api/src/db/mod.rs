//! Relational persistence for robots, preferences, and conversation history.
//!
//! Every read and mutation filters by the caller identity recorded at
//! creation time; nothing in this layer is reachable without it. The store
//! relies on Postgres transactional guarantees — an atomic three-insert
//! commit for create, single statements affecting zero or one logical row
//! for delete and clear — rather than application-level locks.

pub mod store;

pub use store::{RobotStore, StoreError};
