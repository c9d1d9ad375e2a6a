//! Trazar: declarative cloud resource graphs.
//!
//! Builds a typed, acyclic desired-state graph (storage table, execution role,
//! packaged function, HTTP entry point) from configuration and hands it to an
//! external reconciler. Names are deterministic and account-scoped values stay
//! deferred until identity resolution.

pub mod cli;
pub mod core;
pub mod resources;
