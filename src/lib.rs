//! hbnb: a line-oriented console over a small JSON-backed object store.
//!
//! - [`models`]: stored objects, attribute values and the class registry
//! - [`storage`]: the object store and its on-disk snapshot
//! - [`console`]: the command interpreter
//! - [`config`]: where the snapshot lives

pub mod config;
pub mod console;
pub mod models;
pub mod storage;
