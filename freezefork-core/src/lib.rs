//! freezefork-core: core logic library for freezefork.
//!
//! This crate contains the data model, host/vault contracts, the dependency
//! scanner, the package builder and the publish pipeline. Transport (HTTP
//! client/server) and the CLI live in the sibling crates; nothing in here
//! opens a socket.

pub mod contract;
pub mod host;
pub mod manifest;
pub mod model;
pub mod package;
pub mod publish;
pub mod scanner;
