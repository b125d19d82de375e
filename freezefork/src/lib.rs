//! freezefork: CLI and vault API client.
//!
//! All pipeline logic (scanning, packaging, publish orchestration) lives in
//! `freezefork-core`; this crate is CLI glue plus the concrete reqwest
//! implementation of the core's [`VaultApi`] contract.
//!
//! [`VaultApi`]: freezefork_core::contract::VaultApi

pub mod cli;
pub mod client;
