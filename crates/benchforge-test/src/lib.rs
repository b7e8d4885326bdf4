//! Shared test fixtures for BenchForge crates.
//!
//! This crate depends only on `benchforge-core`, so every other crate can
//! use it as a dev-dependency without a cycle.
//!
//! - [`executor`] - A scripted [`CommandExecutor`](benchforge_core::CommandExecutor) that never spawns processes
//! - [`outputs`] - Canned output of each supported toolchain
//! - [`experiments`] - Ready-made experiment definitions and configuration documents
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! benchforge-test = { workspace = true }
//! ```

pub mod executor;
pub mod experiments;
pub mod outputs;

pub use executor::{Reply, ScriptedExecutor};
pub use experiments::{counting_experiment, counting_experiment_named, COUNTING_TOML};
pub use outputs::{lf_c_output, lf_cpp_output, savina_output};
