//! Shared test utilities for the dirmirror workspace.
//!
//! This crate provides a standard on-disk fixture so the engine, CLI and
//! integration suites do not each build their own. It is a dev-dependency
//! only and never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`], a temporary source and replica pair

pub mod tree;

pub use tree::TestTree;
