// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for netweave crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`logging`] - tracing subscriber for tests
//! - [`tree`] - instance hierarchies from dotted paths
//! - [`library`] - canned type graphs

pub mod library;
pub mod logging;
pub mod tree;

pub use library::{divider_library, Library};
pub use logging::init_tracing;
pub use tree::{TestTree, TreeBuilder};
