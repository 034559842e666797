// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-kind edge operations.
//!
//! Composition lives in [`crate::hierarchy`]; every other kind gets its own
//! module here, each adding an `impl Graph` block that enforces the kind's
//! endpoint rules at the point of insertion.

mod interface;
mod operand;
mod pointer;
mod source;
mod trait_edge;
mod type_edge;

pub use interface::{Bus, BusMember};
