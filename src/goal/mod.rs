//! Goal construction and the action goal wire format.
//!
//! Everything here is pure: no I/O, no clock, same input gives the same output.

mod builder;
mod wire;

pub use builder::{build, build_from_request};
pub use wire::{parse_goal_fields, to_payload};
