//! Application-level orchestration utilities.
//!
//! This module owns the goal pipeline (build, serialize, dispatch) and the
//! controller that runs it on behalf of the TUI. UI/CLI layers call into this
//! module to keep responsibilities separated.

#[cfg(feature = "tui")]
mod controller;
mod pipeline;

#[cfg(feature = "tui")]
pub(crate) use controller::{run_controller, DispatchEvent, UiCommand};
pub(crate) use pipeline::send_goal;
