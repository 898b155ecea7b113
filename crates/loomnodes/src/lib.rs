//! Node behavior for the loom workflow engine.
//!
//! One module per node kind, dispatched exhaustively by the executor in
//! `loomruntime`, plus the HTTP-backed capability clients.

mod action;
mod client;
mod conditional;
mod fetch;
mod filter;
mod merge;
mod transform;
pub mod value;

pub use action::run_action;
pub use client::{HttpCompletionClient, HttpToolClient};
pub use conditional::{evaluate, run_conditional};
pub use fetch::run_fetch;
pub use filter::run_filter;
pub use merge::run_merge;
pub use transform::{build_prompt, run_transform};
