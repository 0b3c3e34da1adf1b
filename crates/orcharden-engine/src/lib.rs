//! The agent-engine abstraction: a uniform `execute` call over four
//! concrete engines, each with its own command line and output-parsing
//! schema.
//!
//! # Main types
//!
//! - [`Engine`] — the trait the supervisor depends on.
//! - [`ExecuteOptions`] / [`EngineOutcome`] / [`CostOrDuration`] — the
//!   uniform input/output shape every engine adapter produces.
//! - [`engines`] — the four concrete adapters.

mod engine;
pub mod engines;
mod process;
mod types;

pub use engine::Engine;
pub use types::{CostOrDuration, EngineOutcome, ExecuteOptions};
