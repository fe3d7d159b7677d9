//! Agent loop primitives (events, consumer callbacks, orchestrator).

pub mod consumer;
pub mod events;
pub mod runner;
pub mod state;
pub mod types;

pub use consumer::*;
pub use events::*;
pub use runner::*;
pub use state::*;
pub use types::*;
