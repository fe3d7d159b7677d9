//! connector-agent: mediation layer between a language-model agent and
//! data-source connectors.
//!
//! Two halves:
//! - [`agent_loop::AgentRunner`] consumes the agent runtime's event stream,
//!   dispatches callbacks to a [`agent_loop::RunConsumer`], and keeps the
//!   conversation history of completed runs.
//! - [`tools`] exposes a [`connector::Connector`] to the agent and shapes every
//!   result (field projection, truncation, compaction, download
//!   materialization, output-size guard) before the model sees it.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use connector_agent::prelude::*;
//!
//! # async fn example(
//! #     runtime: Arc<dyn AgentRuntime>,
//! # ) -> connector_agent::error::Result<()> {
//! let mut runner = AgentRunner::new(runtime);
//! let result = runner.drive("List my last five calls", &mut NoopConsumer, None).await?;
//! println!("{:?}", result.status);
//! # Ok(())
//! # }
//! ```

pub mod agent_loop;
pub mod config;
pub mod connector;
pub mod error;
pub mod prelude;
pub mod runtime;
pub mod tools;
pub mod types;
