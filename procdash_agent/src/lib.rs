//! Library entry for procdash_agent: exposes the modules so the binary and
//! integration tests share one implementation.

pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod registry;
pub mod router;
pub mod server;
pub mod state;
pub mod types;
pub mod ws;

pub use config::AgentConfig;
pub use error::AgentError;
pub use server::{Agent, ServerError};
