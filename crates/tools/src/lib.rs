//! Named, schema-described tools over a [`BrokerClient`](kitemcp_core::BrokerClient).
//!
//! Each invocation is checked against its declared parameters once, decoded
//! into a typed argument record, forwarded to exactly one broker call and
//! rendered to a single text payload.

pub mod args;
pub mod catalog;
pub mod error;
pub mod schema;
pub mod toolset;

pub use error::ToolError;
pub use schema::{ParamSpec, ParamType, ToolDefinition};
pub use toolset::ToolSet;
