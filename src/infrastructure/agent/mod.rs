//! Tool-calling agent loop

mod executor;
mod toolset;

pub use executor::AgentExecutor;
pub use toolset::{assemble_toolset, ToolSettings};
