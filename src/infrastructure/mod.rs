//! Infrastructure layer: HTTP seam, wire clients, prober, agent loop, tools

pub mod agent;
pub mod http;
pub mod llm;
pub mod logging;
pub mod probe;
pub mod tools;
