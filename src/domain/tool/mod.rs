//! Tool contract for the agent loop

use std::fmt::Debug;

use async_trait::async_trait;

/// An external capability the model may invoke
///
/// `invoke` never fails: every failure mode (transport error, empty result,
/// malformed upstream response) is converted into a descriptive text result,
/// so the agent loop always receives an observation it can reason over.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Stable name the model uses to address the tool
    fn name(&self) -> &'static str;

    /// Description consumed by the model's tool-selection reasoning
    fn description(&self) -> &'static str;

    /// Run the tool against free-text input
    async fn invoke(&self, input: &str) -> String;
}
