/// Wire protocol spoken by a provider's API
///
/// Several vendors expose OpenAI-compatible endpoints and differ only in
/// base URL; the dispatcher never branches on vendor identity, only on the
/// protocol recorded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireProtocol {
    OpenAiCompat,
    Anthropic,
    Google,
}

/// Syntactic rule an API key must satisfy for a provider
///
/// Advisory only: passing the rule does not guarantee upstream acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRule {
    Prefix(&'static str),
    NonEmpty,
}

impl KeyRule {
    pub fn matches(&self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }

        match self {
            Self::Prefix(prefix) => key.starts_with(prefix),
            Self::NonEmpty => true,
        }
    }
}

/// A specific named model offered by a provider
#[derive(Debug, Clone)]
pub struct Model {
    pub id: &'static str,
    pub name: &'static str,
    pub max_tokens: u32,
    pub context_window: u32,
}

/// One upstream LLM vendor and its catalog entry
#[derive(Debug, Clone)]
pub struct Provider {
    pub id: &'static str,
    pub name: &'static str,
    /// Environment variable conventionally holding a default key
    pub api_key_env: &'static str,
    /// Base URL including the API version segment
    pub base_url: &'static str,
    pub protocol: WireProtocol,
    pub key_rule: KeyRule,
    pub models: Vec<Model>,
}

impl Provider {
    pub fn model(&self, model_id: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.id == model_id)
    }
}
