//! Static provider catalog
//!
//! The source of truth for which providers and models can be addressed by a
//! request. Lookups are pure; client construction lives in
//! `infrastructure::llm` so this module stays free of I/O concerns.

use once_cell::sync::Lazy;

use super::provider::{KeyRule, Model, Provider, WireProtocol};

static CATALOG: Lazy<Vec<Provider>> = Lazy::new(|| {
    vec![
        Provider {
            id: "openai",
            name: "OpenAI",
            api_key_env: "OPENAI_API_KEY",
            base_url: "https://api.openai.com/v1",
            protocol: WireProtocol::OpenAiCompat,
            key_rule: KeyRule::Prefix("sk-"),
            models: vec![
                Model {
                    id: "gpt-4o",
                    name: "GPT-4o",
                    max_tokens: 128_000,
                    context_window: 128_000,
                },
                Model {
                    id: "gpt-4o-mini",
                    name: "GPT-4o Mini",
                    max_tokens: 16_384,
                    context_window: 16_384,
                },
                Model {
                    id: "gpt-3.5-turbo",
                    name: "GPT-3.5 Turbo",
                    max_tokens: 4_096,
                    context_window: 4_096,
                },
            ],
        },
        Provider {
            id: "anthropic",
            name: "Anthropic",
            api_key_env: "ANTHROPIC_API_KEY",
            base_url: "https://api.anthropic.com",
            protocol: WireProtocol::Anthropic,
            key_rule: KeyRule::Prefix("sk-ant-"),
            models: vec![
                Model {
                    id: "claude-3-5-sonnet-20241022",
                    name: "Claude 3.5 Sonnet",
                    max_tokens: 4_096,
                    context_window: 200_000,
                },
                Model {
                    id: "claude-3-5-haiku-20241022",
                    name: "Claude 3.5 Haiku",
                    max_tokens: 4_096,
                    context_window: 200_000,
                },
                Model {
                    id: "claude-3-opus-20240229",
                    name: "Claude 3 Opus",
                    max_tokens: 4_096,
                    context_window: 200_000,
                },
            ],
        },
        Provider {
            id: "groq",
            name: "Groq",
            api_key_env: "GROQ_API_KEY",
            base_url: "https://api.groq.com/openai/v1",
            protocol: WireProtocol::OpenAiCompat,
            key_rule: KeyRule::Prefix("gsk_"),
            models: vec![
                Model {
                    id: "llama3-70b-8192",
                    name: "Llama 3 70B",
                    max_tokens: 8_192,
                    context_window: 8_192,
                },
                Model {
                    id: "llama3-8b-8192",
                    name: "Llama 3 8B",
                    max_tokens: 8_192,
                    context_window: 8_192,
                },
                Model {
                    id: "mixtral-8x7b-32768",
                    name: "Mixtral 8x7B",
                    max_tokens: 32_768,
                    context_window: 32_768,
                },
                Model {
                    id: "gemma2-9b-it",
                    name: "Gemma 2 9B",
                    max_tokens: 8_192,
                    context_window: 8_192,
                },
            ],
        },
        Provider {
            id: "google",
            name: "Google Gemini",
            api_key_env: "GOOGLE_API_KEY",
            base_url: "https://generativelanguage.googleapis.com/v1beta",
            protocol: WireProtocol::Google,
            key_rule: KeyRule::NonEmpty,
            models: vec![
                Model {
                    id: "gemini-2.0-flash-exp",
                    name: "Gemini 2.0 Flash",
                    max_tokens: 1_048_576,
                    context_window: 1_048_576,
                },
                Model {
                    id: "gemini-1.5-flash",
                    name: "Gemini 1.5 Flash",
                    max_tokens: 1_048_576,
                    context_window: 1_048_576,
                },
                Model {
                    id: "gemini-1.5-pro",
                    name: "Gemini 1.5 Pro",
                    max_tokens: 1_048_576,
                    context_window: 1_048_576,
                },
            ],
        },
        Provider {
            id: "deepseek",
            name: "DeepSeek",
            api_key_env: "DEEPSEEK_API_KEY",
            base_url: "https://api.deepseek.com/v1",
            protocol: WireProtocol::OpenAiCompat,
            key_rule: KeyRule::Prefix("sk-"),
            models: vec![
                Model {
                    id: "deepseek-chat",
                    name: "DeepSeek Chat",
                    max_tokens: 32_768,
                    context_window: 32_768,
                },
                Model {
                    id: "deepseek-coder",
                    name: "DeepSeek Coder",
                    max_tokens: 32_768,
                    context_window: 32_768,
                },
                Model {
                    id: "deepseek-reasoner",
                    name: "DeepSeek Reasoner",
                    max_tokens: 32_768,
                    context_window: 32_768,
                },
            ],
        },
        Provider {
            id: "fireworks",
            name: "Fireworks AI",
            api_key_env: "FIREWORKS_API_KEY",
            base_url: "https://api.fireworks.ai/inference/v1",
            protocol: WireProtocol::OpenAiCompat,
            key_rule: KeyRule::NonEmpty,
            models: vec![
                Model {
                    id: "llama-v2-7b-chat",
                    name: "Llama v2 7B Chat",
                    max_tokens: 4_096,
                    context_window: 4_096,
                },
                Model {
                    id: "llama-v2-13b-chat",
                    name: "Llama v2 13B Chat",
                    max_tokens: 4_096,
                    context_window: 4_096,
                },
                Model {
                    id: "llama-v2-70b-chat",
                    name: "Llama v2 70B Chat",
                    max_tokens: 4_096,
                    context_window: 4_096,
                },
            ],
        },
    ]
});

/// The full catalog, insertion order preserved
pub fn providers() -> &'static [Provider] {
    &CATALOG
}

pub fn get_provider(provider_id: &str) -> Option<&'static Provider> {
    CATALOG.iter().find(|p| p.id == provider_id)
}

pub fn get_model(provider_id: &str, model_id: &str) -> Option<&'static Model> {
    get_provider(provider_id).and_then(|p| p.model(model_id))
}

/// Cheap syntactic credential check, no I/O
///
/// Unknown providers are invalid; empty or whitespace-only keys are invalid
/// for every provider.
pub fn validate_key(provider_id: &str, api_key: &str) -> bool {
    match get_provider(provider_id) {
        Some(provider) => provider.key_rule.matches(api_key),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_uniqueness() {
        let ids: Vec<&str> = providers().iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec!["openai", "anthropic", "groq", "google", "deepseek", "fireworks"]
        );

        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_every_provider_has_models() {
        for provider in providers() {
            assert!(!provider.models.is_empty(), "{} has no models", provider.id);
        }
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let first = get_provider("anthropic").unwrap();
        let second = get_provider("anthropic").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.models.len(), second.models.len());

        assert!(get_model("openai", "gpt-4o").is_some());
        assert!(get_model("openai", "gpt-4o").is_some());
    }

    #[test]
    fn test_unknown_lookups() {
        assert!(get_provider("acme").is_none());
        assert!(get_model("acme", "gpt-4o").is_none());
        assert!(get_model("openai", "claude-3-opus-20240229").is_none());
    }

    #[test]
    fn test_validate_key_rules() {
        assert!(validate_key("openai", "sk-abc"));
        assert!(!validate_key("openai", "abc"));
        assert!(validate_key("anthropic", "sk-ant-abc"));
        assert!(!validate_key("anthropic", "sk-abc"));
        assert!(validate_key("groq", "gsk_abc"));
        assert!(!validate_key("groq", "sk-abc"));
        assert!(validate_key("google", "any-key-at-all"));
        assert!(validate_key("deepseek", "sk-abc"));
        assert!(!validate_key("deepseek", "abc"));
        assert!(validate_key("fireworks", "fw-anything"));
    }

    #[test]
    fn test_validate_key_empty_and_unknown() {
        for provider in providers() {
            assert!(!validate_key(provider.id, ""));
            assert!(!validate_key(provider.id, "   "));
        }
        assert!(!validate_key("acme", "sk-abc"));
    }
}
