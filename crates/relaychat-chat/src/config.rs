//! LLM configuration and provider selection.

use relaychat_core::{Error, Result};
use tracing::info;

use crate::types::{ChatStatus, LLMProvider};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const PREFERENCES: &[&str] = &["auto", "openai", "gemini"];

/// Upstream provider settings, resolved once at startup.
#[derive(Clone)]
pub struct LLMConfig {
    /// `auto`, `openai` or `gemini`.
    pub preferred_provider: String,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_model: String,
    pub openai_base_url: String,
    pub gemini_base_url: String,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".into(),
            openai_api_key: None,
            gemini_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.into(),
        }
    }
}

// Keys stay out of logs.
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("preferred_provider", &self.preferred_provider)
            .field("openai_configured", &self.openai_api_key.is_some())
            .field("gemini_configured", &self.gemini_api_key.is_some())
            .field("openai_model", &self.openai_model)
            .field("gemini_model", &self.gemini_model)
            .finish()
    }
}

impl LLMConfig {
    /// Load API keys and provider preference from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        config.openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        config.gemini_api_key = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());

        if let Some(pref) = lookup("RELAYCHAT_PROVIDER") {
            let pref = pref.trim().to_lowercase();
            if !PREFERENCES.contains(&pref.as_str()) {
                return Err(Error::Config(format!(
                    "RELAYCHAT_PROVIDER must be one of {:?}, got {:?}",
                    PREFERENCES, pref
                )));
            }
            config.preferred_provider = pref;
        }

        info!(
            "LLM config: preferred={}, openai={}, gemini={}",
            config.preferred_provider,
            config.openai_api_key.is_some(),
            config.gemini_api_key.is_some()
        );

        Ok(config)
    }

    /// Resolve which provider, model and key to use.
    pub fn resolve_provider(&self) -> Option<(LLMProvider, String, String)> {
        let openai = || {
            self.openai_api_key
                .as_ref()
                .map(|k| (LLMProvider::OpenAI, self.openai_model.clone(), k.clone()))
        };
        let gemini = || {
            self.gemini_api_key
                .as_ref()
                .map(|k| (LLMProvider::Gemini, self.gemini_model.clone(), k.clone()))
        };

        match self.preferred_provider.as_str() {
            "openai" => openai(),
            "gemini" => gemini(),
            // Auto mode: OpenAI > Gemini
            "auto" => openai().or_else(gemini),
            _ => None,
        }
    }

    /// Public status for the active provider, if any.
    pub fn to_status(&self) -> Option<ChatStatus> {
        self.resolve_provider()
            .map(|(provider, model, _)| ChatStatus { provider, model })
    }
}
