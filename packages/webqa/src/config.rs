//! Environment-driven settings.
//!
//! Provider availability is derived from what is configured: a key present
//! means the provider is usable. API keys are held in [`SecretString`] so
//! they never leak through `Debug` or log output.

use std::fmt;

use secrecy::{ExposeSecret, SecretBox};

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g. in an API request).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Runtime settings for the answering pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    /// OpenAI API key, if configured
    pub openai_api_key: Option<SecretString>,

    /// OpenAI model for answering
    pub openai_model: String,

    /// Anthropic API key, if configured
    pub anthropic_api_key: Option<SecretString>,

    /// Anthropic model for answering
    pub anthropic_model: String,

    /// Base URL of an OpenAI-compatible vendor, if configured
    pub compat_api_base: Option<String>,

    /// API key for the compatible vendor
    pub compat_api_key: Option<SecretString>,

    /// Model name at the compatible vendor
    pub compat_model: String,

    /// Whether to try a local Ollama server
    pub use_ollama: bool,

    /// Ollama server base URL
    pub ollama_base_url: String,

    /// Ollama model name
    pub ollama_model: String,

    /// Whether to try the hosted inference fallback (works keyless)
    pub use_huggingface: bool,

    /// Hugging Face API key, if configured
    pub huggingface_api_key: Option<SecretString>,

    /// Override for the hosted QA model name
    pub huggingface_qa_model: Option<String>,

    /// Session content/history TTL in seconds
    pub context_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            anthropic_api_key: None,
            anthropic_model: "claude-3-5-haiku-latest".to_string(),
            compat_api_base: None,
            compat_api_key: None,
            compat_model: "default".to_string(),
            use_ollama: true,
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "llama2".to_string(),
            use_huggingface: true,
            huggingface_api_key: None,
            huggingface_qa_model: None,
            context_ttl_secs: 86_400,
        }
    }
}

impl Settings {
    /// Load settings from the environment (and a `.env` file when present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            openai_api_key: env_secret("OPENAI_API_KEY"),
            openai_model: env_or("OPENAI_MODEL", &defaults.openai_model),
            anthropic_api_key: env_secret("ANTHROPIC_API_KEY"),
            anthropic_model: env_or("ANTHROPIC_MODEL", &defaults.anthropic_model),
            compat_api_base: env_opt("COMPAT_API_BASE"),
            compat_api_key: env_secret("COMPAT_API_KEY"),
            compat_model: env_or("COMPAT_MODEL", &defaults.compat_model),
            use_ollama: env_flag("USE_OLLAMA", defaults.use_ollama),
            ollama_base_url: env_or("OLLAMA_BASE_URL", &defaults.ollama_base_url),
            ollama_model: env_or("OLLAMA_MODEL", &defaults.ollama_model),
            use_huggingface: env_flag("USE_HUGGINGFACE", defaults.use_huggingface),
            huggingface_api_key: env_secret("HUGGINGFACE_API_KEY"),
            huggingface_qa_model: env_opt("HUGGINGFACE_QA_MODEL"),
            context_ttl_secs: env_or("CONTEXT_TTL_SECS", "86400")
                .parse()
                .unwrap_or(defaults.context_ttl_secs),
        }
    }

    /// A pristine configuration with every model backend disabled.
    ///
    /// The cascade built from this runs the deterministic fallback only.
    pub fn offline() -> Self {
        Self {
            use_ollama: false,
            use_huggingface: false,
            ..Self::default()
        }
    }

    /// Whether the OpenAI provider is configured.
    pub fn use_openai(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Whether the Anthropic provider is configured.
    pub fn use_anthropic(&self) -> bool {
        self.anthropic_api_key.is_some()
    }

    /// Whether an OpenAI-compatible vendor is configured.
    pub fn use_compat(&self) -> bool {
        self.compat_api_base.is_some() && self.compat_api_key.is_some()
    }

    /// Whether any hosted chat provider is configured.
    pub fn hosted_provider_configured(&self) -> bool {
        self.use_openai() || self.use_anthropic() || self.use_compat()
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_secret(key: &str) -> Option<SecretString> {
    env_opt(key).map(SecretString::new)
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    match env_opt(key) {
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}
