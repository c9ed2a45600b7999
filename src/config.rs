//! Configuration loading for service assembly.
//!
//! Reads a TOML file into a raw serde shape, then resolves it into plain
//! config structs. The API key comes from the `LLM_API_KEY` env var — never
//! TOML — and is `None` for keyless local models.

use std::{env, fs, path::Path};

use serde::Deserialize;

use crate::error::ServiceError;

/// OpenAI / OpenAI-compatible backend configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// Model backend configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which backend is active (e.g. `"echo"`, `"openai"`).
    /// Maps to `default` in `[llm]` TOML — named `default` there to signal
    /// that other backend sections can coexist without being loaded.
    pub provider: String,
    /// Config for the OpenAI-compatible backend (`[llm.openai]`).
    pub openai: OpenAiConfig,
}

/// Moderation gate configuration (`[moderation]`).
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    pub enabled: bool,
    /// Full moderations endpoint URL.
    pub api_base_url: String,
    pub timeout_seconds: u64,
}

/// Memory configuration (`[memory]`).
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Message-window cap for the bundled store; `None` keeps the default.
    pub window_cap: Option<usize>,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Directory template resources are loaded from.
    pub templates_dir: Option<String>,
    pub llm: LlmConfig,
    pub moderation: ModerationConfig,
    pub memory: MemoryConfig,
    /// API key from `LLM_API_KEY` env var.
    pub llm_api_key: Option<String>,
}

// ── Raw TOML shape — serde target before resolution ───────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    service: RawService,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    moderation: RawModeration,
    #[serde(default)]
    memory: RawMemory,
}

#[derive(Deserialize)]
struct RawService {
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    templates_dir: Option<String>,
}

impl Default for RawService {
    fn default() -> Self {
        Self { log_level: default_log_level(), templates_dir: None }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawModeration {
    #[serde(default = "default_false")]
    enabled: bool,
    #[serde(default = "default_moderation_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawModeration {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base_url: default_moderation_api_base_url(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawMemory {
    window_cap: Option<usize>,
}

fn default_log_level() -> String { "info".to_string() }
fn default_llm_provider() -> String { "echo".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_moderation_api_base_url() -> String { "https://api.openai.com/v1/moderations".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_openai_temperature() -> f32 { 0.2 }
fn default_openai_timeout_seconds() -> u64 { 60 }
fn default_false() -> bool { false }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from a TOML file and pick up the API key from the env.
pub fn load_from(path: &Path) -> Result<Config, ServiceError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        ServiceError::Configuration(format!("cannot read {}: {e}", path.display()))
    })?;

    let parsed: RawConfig = toml::from_str(&raw).map_err(|e| {
        ServiceError::Configuration(format!("parse error in {}: {e}", path.display()))
    })?;

    Ok(Config {
        log_level: parsed.service.log_level,
        templates_dir: parsed.service.templates_dir,
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        moderation: ModerationConfig {
            enabled: parsed.moderation.enabled,
            api_base_url: parsed.moderation.api_base_url,
            timeout_seconds: parsed.moderation.timeout_seconds,
        },
        memory: MemoryConfig { window_cap: parsed.memory.window_cap },
        llm_api_key: env::var("LLM_API_KEY").ok(),
    })
}
