//! Configuration management for Strata Server

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ai: AiConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// AI gateway settings. The credential is read once here and injected into
/// the client; nothing else touches the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub gateway_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// Cap on document characters carried into the prompt
    pub max_prompt_chars: usize,
}

/// Processing policy knobs. Advisory thresholds, not protocol constants.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Upload body cap in bytes
    pub max_upload_bytes: usize,
    /// Minimum extracted-text length considered viable
    pub min_text_chars: usize,
    /// Cosmetic pause after the upload stage, milliseconds
    pub upload_delay_ms: u64,
    /// Cosmetic pause between later stages, milliseconds
    pub stage_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            ai: AiConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            gateway_url: "https://ai.gateway.lovable.dev".to_string(),
            api_key: None,
            model: "google/gemini-2.5-flash".to_string(),
            temperature: 0.1,
            max_prompt_chars: 50_000,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_upload_bytes: 50 * 1024 * 1024,
            min_text_chars: 50,
            upload_delay_ms: 500,
            stage_delay_ms: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parsed("SERVER_PORT", defaults.server.port),
            },
            ai: AiConfig {
                gateway_url: env::var("AI_GATEWAY_URL").unwrap_or(defaults.ai.gateway_url),
                api_key: env::var("AI_GATEWAY_API_KEY").ok().filter(|k| !k.is_empty()),
                model: env::var("AI_MODEL").unwrap_or(defaults.ai.model),
                temperature: parsed("AI_TEMPERATURE", defaults.ai.temperature),
                max_prompt_chars: parsed("AI_MAX_PROMPT_CHARS", defaults.ai.max_prompt_chars),
            },
            limits: LimitsConfig {
                max_upload_bytes: parsed("MAX_UPLOAD_BYTES", defaults.limits.max_upload_bytes),
                min_text_chars: parsed("MIN_TEXT_CHARS", defaults.limits.min_text_chars),
                upload_delay_ms: parsed("UPLOAD_DELAY_MS", defaults.limits.upload_delay_ms),
                stage_delay_ms: parsed("STAGE_DELAY_MS", defaults.limits.stage_delay_ms),
            },
        }
    }
}

fn parsed<T: std::str::FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
