//! Run configuration, read once from the environment at startup.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::llm::{GenerationRequest, SafetyThreshold};
use crate::retry::RetryPolicy;

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model to use.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub const DEFAULT_DB_PAGE_SIZE: usize = 1000;
pub const DEFAULT_PROMPT_BATCH_SIZE: usize = 100;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 3000;
pub const DEFAULT_IMPORT_DELAY_MS: u64 = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// What to do with recipes the model could not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPolicy {
    /// Leave `category` NULL so the recipe is offered again on the next run.
    #[default]
    LeaveUnset,
    /// Store the `UNKNOWN` marker so the recipe is never sent again.
    PersistSentinel,
}

impl FromStr for UnknownPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "leave" | "leave_unset" => Ok(Self::LeaveUnset),
            "persist" | "persist_sentinel" => Ok(Self::PersistSentinel),
            other => Err(format!("expected \"leave\" or \"persist\", got {:?}", other)),
        }
    }
}

/// Which provider to talk to and how.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// "gemini" or "fake".
    pub provider: String,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

/// Generation parameters sent with a prompt.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// `None` leaves the model's own default in place.
    pub temperature: Option<f32>,
    pub max_output_tokens: u32,
    pub safety_threshold: SafetyThreshold,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: Some(0.2),
            max_output_tokens: 8192,
            safety_threshold: SafetyThreshold::BlockMediumAndAbove,
        }
    }
}

impl GenerationSettings {
    /// Defaults for ingredient parsing. Cooking terms ("breast", "thigh",
    /// "butcher") trip the safety filters, so nothing is blocked.
    pub fn parsing() -> Self {
        Self {
            temperature: None,
            safety_threshold: SafetyThreshold::BlockNone,
            ..Self::default()
        }
    }

    /// A JSON-mode request for `prompt` carrying these parameters.
    pub fn request(&self, prompt: String) -> GenerationRequest {
        GenerationRequest {
            prompt,
            temperature: self.temperature,
            max_output_tokens: Some(self.max_output_tokens),
            json_response: true,
            safety_threshold: Some(self.safety_threshold),
        }
    }
}

/// Everything a classification or import run needs.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub database_url: String,
    pub llm: LlmConfig,
    /// Settings for classification prompts.
    pub generation: GenerationSettings,
    /// Settings for ingredient parsing prompts.
    pub parsing: GenerationSettings,
    /// Records fetched from the database per page.
    pub db_page_size: usize,
    /// Records sent to the model per prompt.
    pub prompt_batch_size: usize,
    /// Pause between sub-batches of the same page.
    pub batch_delay: Duration,
    /// Pause between recipes during ingredient import.
    pub import_delay: Duration,
    pub retry: RetryPolicy,
    pub unknown_policy: UnknownPolicy,
}

impl BatchConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    /// - `GEMINI_API_KEY` (when the provider is "gemini")
    ///
    /// Optional:
    /// - `HAMHAMA_LLM_PROVIDER`: "gemini" (default) or "fake"
    /// - `HAMHAMA_MODEL`, `HAMHAMA_API_BASE_URL`, `HAMHAMA_REQUEST_TIMEOUT_SECS`
    /// - `HAMHAMA_DB_PAGE_SIZE`, `HAMHAMA_PROMPT_BATCH_SIZE`
    /// - `HAMHAMA_BATCH_DELAY_MS`, `HAMHAMA_IMPORT_DELAY_MS`, `HAMHAMA_MAX_ATTEMPTS`
    /// - `HAMHAMA_TEMPERATURE`, `HAMHAMA_MAX_OUTPUT_TOKENS`, `HAMHAMA_SAFETY_THRESHOLD`
    /// - `HAMHAMA_PARSE_TEMPERATURE` (unset by default), `HAMHAMA_PARSE_SAFETY_THRESHOLD`
    /// - `HAMHAMA_UNKNOWN_POLICY`: "leave" (default) or "persist"
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let provider = lookup("HAMHAMA_LLM_PROVIDER").unwrap_or_else(|| "gemini".to_string());
        let api_key = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty());
        if provider == "gemini" && api_key.is_none() {
            return Err(ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()));
        }

        let llm = LlmConfig {
            provider,
            api_key,
            model: lookup("HAMHAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: lookup("HAMHAMA_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(parse_var(
                &lookup,
                "HAMHAMA_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
        };

        let defaults = GenerationSettings::default();
        let max_output_tokens = parse_var(
            &lookup,
            "HAMHAMA_MAX_OUTPUT_TOKENS",
            defaults.max_output_tokens,
        )?;
        let generation = GenerationSettings {
            temperature: parse_optional(&lookup, "HAMHAMA_TEMPERATURE")?.or(defaults.temperature),
            max_output_tokens,
            safety_threshold: parse_var(
                &lookup,
                "HAMHAMA_SAFETY_THRESHOLD",
                defaults.safety_threshold,
            )?,
        };

        let parsing_defaults = GenerationSettings::parsing();
        let parsing = GenerationSettings {
            temperature: parse_optional(&lookup, "HAMHAMA_PARSE_TEMPERATURE")?,
            max_output_tokens,
            safety_threshold: parse_var(
                &lookup,
                "HAMHAMA_PARSE_SAFETY_THRESHOLD",
                parsing_defaults.safety_threshold,
            )?,
        };

        let max_attempts = parse_var(
            &lookup,
            "HAMHAMA_MAX_ATTEMPTS",
            RetryPolicy::default().max_attempts,
        )?;

        Ok(Self {
            database_url,
            llm,
            generation,
            parsing,
            db_page_size: parse_positive(&lookup, "HAMHAMA_DB_PAGE_SIZE", DEFAULT_DB_PAGE_SIZE)?,
            prompt_batch_size: parse_positive(
                &lookup,
                "HAMHAMA_PROMPT_BATCH_SIZE",
                DEFAULT_PROMPT_BATCH_SIZE,
            )?,
            batch_delay: Duration::from_millis(parse_var(
                &lookup,
                "HAMHAMA_BATCH_DELAY_MS",
                DEFAULT_BATCH_DELAY_MS,
            )?),
            import_delay: Duration::from_millis(parse_var(
                &lookup,
                "HAMHAMA_IMPORT_DELAY_MS",
                DEFAULT_IMPORT_DELAY_MS,
            )?),
            retry: RetryPolicy {
                max_attempts: max_attempts.max(1),
                ..RetryPolicy::default()
            },
            unknown_policy: parse_var(&lookup, "HAMHAMA_UNKNOWN_POLICY", UnknownPolicy::default())?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
            reason: e.to_string(),
        }),
    }
}

fn parse_optional<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                value,
                reason: e.to_string(),
            }),
    }
}

fn parse_positive<F>(lookup: &F, name: &str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_var(lookup, name, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
