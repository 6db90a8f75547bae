use std::env;
use std::fmt;
use std::time::Duration;

/// Top-level configuration for the pipeline binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub llm: LlmConfig,
    pub telemetry: TelemetryConfig,
    pub pipeline: PipelineSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store = StoreConfig {
            api_key: require("AIRTABLE_API_KEY")?,
            base_id: require("AIRTABLE_BASE_ID")?,
        };

        let llm = LlmConfig {
            api_key: require("GEMINI_API_KEY")?,
            model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string()),
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let pacing_ms = env::var("PIPELINE_PACING_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidPacing)?;

        Ok(Self {
            store,
            llm,
            telemetry: TelemetryConfig { log_level },
            pipeline: PipelineSettings {
                pacing: Duration::from_millis(pacing_ms),
            },
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar { name }),
    }
}

/// Credentials for the hosted record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub api_key: String,
    pub base_id: String,
}

/// Credentials and model selection for the completion service.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Batch-run knobs that are policy rather than correctness.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub pacing: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVar { name: &'static str },
    InvalidPacing,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar { name } => {
                write!(f, "required environment variable {} is not set", name)
            }
            ConfigError::InvalidPacing => {
                write!(f, "PIPELINE_PACING_MS must be a whole number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("AIRTABLE_API_KEY");
        env::remove_var("AIRTABLE_BASE_ID");
        env::remove_var("GEMINI_API_KEY");
        env::remove_var("GEMINI_MODEL");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("PIPELINE_PACING_MS");
    }

    fn set_required() {
        env::set_var("AIRTABLE_API_KEY", "key-store");
        env::set_var("AIRTABLE_BASE_ID", "appBase");
        env::set_var("GEMINI_API_KEY", "key-llm");
    }

    #[test]
    fn load_fails_without_store_credentials() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        match AppConfig::load() {
            Err(ConfigError::MissingVar { name }) => assert_eq!(name, "AIRTABLE_API_KEY"),
            other => panic!("expected missing variable error, got {other:?}"),
        }
    }

    #[test]
    fn load_uses_defaults_for_optional_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        set_required();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.llm.model, "gemini-1.5-flash-latest");
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.pipeline.pacing, Duration::from_millis(1000));
    }

    #[test]
    fn load_rejects_non_numeric_pacing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        set_required();
        env::set_var("PIPELINE_PACING_MS", "soon");
        match AppConfig::load() {
            Err(ConfigError::InvalidPacing) => {}
            other => panic!("expected pacing error, got {other:?}"),
        }
    }
}
