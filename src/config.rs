use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the NeuroTEA session core
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NeuroteaConfig {
    /// Observability settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Group policy settings
    #[serde(default)]
    pub groups: GroupPolicyConfig,
    /// Session lifecycle policy settings
    #[serde(default)]
    pub sessions: SessionPolicyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable structured tracing output
    pub tracing_enabled: bool,
    /// Log level
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupPolicyConfig {
    /// Ceiling on group capacity; None means unbounded.
    /// TEA group work is typically small, so deployments set this low.
    pub max_capacity: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionPolicyConfig {
    /// Freeze attendance records automatically when a session completes.
    /// When disabled, a caller must invoke finalize explicitly.
    pub auto_finalize_on_complete: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            tracing_enabled: true,
            log_level: "info".to_string(),
        }
    }
}

impl Default for GroupPolicyConfig {
    fn default() -> Self {
        Self { max_capacity: None }
    }
}

impl Default for SessionPolicyConfig {
    fn default() -> Self {
        Self {
            auto_finalize_on_complete: true,
        }
    }
}

impl Default for NeuroteaConfig {
    fn default() -> Self {
        Self {
            observability: ObservabilityConfig::default(),
            groups: GroupPolicyConfig::default(),
            sessions: SessionPolicyConfig::default(),
        }
    }
}

impl NeuroteaConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (neurotea.toml)
    /// 3. Environment variables (prefixed with NEUROTEA_, with `__`
    ///    separating nested keys, e.g. NEUROTEA_GROUPS__MAX_CAPACITY)
    pub fn load() -> Result<Self> {
        // Missing keys fall back to the serde defaults on each section
        let mut builder = Config::builder();

        if Path::new("neurotea.toml").exists() {
            builder = builder.add_source(File::with_name("neurotea"));
        }

        // Leaf keys are snake_case, so nesting must split on a double
        // underscore or NEUROTEA_GROUPS_MAX_CAPACITY would parse as
        // groups.max.capacity and never land on a real field
        builder = builder.add_source(
            Environment::with_prefix("NEUROTEA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let neurotea_config: NeuroteaConfig = config.try_deserialize()?;
        Ok(neurotea_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<NeuroteaConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = NeuroteaConfig::load_env_file();
        NeuroteaConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static NeuroteaConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
