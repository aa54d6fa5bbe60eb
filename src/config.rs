use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Encoder dimensions
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_hidden_dim")]
    pub hidden_dim: usize,
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
}

/// Training loop parameters
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Fixed RNG seed for parameter init and negative sampling.
    /// Unset means a fresh seed per training run.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Edge split proportions for link-prediction training
#[derive(Debug, Clone, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_val_fraction")]
    pub val_fraction: f32,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f32,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_hidden_dim() -> usize {
    128
}

fn default_embedding_dim() -> usize {
    64
}

fn default_learning_rate() -> f32 {
    0.01
}

fn default_epochs() -> usize {
    101
}

fn default_val_fraction() -> f32 {
    0.05
}

fn default_test_fraction() -> f32 {
    0.10
}

fn default_http_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    // Empty means allow any origin (local dev); set allowed_origins in
    // config.toml for production
    vec![]
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hidden_dim: default_hidden_dim(),
            embedding_dim: default_embedding_dim(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            epochs: default_epochs(),
            seed: None,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            val_fraction: default_val_fraction(),
            test_fraction: default_test_fraction(),
        }
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: default_http_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// Looks for the config file in this order:
    /// 1. Path specified in LINKGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    ///
    /// A missing file yields compiled defaults (the service holds no
    /// secrets, so it runs out of the box); an unreadable or invalid
    /// file is an error.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("LINKGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        if !config_path.exists() {
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.model.hidden_dim == 0 {
            anyhow::bail!("model.hidden_dim must be greater than 0");
        }

        if self.model.embedding_dim == 0 {
            anyhow::bail!("model.embedding_dim must be greater than 0");
        }

        if self.training.learning_rate <= 0.0 {
            anyhow::bail!("training.learning_rate must be greater than 0");
        }

        if self.training.epochs == 0 {
            anyhow::bail!("training.epochs must be greater than 0");
        }

        if !(0.0..1.0).contains(&self.split.val_fraction) {
            anyhow::bail!("split.val_fraction must be in [0, 1)");
        }

        if !(0.0..1.0).contains(&self.split.test_fraction) {
            anyhow::bail!("split.test_fraction must be in [0, 1)");
        }

        if self.split.val_fraction + self.split.test_fraction >= 1.0 {
            anyhow::bail!("split.val_fraction + split.test_fraction must leave room for training edges");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn with_config_env(path: Option<&std::path::Path>, f: impl FnOnce()) {
        let original = std::env::var("LINKGRAPH_CONFIG").ok();
        match path {
            Some(p) => std::env::set_var("LINKGRAPH_CONFIG", p.to_str().unwrap()),
            None => std::env::set_var("LINKGRAPH_CONFIG", "definitely-not-a-config.toml"),
        }
        f();
        std::env::remove_var("LINKGRAPH_CONFIG");
        if let Some(val) = original {
            std::env::set_var("LINKGRAPH_CONFIG", val);
        }
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        with_config_env(None, || {
            let config = Config::load().unwrap();
            assert_eq!(config.model.hidden_dim, 128);
            assert_eq!(config.model.embedding_dim, 64);
            assert_eq!(config.training.epochs, 101);
            assert!((config.training.learning_rate - 0.01).abs() < 1e-9);
            assert!((config.split.val_fraction - 0.05).abs() < 1e-9);
            assert!((config.split.test_fraction - 0.10).abs() < 1e-9);
            assert_eq!(config.http_server.port, 8000);
        });
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[model]
hidden_dim = 32
embedding_dim = 16

[training]
learning_rate = 0.05
epochs = 20
seed = 7

[split]
val_fraction = 0.1
test_fraction = 0.2

[http_server]
port = 9000
allowed_origins = ["http://localhost:3000"]
"#,
        )
        .unwrap();
        with_config_env(Some(&config_path), || {
            let config = Config::load().unwrap();
            assert_eq!(config.model.hidden_dim, 32);
            assert_eq!(config.model.embedding_dim, 16);
            assert_eq!(config.training.epochs, 20);
            assert_eq!(config.training.seed, Some(7));
            assert_eq!(config.http_server.port, 9000);
            assert_eq!(config.http_server.allowed_origins.len(), 1);
        });
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[http_server]\nport = 8123\n").unwrap();
        with_config_env(Some(&config_path), || {
            let config = Config::load().unwrap();
            assert_eq!(config.http_server.port, 8123);
            assert_eq!(config.model.hidden_dim, 128);
            assert_eq!(config.training.epochs, 101);
        });
    }

    #[test]
    fn test_invalid_split_rejected() {
        let config = Config {
            split: SplitConfig {
                val_fraction: 0.5,
                test_fraction: 0.6,
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_epochs_rejected() {
        let config = Config {
            training: TrainingConfig {
                epochs: 0,
                ..TrainingConfig::default()
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
