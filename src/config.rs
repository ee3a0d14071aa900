use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub topics_path: String,
    pub groundtruth_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Generation is optional; disabled means template answers only
    #[serde(default)]
    pub enabled: bool,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// How many runner-up topics to carry for Inferred synthesis
    #[serde(default = "default_runner_up_count")]
    pub runner_up_count: usize,
    /// Best matches scoring below this floor carry no topic and classify
    /// Out-of-KB; unset preserves the pure best-match behavior
    #[serde(default)]
    pub similarity_floor: Option<f32>,
    /// Append runner-up topics' partial passages to Inferred answers
    #[serde(default)]
    pub include_runner_ups: bool,
}

fn default_runner_up_count() -> usize {
    3
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            runner_up_count: default_runner_up_count(),
            similarity_floor: None,
            include_runner_ups: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default config file path
    pub fn load() -> crate::Result<Self> {
        // Try config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::BardragError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Path to the topics table
    pub fn topics_path(&self) -> &str {
        &self.dataset.topics_path
    }

    /// Path to the groundtruth table
    pub fn groundtruth_path(&self) -> &str {
        &self.dataset.groundtruth_path
    }

    /// Embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Whether the generation collaborator is enabled
    pub fn generation_enabled(&self) -> bool {
        self.llm.enabled
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig {
                topics_path: "data/topics.csv".to_string(),
                groundtruth_path: "data/groundtruth.csv".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            embeddings: EmbeddingsConfig {
                model: "all-minilm".to_string(),
                dimension: crate::embeddings::DEFAULT_EMBEDDING_DIM,
                endpoint: "http://localhost:11434".to_string(),
                api_key: None,
            },
            llm: LlmConfig {
                enabled: false,
                endpoint: "http://localhost:11434".to_string(),
                api_key: String::new(),
                model: default_llm_model(),
                timeout_secs: default_llm_timeout_secs(),
            },
            matcher: MatcherConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
