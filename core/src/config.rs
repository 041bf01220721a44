use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::{
    completion::{CompletionModel, GenerationParams},
    embeddings::model::EmbeddingModel,
    loader::CorpusSource,
    providers::{
        completions::{self, HuggingFaceCompletion, OpenAICompletion},
        embeddings::{self, HuggingFaceEmbedding, OpenAIEmbedding},
    },
    rag::RagSettings,
};

/// Env var naming the JSON config file
pub const CONFIG_PATH_VAR: &str = "RAG_SERVICE_CONFIG";
/// Env var overriding the listening port
pub const PORT_VAR: &str = "RAG_SERVICE_PORT";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_HF_KEY_VAR: &str = "HF_ACCESS_TOKEN";
const DEFAULT_OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file `{0}`: {1}")]
    Read(String, std::io::Error),
    #[error("Invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to fetch env var `{0}`")]
    MissingEnvVar(String),
    #[error("Invalid port `{0}`")]
    InvalidPort(String),
}

/// Settings shared by every provider. Anything left out falls back to the
/// provider's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub model: Option<String>,
    pub api_url: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_var: Option<String>,
}

impl ProviderConfig {
    fn key_var<'a>(&'a self, default: &'a str) -> &'a str {
        self.api_key_var.as_deref().unwrap_or(default)
    }

    fn optional_key(&self, default: &str) -> Option<String> {
        std::env::var(self.key_var(default)).ok()
    }

    fn required_key(&self, default: &str) -> Result<String, ConfigError> {
        let var = self.key_var(default);
        std::env::var(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmbedderConfig {
    HuggingFace(ProviderConfig),
    OpenAI(ProviderConfig),
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self::HuggingFace(ProviderConfig::default())
    }
}

impl EmbedderConfig {
    /// Instantiate the configured embedding provider.
    ///
    /// # Errors
    /// Fails when a provider that needs an API key can't find it.
    pub fn build(&self) -> Result<Box<dyn EmbeddingModel>, ConfigError> {
        Ok(match self {
            Self::HuggingFace(config) => {
                let model = config
                    .model
                    .as_deref()
                    .unwrap_or(embeddings::huggingface::DEFAULT_MODEL);
                let api_url = config
                    .api_url
                    .clone()
                    .unwrap_or_else(|| embeddings::huggingface::default_url(model));
                Box::new(HuggingFaceEmbedding::new(
                    config.optional_key(DEFAULT_HF_KEY_VAR),
                    api_url,
                ))
            }
            Self::OpenAI(config) => Box::new(OpenAIEmbedding::new(
                config.required_key(DEFAULT_OPENAI_KEY_VAR)?,
                config
                    .api_url
                    .clone()
                    .unwrap_or_else(|| embeddings::openai::DEFAULT_URL.to_string()),
                config
                    .model
                    .clone()
                    .unwrap_or_else(|| embeddings::openai::DEFAULT_MODEL.to_string()),
            )),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum GeneratorConfig {
    HuggingFace(ProviderConfig),
    OpenAI(ProviderConfig),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::HuggingFace(ProviderConfig::default())
    }
}

impl GeneratorConfig {
    /// Instantiate the configured text generation provider.
    ///
    /// # Errors
    /// Fails when a provider that needs an API key can't find it.
    pub fn build(&self) -> Result<Box<dyn CompletionModel>, ConfigError> {
        Ok(match self {
            Self::HuggingFace(config) => {
                let model = config
                    .model
                    .as_deref()
                    .unwrap_or(completions::huggingface::DEFAULT_MODEL);
                let api_url = config
                    .api_url
                    .clone()
                    .unwrap_or_else(|| completions::huggingface::default_url(model));
                Box::new(HuggingFaceCompletion::new(
                    config.optional_key(DEFAULT_HF_KEY_VAR),
                    api_url,
                ))
            }
            Self::OpenAI(config) => Box::new(OpenAICompletion::new(
                config.required_key(DEFAULT_OPENAI_KEY_VAR)?,
                config
                    .api_url
                    .clone()
                    .unwrap_or_else(|| completions::openai::DEFAULT_URL.to_string()),
                config
                    .model
                    .clone()
                    .unwrap_or_else(|| completions::openai::DEFAULT_MODEL.to_string()),
            )),
        })
    }
}

/// Everything the service needs at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub corpus: CorpusSource,
    pub embedder: EmbedderConfig,
    pub generator: GeneratorConfig,
    pub generation: GenerationParams,
    /// Answer with the prompt followed by the continuation, not the
    /// continuation alone
    pub return_full_text: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            corpus: CorpusSource::default(),
            embedder: EmbedderConfig::default(),
            generator: GeneratorConfig::default(),
            generation: GenerationParams::default(),
            return_full_text: true,
        }
    }
}

impl ServiceConfig {
    /// Read the config named by `RAG_SERVICE_CONFIG` (defaults when unset),
    /// then apply `RAG_SERVICE_PORT`.
    ///
    /// # Errors
    /// Fails on an unreadable or invalid config file, or an unparsable port.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.with_port_override(std::env::var(PORT_VAR).ok())
    }

    #[must_use]
    pub fn rag_settings(&self) -> RagSettings {
        RagSettings {
            generation: self.generation.clone(),
            return_full_text: self.return_full_text,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    fn with_port_override(mut self, port: Option<String>) -> Result<Self, ConfigError> {
        if let Some(port) = port {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = ServiceConfig::from_json("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.port, 5000);
        assert!(config.return_full_text);
        assert_eq!(config.corpus, CorpusSource::Builtin);
    }

    #[test]
    fn test_parses_provider_sections() {
        let config = ServiceConfig::from_json(
            r#"{
                "port": 8080,
                "embedder": { "provider": "openai", "model": "text-embedding-3-large" },
                "generator": { "provider": "huggingface", "api_url": "http://localhost:8081/generate" },
                "generation": { "max_tokens": 64 },
                "corpus": { "source": "inline", "documents": ["one"] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.embedder,
            EmbedderConfig::OpenAI(ProviderConfig {
                model: Some("text-embedding-3-large".to_string()),
                ..Default::default()
            })
        );
        assert_eq!(
            config.generator,
            GeneratorConfig::HuggingFace(ProviderConfig {
                api_url: Some("http://localhost:8081/generate".to_string()),
                ..Default::default()
            })
        );
        assert_eq!(config.generation.max_tokens, 64);
        assert!(config.generation.deterministic);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(ServiceConfig::from_json(r#"{"debug": true}"#).is_err());
        assert!(ServiceConfig::from_json(
            r#"{"embedder": {"provider": "openai", "api_key": "sk-inline"}}"#
        )
        .is_err());
        assert!(ServiceConfig::from_json(r#"{"embedder": {"provider": "faiss"}}"#).is_err());
    }

    #[test]
    fn test_reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"host": "0.0.0.0"}}"#).unwrap();
        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);

        assert!(matches!(
            ServiceConfig::from_file("/nonexistent/rag.json"),
            Err(ConfigError::Read(_, _))
        ));
    }

    #[test]
    fn test_port_override() {
        let config = ServiceConfig::default()
            .with_port_override(Some("6000".to_string()))
            .unwrap();
        assert_eq!(config.port, 6000);

        let config = ServiceConfig::default().with_port_override(None).unwrap();
        assert_eq!(config.port, 5000);

        assert!(matches!(
            ServiceConfig::default().with_port_override(Some("http".to_string())),
            Err(ConfigError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_openai_requires_its_key() {
        let config = EmbedderConfig::OpenAI(ProviderConfig {
            api_key_var: Some("FELLOWCRAFT_RAG_TEST_UNSET_KEY".to_string()),
            ..Default::default()
        });
        assert!(matches!(
            config.build(),
            Err(ConfigError::MissingEnvVar(var)) if var == "FELLOWCRAFT_RAG_TEST_UNSET_KEY"
        ));
    }

    #[test]
    fn test_huggingface_builds_without_key() {
        let config = GeneratorConfig::HuggingFace(ProviderConfig {
            api_key_var: Some("FELLOWCRAFT_RAG_TEST_UNSET_KEY".to_string()),
            ..Default::default()
        });
        assert!(config.build().is_ok());
        assert!(EmbedderConfig::default().build().is_ok());
    }
}
