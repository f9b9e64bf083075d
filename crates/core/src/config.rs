use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application configuration schema.
///
/// 所有 section 都有完整的默认值：空配置文件（或没有配置文件）也能启动。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub vision: VisionSettings,
    pub classical: ClassicalSettings,
    pub training: TrainingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
        }
    }
}

/// Vision-language engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    pub enabled: bool,
    /// Base URL of the OpenAI-compatible inference endpoint.
    pub endpoint: String,
    /// Model identifier requested from the endpoint.
    pub model: String,
    pub api_key: Option<String>,
    /// Wall-clock budget for one inference, in seconds.
    pub timeout_secs: u64,
    /// Images with a longer edge are downscaled before inference.
    pub max_edge: u32,
    pub max_new_tokens: u32,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://127.0.0.1:8080".to_string(),
            model: "Qwen/Qwen2.5-VL-3B-Instruct".to_string(),
            api_key: None,
            timeout_secs: 90,
            max_edge: 1024,
            max_new_tokens: 512,
        }
    }
}

impl VisionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Classical detector/recognizer engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassicalSettings {
    pub enabled: bool,
    /// Directory containing detection/recognition models and charsets.
    pub models_dir: PathBuf,
    /// Language id used to pick the recognition model at load time.
    pub language: String,
    /// Wall-clock budget for one inference, in seconds.
    pub timeout_secs: u64,
}

impl Default for ClassicalSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            models_dir: PathBuf::from("models"),
            language: "english".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ClassicalSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    /// Root directory for ingested training samples.
    pub root: PathBuf,
    /// Fraction of samples held out for validation.
    pub validation_split: f32,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("training_data"),
            validation_split: 0.2,
        }
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Clone)]
pub struct ConfigDescriptor {
    pub location: Option<PathBuf>,
}

impl ConfigDescriptor {
    pub fn display(&self) -> String {
        match &self.location {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, writing a default file when it does
    /// not exist yet; without a path the built-in defaults are used.
    pub fn load_or_init(path: Option<&Path>) -> Result<(Self, ConfigDescriptor)> {
        let Some(path) = path else {
            return Ok((Self::default(), ConfigDescriptor { location: None }));
        };

        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read configuration {}", path.display()))?;
            let config: AppConfig = toml::from_str(&contents)
                .with_context(|| format!("failed to parse configuration {}", path.display()))?;
            return Ok((
                config,
                ConfigDescriptor {
                    location: Some(path.to_path_buf()),
                },
            ));
        }

        let config = Self::default();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialized = toml::to_string_pretty(&config)?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to initialise configuration {}", path.display()))?;
        Ok((
            config,
            ConfigDescriptor {
                location: Some(path.to_path_buf()),
            },
        ))
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = overrides.server.host.as_ref() {
            self.server.host = host.clone();
        }
        if let Some(port) = overrides.server.port {
            self.server.port = port;
        }

        if let Some(enabled) = overrides.vision.enabled {
            self.vision.enabled = enabled;
        }
        if let Some(endpoint) = overrides.vision.endpoint.as_ref() {
            self.vision.endpoint = endpoint.clone();
        }
        if let Some(model) = overrides.vision.model.as_ref() {
            self.vision.model = model.clone();
        }
        if let Some(api_key) = overrides.vision.api_key.as_ref() {
            self.vision.api_key = Some(api_key.clone());
        }
        if let Some(timeout) = overrides.vision.timeout_secs {
            self.vision.timeout_secs = timeout;
        }
        if let Some(max_edge) = overrides.vision.max_edge {
            self.vision.max_edge = max_edge;
        }

        if let Some(enabled) = overrides.classical.enabled {
            self.classical.enabled = enabled;
        }
        if let Some(models_dir) = overrides.classical.models_dir.as_ref() {
            self.classical.models_dir = models_dir.clone();
        }
        if let Some(language) = overrides.classical.language.as_ref() {
            self.classical.language = language.clone();
        }
        if let Some(timeout) = overrides.classical.timeout_secs {
            self.classical.timeout_secs = timeout;
        }

        if let Some(root) = overrides.training.root.as_ref() {
            self.training.root = root.clone();
        }
    }
}

/// Optional field set contributed by one configuration layer.
///
/// 注意：这不是「覆盖流程」本身，只是某一层提供的可选字段集；
/// 层与层之间的优先级由 resolver 按添加顺序决定。
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub server: ServerOverride,
    pub vision: VisionOverride,
    pub classical: ClassicalOverride,
    pub training: TrainingOverride,
}

impl ConfigOverrides {
    pub fn merge_from(&mut self, rhs: ConfigOverrides) {
        if rhs.config_path.is_some() {
            self.config_path = rhs.config_path;
        }
        self.server.merge_from(rhs.server);
        self.vision.merge_from(rhs.vision);
        self.classical.merge_from(rhs.classical);
        self.training.merge_from(rhs.training);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerOverride {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ServerOverride {
    pub fn merge_from(&mut self, rhs: ServerOverride) {
        if rhs.host.is_some() {
            self.host = rhs.host;
        }
        if rhs.port.is_some() {
            self.port = rhs.port;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VisionOverride {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_edge: Option<u32>,
}

impl VisionOverride {
    pub fn merge_from(&mut self, rhs: VisionOverride) {
        if rhs.enabled.is_some() {
            self.enabled = rhs.enabled;
        }
        if rhs.endpoint.is_some() {
            self.endpoint = rhs.endpoint;
        }
        if rhs.model.is_some() {
            self.model = rhs.model;
        }
        if rhs.api_key.is_some() {
            self.api_key = rhs.api_key;
        }
        if rhs.timeout_secs.is_some() {
            self.timeout_secs = rhs.timeout_secs;
        }
        if rhs.max_edge.is_some() {
            self.max_edge = rhs.max_edge;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClassicalOverride {
    pub enabled: Option<bool>,
    pub models_dir: Option<PathBuf>,
    pub language: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ClassicalOverride {
    pub fn merge_from(&mut self, rhs: ClassicalOverride) {
        if rhs.enabled.is_some() {
            self.enabled = rhs.enabled;
        }
        if rhs.models_dir.is_some() {
            self.models_dir = rhs.models_dir;
        }
        if rhs.language.is_some() {
            self.language = rhs.language;
        }
        if rhs.timeout_secs.is_some() {
            self.timeout_secs = rhs.timeout_secs;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrainingOverride {
    pub root: Option<PathBuf>,
}

impl TrainingOverride {
    pub fn merge_from(&mut self, rhs: TrainingOverride) {
        if rhs.root.is_some() {
            self.root = rhs.root;
        }
    }
}
