use std::path::PathBuf;

use clap::Args;

use crate::config::{
    ClassicalOverride, ConfigOverrides, ServerOverride, TrainingOverride, VisionOverride,
};

#[derive(Args, Debug, Clone, Default)]
pub struct CommonEngineArgs {
    /// Optional path to a configuration file (TOML).
    #[arg(long, value_name = "PATH", help_heading = "Application")]
    pub config: Option<PathBuf>,

    /// Base URL of the vision-language inference endpoint.
    #[arg(long, value_name = "URL", help_heading = "Vision engine")]
    pub vision_endpoint: Option<String>,

    /// Model identifier requested from the vision endpoint.
    #[arg(long, value_name = "ID", help_heading = "Vision engine")]
    pub vision_model: Option<String>,

    /// Wall-clock budget for one vision inference, in seconds.
    #[arg(long, value_name = "SECS", help_heading = "Vision engine")]
    pub vision_timeout: Option<u64>,

    /// Disable the vision engine entirely.
    #[arg(long, help_heading = "Vision engine")]
    pub no_vision: bool,

    /// Directory containing the classical detection/recognition models.
    #[arg(long, value_name = "PATH", help_heading = "Classical engine")]
    pub models_dir: Option<PathBuf>,

    /// Language id used to pick the classical recognition model.
    #[arg(long, value_name = "ID", help_heading = "Classical engine")]
    pub classical_language: Option<String>,

    /// Wall-clock budget for one classical inference, in seconds.
    #[arg(long, value_name = "SECS", help_heading = "Classical engine")]
    pub classical_timeout: Option<u64>,

    /// Disable the classical engine entirely.
    #[arg(long, help_heading = "Classical engine")]
    pub no_classical: bool,

    /// Root directory for training-sample ingestion.
    #[arg(long, value_name = "PATH", help_heading = "Training")]
    pub training_root: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServerBindArgs {
    /// Host/IP for server to bind.
    #[arg(long, help_heading = "Application")]
    pub host: Option<String>,

    /// TCP port for server.
    #[arg(long, help_heading = "Application")]
    pub port: Option<u16>,
}

pub fn build_config_overrides(
    engines: &CommonEngineArgs,
    bind: Option<&ServerBindArgs>,
) -> ConfigOverrides {
    ConfigOverrides {
        config_path: engines.config.clone(),
        server: ServerOverride {
            host: bind.and_then(|value| value.host.clone()),
            port: bind.and_then(|value| value.port),
        },
        vision: VisionOverride {
            enabled: engines.no_vision.then_some(false),
            endpoint: engines.vision_endpoint.clone(),
            model: engines.vision_model.clone(),
            api_key: None,
            timeout_secs: engines.vision_timeout,
            max_edge: None,
        },
        classical: ClassicalOverride {
            enabled: engines.no_classical.then_some(false),
            models_dir: engines.models_dir.clone(),
            language: engines.classical_language.clone(),
            timeout_secs: engines.classical_timeout,
        },
        training: TrainingOverride {
            root: engines.training_root.clone(),
        },
    }
}
