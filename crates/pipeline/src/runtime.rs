use std::sync::Arc;

use anyhow::Result;
use hybrid_ocr_core::{AppConfig, ConfigDescriptor, ConfigOverrides};
use tokio::task;
use tracing::warn;

use crate::{
    adapter::{ClassicalEngine, VisionEngine},
    config::{ConfigResolver, ConfigSource, PatchLayer},
    orchestrator::Orchestrator,
    progress::NoopSink,
};

/// Builder for `OcrRuntime`.
///
/// 设计目标：
/// - CLI/Server 不需要理解 config/infer-* 的内部细节；
/// - 把「覆盖流程（layers + precedence）」集中表达在一个地方。
#[derive(Default)]
pub struct OcrRuntimeBuilder {
    defaults: Option<ConfigOverrides>,
    config_file: Option<ConfigOverrides>,
    cli_args: Option<ConfigOverrides>,
}

impl OcrRuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest priority layer.
    pub fn with_defaults_layer(mut self, patch: ConfigOverrides) -> Self {
        self.defaults = Some(patch);
        self
    }

    /// Middle priority layer.
    pub fn with_config_file_layer(mut self, patch: ConfigOverrides) -> Self {
        self.config_file = Some(patch);
        self
    }

    /// Highest priority layer for app-level overrides.
    pub fn with_cli_args_layer(mut self, patch: ConfigOverrides) -> Self {
        self.cli_args = Some(patch);
        self
    }

    pub fn build(self) -> Result<OcrRuntime> {
        let OcrRuntimeBuilder {
            defaults,
            config_file,
            cli_args,
        } = self;

        let mut resolver = ConfigResolver::new();
        if let Some(defaults) = defaults {
            resolver.push_layer(PatchLayer::new(ConfigSource::Defaults, defaults));
        }
        if let Some(cfg) = config_file {
            resolver.push_layer(PatchLayer::new(ConfigSource::ConfigFile, cfg));
        }
        if let Some(cli) = cli_args {
            resolver.push_layer(PatchLayer::new(ConfigSource::CliArgs, cli));
        }

        let (config, descriptor) = resolver.resolve()?;
        let config = Arc::new(config);

        let vision = Arc::new(VisionEngine::new(&config.vision));
        let classical = Arc::new(ClassicalEngine::new(&config.classical));
        let orchestrator = Orchestrator::new(vision, classical);

        Ok(OcrRuntime {
            config,
            descriptor,
            orchestrator,
        })
    }
}

/// High-level runtime facade.
///
/// 一套可复用的服务环境：解析后的配置 + 两个进程级单例引擎适配器。
/// 应用层（Server）只通过它拿 `Orchestrator`。
pub struct OcrRuntime {
    config: Arc<AppConfig>,
    descriptor: ConfigDescriptor,
    orchestrator: Orchestrator,
}

impl OcrRuntime {
    pub fn builder() -> OcrRuntimeBuilder {
        OcrRuntimeBuilder::new()
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    pub fn descriptor(&self) -> &ConfigDescriptor {
        &self.descriptor
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Warm the classical engine ahead of the first request.
    ///
    /// The vision model stays lazy: its load is expensive and the endpoint
    /// may legitimately come up after us. A warm-up failure only logs — the
    /// adapter has already recorded the engine as unavailable.
    pub async fn preload(&self) {
        let orchestrator = self.orchestrator.clone();
        let outcome = task::spawn_blocking(move || {
            orchestrator
                .engine(hybrid_ocr_core::EngineKind::Paddle)
                .warm_up(&NoopSink)
        })
        .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "classical engine warm-up failed"),
            Err(err) => warn!(error = %err, "classical engine warm-up task failed"),
        }
    }
}
