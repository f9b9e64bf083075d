use std::fmt;

use anyhow::{Context, Result};
use hybrid_ocr_core::{AppConfig, ConfigDescriptor, ConfigOverrides};

/// Origin of a configuration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSource {
    Defaults,
    ConfigFile,
    CliArgs,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSource::Defaults => "defaults",
            ConfigSource::ConfigFile => "config file",
            ConfigSource::CliArgs => "cli args",
        };
        f.write_str(label)
    }
}

/// Configuration layer that can contribute an override set.
///
/// 覆盖优先级由 resolver 决定（而不是 layer 自己写死）。
pub trait ConfigLayer: Send + Sync {
    fn source(&self) -> ConfigSource;
    fn load_patch(&self) -> Result<ConfigOverrides>;
}

/// Convenience layer wrapping an already-built override set.
#[derive(Debug, Clone)]
pub struct PatchLayer {
    source: ConfigSource,
    patch: ConfigOverrides,
}

impl PatchLayer {
    pub fn new(source: ConfigSource, patch: ConfigOverrides) -> Self {
        Self { source, patch }
    }
}

impl ConfigLayer for PatchLayer {
    fn source(&self) -> ConfigSource {
        self.source
    }

    fn load_patch(&self) -> Result<ConfigOverrides> {
        Ok(self.patch.clone())
    }
}

/// Resolver for the effective `AppConfig`.
///
/// 覆盖语义：按 layer 添加顺序从低优先级到高优先级叠加。
#[derive(Default)]
pub struct ConfigResolver {
    layers: Vec<Box<dyn ConfigLayer>>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_layer<L>(&mut self, layer: L)
    where
        L: ConfigLayer + 'static,
    {
        self.layers.push(Box::new(layer));
    }

    pub fn merged_patch(&self) -> Result<ConfigOverrides> {
        let mut merged = ConfigOverrides::default();
        for layer in &self.layers {
            let source = layer.source();
            let patch = layer
                .load_patch()
                .with_context(|| format!("failed to load config patch from {source}"))?;
            merged.merge_from(patch);
        }
        Ok(merged)
    }

    pub fn resolve(&self) -> Result<(AppConfig, ConfigDescriptor)> {
        let merged = self.merged_patch()?;
        let (mut config, descriptor) = AppConfig::load_or_init(merged.config_path.as_deref())
            .context("failed to load or init configuration")?;
        config.apply_overrides(&merged);
        Ok((config, descriptor))
    }
}
