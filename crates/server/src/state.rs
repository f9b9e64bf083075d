use std::sync::Arc;

use anyhow::Result;
use hybrid_ocr_pipeline::hybrid_ocr_core::{AppConfig, ConfigOverrides};
use hybrid_ocr_pipeline::{OcrRuntime, Orchestrator, ProgressEvent};
use tokio::sync::broadcast;

use crate::args::Args;

/// Shared server state: the pipeline runtime plus the server-wide progress
/// broadcast that per-request channels are bridged into.
pub struct AppState {
    runtime: OcrRuntime,
    progress: broadcast::Sender<ProgressEvent>,
}

impl AppState {
    pub fn bootstrap(args: &Args) -> Result<Self> {
        let config_file_layer = ConfigOverrides {
            config_path: args.engines.config.clone(),
            ..Default::default()
        };
        let cli_args_layer = ConfigOverrides::from(args);

        let runtime = OcrRuntime::builder()
            .with_config_file_layer(config_file_layer)
            .with_cli_args_layer(cli_args_layer)
            .build()?;

        let (progress, _) = broadcast::channel(256);

        Ok(Self { runtime, progress })
    }

    pub fn runtime(&self) -> &OcrRuntime {
        &self.runtime
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        self.runtime.config()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        self.runtime.orchestrator()
    }

    pub fn progress_sender(&self) -> &broadcast::Sender<ProgressEvent> {
        &self.progress
    }

    pub fn subscribe_progress(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress.subscribe()
    }
}
