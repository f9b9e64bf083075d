use std::time::Duration;

use thiserror::Error;

/// Failure taxonomy for a single engine invocation.
///
/// 每个变体的恢复策略不同：`Unavailable` 在规划阶段就应跳过该引擎；
/// `Timeout` / `Inference` 在 auto 模式下触发回退，单引擎模式下直接终止请求。
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Backend never initialised (missing models, unreachable endpoint,
    /// disabled in configuration). Sticky for the process lifetime.
    #[error("engine unavailable: {reason}")]
    Unavailable { reason: String },

    /// The invocation exceeded its wall-clock budget.
    #[error("inference timed out after {}s", budget.as_secs())]
    Timeout { budget: Duration },

    /// Backend raised during execution (malformed image, out-of-memory,
    /// runtime failure in the underlying library).
    #[error("inference failed: {message}")]
    Inference { message: String },
}

impl EngineError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// Stable label used in diagnostics and API error bodies.
    pub fn kind_label(&self) -> &'static str {
        match self {
            EngineError::Unavailable { .. } => "engine_unavailable",
            EngineError::Timeout { .. } => "inference_timeout",
            EngineError::Inference { .. } => "inference_error",
        }
    }
}
