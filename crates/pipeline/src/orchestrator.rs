use std::sync::Arc;
use std::time::Instant;

use hybrid_ocr_core::{EngineError, EngineKind, EngineStatus, LanguageHint, OcrMode};
use image::DynamicImage;
use thiserror::Error;
use tokio::{task, time};
use tracing::{info, warn};

use crate::{
    adapter::EngineCapability,
    api::{AttemptOutcome, EngineAttempt, OcrRequest, OcrResponse},
    normalizer,
    progress::ProgressChannel,
};

/// Terminal failure for one orchestrated request.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// No engine in the plan could even be attempted — a deployment problem,
    /// not a property of the image.
    #[error("no OCR engine is available")]
    NoEngineAvailable { skipped: Vec<EngineAttempt> },

    /// Every planned engine was attempted and failed.
    #[error("all OCR engines failed")]
    AllEnginesFailed { attempts: Vec<EngineAttempt> },

    /// An explicitly requested engine failed; single-engine modes never
    /// fall back, even when the other engine could have served the request.
    #[error("{engine} failed: {error}")]
    Engine {
        engine: EngineKind,
        #[source]
        error: EngineError,
    },
}

impl OcrError {
    /// Stable label used in API error bodies.
    pub fn kind_label(&self) -> &'static str {
        match self {
            OcrError::NoEngineAvailable { .. } => "no_engine_available",
            OcrError::AllEnginesFailed { .. } => "all_engines_failed",
            OcrError::Engine { error, .. } => error.kind_label(),
        }
    }

    pub fn attempts(&self) -> &[EngineAttempt] {
        match self {
            OcrError::NoEngineAvailable { skipped } => skipped,
            OcrError::AllEnginesFailed { attempts } => attempts,
            OcrError::Engine { .. } => &[],
        }
    }
}

/// Per-engine availability snapshot for liveness probes.
#[derive(Debug, Clone)]
pub struct EngineHealth {
    pub engine: EngineKind,
    pub status: EngineStatus,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub engines: Vec<EngineHealth>,
}

impl HealthReport {
    /// The service is healthy while at least one engine can serve.
    pub fn healthy(&self) -> bool {
        self.engines.iter().any(|e| e.status.is_available())
    }

    pub fn degraded(&self) -> bool {
        self.healthy() && self.engines.iter().any(|e| !e.status.is_available())
    }
}

/// Selects and sequences engines for each request.
///
/// 设计目标：
/// - 一次请求 = 一次规划 + 严格顺序的引擎调用（两个重型模型绝不并行，
///   以可用性换峰值内存）；
/// - 第一个产出良构结果的引擎即获胜，剩余计划不再执行；
/// - 每次调用都带各引擎自己的 deadline，超时视为普通失败参与回退；
/// - 无论成功失败，请求的进度通道都恰好收到一次终止事件。
#[derive(Clone)]
pub struct Orchestrator {
    vision: Arc<dyn EngineCapability>,
    classical: Arc<dyn EngineCapability>,
}

impl Orchestrator {
    pub fn new(vision: Arc<dyn EngineCapability>, classical: Arc<dyn EngineCapability>) -> Self {
        Self { vision, classical }
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            engines: [&self.vision, &self.classical]
                .into_iter()
                .map(|engine| EngineHealth {
                    engine: engine.kind(),
                    status: engine.status(),
                })
                .collect(),
        }
    }

    pub fn engine(&self, kind: EngineKind) -> &dyn EngineCapability {
        match kind {
            EngineKind::Qwen => self.vision.as_ref(),
            EngineKind::Paddle => self.classical.as_ref(),
        }
    }

    /// Ordered engine plan for `mode`, with unavailable engines dropped and
    /// recorded as diagnostics.
    fn plan(&self, mode: OcrMode) -> (Vec<Arc<dyn EngineCapability>>, Vec<EngineAttempt>) {
        // Vision first in auto mode: higher accuracy, classical is the
        // availability/cost safety net.
        let candidates: &[&Arc<dyn EngineCapability>] = match mode {
            OcrMode::Qwen => &[&self.vision],
            OcrMode::Paddle => &[&self.classical],
            OcrMode::Auto => &[&self.vision, &self.classical],
        };

        let mut plan = Vec::new();
        let mut skipped = Vec::new();
        for &candidate in candidates {
            match candidate.status() {
                EngineStatus::Unavailable { reason } => skipped.push(EngineAttempt {
                    engine: candidate.kind(),
                    outcome: AttemptOutcome::Skipped { reason },
                }),
                _ => plan.push(Arc::clone(candidate)),
            }
        }
        (plan, skipped)
    }

    /// Run one request to completion.
    ///
    /// The progress channel receives its terminal event on every path,
    /// including adapter panics surfaced as join errors.
    pub async fn run(
        &self,
        request: OcrRequest,
        progress: Arc<ProgressChannel>,
    ) -> Result<OcrResponse, OcrError> {
        let result = self.run_inner(request, Arc::clone(&progress)).await;
        match &result {
            Ok(response) => progress.complete(response.engine),
            Err(err) => progress.fail(err.to_string()),
        }
        result
    }

    async fn run_inner(
        &self,
        request: OcrRequest,
        progress: Arc<ProgressChannel>,
    ) -> Result<OcrResponse, OcrError> {
        let started = Instant::now();
        let OcrRequest {
            image,
            language,
            mode,
        } = request;

        let (plan, mut attempts) = self.plan(mode);
        if plan.is_empty() {
            return Err(OcrError::NoEngineAvailable { skipped: attempts });
        }

        let image = Arc::new(image);
        let mut last_failure: Option<(EngineKind, EngineError)> = None;

        for engine in plan {
            let kind = engine.kind();
            info!(engine = %kind, %mode, "invoking OCR engine");

            match invoke_with_deadline(
                engine,
                Arc::clone(&image),
                language.clone(),
                Arc::clone(&progress),
            )
            .await
            {
                Ok(result) => {
                    // First success wins; remaining plan entries are not
                    // attempted even if they might score higher.
                    if !attempts.is_empty() {
                        info!(engine = %kind, "fallback engine produced the result");
                    }
                    return Ok(normalizer::normalize(
                        result,
                        language,
                        attempts,
                        started.elapsed(),
                    ));
                }
                Err(error) => {
                    warn!(engine = %kind, error = %error, "OCR engine failed");
                    attempts.push(EngineAttempt {
                        engine: kind,
                        outcome: AttemptOutcome::Failed {
                            kind: error.kind_label(),
                            reason: error.to_string(),
                        },
                    });
                    last_failure = Some((kind, error));
                }
            }
        }

        match mode {
            OcrMode::Auto => Err(OcrError::AllEnginesFailed { attempts }),
            OcrMode::Qwen | OcrMode::Paddle => {
                let (engine, error) =
                    last_failure.expect("single-engine plan was invoked at least once");
                Err(OcrError::Engine { engine, error })
            }
        }
    }
}

/// Invoke one adapter on a blocking thread under its wall-clock budget.
///
/// A timed-out worker thread is not cancelled (model loads are sunk cost and
/// keep the cell consistent); its late progress emits are dropped once the
/// channel closes.
async fn invoke_with_deadline(
    engine: Arc<dyn EngineCapability>,
    image: Arc<DynamicImage>,
    language: LanguageHint,
    progress: Arc<ProgressChannel>,
) -> Result<hybrid_ocr_core::EngineResult, EngineError> {
    let budget = engine.budget();
    let worker = task::spawn_blocking(move || {
        engine.recognize(image.as_ref(), &language, progress.as_ref())
    });

    match time::timeout(budget, worker).await {
        Err(_elapsed) => Err(EngineError::Timeout { budget }),
        Ok(Err(join_error)) => Err(EngineError::inference(format!(
            "engine task failed: {join_error}"
        ))),
        Ok(Ok(result)) => result,
    }
}
