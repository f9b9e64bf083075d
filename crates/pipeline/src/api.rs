//! High-level request/response types for orchestrated OCR.

use std::time::Duration;

use hybrid_ocr_core::{EngineKind, LanguageHint, OcrMode, TextRegion};
use image::DynamicImage;
use serde::Serialize;

/// One inbound OCR call.
///
/// 设计目标：
/// - 作为编排层对外暴露的稳定语义输入；
/// - 请求对象是不可变值，随响应发出后即丢弃，不做跨请求复用。
#[derive(Debug)]
pub struct OcrRequest {
    pub image: DynamicImage,
    pub language: LanguageHint,
    pub mode: OcrMode,
}

/// Normalised response shared by every engine.
///
/// 不论哪个引擎产出结果，调用方看到的都是这一个契约；引擎给不出的字段
/// （例如视觉模型的置信度）保持缺省，绝不伪造。
#[derive(Debug, Clone)]
pub struct OcrResponse {
    /// Engine that actually produced the result.
    pub engine: EngineKind,
    /// Model label reported by the backend.
    pub model: String,
    pub text: String,
    /// Aggregate confidence in [0, 100]; absent when the engine reports none.
    pub confidence: Option<f32>,
    pub word_count: usize,
    /// Per-region detail; only the classical engine produces it.
    pub regions: Option<Vec<TextRegion>>,
    pub language: LanguageHint,
    /// Wall-clock spent inside the winning engine.
    pub engine_duration: Duration,
    /// Total request latency including failed attempts.
    pub duration: Duration,
    /// Engines that were skipped or failed before this result.
    pub attempts: Vec<EngineAttempt>,
}

/// Diagnostic record for one engine that did not produce the final result.
#[derive(Debug, Clone, Serialize)]
pub struct EngineAttempt {
    pub engine: EngineKind,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Dropped from the plan before invocation (unavailable at build time).
    Skipped { reason: String },
    /// Invoked and failed.
    Failed { kind: &'static str, reason: String },
}
