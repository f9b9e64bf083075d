use std::time::Duration;

use anyhow::Result;
use image::DynamicImage;

use crate::{EngineKind, TextRegion};

/// Narrow interface to an opaque vision-language OCR backend.
///
/// 设计目标：
/// - 权重加载、量化与推理细节对上层完全不可见；
/// - 上层只关心「图像 + 提示 → 文本」这一种能力；
/// - 实现不要求线程安全，适配层负责串行化访问。
pub trait VisionBackend: Send {
    /// Human-readable model label reported in responses.
    fn model(&self) -> &str;

    /// Transcribe the text visible in `image`, guided by `prompt`.
    fn transcribe(&mut self, image: &DynamicImage, prompt: &str) -> Result<String>;
}

/// Narrow interface to an opaque classical detector/recognizer backend.
pub trait ClassicalBackend: Send {
    /// Human-readable model label reported in responses.
    fn model(&self) -> &str;

    /// Detect and recognise text regions in `image`.
    fn recognize(&mut self, image: &DynamicImage) -> Result<Vec<TextRegion>>;
}

/// Raw engine output before normalisation.
///
/// 两个引擎的输出形状不同：视觉模型给整块文本且不报置信度，
/// 传统管线给逐区域文本、置信度与包围盒。归一化在 pipeline 层完成。
#[derive(Debug, Clone)]
pub enum RawOutput {
    Vision { text: String },
    Classical { regions: Vec<TextRegion> },
}

/// Output of one successful engine invocation.
#[derive(Debug, Clone)]
pub struct EngineResult {
    pub engine: EngineKind,
    pub model: String,
    pub output: RawOutput,
    pub duration: Duration,
}
