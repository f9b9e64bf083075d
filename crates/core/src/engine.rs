use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Identity of one OCR backend.
///
/// 设计目标：
/// - 引擎集合是封闭的：新增引擎时扩展枚举，而不是在调用点堆条件分支；
/// - 对外序列化固定为小写字符串（`qwen` / `paddle`），与 API 字段保持一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Vision-language model (high accuracy, slow).
    Qwen,
    /// Classical detector/recognizer pipeline (fast, cheap).
    Paddle,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Qwen => "qwen",
            EngineKind::Paddle => "paddle",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine-selection mode carried by an OCR request.
///
/// `Auto` 表示先试视觉模型、失败后回退到传统管线；单引擎模式从不回退。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrMode {
    Qwen,
    Paddle,
    #[default]
    Auto,
}

impl OcrMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrMode::Qwen => "qwen",
            OcrMode::Paddle => "paddle",
            OcrMode::Auto => "auto",
        }
    }
}

impl FromStr for OcrMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "qwen" => Ok(OcrMode::Qwen),
            "paddle" => Ok(OcrMode::Paddle),
            "auto" => Ok(OcrMode::Auto),
            other => bail!("unknown OCR mode `{other}` (expected qwen, paddle or auto)"),
        }
    }
}

impl fmt::Display for OcrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter availability as seen by request planning and health reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    /// Backend is loaded and ready to serve.
    Loaded,
    /// Backend has not been asked to load yet; presumed usable.
    NotLoaded,
    /// Backend failed to initialise and stays out of service for the
    /// process lifetime.
    Unavailable { reason: String },
}

impl EngineStatus {
    pub fn is_available(&self) -> bool {
        !matches!(self, EngineStatus::Unavailable { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineStatus::Loaded => "loaded",
            EngineStatus::NotLoaded => "not_loaded",
            EngineStatus::Unavailable { .. } => "unavailable",
        }
    }
}
