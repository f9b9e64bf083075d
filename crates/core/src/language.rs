use std::fmt;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Language hint attached to an OCR request.
///
/// 设计目标：
/// - 请求里仍然使用单一字符串（对用户友好，兼容 `eng`/`en`/`english` 等写法）；
/// - 进入 Rust 代码后尽早收敛为强类型，约束（非空、无空白符）前置。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageHint(String);

impl LanguageHint {
    pub fn from_hint(hint: String) -> Result<Self> {
        let trimmed = hint.trim();
        ensure!(!trimmed.is_empty(), "language hint must be non-empty");
        ensure!(
            !trimmed.chars().any(char::is_whitespace),
            "language hint must not contain whitespace"
        );
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the hinted language is written in Arabic script.
    ///
    /// The vision prompt carries an extra transcription instruction for these.
    pub fn uses_arabic_script(&self) -> bool {
        matches!(
            self.0.as_str(),
            "ar" | "ara" | "arabic" | "ur" | "urd" | "urdu" | "fa" | "fas" | "per" | "persian"
        )
    }
}

impl Default for LanguageHint {
    fn default() -> Self {
        Self("eng".to_string())
    }
}

impl fmt::Display for LanguageHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for LanguageHint {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hint(value)
    }
}

impl TryFrom<&str> for LanguageHint {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::from_hint(value.to_string())
    }
}

impl From<LanguageHint> for String {
    fn from(value: LanguageHint) -> Self {
        value.0
    }
}
