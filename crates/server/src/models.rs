//! JSON DTOs for the `/v1` API.

use hybrid_ocr_pipeline::api::{EngineAttempt, OcrResponse};
use hybrid_ocr_pipeline::hybrid_ocr_core::{EngineKind, TextRegion};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct OcrApiRequest {
    /// Image payload: a `data:` URL, an `http(s)` URL, or raw base64.
    pub image: String,

    /// Language hint, e.g. `eng`, `urd`, `ara`.
    #[serde(default)]
    pub language: Option<String>,

    /// Engine selection: `qwen`, `paddle` or `auto`.
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OcrApiResponse {
    pub engine: EngineKind,
    pub model: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub word_count: usize,
    pub language: String,
    /// Total request latency in seconds, failed attempts included.
    pub processing_time: f64,
    /// Wall-clock spent inside the winning engine, in seconds.
    pub engine_time: f64,
    /// Engines that were skipped or failed before this result.
    pub attempts: Vec<EngineAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<TextRegion>>,
}

impl From<OcrResponse> for OcrApiResponse {
    fn from(response: OcrResponse) -> Self {
        Self {
            engine: response.engine,
            model: response.model,
            text: response.text,
            confidence: response.confidence,
            word_count: response.word_count,
            language: response.language.to_string(),
            processing_time: response.duration.as_secs_f64(),
            engine_time: response.engine_duration.as_secs_f64(),
            attempts: response.attempts,
            regions: response.regions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, `degraded` or `unavailable`.
    pub status: &'static str,
    pub engines: Vec<EngineHealthDto>,
}

#[derive(Debug, Serialize)]
pub struct EngineHealthDto {
    pub engine: EngineKind,
    pub state: &'static str,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageDto>,
}

#[derive(Debug, Serialize)]
pub struct LanguageDto {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Whether the model files for this language are present on disk.
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub samples: Vec<TrainSampleDto>,
}

#[derive(Debug, Deserialize)]
pub struct TrainSampleDto {
    pub image: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub ingested: usize,
    pub train_count: usize,
    pub val_count: usize,
    pub train_list: String,
    pub val_list: String,
}
