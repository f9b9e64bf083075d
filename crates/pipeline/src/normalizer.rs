//! Maps raw engine outputs into the one response contract.

use std::time::Duration;

use hybrid_ocr_core::{EngineResult, LanguageHint, RawOutput, TextRegion};

use crate::api::{EngineAttempt, OcrResponse};

pub fn normalize(
    result: EngineResult,
    language: LanguageHint,
    attempts: Vec<EngineAttempt>,
    total: Duration,
) -> OcrResponse {
    let EngineResult {
        engine,
        model,
        output,
        duration,
    } = result;

    let (text, confidence, regions) = match output {
        // The vision model reports no confidence; leave it absent rather
        // than inventing one.
        RawOutput::Vision { text } => (text, None, None),
        RawOutput::Classical { regions } => {
            let text = regions
                .iter()
                .map(|region| region.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            let confidence = aggregate_confidence(&regions);
            (text, confidence, Some(regions))
        }
    };

    OcrResponse {
        engine,
        model,
        word_count: word_count(&text),
        text,
        confidence,
        regions,
        language,
        engine_duration: duration,
        duration: total,
        attempts,
    }
}

/// Mean region confidence as a percentage in [0, 100].
fn aggregate_confidence(regions: &[TextRegion]) -> Option<f32> {
    if regions.is_empty() {
        return None;
    }
    let sum: f32 = regions.iter().map(|region| region.confidence).sum();
    let mean = sum / regions.len() as f32;
    Some((mean * 100.0).clamp(0.0, 100.0))
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
