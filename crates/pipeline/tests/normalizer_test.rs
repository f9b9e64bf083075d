use std::time::Duration;

use hybrid_ocr_core::{
    BoundingBox, EngineKind, EngineResult, LanguageHint, RawOutput, TextRegion,
};
use hybrid_ocr_pipeline::normalize;

fn region(text: &str, confidence: f32) -> TextRegion {
    TextRegion {
        text: text.to_string(),
        confidence,
        bbox: BoundingBox {
            x: 0,
            y: 0,
            width: 100,
            height: 20,
        },
    }
}

fn classical_result(regions: Vec<TextRegion>) -> EngineResult {
    EngineResult {
        engine: EngineKind::Paddle,
        model: "PP-OCRv5-english".to_string(),
        output: RawOutput::Classical { regions },
        duration: Duration::from_millis(120),
    }
}

#[test]
fn classical_regions_are_joined_and_averaged() {
    let result = classical_result(vec![
        region("Invoice #12345", 0.75),
        region("Date: 2024-01-15", 0.25),
    ]);

    let response = normalize(
        result,
        LanguageHint::default(),
        Vec::new(),
        Duration::from_millis(150),
    );

    assert_eq!(response.engine, EngineKind::Paddle);
    assert_eq!(response.text, "Invoice #12345\nDate: 2024-01-15");
    assert_eq!(response.confidence, Some(50.0));
    assert_eq!(response.word_count, 4);
    assert_eq!(response.regions.as_ref().map(Vec::len), Some(2));
    assert_eq!(response.duration, Duration::from_millis(150));
    assert_eq!(response.engine_duration, Duration::from_millis(120));
}

#[test]
fn classical_with_no_regions_reports_no_confidence() {
    let response = normalize(
        classical_result(Vec::new()),
        LanguageHint::default(),
        Vec::new(),
        Duration::from_millis(10),
    );

    assert_eq!(response.text, "");
    assert_eq!(response.confidence, None);
    assert_eq!(response.word_count, 0);
}

#[test]
fn vision_output_never_gets_a_fabricated_confidence() {
    let result = EngineResult {
        engine: EngineKind::Qwen,
        model: "Qwen/Qwen2.5-VL-3B-Instruct".to_string(),
        output: RawOutput::Vision {
            text: "The quick brown fox".to_string(),
        },
        duration: Duration::from_secs(3),
    };

    let response = normalize(
        result,
        LanguageHint::default(),
        Vec::new(),
        Duration::from_secs(3),
    );

    assert_eq!(response.engine, EngineKind::Qwen);
    assert_eq!(response.confidence, None);
    assert_eq!(response.regions, None);
    assert_eq!(response.word_count, 4);
}

#[test]
fn aggregate_confidence_is_clamped_to_percentage_range() {
    // Backends occasionally report slightly-above-one confidences.
    let response = normalize(
        classical_result(vec![region("x", 1.25)]),
        LanguageHint::default(),
        Vec::new(),
        Duration::ZERO,
    );

    assert_eq!(response.confidence, Some(100.0));
}
