use hybrid_ocr_core::EngineKind;
use hybrid_ocr_pipeline::ProgressEvent;

#[test]
fn serialize_stage_includes_all_fields() {
    let event = ProgressEvent::Stage {
        stage: 3,
        label: "running OCR analysis".to_string(),
        percent: 70,
        timestamp_ms: 1_700_000_000_123,
    };

    let json = serde_json::to_string(&event).expect("serialize");

    assert!(json.contains("\"kind\":\"stage\""));
    assert!(json.contains("\"stage\":3"));
    assert!(json.contains("\"label\":\"running OCR analysis\""));
    assert!(json.contains("\"percent\":70"));
    assert!(json.contains("\"timestamp_ms\":1700000000123"));
}

#[test]
fn serialize_completed_pins_percent_to_hundred() {
    let event = ProgressEvent::Completed {
        stage: 7,
        engine: EngineKind::Paddle,
        timestamp_ms: 42,
    };

    let json = serde_json::to_string(&event).expect("serialize");

    assert!(json.contains("\"kind\":\"completed\""));
    assert!(json.contains("\"engine\":\"paddle\""));
    assert!(json.contains("\"percent\":100"));
}

#[test]
fn serialize_failed_carries_reason() {
    let event = ProgressEvent::Failed {
        stage: 2,
        reason: "all OCR engines failed".to_string(),
        timestamp_ms: 42,
    };

    let json = serde_json::to_string(&event).expect("serialize");

    assert!(json.contains("\"kind\":\"failed\""));
    assert!(json.contains("\"reason\":\"all OCR engines failed\""));
    assert!(!json.contains("percent"));
}

#[test]
fn display_is_human_readable() {
    let stage = ProgressEvent::Stage {
        stage: 1,
        label: "generating text".to_string(),
        percent: 80,
        timestamp_ms: 0,
    };
    let completed = ProgressEvent::Completed {
        stage: 5,
        engine: EngineKind::Qwen,
        timestamp_ms: 0,
    };

    assert_eq!(stage.to_string(), "Stage 1 `generating text` 80%");
    assert_eq!(completed.to_string(), "Completed 5 via qwen");
}

#[test]
fn terminal_classification() {
    let stage = ProgressEvent::Stage {
        stage: 0,
        label: "x".to_string(),
        percent: 0,
        timestamp_ms: 0,
    };
    let failed = ProgressEvent::Failed {
        stage: 1,
        reason: "x".to_string(),
        timestamp_ms: 0,
    };

    assert!(!stage.is_terminal());
    assert!(failed.is_terminal());
    assert_eq!(stage.percent(), Some(0));
    assert_eq!(failed.percent(), None);
}
