use std::str::FromStr;

use hybrid_ocr_core::{EngineKind, LanguageHint, OcrMode};

#[test]
fn mode_parses_case_insensitively() {
    assert_eq!(OcrMode::from_str("qwen").unwrap(), OcrMode::Qwen);
    assert_eq!(OcrMode::from_str("PADDLE").unwrap(), OcrMode::Paddle);
    assert_eq!(OcrMode::from_str("  Auto ").unwrap(), OcrMode::Auto);
}

#[test]
fn unknown_mode_is_rejected_with_the_offending_value() {
    let err = OcrMode::from_str("tesseract").unwrap_err();
    assert!(err.to_string().contains("tesseract"));
}

#[test]
fn mode_defaults_to_auto() {
    assert_eq!(OcrMode::default(), OcrMode::Auto);
}

#[test]
fn engine_kind_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&EngineKind::Qwen).unwrap(),
        "\"qwen\""
    );
    assert_eq!(
        serde_json::to_string(&EngineKind::Paddle).unwrap(),
        "\"paddle\""
    );
}

#[test]
fn language_hint_is_trimmed_and_lowercased() {
    let hint = LanguageHint::try_from(" ENG ").unwrap();
    assert_eq!(hint.as_str(), "eng");
}

#[test]
fn empty_or_whitespace_hints_are_rejected() {
    assert!(LanguageHint::try_from("").is_err());
    assert!(LanguageHint::try_from("   ").is_err());
    assert!(LanguageHint::try_from("en gb").is_err());
}

#[test]
fn arabic_script_hints_are_classified() {
    for raw in ["ara", "ar", "urd", "urdu", "fa"] {
        assert!(
            LanguageHint::try_from(raw).unwrap().uses_arabic_script(),
            "{raw} should be classified as Arabic script"
        );
    }
    for raw in ["eng", "fra", "deu", "spa"] {
        assert!(!LanguageHint::try_from(raw).unwrap().uses_arabic_script());
    }
}

#[test]
fn language_hint_round_trips_through_serde() {
    let hint: LanguageHint = serde_json::from_str("\"Urd\"").unwrap();
    assert_eq!(hint.as_str(), "urd");
    assert_eq!(serde_json::to_string(&hint).unwrap(), "\"urd\"");

    let invalid: Result<LanguageHint, _> = serde_json::from_str("\"\"");
    assert!(invalid.is_err());
}
