use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

/// Detection model shared by all languages.
pub const DETECTION_MODEL: &str = "PP-OCRv5_mobile_det.mnn";

/// One recognisable language and the model files backing it.
#[derive(Debug, Clone)]
pub struct LanguageModel {
    /// Language identifier (e.g. "english", "arabic").
    pub id: &'static str,
    /// Display name.
    pub display_name: &'static str,
    /// Recognition model filename.
    pub rec_model: &'static str,
    /// Charset filename.
    pub charset_file: &'static str,
}

/// Language config: (id, display_name, rec_model, charset).
const LANGUAGE_TABLE: &[LanguageModel] = &[
    LanguageModel {
        id: "chinese",
        display_name: "简体中文",
        rec_model: "PP-OCRv5_mobile_rec.mnn",
        charset_file: "ppocr_keys_v5.txt",
    },
    LanguageModel {
        id: "english",
        display_name: "English",
        rec_model: "en_PP-OCRv5_mobile_rec_infer.mnn",
        charset_file: "ppocr_keys_en.txt",
    },
    LanguageModel {
        id: "korean",
        display_name: "한국어",
        rec_model: "korean_PP-OCRv5_mobile_rec_infer.mnn",
        charset_file: "ppocr_keys_korean.txt",
    },
    LanguageModel {
        id: "arabic",
        display_name: "العربية",
        rec_model: "arabic_PP-OCRv5_mobile_rec_infer.mnn",
        charset_file: "ppocr_keys_arabic.txt",
    },
    LanguageModel {
        id: "cyrillic",
        display_name: "Кириллица",
        rec_model: "cyrillic_PP-OCRv5_mobile_rec_infer.mnn",
        charset_file: "ppocr_keys_cyrillic.txt",
    },
    LanguageModel {
        id: "devanagari",
        display_name: "देवनागरी",
        rec_model: "devanagari_PP-OCRv5_mobile_rec_infer.mnn",
        charset_file: "ppocr_keys_devanagari.txt",
    },
    LanguageModel {
        id: "latin",
        display_name: "Latin",
        rec_model: "latin_PP-OCRv5_mobile_rec_infer.mnn",
        charset_file: "ppocr_keys_latin.txt",
    },
    LanguageModel {
        id: "greek",
        display_name: "Ελληνικά",
        rec_model: "el_PP-OCRv5_mobile_rec_infer.mnn",
        charset_file: "ppocr_keys_el.txt",
    },
    LanguageModel {
        id: "thai",
        display_name: "ไทย",
        rec_model: "th_PP-OCRv5_mobile_rec_infer.mnn",
        charset_file: "ppocr_keys_th.txt",
    },
    LanguageModel {
        id: "tamil",
        display_name: "தமிழ்",
        rec_model: "ta_PP-OCRv5_mobile_rec_infer.mnn",
        charset_file: "ppocr_keys_ta.txt",
    },
    LanguageModel {
        id: "telugu",
        display_name: "తెలుగు",
        rec_model: "te_PP-OCRv5_mobile_rec_infer.mnn",
        charset_file: "ppocr_keys_te.txt",
    },
];

/// All languages the recognition model table knows about.
pub fn known_languages() -> &'static [LanguageModel] {
    LANGUAGE_TABLE
}

/// Detect languages whose model files are actually present in `models_dir`.
pub fn available_languages(models_dir: &Path) -> Vec<LanguageModel> {
    LANGUAGE_TABLE
        .iter()
        .filter(|lang| {
            let rec_path = models_dir.join(lang.rec_model);
            let charset_path = models_dir.join(lang.charset_file);
            // Only include languages with both files present.
            rec_path.exists() && charset_path.exists()
        })
        .cloned()
        .collect()
}

/// Resolve model paths for the configured language.
///
/// Falls back to the first available language when the configured one has no
/// model files on disk.
pub fn resolve_model_paths(
    models_dir: &Path,
    language: &str,
) -> Result<(PathBuf, PathBuf, PathBuf, &'static str)> {
    let det_path = models_dir.join(DETECTION_MODEL);

    let available = available_languages(models_dir);
    let lang = available
        .iter()
        .find(|l| l.id == language)
        .or_else(|| available.first())
        .ok_or_else(|| {
            anyhow!(
                "no recognition models found under {}",
                models_dir.display()
            )
        })?;

    let rec_path = models_dir.join(lang.rec_model);
    let charset_path = models_dir.join(lang.charset_file);

    if !det_path.exists() {
        return Err(anyhow!(
            "detection model missing: {}",
            det_path.display()
        ));
    }

    Ok((det_path, rec_path, charset_path, lang.id))
}
