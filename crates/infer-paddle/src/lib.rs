pub mod lang;

use anyhow::Result;
use hybrid_ocr_core::{BoundingBox, ClassicalBackend, ClassicalSettings, TextRegion};
use image::DynamicImage;
use ocr_rs::OcrEngine;
use tracing::info;

pub use lang::{DETECTION_MODEL, LanguageModel, available_languages, known_languages};

/// PP-OCRv5 detector/recognizer behind the classical backend interface.
pub struct PaddleBackend {
    engine: OcrEngine,
    model: String,
}

/// Load the classical backend for the configured models directory and
/// language. Missing model files fail the load; the adapter records that as
/// a permanent unavailability.
pub fn load_backend(settings: &ClassicalSettings) -> Result<Box<dyn ClassicalBackend>> {
    let (det_path, rec_path, charset_path, language) =
        lang::resolve_model_paths(&settings.models_dir, &settings.language)?;

    let engine = OcrEngine::new(&det_path, &rec_path, &charset_path, None)
        .map_err(|err| anyhow::anyhow!("failed to create PP-OCRv5 engine: {err}"))?;

    info!(
        language,
        models_dir = %settings.models_dir.display(),
        "classical engine loaded"
    );

    Ok(Box::new(PaddleBackend {
        engine,
        model: format!("PP-OCRv5-{language}"),
    }))
}

impl ClassicalBackend for PaddleBackend {
    fn model(&self) -> &str {
        &self.model
    }

    fn recognize(&mut self, image: &DynamicImage) -> Result<Vec<TextRegion>> {
        let raw_results = self
            .engine
            .recognize(image)
            .map_err(|err| anyhow::anyhow!("PP-OCRv5 recognition failed: {err}"))?;

        let regions = raw_results
            .into_iter()
            .filter(|r| !r.text.trim().is_empty())
            .map(|r| TextRegion {
                text: r.text,
                confidence: r.confidence,
                bbox: BoundingBox {
                    x: r.bbox.rect.left(),
                    y: r.bbox.rect.top(),
                    width: r.bbox.rect.width() as i32,
                    height: r.bbox.rect.height() as i32,
                },
            })
            .collect();

        Ok(regions)
    }
}
