use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use hybrid_ocr_pipeline::hybrid_ocr_core::{LanguageHint, OcrMode};
use hybrid_ocr_pipeline::{OcrRequest, ProgressChannel};
use image::DynamicImage;
use reqwest::blocking::Client;
use rocket::tokio;
use tracing::{error, info};

use crate::{
    error::ApiError,
    models::{OcrApiRequest, OcrApiResponse},
    state::AppState,
    stream::forward_progress,
};

/// Run one OCR request end to end.
pub async fn run_ocr(state: &AppState, payload: OcrApiRequest) -> Result<OcrApiResponse, ApiError> {
    let mode = match payload.mode.as_deref() {
        Some(raw) => OcrMode::from_str(raw).map_err(|err| ApiError::BadRequest(err.to_string()))?,
        None => OcrMode::default(),
    };
    let language = match payload.language {
        Some(raw) => {
            LanguageHint::from_hint(raw).map_err(|err| ApiError::BadRequest(err.to_string()))?
        }
        None => LanguageHint::default(),
    };

    // Payload decoding may fetch remote images; keep it off the async workers.
    let image_spec = payload.image;
    let image = tokio::task::spawn_blocking(move || load_image(&image_spec))
        .await
        .map_err(|err| ApiError::Internal(format!("image decode task failed: {err}")))??;

    info!(
        %mode,
        %language,
        width = image.width(),
        height = image.height(),
        "processing OCR request"
    );

    let channel = Arc::new(ProgressChannel::new());
    forward_progress(channel.subscribe(), state.progress_sender().clone());

    let orchestrator = state.orchestrator().clone();
    let request = OcrRequest {
        image,
        language,
        mode,
    };

    // Detached task: a dropped connection must not cancel in-flight
    // inference — the run completes, the result is simply discarded.
    let worker =
        tokio::spawn(async move { orchestrator.run(request, channel).await });

    match worker.await {
        Ok(Ok(response)) => Ok(response.into()),
        Ok(Err(err)) => {
            error!(error = %err, "OCR request failed");
            Err(ApiError::from(err))
        }
        Err(err) => Err(ApiError::Internal(format!("ocr task failed: {err}"))),
    }
}

/// Decode the request's image payload.
///
/// Accepts a base64 `data:` URL, an `http(s)` URL fetched server-side, or a
/// bare base64 string.
pub fn load_image(spec: &str) -> Result<DynamicImage, ApiError> {
    if let Some(rest) = spec.strip_prefix("data:") {
        return load_data_url(rest);
    }
    if spec.starts_with("http://") || spec.starts_with("https://") {
        return fetch_remote_image(spec);
    }
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(spec.trim())
        .map_err(|_| {
            ApiError::BadRequest(
                "image must be a data: URL, an http(s) URL or base64 image bytes".into(),
            )
        })?;
    image::load_from_memory(&decoded)
        .map_err(|err| ApiError::BadRequest(format!("failed to decode image payload: {err}")))
}

fn load_data_url(data: &str) -> Result<DynamicImage, ApiError> {
    let (meta, payload) = data
        .split_once(',')
        .ok_or_else(|| ApiError::BadRequest("invalid data URL".into()))?;
    if !meta.ends_with(";base64") {
        return Err(ApiError::BadRequest(
            "data URLs must specify base64 encoding".into(),
        ));
    }
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|err| ApiError::BadRequest(format!("invalid base64 image payload: {err}")))?;
    image::load_from_memory(&decoded)
        .map_err(|err| ApiError::BadRequest(format!("failed to decode inline image: {err}")))
}

fn fetch_remote_image(url: &str) -> Result<DynamicImage, ApiError> {
    let client = Client::new();
    let response = client
        .get(url)
        .send()
        .map_err(|err| ApiError::BadRequest(format!("failed to fetch {url}: {err}")))?
        .error_for_status()
        .map_err(|err| ApiError::BadRequest(format!("image request failed for {url}: {err}")))?;
    let bytes = response
        .bytes()
        .map_err(|err| ApiError::BadRequest(format!("failed to read image body: {err}")))?;
    image::load_from_memory(&bytes)
        .map_err(|err| ApiError::BadRequest(format!("failed to decode remote image: {err}")))
}
