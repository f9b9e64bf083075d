use std::path::PathBuf;

use hybrid_ocr_pipeline::hybrid_ocr_core::EngineStatus;
use hybrid_ocr_pipeline::hybrid_ocr_infer_paddle as paddle;
use hybrid_ocr_training::{TrainingSample, TrainingWorkspace};
use rocket::{Route, State, serde::json::Json};
use tracing::info;

use crate::{
    error::ApiError,
    models::{
        EngineHealthDto, HealthResponse, LanguageDto, LanguagesResponse, OcrApiRequest,
        OcrApiResponse, TrainRequest, TrainResponse,
    },
    recognition,
    state::AppState,
    stream,
};

pub fn v1_routes() -> Vec<Route> {
    routes![ocr, health, languages, train, stream::progress]
}

#[post("/ocr", format = "json", data = "<req>")]
async fn ocr(
    state: &State<AppState>,
    req: Json<OcrApiRequest>,
) -> Result<Json<OcrApiResponse>, ApiError> {
    recognition::run_ocr(state, req.into_inner())
        .await
        .map(Json)
}

#[get("/health")]
fn health(state: &State<AppState>) -> Json<HealthResponse> {
    let report = state.orchestrator().health();

    let status = if !report.healthy() {
        "unavailable"
    } else if report.degraded() {
        "degraded"
    } else {
        "healthy"
    };

    let engines = report
        .engines
        .into_iter()
        .map(|engine| {
            let reason = match &engine.status {
                EngineStatus::Unavailable { reason } => Some(reason.clone()),
                _ => None,
            };
            EngineHealthDto {
                engine: engine.engine,
                state: engine.status.as_str(),
                available: engine.status.is_available(),
                reason,
            }
        })
        .collect();

    Json(HealthResponse { status, engines })
}

#[get("/languages")]
fn languages(state: &State<AppState>) -> Json<LanguagesResponse> {
    let models_dir = &state.config().classical.models_dir;
    let available = paddle::available_languages(models_dir);

    let languages = paddle::known_languages()
        .iter()
        .map(|lang| LanguageDto {
            id: lang.id,
            display_name: lang.display_name,
            available: available.iter().any(|a| a.id == lang.id),
        })
        .collect();

    Json(LanguagesResponse { languages })
}

#[post("/train", format = "json", data = "<req>")]
async fn train(
    state: &State<AppState>,
    req: Json<TrainRequest>,
) -> Result<Json<TrainResponse>, ApiError> {
    let training = state.config().training.clone();
    let samples = req
        .into_inner()
        .samples
        .into_iter()
        .map(|sample| TrainingSample {
            image: PathBuf::from(sample.image),
            text: sample.text,
        })
        .collect::<Vec<_>>();

    if samples.is_empty() {
        return Err(ApiError::BadRequest(
            "training submission must include at least one sample".into(),
        ));
    }

    let count = samples.len();
    let manifest = rocket::tokio::task::spawn_blocking(move || {
        let workspace = TrainingWorkspace::create(&training.root, training.validation_split)
            .map_err(|err| ApiError::Internal(format!("{err:#}")))?;
        workspace
            .ingest(&samples)
            .map_err(|err| ApiError::BadRequest(format!("{err:#}")))
    })
    .await
    .map_err(|err| ApiError::Internal(format!("training task failed: {err}")))??;

    info!(
        ingested = count,
        train = manifest.train_count,
        val = manifest.val_count,
        "training batch ingested"
    );

    Ok(Json(TrainResponse {
        ingested: count,
        train_count: manifest.train_count,
        val_count: manifest.val_count,
        train_list: manifest.train_list.display().to_string(),
        val_list: manifest.val_list.display().to_string(),
    }))
}
