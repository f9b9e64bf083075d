use clap::Parser;
use rocket::{
    Build, Rocket,
    http::{ContentType, Status},
    local::asynchronous::Client,
};
use serde_json::{Value, json};

use hybrid_ocr_server::{args::Args, routes, state::AppState};

fn test_rocket(extra_args: &[&str]) -> Rocket<Build> {
    let mut argv = vec!["hybrid-ocr-server"];
    argv.extend_from_slice(extra_args);
    let args = Args::parse_from(argv);
    let state = AppState::bootstrap(&args).expect("state should bootstrap");
    rocket::build().manage(state).mount("/v1", routes::v1_routes())
}

async fn read_json(response: rocket::local::asynchronous::LocalResponse<'_>) -> Value {
    response
        .into_string()
        .await
        .map(|s| serde_json::from_str::<Value>(&s).expect("response must be valid JSON"))
        .expect("response body should exist")
}

fn png_data_url() -> String {
    use base64::Engine;
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgba8(2, 2)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("png encoding");
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[rocket::async_test]
async fn health_reports_both_engines_and_overall_status() {
    let client = Client::tracked(test_rocket(&[]))
        .await
        .expect("client should build");

    let response = client.get("/v1/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");

    let engines = body["engines"].as_array().expect("engines array");
    assert_eq!(engines.len(), 2);
    assert_eq!(engines[0]["engine"], "qwen");
    assert_eq!(engines[1]["engine"], "paddle");
    assert!(engines.iter().all(|e| e["state"] == "not_loaded"));
    assert!(engines.iter().all(|e| e["available"] == true));
}

#[rocket::async_test]
async fn languages_lists_the_classical_model_table() {
    let models_dir = tempfile::tempdir().expect("tempdir");
    let client = Client::tracked(test_rocket(&[
        "--models-dir",
        models_dir.path().to_str().expect("utf-8 path"),
    ]))
    .await
    .expect("client should build");

    let response = client.get("/v1/languages").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body = read_json(response).await;
    let languages = body["languages"].as_array().expect("languages array");
    assert!(languages.iter().any(|l| l["id"] == "english"));
    assert!(languages.iter().any(|l| l["id"] == "arabic"));
    // No model files on disk: nothing is available yet.
    assert!(languages.iter().all(|l| l["available"] == false));
}

#[rocket::async_test]
async fn unknown_mode_is_rejected_with_the_error_shape() {
    let client = Client::tracked(test_rocket(&[]))
        .await
        .expect("client should build");

    let payload = json!({"image": png_data_url(), "mode": "tesseract"});
    let response = client
        .post("/v1/ocr")
        .header(ContentType::JSON)
        .body(payload.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let body = read_json(response).await;
    assert!(body["error"]["message"].is_string());
    assert_eq!(body["error"]["type"], "bad_request");
    assert!(
        body["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("tesseract"))
    );
}

#[rocket::async_test]
async fn undecodable_image_payloads_are_bad_requests() {
    let client = Client::tracked(test_rocket(&[]))
        .await
        .expect("client should build");

    let payload = json!({"image": "definitely !! not ** an image"});
    let response = client
        .post("/v1/ocr")
        .header(ContentType::JSON)
        .body(payload.to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    let body = read_json(response).await;
    assert_eq!(body["error"]["type"], "bad_request");
}

#[rocket::async_test]
async fn requested_engine_failure_is_engine_specific_and_sticky() {
    let models_dir = tempfile::tempdir().expect("tempdir");
    let client = Client::tracked(test_rocket(&[
        "--models-dir",
        models_dir.path().to_str().expect("utf-8 path"),
        "--no-vision",
    ]))
    .await
    .expect("client should build");

    let payload = json!({"image": png_data_url(), "mode": "paddle"});

    // First call attempts the load and surfaces the engine-specific error;
    // paddle mode never falls back.
    let response = client
        .post("/v1/ocr")
        .header(ContentType::JSON)
        .body(payload.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::InternalServerError);
    let body = read_json(response).await;
    assert_eq!(body["error"]["type"], "engine_unavailable");

    // The failed load is cached: the engine is now gated out at planning
    // time and the failure class changes to a deployment problem.
    let response = client
        .post("/v1/ocr")
        .header(ContentType::JSON)
        .body(payload.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::ServiceUnavailable);
    let body = read_json(response).await;
    assert_eq!(body["error"]["type"], "no_engine_available");
    assert!(body["error"]["attempts"].is_array());

    // Liveness reflects the dead engines.
    let response = client.get("/v1/health").dispatch().await;
    let body = read_json(response).await;
    assert_eq!(body["status"], "unavailable");
}

#[rocket::async_test]
async fn train_rejects_empty_batches() {
    let client = Client::tracked(test_rocket(&[]))
        .await
        .expect("client should build");

    let response = client
        .post("/v1/train")
        .header(ContentType::JSON)
        .body(json!({"samples": []}).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn train_ingests_a_batch_and_reports_the_split() {
    let inputs = tempfile::tempdir().expect("inputs dir");
    let training_root = tempfile::tempdir().expect("training root");

    let first = inputs.path().join("a.png");
    let second = inputs.path().join("b.png");
    image::RgbaImage::new(4, 4).save(&first).expect("sample a");
    image::RgbaImage::new(4, 4).save(&second).expect("sample b");

    let client = Client::tracked(test_rocket(&[
        "--training-root",
        training_root.path().to_str().expect("utf-8 path"),
    ]))
    .await
    .expect("client should build");

    let payload = json!({
        "samples": [
            {"image": first.to_str().expect("utf-8 path"), "text": "first sample"},
            {"image": second.to_str().expect("utf-8 path"), "text": "second sample"},
        ]
    });
    let response = client
        .post("/v1/train")
        .header(ContentType::JSON)
        .body(payload.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body = read_json(response).await;
    assert_eq!(body["ingested"], 2);
    assert_eq!(body["train_count"], 1);
    assert_eq!(body["val_count"], 1);
    assert!(training_root.path().join("manifest.json").exists());
}
