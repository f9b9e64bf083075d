use anyhow::Result;
use rocket::{Config, data::ToByteUnit};
use tracing::info;

use crate::{args::Args, cors::Cors, routes, state::AppState};

pub async fn run(args: Args) -> Result<()> {
    let state = AppState::bootstrap(&args)?;
    let config = state.config();
    let (host, port) = (config.server.host.clone(), config.server.port);

    info!(
        "Using configuration {} (vision enabled: {}, classical enabled: {})",
        state.runtime().descriptor().display(),
        config.vision.enabled,
        config.classical.enabled,
    );

    // The classical model is cheap; have it ready before the first request.
    state.runtime().preload().await;

    let figment = Config::figment()
        .merge(("port", port))
        .merge(("address", host.clone()))
        .merge((
            "limits",
            rocket::data::Limits::default()
                .limit("json", 50.megabytes())
                .limit("bytes", 50.megabytes()),
        ));

    info!("Server ready on {host}:{port}");

    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .mount("/v1", routes::v1_routes())
        .launch()
        .await
        .map_err(|err| anyhow::anyhow!("rocket failed: {err}"))?;

    Ok(())
}
