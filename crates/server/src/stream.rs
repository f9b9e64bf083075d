use hybrid_ocr_pipeline::ProgressEvent;
use rocket::State;
use rocket::response::stream::{Event, EventStream};
use rocket::tokio;
use tokio::sync::broadcast;

use crate::state::AppState;

/// Bridge one request's progress channel into the server-wide broadcast.
///
/// Runs until the channel delivers its terminal event (or closes); a slow or
/// absent SSE consumer only affects the broadcast buffer, never inference.
pub fn forward_progress(
    mut rx: broadcast::Receiver<ProgressEvent>,
    tx: broadcast::Sender<ProgressEvent>,
) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let terminal = event.is_terminal();
                    let _ = tx.send(event);
                    if terminal {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Live progress of all in-flight OCR requests as Server-Sent Events.
#[get("/progress")]
pub fn progress(state: &State<AppState>) -> EventStream![Event] {
    let mut rx = state.subscribe_progress();
    EventStream! {
        loop {
            match rx.recv().await {
                Ok(event) => yield Event::json(&event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
